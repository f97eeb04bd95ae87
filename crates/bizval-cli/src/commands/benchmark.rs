use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use bizval_core::assumptions::EngineAssumptions;
use bizval_core::benchmark::{compare_to_benchmark, BenchmarkTable, IndustryBenchmark};
use bizval_core::FinancialProfile;

use super::ProfileArgs;
use crate::input;

/// Arguments for an industry benchmark comparison
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct BenchmarkArgs {
    /// Industry name (case-insensitive, see `bizval industries`)
    #[arg(long)]
    pub industry: Option<String>,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Business revenue growth rate (0.05 = 5%)
    #[arg(long)]
    pub growth: Option<Decimal>,

    /// JSON or YAML benchmark table replacing the built-in one
    #[arg(long)]
    pub table: Option<String>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for listing benchmark industries
#[derive(Args)]
pub struct IndustriesArgs {
    /// JSON or YAML benchmark table replacing the built-in one
    #[arg(long)]
    pub table: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BenchmarkRequest {
    profile: FinancialProfile,
    industry: String,
    #[serde(default)]
    business_growth_rate: Option<Decimal>,
}

/// The built-in table, or the one named by `--table`.
pub fn load_table(path: Option<&str>) -> Result<BenchmarkTable, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let table: BenchmarkTable = input::file::read_document(p)?;
            tracing::debug!(path = p, industries = table.len(), "loaded benchmark table");
            Ok(table)
        }
        None => Ok(BenchmarkTable::standard()),
    }
}

/// Look up an industry, listing the known ones when it is missing.
pub fn find_industry(
    table: &BenchmarkTable,
    industry: &str,
) -> Result<IndustryBenchmark, Box<dyn std::error::Error>> {
    table.get(industry).cloned().ok_or_else(|| {
        format!(
            "Unknown industry '{industry}'. Known industries: {}",
            table.industries().join(", ")
        )
        .into()
    })
}

pub fn run_benchmark(
    args: BenchmarkArgs,
    assumptions: &EngineAssumptions,
) -> Result<Value, Box<dyn std::error::Error>> {
    let request: BenchmarkRequest =
        if let Some(parsed) = input::read_input(args.input.as_deref())? {
            parsed
        } else {
            BenchmarkRequest {
                profile: args.profile.require()?,
                industry: args
                    .industry
                    .ok_or("--industry is required (or provide --input)")?,
                business_growth_rate: args.growth,
            }
        };

    let table = load_table(args.table.as_deref())?;
    let benchmark = find_industry(&table, &request.industry)?;
    let result = compare_to_benchmark(
        &request.profile,
        &benchmark,
        request.business_growth_rate,
        &assumptions.benchmark,
    );
    Ok(serde_json::to_value(result)?)
}

pub fn run_industries(args: IndustriesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let table = load_table(args.table.as_deref())?;
    Ok(serde_json::to_value(table)?)
}
