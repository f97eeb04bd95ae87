use clap::Args;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

use bizval_core::assumptions::EngineAssumptions;
use bizval_core::scenarios::{analyze_scenarios, generate_scenarios, Scenario, ScenarioAnalysis};
use bizval_core::{with_metadata, FinancialProfile, Money};

use super::ProfileArgs;
use crate::input;

/// Arguments for scenario generation and analysis
#[derive(Args)]
pub struct ScenariosArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Base (realistic) valuation the scenarios are derived from
    #[arg(long)]
    pub base_value: Option<Decimal>,

    /// Let custom scenarios widen the analysed range
    #[arg(long)]
    pub include_custom: bool,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// File / stdin form of the command.
#[derive(Debug, Deserialize)]
struct ScenarioRequest {
    profile: FinancialProfile,
    base_valuation: Money,
    /// Appended after the standard three; must be tagged `Custom`
    #[serde(default)]
    custom: Vec<Scenario>,
}

#[derive(Debug, Serialize)]
struct ScenarioReport {
    scenarios: Vec<Scenario>,
    chart: Vec<(String, Money)>,
    analysis: ScenarioAnalysis,
}

pub fn run_scenarios(
    args: ScenariosArgs,
    assumptions: &EngineAssumptions,
) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let request: ScenarioRequest =
        if let Some(parsed) = input::read_input(args.input.as_deref())? {
            parsed
        } else {
            ScenarioRequest {
                profile: args.profile.require()?,
                base_valuation: args
                    .base_value
                    .ok_or("--base-value is required (or provide --input)")?,
                custom: Vec::new(),
            }
        };

    let generated = generate_scenarios(
        &request.profile,
        request.base_valuation,
        &assumptions.scenarios,
    )?;
    let mut warnings = generated.warnings;
    let mut set = generated.result;
    for scenario in request.custom {
        set.push_custom(scenario)?;
    }

    let mut options = assumptions.scenario_analysis.clone();
    options.include_custom |= args.include_custom;
    let analysis = analyze_scenarios(&set, &options)?;
    warnings.extend(analysis.warnings);

    let report = ScenarioReport {
        chart: set.chart_points(),
        scenarios: set.scenarios,
        analysis: analysis.result,
    };
    let output = with_metadata(
        "Scenario Generation and Analysis",
        &serde_json::json!({
            "base_valuation": request.base_valuation.to_string(),
            "policy": assumptions.scenarios,
            "analysis": options,
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        report,
    );
    Ok(serde_json::to_value(output)?)
}
