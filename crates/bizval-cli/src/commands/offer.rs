use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use bizval_core::assumptions::EngineAssumptions;
use bizval_core::offer::{recommend_offer, OfferInput};
use bizval_core::valuation::{ValuationMethodology, ValuationParams, ValuationResult};
use bizval_core::FinancialProfile;

use super::benchmark::{find_industry, load_table};
use super::ProfileArgs;
use crate::input;

/// Arguments for an offer recommendation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct OfferArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Valuation as methodology:multiple (e.g. "profit:3.0"); repeatable
    #[arg(long = "valuation")]
    pub valuations: Vec<String>,

    /// Industry benchmark to fit against
    #[arg(long)]
    pub industry: Option<String>,

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

fn parse_valuation(
    arg: &str,
    profile: &FinancialProfile,
) -> Result<ValuationResult, Box<dyn std::error::Error>> {
    let (name, multiple) = arg
        .split_once(':')
        .ok_or_else(|| format!("Valuation must be methodology:multiple, got '{arg}'"))?;
    let methodology: ValuationMethodology = name.parse()?;
    if !methodology.is_driver_multiple() {
        return Err(format!("{methodology} needs --input with an explicit value").into());
    }
    let multiple: Decimal = multiple
        .trim()
        .parse()
        .map_err(|e| format!("Invalid multiple in '{arg}': {e}"))?;
    Ok(methodology.apply(profile, &ValuationParams::with_multiple(multiple)))
}

pub fn run_offer(
    args: OfferArgs,
    assumptions: &EngineAssumptions,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut offer_input: OfferInput =
        if let Some(parsed) = input::read_input(args.input.as_deref())? {
            parsed
        } else {
            let profile = args.profile.require()?;
            if args.valuations.is_empty() {
                return Err("at least one --valuation is required (or provide --input)".into());
            }
            let valuations = args
                .valuations
                .iter()
                .map(|arg| parse_valuation(arg, &profile))
                .collect::<Result<Vec<_>, _>>()?;
            OfferInput {
                profile,
                valuations,
                benchmark: None,
                business_growth_rate: args.growth,
            }
        };

    if let Some(industry) = args.industry.as_deref() {
        let table = load_table(args.table.as_deref())?;
        offer_input.benchmark = Some(find_industry(&table, industry)?);
    }

    let mut policy = assumptions.offer.clone();
    policy.benchmark = assumptions.benchmark.clone();
    let result = recommend_offer(&offer_input, &policy)?;
    Ok(serde_json::to_value(result)?)
}
