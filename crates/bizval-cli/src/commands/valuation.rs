use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use bizval_core::valuation::{
    calculate_valuation, ValuationInput, ValuationMethodology, ValuationParams,
};

use super::ProfileArgs;
use crate::input;

/// Arguments for a single valuation
#[derive(Args)]
pub struct ValuationArgs {
    /// Methodology: revenue, profit, ebitda, sde, asset, dcf, market
    #[arg(long, short = 'm')]
    pub methodology: Option<ValuationMethodology>,

    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Multiple applied to the methodology's driver
    #[arg(long)]
    pub multiple: Option<Decimal>,

    /// Tangible asset value (asset-based)
    #[arg(long)]
    pub asset_value: Option<Decimal>,

    /// Goodwill / blue-sky value (asset-based)
    #[arg(long)]
    pub blue_sky: Option<Decimal>,

    /// Externally derived value (dcf / market)
    #[arg(long)]
    pub value: Option<Decimal>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_valuation(args: ValuationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let valuation_input: ValuationInput =
        if let Some(parsed) = input::read_input(args.input.as_deref())? {
            parsed
        } else {
            let methodology = args
                .methodology
                .ok_or("--methodology is required (or provide --input)")?;
            if methodology.is_driver_multiple() && args.multiple.is_none() {
                return Err(format!("--multiple is required for {methodology}").into());
            }
            ValuationInput {
                profile: args.profile.require()?,
                methodology,
                params: ValuationParams {
                    multiple: args.multiple.unwrap_or(Decimal::ZERO),
                    manual_asset_value: args.asset_value,
                    manual_blue_sky: args.blue_sky,
                    manual_value: args.value,
                },
            }
        };

    let result = calculate_valuation(&valuation_input);
    Ok(serde_json::to_value(result)?)
}
