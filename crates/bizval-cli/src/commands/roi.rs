use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use bizval_core::amortization::LoanTerms;
use bizval_core::assumptions::EngineAssumptions;
use bizval_core::roi::{calculate_roi, RoiInput};

use super::ProfileArgs;
use crate::input;

/// Arguments for an acquisition ROI projection
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RoiArgs {
    #[command(flatten)]
    pub profile: ProfileArgs,

    /// Purchase price (defaults to the asking price)
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Holding period in years
    #[arg(long, default_value_t = 5)]
    pub years: u32,

    /// Annual revenue growth (0.05 = 5%)
    #[arg(long)]
    pub growth: Option<Decimal>,

    /// Profit margin on projected revenue (defaults to profit / revenue)
    #[arg(long)]
    pub margin: Option<Decimal>,

    /// Exit multiple on final-year profit
    #[arg(long)]
    pub exit_multiple: Option<Decimal>,

    /// Capital spent after closing
    #[arg(long)]
    pub additional_investment: Option<Decimal>,

    /// Working capital injected at closing
    #[arg(long)]
    pub working_capital: Option<Decimal>,

    /// NPV discount rate (overrides assumptions)
    #[arg(long)]
    pub discount_rate: Option<Decimal>,

    /// Acquisition loan amount
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Acquisition loan rate as a percentage
    #[arg(long)]
    pub loan_rate: Option<Decimal>,

    /// Acquisition loan term in years
    #[arg(long)]
    pub loan_years: Option<i32>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_roi(
    args: RoiArgs,
    assumptions: &EngineAssumptions,
) -> Result<Value, Box<dyn std::error::Error>> {
    let roi_input: RoiInput = if let Some(parsed) = input::read_input(args.input.as_deref())? {
        parsed
    } else {
        let profile = args.profile.require()?;
        let profit_margin = match args.margin.or_else(|| profile.profit_margin()) {
            Some(m) => m,
            None => return Err("--margin is required when revenue is not positive".into()),
        };
        let financing = match (args.loan_amount, args.loan_rate, args.loan_years) {
            (Some(amount), Some(rate), Some(years)) => Some(LoanTerms::new(amount, rate, years)),
            (None, None, None) => None,
            _ => return Err("--loan-amount, --loan-rate and --loan-years go together".into()),
        };
        RoiInput {
            purchase_price: args.purchase_price.unwrap_or(profile.asking_price),
            investment_period_years: args.years,
            revenue_growth_rate: args.growth.unwrap_or(Decimal::ZERO),
            profit_margin,
            exit_multiple: args
                .exit_multiple
                .ok_or("--exit-multiple is required (or provide --input)")?,
            additional_investment: args.additional_investment.unwrap_or(Decimal::ZERO),
            working_capital: args.working_capital.unwrap_or(Decimal::ZERO),
            discount_rate: args.discount_rate,
            sensitivity: None,
            financing,
            profile,
        }
    };

    let result = calculate_roi(&roi_input, &assumptions.roi)?;
    Ok(serde_json::to_value(result)?)
}
