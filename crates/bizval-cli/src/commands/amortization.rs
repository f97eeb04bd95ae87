use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use bizval_core::amortization::{build_amortization_schedule, LoanTerms};

use crate::input;

/// Arguments for a fixed-rate loan
#[derive(Args)]
pub struct AmortizationArgs {
    /// Loan amount
    #[arg(long, alias = "loan-amount")]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a percentage (6.0 = 6%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years
    #[arg(long)]
    pub years: Option<i32>,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_amortization(args: AmortizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms: LoanTerms = if let Some(parsed) = input::read_input(args.input.as_deref())? {
        parsed
    } else {
        LoanTerms::new(
            args.principal
                .ok_or("--principal is required (or provide --input)")?,
            args.rate.ok_or("--rate is required (or provide --input)")?,
            args.years.ok_or("--years is required (or provide --input)")?,
        )
    };

    let result = build_amortization_schedule(&terms)?;
    Ok(serde_json::to_value(result)?)
}
