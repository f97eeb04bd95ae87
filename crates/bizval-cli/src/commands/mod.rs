pub mod amortization;
pub mod benchmark;
pub mod offer;
pub mod roi;
pub mod scenarios;
pub mod valuation;

use bizval_core::FinancialProfile;
use clap::Args;
use rust_decimal::Decimal;

/// Headline financials shared by most commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ProfileArgs {
    /// Annual revenue
    #[arg(long)]
    pub revenue: Option<Decimal>,

    /// Annual profit (may be negative)
    #[arg(long, allow_hyphen_values = true)]
    pub profit: Option<Decimal>,

    /// Seller's asking price
    #[arg(long)]
    pub asking_price: Option<Decimal>,
}

impl ProfileArgs {
    pub fn is_empty(&self) -> bool {
        self.revenue.is_none() && self.profit.is_none() && self.asking_price.is_none()
    }

    pub fn profile(&self) -> FinancialProfile {
        FinancialProfile::new(
            self.revenue.unwrap_or(Decimal::ZERO),
            self.profit.unwrap_or(Decimal::ZERO),
            self.asking_price.unwrap_or(Decimal::ZERO),
        )
    }

    /// Like [`ProfileArgs::profile`] but errors when no flag was given.
    pub fn require(&self) -> Result<FinancialProfile, Box<dyn std::error::Error>> {
        if self.is_empty() {
            return Err("--revenue, --profit or --asking-price is required (or provide --input)".into());
        }
        Ok(self.profile())
    }
}
