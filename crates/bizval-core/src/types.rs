use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Multiples (e.g., 3.0x SDE)
pub type Multiple = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Headline financials of a business under consideration.
///
/// Supplied by the host application per calculation. `annual_profit` may be
/// negative; the engine does not validate ranges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialProfile {
    pub annual_revenue: Money,
    pub annual_profit: Money,
    pub asking_price: Money,
}

impl FinancialProfile {
    pub fn new(annual_revenue: Money, annual_profit: Money, asking_price: Money) -> Self {
        Self {
            annual_revenue,
            annual_profit,
            asking_price,
        }
    }

    /// Profit as a fraction of revenue, `None` when revenue is not positive.
    pub fn profit_margin(&self) -> Option<Rate> {
        if self.annual_revenue > Decimal::ZERO {
            Some(self.annual_profit / self.annual_revenue)
        } else {
            None
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Clamp a score into the closed unit interval.
pub(crate) fn clamp_unit(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(Decimal::ONE)
}
