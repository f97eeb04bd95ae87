pub mod projection;
pub mod risk;
pub mod sensitivity;

pub use projection::{
    calculate_roi, FinancingSummary, ProjectionYear, RoiAssumptions, RoiInput, RoiOutput,
    DEFAULT_DISCOUNT_RATE, MAX_HOLDING_PERIOD_YEARS,
};
pub use risk::{RiskTier, RiskTierThresholds};
pub use sensitivity::{SensitivityBand, SensitivityBands, SensitivityFactor};
