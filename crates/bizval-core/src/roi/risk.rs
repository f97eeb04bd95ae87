//! Qualitative risk tier and risk-factor rules for an ROI projection.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Rate, Years};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Total ROI must exceed this for a Low tier.
pub const LOW_RISK_MIN_TOTAL_ROI: Rate = dec!(0.20);
/// Payback must be strictly shorter than this for a Low tier.
pub const LOW_RISK_MAX_PAYBACK_YEARS: Years = dec!(3);
/// Total ROI must be at least this for a Medium tier.
pub const MEDIUM_RISK_MIN_TOTAL_ROI: Rate = dec!(0);
/// Payback must be no longer than this for a Medium tier.
pub const MEDIUM_RISK_MAX_PAYBACK_YEARS: Years = dec!(5);

/// Margins above this are flagged as optimistic.
pub const HIGH_MARGIN_THRESHOLD: Rate = dec!(0.40);
/// Flag when the exit accounts for more than this share of total inflows.
pub const EXIT_DEPENDENCE_THRESHOLD: Rate = dec!(0.60);
/// Year-one debt service coverage below this is flagged.
pub const MIN_DEBT_SERVICE_COVERAGE: Decimal = dec!(1.25);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Boundaries between risk tiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTierThresholds {
    pub low_min_total_roi: Rate,
    pub low_max_payback_years: Years,
    pub medium_min_total_roi: Rate,
    pub medium_max_payback_years: Years,
}

impl Default for RiskTierThresholds {
    fn default() -> Self {
        Self {
            low_min_total_roi: LOW_RISK_MIN_TOTAL_ROI,
            low_max_payback_years: LOW_RISK_MAX_PAYBACK_YEARS,
            medium_min_total_roi: MEDIUM_RISK_MIN_TOTAL_ROI,
            medium_max_payback_years: MEDIUM_RISK_MAX_PAYBACK_YEARS,
        }
    }
}

/// Signals the risk-factor rules look at.
#[derive(Debug, Clone)]
pub(crate) struct RiskSignals {
    pub revenue_growth_rate: Rate,
    pub profit_margin: Rate,
    pub payback_reached: bool,
    pub total_cash_flow: Decimal,
    pub exit_value: Decimal,
    pub debt_service_coverage: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Low: ROI above the low threshold and payback inside the low window.
/// Medium: non-negative ROI and payback inside the medium window.
/// Everything else, including payback never reached, is High.
pub fn classify_risk_tier(
    total_roi: Rate,
    payback_years: Years,
    payback_reached: bool,
    thresholds: &RiskTierThresholds,
) -> RiskTier {
    if !payback_reached {
        return RiskTier::High;
    }
    if total_roi > thresholds.low_min_total_roi && payback_years < thresholds.low_max_payback_years
    {
        RiskTier::Low
    } else if total_roi >= thresholds.medium_min_total_roi
        && payback_years <= thresholds.medium_max_payback_years
    {
        RiskTier::Medium
    } else {
        RiskTier::High
    }
}

pub(crate) fn identify_risk_factors(signals: &RiskSignals) -> Vec<String> {
    let mut factors = Vec::new();

    if signals.revenue_growth_rate < Decimal::ZERO {
        factors.push("Projection assumes declining revenue".to_string());
    }
    if signals.profit_margin > HIGH_MARGIN_THRESHOLD {
        factors.push(format!(
            "Target profit margin above {}% is aggressive for a small business",
            (HIGH_MARGIN_THRESHOLD * dec!(100)).normalize()
        ));
    }
    if signals.profit_margin <= Decimal::ZERO {
        factors.push("Projected operations do not generate profit".to_string());
    }
    if !signals.payback_reached {
        factors.push("Investment is not paid back within the holding period".to_string());
    }

    let exit_dependent = signals
        .total_cash_flow
        .checked_add(signals.exit_value)
        .filter(|inflows| *inflows > Decimal::ZERO)
        .map(|inflows| {
            signals
                .exit_value
                .checked_div(inflows)
                .map_or(true, |share| share > EXIT_DEPENDENCE_THRESHOLD)
        })
        .unwrap_or(false);
    if exit_dependent {
        factors.push(format!(
            "Exit value is more than {}% of total return",
            (EXIT_DEPENDENCE_THRESHOLD * dec!(100)).normalize()
        ));
    }

    if let Some(dscr) = signals.debt_service_coverage {
        if dscr < MIN_DEBT_SERVICE_COVERAGE {
            factors.push(format!(
                "Debt service coverage of {:.2}x is below {}x",
                dscr, MIN_DEBT_SERVICE_COVERAGE
            ));
        }
    }

    factors
}
