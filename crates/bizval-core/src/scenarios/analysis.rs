use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::generator::{ScenarioSet, ScenarioType};
use crate::error::BizValError;
use crate::types::*;
use crate::BizValResult;

pub const PESSIMISTIC_WEIGHT: Rate = dec!(0.25);
pub const REALISTIC_WEIGHT: Rate = dec!(0.50);
pub const OPTIMISTIC_WEIGHT: Rate = dec!(0.25);

/// Risk premium below this is Low.
pub const LOW_RISK_PREMIUM_CEILING: Rate = dec!(0.25);
/// Risk premium below this (and at or above the Low ceiling) is Moderate.
pub const MODERATE_RISK_PREMIUM_CEILING: Rate = dec!(0.50);

const WEIGHT_TOLERANCE: Decimal = dec!(0.001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioRiskLevel {
    Low,
    Moderate,
    High,
}

impl std::fmt::Display for ScenarioRiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Moderate => write!(f, "Moderate"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Weights for the recommended value; must sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioWeights {
    pub pessimistic: Rate,
    pub realistic: Rate,
    pub optimistic: Rate,
}

impl Default for ScenarioWeights {
    fn default() -> Self {
        Self {
            pessimistic: PESSIMISTIC_WEIGHT,
            realistic: REALISTIC_WEIGHT,
            optimistic: OPTIMISTIC_WEIGHT,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioAnalysisOptions {
    /// Let custom scenarios widen the value range.
    pub include_custom: bool,
    pub weights: ScenarioWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioAnalysis {
    pub pessimistic_value: Money,
    pub realistic_value: Money,
    pub optimistic_value: Money,
    pub min_value: Money,
    pub max_value: Money,
    pub value_range: Money,
    /// (max - min) / realistic
    pub risk_premium: Rate,
    pub risk_level: ScenarioRiskLevel,
    pub recommended_value: Money,
    pub scenarios_considered: usize,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Summarise a scenario set into a range, a risk label and a weighted value.
pub fn analyze_scenarios(
    set: &ScenarioSet,
    options: &ScenarioAnalysisOptions,
) -> BizValResult<ComputationOutput<ScenarioAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let w = &options.weights;

    for (label, weight) in [
        ("pessimistic", w.pessimistic),
        ("realistic", w.realistic),
        ("optimistic", w.optimistic),
    ] {
        if weight < Decimal::ZERO || weight > Decimal::ONE {
            return Err(BizValError::InvalidInput {
                field: format!("weights.{label}"),
                reason: "Weight must be between 0 and 1".into(),
            });
        }
    }
    let total_weight = w.pessimistic + w.realistic + w.optimistic;
    if (total_weight - Decimal::ONE).abs() > WEIGHT_TOLERANCE {
        return Err(BizValError::InvalidInput {
            field: "weights".into(),
            reason: format!("Weights must sum to 1.0 (got {total_weight})"),
        });
    }

    let value_of = |t: ScenarioType| {
        set.get(t).map(|s| s.calculated_value).ok_or_else(|| {
            BizValError::InsufficientData(format!("{t} scenario missing from set"))
        })
    };
    let pessimistic_value = value_of(ScenarioType::Pessimistic)?;
    let realistic_value = value_of(ScenarioType::Realistic)?;
    let optimistic_value = value_of(ScenarioType::Optimistic)?;

    let considered: Vec<Money> = set
        .scenarios
        .iter()
        .filter(|s| options.include_custom || s.scenario_type != ScenarioType::Custom)
        .map(|s| s.calculated_value)
        .collect();

    let min_value = considered.iter().copied().min().unwrap_or(Decimal::ZERO);
    let max_value = considered.iter().copied().max().unwrap_or(Decimal::ZERO);
    let value_range = max_value
        .checked_sub(min_value)
        .ok_or_else(|| BizValError::InvalidInput {
            field: "scenarios".into(),
            reason: "Scenario value range exceeds the representable range".into(),
        })?;

    // Spread relative to the size of the realistic value, whatever its sign
    let risk_premium = if realistic_value.is_zero() {
        warnings.push("Realistic value is zero; risk premium reported as 0".into());
        Decimal::ZERO
    } else {
        value_range
            .checked_div(realistic_value.abs())
            .unwrap_or(Decimal::MAX)
    };

    let risk_level = if risk_premium < LOW_RISK_PREMIUM_CEILING {
        ScenarioRiskLevel::Low
    } else if risk_premium < MODERATE_RISK_PREMIUM_CEILING {
        ScenarioRiskLevel::Moderate
    } else {
        ScenarioRiskLevel::High
    };

    if !(optimistic_value >= realistic_value && realistic_value >= pessimistic_value) {
        warnings.push("Scenario values are not ordered optimistic >= realistic >= pessimistic".into());
    }

    let recommended_value = w.pessimistic * pessimistic_value
        + w.realistic * realistic_value
        + w.optimistic * optimistic_value;

    let analysis = ScenarioAnalysis {
        pessimistic_value,
        realistic_value,
        optimistic_value,
        min_value,
        max_value,
        value_range,
        risk_premium,
        risk_level,
        recommended_value,
        scenarios_considered: considered.len(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Scenario Range and Weighted Recommendation",
        &serde_json::json!({
            "include_custom": options.include_custom,
            "weights": w,
        }),
        warnings,
        elapsed,
        analysis,
    ))
}
