use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::BizValError;
use crate::types::*;
use crate::valuation::{ValuationMethodology, ValuationParams, ValuationResult};
use crate::BizValResult;

// ---------------------------------------------------------------------------
// Default adjustments relative to the realistic case
// ---------------------------------------------------------------------------

pub const OPTIMISTIC_GROWTH: Rate = dec!(0.10);
/// Negative: the optimistic case earns a premium on the multiple.
pub const OPTIMISTIC_RISK_ADJUSTMENT: Rate = dec!(-0.05);
pub const REALISTIC_GROWTH: Rate = dec!(0);
pub const REALISTIC_RISK_ADJUSTMENT: Rate = dec!(0);
pub const PESSIMISTIC_GROWTH: Rate = dec!(-0.10);
pub const PESSIMISTIC_RISK_ADJUSTMENT: Rate = dec!(0.15);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScenarioType {
    Optimistic,
    Realistic,
    Pessimistic,
    Custom,
}

impl std::fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Optimistic => write!(f, "Optimistic"),
            Self::Realistic => write!(f, "Realistic"),
            Self::Pessimistic => write!(f, "Pessimistic"),
            Self::Custom => write!(f, "Custom"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketCondition {
    Strong,
    Stable,
    Weak,
}

/// Growth applied to the valuation drivers and discount applied to the multiple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAdjustment {
    pub growth_rate: Rate,
    pub risk_adjustment: Rate,
}

/// Adjustments used to derive the three standard scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioPolicy {
    pub optimistic: ScenarioAdjustment,
    pub realistic: ScenarioAdjustment,
    pub pessimistic: ScenarioAdjustment,
}

impl Default for ScenarioPolicy {
    fn default() -> Self {
        Self {
            optimistic: ScenarioAdjustment {
                growth_rate: OPTIMISTIC_GROWTH,
                risk_adjustment: OPTIMISTIC_RISK_ADJUSTMENT,
            },
            realistic: ScenarioAdjustment {
                growth_rate: REALISTIC_GROWTH,
                risk_adjustment: REALISTIC_RISK_ADJUSTMENT,
            },
            pessimistic: ScenarioAdjustment {
                growth_rate: PESSIMISTIC_GROWTH,
                risk_adjustment: PESSIMISTIC_RISK_ADJUSTMENT,
            },
        }
    }
}

impl ScenarioPolicy {
    /// Growth may not rise, and the risk adjustment may not fall, moving
    /// from optimistic through realistic to pessimistic.
    fn check_ordering(&self) -> BizValResult<()> {
        let steps = [
            ("realistic", &self.optimistic, &self.realistic),
            ("pessimistic", &self.realistic, &self.pessimistic),
        ];
        for (label, better, worse) in steps {
            if worse.growth_rate > better.growth_rate {
                return Err(BizValError::InvalidInput {
                    field: format!("{label}.growth_rate"),
                    reason: "Growth must not exceed the more favourable scenario's".into(),
                });
            }
            if worse.risk_adjustment < better.risk_adjustment {
                return Err(BizValError::InvalidInput {
                    field: format!("{label}.risk_adjustment"),
                    reason: "Risk adjustment must not be below the more favourable scenario's"
                        .into(),
                });
            }
        }
        Ok(())
    }
}

/// A named valuation outcome under a set of assumptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub scenario_type: ScenarioType,
    pub calculated_value: Money,
    pub multiple: Multiple,
    pub methodology: ValuationMethodology,
    pub growth_rate: Rate,
    pub risk_adjustment: Rate,
    pub market_condition: MarketCondition,
    pub assumptions: String,
}

impl Scenario {
    /// A caller-defined scenario built from an existing valuation.
    pub fn custom(
        name: impl Into<String>,
        valuation: ValuationResult,
        growth_rate: Rate,
        risk_adjustment: Rate,
        market_condition: MarketCondition,
        assumptions: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            scenario_type: ScenarioType::Custom,
            calculated_value: valuation.calculated_value,
            multiple: valuation.multiple,
            methodology: valuation.methodology,
            growth_rate,
            risk_adjustment,
            market_condition,
            assumptions: assumptions.into(),
        }
    }

    pub fn valuation(&self) -> ValuationResult {
        ValuationResult {
            calculated_value: self.calculated_value,
            multiple: self.multiple,
            methodology: self.methodology,
        }
    }
}

/// Standard scenarios first, custom scenarios in the order they were added.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    pub fn get(&self, scenario_type: ScenarioType) -> Option<&Scenario> {
        self.scenarios
            .iter()
            .find(|s| s.scenario_type == scenario_type)
    }

    pub fn standard(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios
            .iter()
            .filter(|s| s.scenario_type != ScenarioType::Custom)
    }

    pub fn custom(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios
            .iter()
            .filter(|s| s.scenario_type == ScenarioType::Custom)
    }

    pub fn push_custom(&mut self, scenario: Scenario) -> BizValResult<()> {
        if scenario.scenario_type != ScenarioType::Custom {
            return Err(BizValError::InvalidInput {
                field: "scenario_type".into(),
                reason: format!(
                    "Only custom scenarios can be appended (got {})",
                    scenario.scenario_type
                ),
            });
        }
        self.scenarios.push(scenario);
        Ok(())
    }

    /// (name, value) for every scenario, custom ones included.
    pub fn chart_points(&self) -> Vec<(String, Money)> {
        self.scenarios
            .iter()
            .map(|s| (s.name.clone(), s.calculated_value))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive optimistic, realistic and pessimistic scenarios from a base value.
///
/// The base value is turned into an implied multiple on the strongest
/// available driver (profit, then revenue, then asking price). Each
/// scenario grows the drivers by its growth rate and discounts the multiple
/// by its risk adjustment before re-valuing.
pub fn generate_scenarios(
    profile: &FinancialProfile,
    base_valuation: Money,
    policy: &ScenarioPolicy,
) -> BizValResult<ComputationOutput<ScenarioSet>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    for (label, adj) in [
        ("optimistic", &policy.optimistic),
        ("realistic", &policy.realistic),
        ("pessimistic", &policy.pessimistic),
    ] {
        if adj.growth_rate <= dec!(-1) {
            return Err(BizValError::InvalidInput {
                field: format!("{label}.growth_rate"),
                reason: "Growth rate must be greater than -100%".into(),
            });
        }
        if adj.risk_adjustment >= Decimal::ONE {
            return Err(BizValError::InvalidInput {
                field: format!("{label}.risk_adjustment"),
                reason: "Risk adjustment must be below 100%".into(),
            });
        }
    }

    policy.check_ordering()?;

    if base_valuation <= Decimal::ZERO {
        warnings.push("Base valuation is not positive; scenario ordering may invert".into());
    }

    let (methodology, implied_multiple) = implied_seed(profile, base_valuation);
    if methodology == ValuationMethodology::MarketComparison && profile.asking_price.is_zero() {
        warnings.push("No positive revenue, profit or asking price; scaling the base value".into());
    }

    let scenarios = vec![
        build_scenario(
            "Optimistic",
            ScenarioType::Optimistic,
            MarketCondition::Strong,
            &policy.optimistic,
            profile,
            base_valuation,
            methodology,
            implied_multiple,
        ),
        build_scenario(
            "Realistic",
            ScenarioType::Realistic,
            MarketCondition::Stable,
            &policy.realistic,
            profile,
            base_valuation,
            methodology,
            implied_multiple,
        ),
        build_scenario(
            "Pessimistic",
            ScenarioType::Pessimistic,
            MarketCondition::Weak,
            &policy.pessimistic,
            profile,
            base_valuation,
            methodology,
            implied_multiple,
        ),
    ];

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Optimistic / Realistic / Pessimistic Scenario Generation",
        &serde_json::json!({
            "base_valuation": base_valuation.to_string(),
            "seed_methodology": methodology.to_string(),
            "implied_multiple": implied_multiple.to_string(),
            "policy": policy,
        }),
        warnings,
        elapsed,
        ScenarioSet { scenarios },
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn implied_seed(profile: &FinancialProfile, base_valuation: Money) -> (ValuationMethodology, Multiple) {
    if profile.annual_profit > Decimal::ZERO {
        (
            ValuationMethodology::ProfitMultiple,
            base_valuation / profile.annual_profit,
        )
    } else if profile.annual_revenue > Decimal::ZERO {
        (
            ValuationMethodology::RevenueMultiple,
            base_valuation / profile.annual_revenue,
        )
    } else if profile.asking_price > Decimal::ZERO {
        (
            ValuationMethodology::MarketComparison,
            base_valuation / profile.asking_price,
        )
    } else {
        (ValuationMethodology::MarketComparison, Decimal::ONE)
    }
}

#[allow(clippy::too_many_arguments)]
fn build_scenario(
    name: &str,
    scenario_type: ScenarioType,
    market_condition: MarketCondition,
    adj: &ScenarioAdjustment,
    profile: &FinancialProfile,
    base_valuation: Money,
    methodology: ValuationMethodology,
    implied_multiple: Multiple,
) -> Scenario {
    let growth = Decimal::ONE + adj.growth_rate;
    let adjusted = FinancialProfile {
        annual_revenue: profile.annual_revenue * growth,
        annual_profit: profile.annual_profit * growth,
        asking_price: profile.asking_price * growth,
    };
    let multiple = implied_multiple * (Decimal::ONE - adj.risk_adjustment);

    let mut params = ValuationParams::with_multiple(multiple);
    if methodology == ValuationMethodology::MarketComparison && profile.asking_price.is_zero() {
        params.manual_value = Some(base_valuation * growth * multiple);
    }
    let valuation = methodology.apply(&adjusted, &params);

    Scenario {
        name: name.to_string(),
        scenario_type,
        calculated_value: valuation.calculated_value,
        multiple: valuation.multiple,
        methodology,
        growth_rate: adj.growth_rate,
        risk_adjustment: adj.risk_adjustment,
        market_condition,
        assumptions: format!(
            "{methodology} of {:.2}x on drivers adjusted by {}; {} market",
            multiple,
            pct(adj.growth_rate),
            match market_condition {
                MarketCondition::Strong => "strong",
                MarketCondition::Stable => "stable",
                MarketCondition::Weak => "weak",
            }
        ),
    }
}

fn pct(rate: Rate) -> String {
    let p = (rate * dec!(100)).normalize();
    if p > Decimal::ZERO {
        format!("+{p}%")
    } else {
        format!("{p}%")
    }
}
