use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::table::{BenchmarkRisk, IndustryBenchmark};
use crate::types::*;

/// Implied / benchmark ratio at or above this is above market.
pub const ABOVE_MARKET_RATIO: Decimal = dec!(1.2);
/// Implied / benchmark ratio at or below this is below market.
pub const BELOW_MARKET_RATIO: Decimal = dec!(0.8);

pub const MULTIPLE_SCORE_WEIGHT: Decimal = dec!(0.50);
pub const SIZE_SCORE_WEIGHT: Decimal = dec!(0.25);
pub const GROWTH_SCORE_WEIGHT: Decimal = dec!(0.25);
/// Growth gap (absolute) at which the growth score reaches zero.
pub const GROWTH_SCORE_SPAN: Rate = dec!(0.10);
/// Score used when a signal cannot be computed.
pub const NEUTRAL_SCORE: Decimal = dec!(0.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkPolicy {
    pub above_market_ratio: Decimal,
    pub below_market_ratio: Decimal,
    pub multiple_weight: Decimal,
    pub size_weight: Decimal,
    pub growth_weight: Decimal,
    pub growth_span: Rate,
}

impl Default for BenchmarkPolicy {
    fn default() -> Self {
        Self {
            above_market_ratio: ABOVE_MARKET_RATIO,
            below_market_ratio: BELOW_MARKET_RATIO,
            multiple_weight: MULTIPLE_SCORE_WEIGHT,
            size_weight: SIZE_SCORE_WEIGHT,
            growth_weight: GROWTH_SCORE_WEIGHT,
            growth_span: GROWTH_SCORE_SPAN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MultiplePosition {
    AboveMarket,
    MatchesMarket,
    BelowMarket,
    /// Implied or benchmark multiple is not positive
    NotApplicable,
}

impl std::fmt::Display for MultiplePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AboveMarket => write!(f, "above industry"),
            Self::MatchesMarket => write!(f, "matches industry"),
            Self::BelowMarket => write!(f, "below industry"),
            Self::NotApplicable => write!(f, "not applicable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleComparison {
    pub implied: Multiple,
    pub benchmark: Multiple,
    pub ratio: Option<Decimal>,
    pub position: MultiplePosition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkAnalysis {
    pub industry: String,
    pub revenue_multiple: MultipleComparison,
    pub profit_multiple: MultipleComparison,
    pub multiple_score: Decimal,
    pub size_score: Decimal,
    pub growth_score: Decimal,
    /// Weighted blend of the three scores, in [0, 1]
    pub fit_score: Decimal,
    pub benchmark_risk: BenchmarkRisk,
    pub insights: Vec<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compare a business's implied multiples, size and growth to an industry.
///
/// Scores:
/// - multiple: mean over comparable multiples of `max(0, 1 - |ratio - 1|)`
/// - size: `min(r, 1/r)` with `r = revenue / average_business_size`
/// - growth: `1 - min(1, |growth - typical| / growth_span)`
///
/// A signal that cannot be computed scores [`NEUTRAL_SCORE`].
pub fn compare_to_benchmark(
    profile: &FinancialProfile,
    benchmark: &IndustryBenchmark,
    business_growth_rate: Option<Rate>,
    policy: &BenchmarkPolicy,
) -> ComputationOutput<BenchmarkAnalysis> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let mut insights: Vec<String> = Vec::new();

    if profile.asking_price <= Decimal::ZERO {
        warnings.push("Asking price is not positive; implied multiples are 0".into());
    }

    let revenue_multiple = compare_multiple(
        implied_multiple(profile.asking_price, profile.annual_revenue),
        benchmark.revenue_multiple,
        policy,
    );
    let profit_multiple = compare_multiple(
        implied_multiple(profile.asking_price, profile.annual_profit),
        benchmark.profit_multiple,
        policy,
    );

    for (label, cmp) in [("revenue", &revenue_multiple), ("profit", &profit_multiple)] {
        if cmp.position != MultiplePosition::NotApplicable {
            insights.push(format!(
                "Asking price implies {:.2}x {label}, {} ({:.2}x)",
                cmp.implied, cmp.position, cmp.benchmark
            ));
        }
    }

    let ratio_scores: Vec<Decimal> = [&revenue_multiple, &profit_multiple]
        .iter()
        .filter_map(|c| c.ratio)
        .map(|r| (Decimal::ONE - (r - Decimal::ONE).abs()).max(Decimal::ZERO))
        .collect();
    let multiple_score = if ratio_scores.is_empty() {
        NEUTRAL_SCORE
    } else {
        ratio_scores.iter().copied().sum::<Decimal>() / Decimal::from(ratio_scores.len())
    };

    let size_score = if benchmark.average_business_size <= Decimal::ZERO {
        warnings.push("Benchmark average size is not positive; size score is neutral".into());
        NEUTRAL_SCORE
    } else if profile.annual_revenue <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        let r = profile.annual_revenue / benchmark.average_business_size;
        if r < Decimal::ONE {
            insights.push(format!(
                "Revenue is {}% of the industry average business size",
                (r * dec!(100)).round_dp(0)
            ));
        }
        r.min(Decimal::ONE / r)
    };

    let growth_score = match business_growth_rate {
        None => NEUTRAL_SCORE,
        Some(_) if policy.growth_span <= Decimal::ZERO => NEUTRAL_SCORE,
        Some(g) => {
            let gap = (g - benchmark.typical_growth_rate).abs();
            if g < benchmark.typical_growth_rate {
                insights.push("Growth is below the industry norm".into());
            } else if g > benchmark.typical_growth_rate {
                insights.push("Growth is above the industry norm".into());
            }
            Decimal::ONE - (gap / policy.growth_span).min(Decimal::ONE)
        }
    };

    let total_weight = policy.multiple_weight + policy.size_weight + policy.growth_weight;
    let fit_score = if total_weight <= Decimal::ZERO {
        warnings.push("Score weights sum to zero; fit score is neutral".into());
        NEUTRAL_SCORE
    } else {
        clamp_unit(
            (policy.multiple_weight * multiple_score
                + policy.size_weight * size_score
                + policy.growth_weight * growth_score)
                / total_weight,
        )
    };

    if benchmark.risk_level == BenchmarkRisk::High {
        insights.push(format!("{} is a high-risk industry", benchmark.industry));
    }

    let analysis = BenchmarkAnalysis {
        industry: benchmark.industry.clone(),
        revenue_multiple,
        profit_multiple,
        multiple_score,
        size_score,
        growth_score,
        fit_score,
        benchmark_risk: benchmark.risk_level,
        insights,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Industry Benchmark Comparison (implied multiples, size, growth)",
        &serde_json::json!({
            "industry": benchmark.industry,
            "business_growth_rate": business_growth_rate.map(|g| g.to_string()),
            "policy": policy,
        }),
        warnings,
        elapsed,
        analysis,
    )
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn implied_multiple(asking_price: Money, denominator: Money) -> Multiple {
    if denominator <= Decimal::ZERO {
        Decimal::ZERO
    } else {
        asking_price / denominator
    }
}

fn compare_multiple(
    implied: Multiple,
    benchmark: Multiple,
    policy: &BenchmarkPolicy,
) -> MultipleComparison {
    if implied <= Decimal::ZERO || benchmark <= Decimal::ZERO {
        return MultipleComparison {
            implied,
            benchmark,
            ratio: None,
            position: MultiplePosition::NotApplicable,
        };
    }
    let ratio = implied / benchmark;
    let position = if ratio >= policy.above_market_ratio {
        MultiplePosition::AboveMarket
    } else if ratio <= policy.below_market_ratio {
        MultiplePosition::BelowMarket
    } else {
        MultiplePosition::MatchesMarket
    };
    MultipleComparison {
        implied,
        benchmark,
        ratio: Some(ratio),
        position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::BenchmarkTable;
    use pretty_assertions::assert_eq;

    fn retail() -> IndustryBenchmark {
        BenchmarkTable::standard().get("Retail").unwrap().clone()
    }

    #[test]
    fn test_implied_multiples() {
        let profile = FinancialProfile::new(dec!(1000000), dec!(200000), dec!(500000));
        let a = compare_to_benchmark(&profile, &retail(), None, &BenchmarkPolicy::default()).result;
        assert_eq!(a.revenue_multiple.implied, dec!(0.5));
        assert_eq!(a.profit_multiple.implied, dec!(2.5));
        // 0.5 / 0.45 = 1.11..
        assert_eq!(a.revenue_multiple.position, MultiplePosition::MatchesMarket);
        // 2.5 / 2.2 = 1.136..
        assert_eq!(a.profit_multiple.position, MultiplePosition::MatchesMarket);
        assert_eq!(a.growth_score, NEUTRAL_SCORE);
    }

    #[test]
    fn test_zero_asking_price() {
        let profile = FinancialProfile::new(dec!(1000000), dec!(200000), Decimal::ZERO);
        let out = compare_to_benchmark(&profile, &retail(), None, &BenchmarkPolicy::default());
        assert_eq!(out.result.revenue_multiple.implied, Decimal::ZERO);
        assert_eq!(out.result.profit_multiple.implied, Decimal::ZERO);
        assert_eq!(out.result.revenue_multiple.position, MultiplePosition::NotApplicable);
        assert_eq!(out.result.multiple_score, NEUTRAL_SCORE);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_zero_profit_not_applicable() {
        let profile = FinancialProfile::new(dec!(1000000), Decimal::ZERO, dec!(500000));
        let a = compare_to_benchmark(&profile, &retail(), None, &BenchmarkPolicy::default()).result;
        assert_eq!(a.profit_multiple.implied, Decimal::ZERO);
        assert_eq!(a.profit_multiple.position, MultiplePosition::NotApplicable);
        assert_eq!(a.revenue_multiple.position, MultiplePosition::MatchesMarket);
    }

    #[test]
    fn test_positions() {
        let policy = BenchmarkPolicy::default();
        assert_eq!(
            compare_multiple(dec!(3.0), dec!(2.5), &policy).position,
            MultiplePosition::AboveMarket
        );
        assert_eq!(
            compare_multiple(dec!(2.0), dec!(2.5), &policy).position,
            MultiplePosition::BelowMarket
        );
        assert_eq!(
            compare_multiple(dec!(2.5), dec!(2.5), &policy).position,
            MultiplePosition::MatchesMarket
        );
    }

    #[test]
    fn test_perfect_fit() {
        let b = retail();
        let profile = FinancialProfile::new(
            b.average_business_size,
            b.average_business_size * b.revenue_multiple / b.profit_multiple,
            b.average_business_size * b.revenue_multiple,
        );
        let a = compare_to_benchmark(
            &profile,
            &b,
            Some(b.typical_growth_rate),
            &BenchmarkPolicy::default(),
        )
        .result;
        assert_eq!(a.size_score, Decimal::ONE);
        assert_eq!(a.growth_score, Decimal::ONE);
        assert!(a.fit_score > dec!(0.999));
    }

    #[test]
    fn test_fit_is_deterministic_and_bounded() {
        let profile = FinancialProfile::new(dec!(300000), dec!(20000), dec!(900000));
        let b = retail();
        let policy = BenchmarkPolicy::default();
        let a1 = compare_to_benchmark(&profile, &b, Some(dec!(-0.2)), &policy).result;
        let a2 = compare_to_benchmark(&profile, &b, Some(dec!(-0.2)), &policy).result;
        assert_eq!(a1.fit_score, a2.fit_score);
        assert!(a1.fit_score >= Decimal::ZERO && a1.fit_score <= Decimal::ONE);
        assert_eq!(a1.growth_score, Decimal::ZERO);
        assert_eq!(a1.revenue_multiple.position, MultiplePosition::AboveMarket);
    }
}
