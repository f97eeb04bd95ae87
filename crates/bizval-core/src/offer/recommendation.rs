use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::benchmark::{
    compare_to_benchmark, BenchmarkAnalysis, BenchmarkPolicy, BenchmarkRisk, IndustryBenchmark,
};
use crate::error::BizValError;
use crate::types::*;
use crate::valuation::{summarize_valuations, ValuationResult};
use crate::BizValResult;

/// Largest discount off the average valuation, applied at a fit score of 0.
pub const MAX_RISK_DISCOUNT: Rate = dec!(0.20);
/// Minimum and maximum offer sit this far either side of the recommendation.
pub const OFFER_BAND: Rate = dec!(0.10);
/// Fit score used when no benchmark is supplied.
pub const NEUTRAL_FIT_SCORE: Decimal = dec!(0.5);
/// Asking above this multiple of the highest valuation is flagged.
pub const OVERPRICED_ASKING_RATIO: Decimal = dec!(1.2);
/// Valuation spread / mean above this is flagged.
pub const HIGH_DISPERSION: Rate = dec!(0.5);
/// Profit margins below this are flagged.
pub const LOW_MARGIN: Rate = dec!(0.10);
/// Fit scores below this are flagged.
pub const WEAK_FIT: Decimal = dec!(0.4);
/// Discount to asking above this calls for a firmer opening position.
pub const FIRM_NEGOTIATION_DISCOUNT: Rate = dec!(0.15);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Ordered most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskSeverity {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for RiskSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRiskFactor {
    pub severity: RiskSeverity,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferPolicy {
    pub max_risk_discount: Rate,
    pub offer_band: Rate,
    pub neutral_fit_score: Decimal,
    pub overpriced_asking_ratio: Decimal,
    pub high_dispersion: Rate,
    pub low_margin: Rate,
    pub weak_fit: Decimal,
    pub firm_negotiation_discount: Rate,
    pub benchmark: BenchmarkPolicy,
}

impl Default for OfferPolicy {
    fn default() -> Self {
        Self {
            max_risk_discount: MAX_RISK_DISCOUNT,
            offer_band: OFFER_BAND,
            neutral_fit_score: NEUTRAL_FIT_SCORE,
            overpriced_asking_ratio: OVERPRICED_ASKING_RATIO,
            high_dispersion: HIGH_DISPERSION,
            low_margin: LOW_MARGIN,
            weak_fit: WEAK_FIT,
            firm_negotiation_discount: FIRM_NEGOTIATION_DISCOUNT,
            benchmark: BenchmarkPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferInput {
    pub profile: FinancialProfile,
    pub valuations: Vec<ValuationResult>,
    #[serde(default)]
    pub benchmark: Option<IndustryBenchmark>,
    #[serde(default)]
    pub business_growth_rate: Option<Rate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferRecommendation {
    pub average_valuation: Money,
    pub valuation_low: Money,
    pub valuation_high: Money,
    pub valuation_count: usize,
    pub fit_score: Decimal,
    pub risk_adjustment_factor: Rate,
    pub minimum_offer: Money,
    pub recommended_offer: Money,
    pub maximum_offer: Money,
    /// (asking - recommended) / asking; negative when recommending above asking
    pub discount_to_asking: Rate,
    pub market_position_score: Decimal,
    pub risk_factors: Vec<OfferRiskFactor>,
    pub next_steps: Vec<String>,
    pub summary: String,
    pub negotiation_strategy: String,
    pub benchmark: Option<BenchmarkAnalysis>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Turn one or more valuations into an offer range and negotiating notes.
///
/// `recommended = average * (1 - max_risk_discount * (1 - fit))`, with the
/// minimum and maximum offers `offer_band` either side. Market position is
/// `0.5 * fit + 0.5 * min(1, average / asking)`.
pub fn recommend_offer(
    input: &OfferInput,
    policy: &OfferPolicy,
) -> BizValResult<ComputationOutput<OfferRecommendation>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if policy.max_risk_discount < Decimal::ZERO || policy.max_risk_discount > Decimal::ONE {
        return Err(BizValError::InvalidInput {
            field: "max_risk_discount".into(),
            reason: "Must be between 0 and 1".into(),
        });
    }
    if policy.offer_band < Decimal::ZERO || policy.offer_band >= Decimal::ONE {
        return Err(BizValError::InvalidInput {
            field: "offer_band".into(),
            reason: "Must be at least 0 and below 1".into(),
        });
    }

    let summary = summarize_valuations(&input.valuations)?;
    let profile = &input.profile;
    let average = summary.mean;
    if average <= Decimal::ZERO {
        warnings.push("Average valuation is not positive".into());
    }

    let benchmark = input.benchmark.as_ref().map(|b| {
        let out = compare_to_benchmark(profile, b, input.business_growth_rate, &policy.benchmark);
        warnings.extend(out.warnings);
        out.result
    });
    let fit_score = benchmark
        .as_ref()
        .map(|b| b.fit_score)
        .unwrap_or(policy.neutral_fit_score);

    let risk_adjustment_factor = policy.max_risk_discount * (Decimal::ONE - fit_score);
    let recommended_offer = average * (Decimal::ONE - risk_adjustment_factor);
    let minimum_offer = recommended_offer * (Decimal::ONE - policy.offer_band);
    let maximum_offer = recommended_offer * (Decimal::ONE + policy.offer_band);

    let discount_to_asking = if profile.asking_price.is_zero() {
        Decimal::ZERO
    } else {
        (profile.asking_price - recommended_offer) / profile.asking_price
    };

    let price_coverage = if average <= Decimal::ZERO {
        Decimal::ZERO
    } else if profile.asking_price.is_zero() {
        Decimal::ONE
    } else {
        (average / profile.asking_price).min(Decimal::ONE)
    };
    let market_position_score = clamp_unit(dec!(0.5) * fit_score + dec!(0.5) * price_coverage);

    // -- Risk factors --
    let mut risk_factors: Vec<OfferRiskFactor> = Vec::new();
    let mut flag = |severity: RiskSeverity, description: String| {
        risk_factors.push(OfferRiskFactor {
            severity,
            description,
        })
    };

    if profile.asking_price > summary.high * policy.overpriced_asking_ratio {
        flag(
            RiskSeverity::High,
            format!(
                "Asking price {} exceeds the highest valuation {} by more than {}%",
                profile.asking_price.round_dp(2),
                summary.high.round_dp(2),
                pct(policy.overpriced_asking_ratio - Decimal::ONE)
            ),
        );
    }
    if profile.annual_profit <= Decimal::ZERO {
        flag(RiskSeverity::High, "Business is not profitable".into());
    }
    if summary.dispersion > policy.high_dispersion {
        flag(
            RiskSeverity::Medium,
            format!(
                "Valuations disagree widely ({}% spread around the mean)",
                pct(summary.dispersion.round_dp(4))
            ),
        );
    }
    let margin = profile.profit_margin();
    if let Some(m) = margin {
        if m > Decimal::ZERO && m < policy.low_margin {
            flag(
                RiskSeverity::Medium,
                format!(
                    "Thin profit margin ({}%, below {}%)",
                    pct(m.round_dp(4)),
                    pct(policy.low_margin)
                ),
            );
        }
    }
    if let Some(b) = &benchmark {
        if b.benchmark_risk == BenchmarkRisk::High {
            flag(
                RiskSeverity::Medium,
                format!("{} is a high-risk industry", b.industry),
            );
        }
        if b.fit_score < policy.weak_fit {
            flag(
                RiskSeverity::Medium,
                format!("Weak fit with {} benchmarks", b.industry),
            );
        }
    }
    if summary.count == 1 {
        flag(
            RiskSeverity::Low,
            "Only one valuation method was used".into(),
        );
    }
    risk_factors.sort_by_key(|f| f.severity);

    // -- Next steps --
    let mut next_steps: Vec<String> =
        vec!["Verify financial statements and tax returns for the last three years".into()];
    if summary.count == 1 {
        next_steps.push("Obtain at least one additional valuation using a different method".into());
    }
    if summary.dispersion > policy.high_dispersion {
        next_steps.push("Reconcile the valuation methods before making an offer".into());
    }
    if profile.annual_profit <= Decimal::ZERO || margin.is_some_and(|m| m < policy.low_margin) {
        next_steps.push("Review the cost structure and owner add-backs".into());
    }
    if benchmark.is_none() {
        next_steps.push("Compare the business against an industry benchmark".into());
    }
    if discount_to_asking > Decimal::ZERO {
        next_steps.push(format!(
            "Prepare evidence supporting an offer of {} against the asking price",
            recommended_offer.round_dp(2)
        ));
    }
    next_steps.push(format!(
        "Arrange financing for up to {}",
        maximum_offer.round_dp(2)
    ));

    // -- Narrative --
    let relation = if discount_to_asking > Decimal::ZERO {
        format!("{}% below the asking price", pct(discount_to_asking.round_dp(4)))
    } else if discount_to_asking < Decimal::ZERO {
        format!("{}% above the asking price", pct((-discount_to_asking).round_dp(4)))
    } else {
        "in line with the asking price".to_string()
    };
    let narrative_summary = format!(
        "Based on {} valuation(s) averaging {}, the recommended offer is {} (range {} to {}), {}.",
        summary.count,
        average.round_dp(2),
        recommended_offer.round_dp(2),
        minimum_offer.round_dp(2),
        maximum_offer.round_dp(2),
        relation
    );
    let negotiation_strategy = if discount_to_asking > policy.firm_negotiation_discount {
        format!(
            "Open at {} and justify the gap with the valuation evidence; be prepared to walk away above {}.",
            minimum_offer.round_dp(2),
            maximum_offer.round_dp(2)
        )
    } else if discount_to_asking > Decimal::ZERO {
        format!(
            "Open at {} and leave room to settle near {}.",
            minimum_offer.round_dp(2),
            recommended_offer.round_dp(2)
        )
    } else {
        "Asking price is at or below supported value; an offer near asking with standard diligence contingencies should be competitive.".to_string()
    };

    let recommendation = OfferRecommendation {
        average_valuation: average,
        valuation_low: summary.low,
        valuation_high: summary.high,
        valuation_count: summary.count,
        fit_score,
        risk_adjustment_factor,
        minimum_offer,
        recommended_offer,
        maximum_offer,
        discount_to_asking,
        market_position_score,
        risk_factors,
        next_steps,
        summary: narrative_summary,
        negotiation_strategy,
        benchmark,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fit-Adjusted Offer Recommendation",
        &serde_json::json!({
            "valuation_count": summary.count,
            "benchmark": input.benchmark.as_ref().map(|b| b.industry.clone()),
            "policy": policy,
        }),
        warnings,
        elapsed,
        recommendation,
    ))
}

fn pct(rate: Rate) -> String {
    (rate * dec!(100)).normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::BenchmarkTable;
    use crate::valuation::ValuationMethodology;
    use pretty_assertions::assert_eq;

    fn valuation(value: Money) -> ValuationResult {
        ValuationResult {
            calculated_value: value,
            multiple: dec!(3),
            methodology: ValuationMethodology::ProfitMultiple,
        }
    }

    fn input(valuations: Vec<ValuationResult>) -> OfferInput {
        OfferInput {
            profile: FinancialProfile::new(dec!(1000000), dec!(200000), dec!(500000)),
            valuations,
            benchmark: None,
            business_growth_rate: None,
        }
    }

    #[test]
    fn test_single_valuation_neutral_fit() {
        let r = recommend_offer(&input(vec![valuation(dec!(600000))]), &OfferPolicy::default())
            .unwrap()
            .result;
        assert_eq!(r.average_valuation, dec!(600000));
        assert_eq!(r.fit_score, dec!(0.5));
        assert_eq!(r.risk_adjustment_factor, dec!(0.10));
        assert_eq!(r.recommended_offer, dec!(540000));
        assert_eq!(r.minimum_offer, dec!(486000));
        assert_eq!(r.maximum_offer, dec!(594000));
        assert!(r.minimum_offer < r.recommended_offer && r.recommended_offer < r.maximum_offer);
        assert_eq!(r.discount_to_asking, dec!(-0.08));
        assert_eq!(r.market_position_score, dec!(0.75));
    }

    #[test]
    fn test_empty_valuations() {
        assert!(matches!(
            recommend_offer(&input(vec![]), &OfferPolicy::default()),
            Err(BizValError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_zero_asking_price() {
        let mut i = input(vec![valuation(dec!(600000))]);
        i.profile.asking_price = Decimal::ZERO;
        let r = recommend_offer(&i, &OfferPolicy::default()).unwrap().result;
        assert_eq!(r.discount_to_asking, Decimal::ZERO);
        assert_eq!(r.market_position_score, dec!(0.75));
    }

    #[test]
    fn test_risk_factors_ordered_by_severity() {
        let mut i = input(vec![valuation(dec!(100000)), valuation(dec!(300000))]);
        i.profile = FinancialProfile::new(dec!(1000000), dec!(-5000), dec!(900000));
        let r = recommend_offer(&i, &OfferPolicy::default()).unwrap().result;
        let severities: Vec<RiskSeverity> = r.risk_factors.iter().map(|f| f.severity).collect();
        assert_eq!(
            severities,
            vec![RiskSeverity::High, RiskSeverity::High, RiskSeverity::Medium]
        );
        assert!(r.risk_factors[0].description.starts_with("Asking price"));
        assert_eq!(r.risk_factors[1].description, "Business is not profitable");
    }

    #[test]
    fn test_benchmark_fit_moves_offer() {
        let table = BenchmarkTable::standard();
        let mut i = input(vec![valuation(dec!(600000))]);
        i.benchmark = table.get("construction").cloned();
        i.business_growth_rate = Some(dec!(0.05));
        let r = recommend_offer(&i, &OfferPolicy::default()).unwrap().result;
        let b = r.benchmark.as_ref().unwrap();
        assert_eq!(r.fit_score, b.fit_score);
        assert_eq!(
            r.recommended_offer,
            dec!(600000) * (Decimal::ONE - MAX_RISK_DISCOUNT * (Decimal::ONE - b.fit_score))
        );
        assert!(r
            .risk_factors
            .iter()
            .any(|f| f.description == "Construction is a high-risk industry"));
        assert!(!r
            .next_steps
            .iter()
            .any(|s| s.contains("industry benchmark")));
    }

    #[test]
    fn test_narrative_mentions_direction() {
        let mut i = input(vec![valuation(dec!(400000))]);
        i.profile.asking_price = dec!(600000);
        let r = recommend_offer(&i, &OfferPolicy::default()).unwrap().result;
        // recommended 360,000 => 40% below asking
        assert!(r.summary.contains("40% below the asking price"), "{}", r.summary);
        assert!(r.negotiation_strategy.starts_with("Open at 324000"));
    }

    #[test]
    fn test_invalid_band() {
        let policy = OfferPolicy {
            offer_band: dec!(1),
            ..Default::default()
        };
        assert!(recommend_offer(&input(vec![valuation(dec!(1))]), &policy).is_err());
    }
}
