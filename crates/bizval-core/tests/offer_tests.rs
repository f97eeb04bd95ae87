use bizval_core::assumptions::EngineAssumptions;
use bizval_core::benchmark::BenchmarkTable;
use bizval_core::offer::{recommend_offer, OfferInput, RiskSeverity};
use bizval_core::valuation::{calculate_valuation, ValuationInput, ValuationMethodology, ValuationParams};
use bizval_core::{BizValError, FinancialProfile};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn reference_profile() -> FinancialProfile {
    FinancialProfile::new(dec!(1000000), dec!(200000), dec!(500000))
}

#[test]
fn test_valuation_feeds_offer() {
    let valuation = calculate_valuation(&ValuationInput {
        profile: reference_profile(),
        methodology: ValuationMethodology::ProfitMultiple,
        params: ValuationParams::with_multiple(dec!(3.0)),
    })
    .result;
    assert_eq!(valuation.calculated_value, dec!(600000));

    let assumptions = EngineAssumptions::default();
    let offer = recommend_offer(
        &OfferInput {
            profile: reference_profile(),
            valuations: vec![valuation],
            benchmark: None,
            business_growth_rate: None,
        },
        &assumptions.offer,
    )
    .unwrap()
    .result;

    assert_eq!(offer.average_valuation, dec!(600000));
    assert!(offer.minimum_offer < offer.recommended_offer);
    assert!(offer.recommended_offer < offer.maximum_offer);
    assert_eq!(offer.valuation_count, 1);
    assert_eq!(offer.risk_factors.len(), 1);
    assert_eq!(offer.risk_factors[0].severity, RiskSeverity::Low);
    assert!(offer.market_position_score >= Decimal::ZERO);
    assert!(offer.market_position_score <= Decimal::ONE);
    assert!(!offer.summary.is_empty());
    assert!(!offer.negotiation_strategy.is_empty());
}

#[test]
fn test_offer_with_benchmark() {
    let table = BenchmarkTable::standard();
    let p = reference_profile();
    let valuations = [
        (ValuationMethodology::ProfitMultiple, dec!(3.0)),
        (ValuationMethodology::RevenueMultiple, dec!(0.5)),
    ]
    .into_iter()
    .map(|(m, x)| m.apply(&p, &ValuationParams::with_multiple(x)))
    .collect();
    let offer = recommend_offer(
        &OfferInput {
            profile: p,
            valuations,
            benchmark: table.get("Professional Services").cloned(),
            business_growth_rate: Some(dec!(0.06)),
        },
        &EngineAssumptions::default().offer,
    )
    .unwrap();
    assert_eq!(offer.result.average_valuation, dec!(550000));
    assert!(offer.result.benchmark.is_some());
    assert_eq!(offer.methodology, "Fit-Adjusted Offer Recommendation");
}

#[test]
fn test_offer_requires_valuations() {
    let err = recommend_offer(
        &OfferInput {
            profile: reference_profile(),
            valuations: vec![],
            benchmark: None,
            business_growth_rate: None,
        },
        &EngineAssumptions::default().offer,
    )
    .unwrap_err();
    assert!(matches!(err, BizValError::InsufficientData(_)));
}
