use bizval_core::scenarios::{
    analyze_scenarios, generate_scenarios, ScenarioAnalysisOptions, ScenarioPolicy, ScenarioType,
};
use bizval_core::FinancialProfile;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Scenario generator
// ===========================================================================

#[test]
fn test_generate_then_analyze() {
    let profile = FinancialProfile::new(dec!(1000000), dec!(200000), dec!(500000));
    let set = generate_scenarios(&profile, dec!(600000), &ScenarioPolicy::default())
        .unwrap()
        .result;
    let analysis = analyze_scenarios(&set, &ScenarioAnalysisOptions::default())
        .unwrap()
        .result;
    assert_eq!(analysis.realistic_value, dec!(600000));
    assert!(analysis.recommended_value > analysis.pessimistic_value);
    assert!(analysis.recommended_value < analysis.optimistic_value);
}

#[test]
fn test_scenarios_serialize_with_type_tags() {
    let profile = FinancialProfile::new(dec!(1000000), dec!(200000), dec!(500000));
    let out = generate_scenarios(&profile, dec!(600000), &ScenarioPolicy::default()).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    let scenarios = json["result"]["scenarios"].as_array().unwrap();
    assert_eq!(scenarios.len(), 3);
    assert_eq!(scenarios[0]["scenario_type"], "Optimistic");
    assert_eq!(scenarios[1]["calculated_value"], "600000");
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn prop_scenarios_are_ordered(
        revenue in 1i64..50_000_000,
        profit in 1i64..10_000_000,
        base in 1i64..100_000_000,
    ) {
        let profile = FinancialProfile::new(
            Decimal::from(revenue),
            Decimal::from(profit),
            Decimal::from(base),
        );
        let set = generate_scenarios(&profile, Decimal::from(base), &ScenarioPolicy::default())
            .unwrap()
            .result;
        let value = |t| set.get(t).unwrap().calculated_value;
        prop_assert!(value(ScenarioType::Optimistic) > value(ScenarioType::Realistic));
        prop_assert!(value(ScenarioType::Realistic) > value(ScenarioType::Pessimistic));
    }
}
