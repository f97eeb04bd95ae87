pub mod analysis;
pub mod generator;

pub use analysis::{
    analyze_scenarios, ScenarioAnalysis, ScenarioAnalysisOptions, ScenarioRiskLevel,
    ScenarioWeights,
};
pub use generator::{
    generate_scenarios, MarketCondition, Scenario, ScenarioAdjustment, ScenarioPolicy,
    ScenarioSet, ScenarioType,
};
