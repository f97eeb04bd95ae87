//! Tunable defaults for every calculator, loaded as one document.

use serde::{Deserialize, Serialize};

#[cfg(feature = "benchmark")]
use crate::benchmark::BenchmarkPolicy;
#[cfg(feature = "offer")]
use crate::offer::OfferPolicy;
#[cfg(feature = "roi")]
use crate::roi::RoiAssumptions;
#[cfg(feature = "scenarios")]
use crate::scenarios::{ScenarioAnalysisOptions, ScenarioPolicy};
use crate::BizValResult;

/// Policy for each enabled calculator. Omitted sections take their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineAssumptions {
    #[cfg(feature = "roi")]
    pub roi: RoiAssumptions,
    #[cfg(feature = "scenarios")]
    pub scenarios: ScenarioPolicy,
    #[cfg(feature = "scenarios")]
    pub scenario_analysis: ScenarioAnalysisOptions,
    #[cfg(feature = "benchmark")]
    pub benchmark: BenchmarkPolicy,
    #[cfg(feature = "offer")]
    pub offer: OfferPolicy,
}

impl EngineAssumptions {
    pub fn from_json_str(json: &str) -> BizValResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(all(test, feature = "roi", feature = "scenarios", feature = "offer"))]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let a = EngineAssumptions::from_json_str(
            r#"{ "roi": { "discount_rate": "0.12" }, "offer": { "offer_band": "0.05" } }"#,
        )
        .unwrap();
        assert_eq!(a.roi.discount_rate, dec!(0.12));
        assert_eq!(a.roi.sensitivity, crate::roi::SensitivityBands::default());
        assert_eq!(a.offer.offer_band, dec!(0.05));
        assert_eq!(a.offer.max_risk_discount, crate::offer::recommendation::MAX_RISK_DISCOUNT);
        assert_eq!(a.scenarios, ScenarioPolicy::default());
    }

    #[test]
    fn test_empty_document() {
        let a = EngineAssumptions::from_json_str("{}").unwrap();
        assert_eq!(a.roi.discount_rate, crate::roi::DEFAULT_DISCOUNT_RATE);
        assert!(!a.scenario_analysis.include_custom);
    }
}
