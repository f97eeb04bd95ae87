use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::methodology::ValuationResult;
use crate::error::BizValError;
use crate::types::{Money, Rate};
use crate::BizValResult;

/// Descriptive statistics across several valuations of one business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub count: usize,
    pub mean: Money,
    pub median: Money,
    pub low: Money,
    pub high: Money,
    /// high - low
    pub spread: Money,
    /// spread / mean, 0 when the mean is 0
    pub dispersion: Rate,
}

/// Summarise a set of valuations. At least one is required.
pub fn summarize_valuations(valuations: &[ValuationResult]) -> BizValResult<ValuationSummary> {
    if valuations.is_empty() {
        return Err(BizValError::InsufficientData(
            "At least one valuation is required".into(),
        ));
    }

    let count = valuations.len();
    let mut sorted: Vec<Money> = valuations.iter().map(|v| v.calculated_value).collect();
    sorted.sort();

    let mean = sorted.iter().copied().sum::<Decimal>() / Decimal::from(count as u64);
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / dec!(2)
    } else {
        sorted[count / 2]
    };
    let low = sorted[0];
    let high = sorted[count - 1];
    let spread = high - low;
    let dispersion = if mean.is_zero() {
        Decimal::ZERO
    } else {
        spread / mean.abs()
    };

    Ok(ValuationSummary {
        count,
        mean,
        median,
        low,
        high,
        spread,
        dispersion,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::valuation::ValuationMethodology;
    use pretty_assertions::assert_eq;

    fn val(v: Decimal) -> ValuationResult {
        ValuationResult {
            calculated_value: v,
            multiple: Decimal::ONE,
            methodology: ValuationMethodology::MarketComparison,
        }
    }

    #[test]
    fn test_summary_statistics() {
        let s = summarize_valuations(&[val(dec!(500)), val(dec!(700)), val(dec!(600))]).unwrap();
        assert_eq!(
            s,
            ValuationSummary {
                count: 3,
                mean: dec!(600),
                median: dec!(600),
                low: dec!(500),
                high: dec!(700),
                spread: dec!(200),
                dispersion: dec!(200) / dec!(600),
            }
        );
    }

    #[test]
    fn test_even_count_median() {
        let s = summarize_valuations(&[val(dec!(100)), val(dec!(300))]).unwrap();
        assert_eq!(s.median, dec!(200));
    }

    #[test]
    fn test_empty_is_error() {
        assert!(summarize_valuations(&[]).is_err());
    }
}
