use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::projection::{project, ProjectionDrivers};
use crate::error::BizValError;
use crate::types::{Multiple, Rate};
use crate::BizValResult;

/// Default perturbation of the revenue growth rate (3 percentage points).
pub const DEFAULT_GROWTH_DELTA: Rate = dec!(0.03);
/// Default perturbation of the profit margin (3 percentage points).
pub const DEFAULT_MARGIN_DELTA: Rate = dec!(0.03);
/// Default perturbation of the exit multiple (1.0x).
pub const DEFAULT_EXIT_MULTIPLE_DELTA: Multiple = dec!(1.0);

/// Size of the one-at-a-time perturbations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityBands {
    pub growth_delta: Rate,
    pub margin_delta: Rate,
    pub exit_multiple_delta: Multiple,
}

impl Default for SensitivityBands {
    fn default() -> Self {
        Self {
            growth_delta: DEFAULT_GROWTH_DELTA,
            margin_delta: DEFAULT_MARGIN_DELTA,
            exit_multiple_delta: DEFAULT_EXIT_MULTIPLE_DELTA,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensitivityFactor {
    RevenueGrowth,
    ProfitMargin,
    ExitMultiple,
}

impl std::fmt::Display for SensitivityFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RevenueGrowth => write!(f, "Revenue Growth"),
            Self::ProfitMargin => write!(f, "Profit Margin"),
            Self::ExitMultiple => write!(f, "Exit Multiple"),
        }
    }
}

/// Total ROI with one input moved down and up, others held at base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityBand {
    pub factor: SensitivityFactor,
    pub low_input: Rate,
    pub base_input: Rate,
    pub high_input: Rate,
    pub low_roi: Rate,
    pub base_roi: Rate,
    pub high_roi: Rate,
}

fn evaluate_band<F>(
    factor: SensitivityFactor,
    base_input: Rate,
    delta: Rate,
    base_roi: Rate,
    eval_fn: F,
) -> BizValResult<SensitivityBand>
where
    F: Fn(Rate) -> BizValResult<Rate>,
{
    let perturbed = |v: Option<Rate>| {
        v.ok_or_else(|| BizValError::InvalidInput {
            field: "sensitivity".into(),
            reason: format!("{factor:?} perturbation exceeds the representable range"),
        })
    };
    let low_input = perturbed(base_input.checked_sub(delta))?;
    let high_input = perturbed(base_input.checked_add(delta))?;
    Ok(SensitivityBand {
        factor,
        low_input,
        base_input,
        high_input,
        low_roi: eval_fn(low_input)?,
        base_roi,
        high_roi: eval_fn(high_input)?,
    })
}

/// Re-run the projection once per perturbed input.
pub(crate) fn sensitivity_bands(
    base: &ProjectionDrivers,
    bands: &SensitivityBands,
    base_roi: Rate,
) -> BizValResult<Vec<SensitivityBand>> {
    let growth = evaluate_band(
        SensitivityFactor::RevenueGrowth,
        base.revenue_growth_rate,
        bands.growth_delta,
        base_roi,
        |g| {
            project(&ProjectionDrivers {
                revenue_growth_rate: g,
                ..base.clone()
            })
            .map(|p| p.total_roi)
        },
    )?;

    let margin = evaluate_band(
        SensitivityFactor::ProfitMargin,
        base.profit_margin,
        bands.margin_delta,
        base_roi,
        |m| {
            project(&ProjectionDrivers {
                profit_margin: m,
                ..base.clone()
            })
            .map(|p| p.total_roi)
        },
    )?;

    let exit = evaluate_band(
        SensitivityFactor::ExitMultiple,
        base.exit_multiple,
        bands.exit_multiple_delta,
        base_roi,
        |x| {
            project(&ProjectionDrivers {
                exit_multiple: x,
                ..base.clone()
            })
            .map(|p| p.total_roi)
        },
    )?;

    Ok(vec![growth, margin, exit])
}
