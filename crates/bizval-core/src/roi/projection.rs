use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::risk::{
    classify_risk_tier, identify_risk_factors, RiskSignals, RiskTier, RiskTierThresholds,
};
use super::sensitivity::{sensitivity_bands, SensitivityBand, SensitivityBands};
use crate::amortization::{LoanTerms, MAX_TERM_YEARS};
use crate::error::BizValError;
use crate::time_value;
use crate::types::*;
use crate::BizValResult;

/// NPV discount rate used when the caller does not supply one.
pub const DEFAULT_DISCOUNT_RATE: Rate = dec!(0.10);

/// Longest holding period the projection accepts.
pub const MAX_HOLDING_PERIOD_YEARS: u32 = 100;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Defaults applied when an [`RoiInput`] leaves a setting unspecified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoiAssumptions {
    pub discount_rate: Rate,
    pub sensitivity: SensitivityBands,
    pub risk_tiers: RiskTierThresholds,
}

impl Default for RoiAssumptions {
    fn default() -> Self {
        Self {
            discount_rate: DEFAULT_DISCOUNT_RATE,
            sensitivity: SensitivityBands::default(),
            risk_tiers: RiskTierThresholds::default(),
        }
    }
}

/// Input for an acquisition ROI projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiInput {
    pub profile: FinancialProfile,
    pub purchase_price: Money,
    /// Holding period in whole years (>= 1)
    pub investment_period_years: u32,
    /// Annual revenue growth (0.05 = 5%), may be negative
    pub revenue_growth_rate: Rate,
    /// Profit as a fraction of projected revenue
    pub profit_margin: Rate,
    /// Multiple of final-year profit received at exit
    pub exit_multiple: Multiple,
    #[serde(default)]
    pub additional_investment: Money,
    #[serde(default)]
    pub working_capital: Money,
    /// Overrides the NPV discount rate from the assumptions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_rate: Option<Rate>,
    /// Overrides the sensitivity perturbations from the assumptions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensitivity: Option<SensitivityBands>,
    /// Acquisition debt; reported alongside, never netted into cash flows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financing: Option<LoanTerms>,
}

/// One projected year
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionYear {
    pub year: u32,
    pub revenue: Money,
    pub profit: Money,
    pub cash_flow: Money,
    pub cumulative_cash_flow: Money,
}

/// Debt service measured against the unlevered projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancingSummary {
    pub annual_debt_service: Money,
    /// Year-one cash flow / annual debt service; None when there is no debt service
    pub debt_service_coverage: Option<Decimal>,
    /// Cash flow less debt service in each year the loan is outstanding
    pub levered_cash_flows: Vec<Money>,
    pub equity_invested: Money,
}

/// Output of an acquisition ROI projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoiOutput {
    pub projection: Vec<ProjectionYear>,
    pub yearly_cash_flows: Vec<Money>,
    pub cumulative_cash_flows: Vec<Money>,
    pub exit_value: Money,
    pub total_investment: Money,
    pub total_cash_flow: Money,
    pub net_profit: Money,
    /// None when no rate in [-99%, +1000%] zeroes the NPV
    pub irr: Option<Rate>,
    pub npv: Money,
    pub discount_rate: Rate,
    /// First year cumulative cash flow covers the investment; saturates at
    /// the holding period when `payback_reached` is false
    pub payback_period_years: Years,
    pub payback_reached: bool,
    pub total_roi: Rate,
    pub annual_roi: Rate,
    pub sensitivity: Vec<SensitivityBand>,
    pub risk_tier: RiskTier,
    pub risk_factors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financing: Option<FinancingSummary>,
}

// ---------------------------------------------------------------------------
// Projection core
// ---------------------------------------------------------------------------

/// The inputs a projection depends on; sensitivity runs vary one at a time.
#[derive(Debug, Clone)]
pub(crate) struct ProjectionDrivers {
    pub annual_revenue: Money,
    pub revenue_growth_rate: Rate,
    pub profit_margin: Rate,
    pub exit_multiple: Multiple,
    pub years: u32,
    pub total_investment: Money,
}

#[derive(Debug, Clone)]
pub(crate) struct Projection {
    pub rows: Vec<ProjectionYear>,
    pub exit_value: Money,
    pub total_cash_flow: Money,
    pub net_profit: Money,
    pub total_roi: Rate,
}

fn overflow(context: &str) -> BizValError {
    BizValError::InvalidInput {
        field: context.into(),
        reason: "Projection exceeds the representable range".into(),
    }
}

pub(crate) fn project(d: &ProjectionDrivers) -> BizValResult<Projection> {
    let growth = Decimal::ONE + d.revenue_growth_rate;
    let mut growth_factor = Decimal::ONE;
    let mut cumulative = Decimal::ZERO;
    let mut rows = Vec::with_capacity(d.years as usize);

    for year in 1..=d.years {
        growth_factor = growth_factor
            .checked_mul(growth)
            .ok_or_else(|| overflow("revenue_growth_rate"))?;
        let revenue = d
            .annual_revenue
            .checked_mul(growth_factor)
            .ok_or_else(|| overflow("annual_revenue"))?;
        let profit = revenue
            .checked_mul(d.profit_margin)
            .ok_or_else(|| overflow("profit_margin"))?;
        cumulative = cumulative
            .checked_add(profit)
            .ok_or_else(|| overflow("annual_revenue"))?;
        rows.push(ProjectionYear {
            year,
            revenue,
            profit,
            cash_flow: profit,
            cumulative_cash_flow: cumulative,
        });
    }

    let final_profit = rows.last().map(|r| r.profit).unwrap_or(Decimal::ZERO);
    let exit_value = final_profit
        .checked_mul(d.exit_multiple)
        .ok_or_else(|| overflow("exit_multiple"))?;
    let total_cash_flow = cumulative;
    let net_profit = total_cash_flow
        .checked_add(exit_value)
        .and_then(|v| v.checked_sub(d.total_investment))
        .ok_or_else(|| overflow("exit_multiple"))?;
    let total_roi = if d.total_investment.is_zero() {
        Decimal::ZERO
    } else {
        net_profit
            .checked_div(d.total_investment)
            .ok_or_else(|| overflow("purchase_price"))?
    };

    Ok(Projection {
        rows,
        exit_value,
        total_cash_flow,
        net_profit,
        total_roi,
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Project cash flows over the holding period and derive IRR, NPV, payback,
/// ROI, sensitivity bands and a risk tier.
pub fn calculate_roi(
    input: &RoiInput,
    assumptions: &RoiAssumptions,
) -> BizValResult<ComputationOutput<RoiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // -- Validation ----------------------------------------------------------
    if input.investment_period_years == 0 {
        return Err(BizValError::InvalidInput {
            field: "investment_period_years".into(),
            reason: "Holding period must be at least 1 year".into(),
        });
    }
    if input.investment_period_years > MAX_HOLDING_PERIOD_YEARS {
        return Err(BizValError::InvalidInput {
            field: "investment_period_years".into(),
            reason: format!("Holding period cannot exceed {MAX_HOLDING_PERIOD_YEARS} years"),
        });
    }
    let discount_rate = input.discount_rate.unwrap_or(assumptions.discount_rate);
    if discount_rate <= dec!(-1) {
        return Err(BizValError::InvalidInput {
            field: "discount_rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }
    if input.profit_margin > Decimal::ONE {
        warnings.push("Profit margin above 100% of revenue".into());
    }

    let total_investment = input
        .purchase_price
        .checked_add(input.additional_investment)
        .and_then(|v| v.checked_add(input.working_capital))
        .ok_or_else(|| overflow("purchase_price"))?;
    if total_investment.is_zero() {
        warnings.push("Total investment is zero; ROI reported as 0".into());
    }

    // -- Base projection -----------------------------------------------------
    let drivers = ProjectionDrivers {
        annual_revenue: input.profile.annual_revenue,
        revenue_growth_rate: input.revenue_growth_rate,
        profit_margin: input.profit_margin,
        exit_multiple: input.exit_multiple,
        years: input.investment_period_years,
        total_investment,
    };
    let projection = project(&drivers)?;
    let n = input.investment_period_years;

    let yearly_cash_flows: Vec<Money> = projection.rows.iter().map(|r| r.cash_flow).collect();
    let cumulative_cash_flows: Vec<Money> = projection
        .rows
        .iter()
        .map(|r| r.cumulative_cash_flow)
        .collect();

    // -- Payback -------------------------------------------------------------
    let payback_year = projection
        .rows
        .iter()
        .find(|r| r.cumulative_cash_flow >= total_investment)
        .map(|r| r.year);
    let payback_reached = payback_year.is_some();
    let payback_period_years = Decimal::from(payback_year.unwrap_or(n));
    if !payback_reached {
        warnings.push(format!(
            "Cumulative cash flow never covers the investment; payback saturates at {n} years"
        ));
    }

    // -- IRR / NPV -----------------------------------------------------------
    let mut flows = Vec::with_capacity(yearly_cash_flows.len() + 1);
    flows.push(-total_investment);
    flows.extend(yearly_cash_flows.iter().copied());
    if let Some(last) = flows.last_mut() {
        *last = last
            .checked_add(projection.exit_value)
            .ok_or_else(|| overflow("exit_multiple"))?;
    }

    let irr = match time_value::irr(&flows) {
        Ok(r) => Some(r),
        Err(e) => {
            warnings.push(format!("IRR not computable: {e}"));
            None
        }
    };
    let npv = time_value::npv(discount_rate, &flows)?;

    // -- Returns -------------------------------------------------------------
    let total_roi = projection.total_roi;
    let annual_roi = total_roi / Decimal::from(n);

    let bands = input
        .sensitivity
        .as_ref()
        .unwrap_or(&assumptions.sensitivity);
    let sensitivity = sensitivity_bands(&drivers, bands, total_roi)?;

    // -- Financing -----------------------------------------------------------
    let financing = input
        .financing
        .as_ref()
        .map(|loan| summarize_financing(loan, &yearly_cash_flows, total_investment, &mut warnings))
        .transpose()?;

    // -- Risk ----------------------------------------------------------------
    let risk_tier = classify_risk_tier(
        total_roi,
        payback_period_years,
        payback_reached,
        &assumptions.risk_tiers,
    );
    let risk_factors = identify_risk_factors(&RiskSignals {
        revenue_growth_rate: input.revenue_growth_rate,
        profit_margin: input.profit_margin,
        payback_reached,
        total_cash_flow: projection.total_cash_flow,
        exit_value: projection.exit_value,
        debt_service_coverage: financing.as_ref().and_then(|f| f.debt_service_coverage),
    });

    let output = RoiOutput {
        projection: projection.rows,
        yearly_cash_flows,
        cumulative_cash_flows,
        exit_value: projection.exit_value,
        total_investment,
        total_cash_flow: projection.total_cash_flow,
        net_profit: projection.net_profit,
        irr,
        npv,
        discount_rate,
        payback_period_years,
        payback_reached,
        total_roi,
        annual_roi,
        sensitivity,
        risk_tier,
        risk_factors,
        financing,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Acquisition ROI: projected cash flows, IRR, NPV, payback",
        &serde_json::json!({
            "input": input,
            "discount_rate": discount_rate.to_string(),
            "sensitivity": bands,
            "risk_tiers": assumptions.risk_tiers,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn summarize_financing(
    loan: &LoanTerms,
    yearly_cash_flows: &[Money],
    total_investment: Money,
    warnings: &mut Vec<String>,
) -> BizValResult<FinancingSummary> {
    if loan.term_years > MAX_TERM_YEARS {
        return Err(BizValError::InvalidInput {
            field: "financing.term_years".into(),
            reason: format!("Loan term cannot exceed {MAX_TERM_YEARS} years"),
        });
    }
    let annual_debt_service = loan
        .annual_debt_service()
        .ok_or_else(|| overflow("financing.principal"))?;
    let term = loan.term_years.max(0) as usize;

    let levered_cash_flows = yearly_cash_flows
        .iter()
        .enumerate()
        .map(|(i, cf)| {
            if i < term {
                cf.checked_sub(annual_debt_service)
                    .ok_or_else(|| overflow("financing.principal"))
            } else {
                Ok(*cf)
            }
        })
        .collect::<BizValResult<Vec<Money>>>()?;

    let debt_service_coverage = match yearly_cash_flows.first() {
        Some(cf) if annual_debt_service > Decimal::ZERO => cf.checked_div(annual_debt_service),
        _ => None,
    };

    let equity_invested = total_investment
        .checked_sub(loan.principal)
        .ok_or_else(|| overflow("financing.principal"))?;
    if equity_invested < Decimal::ZERO {
        warnings.push("Loan principal exceeds total investment".into());
    }

    Ok(FinancingSummary {
        annual_debt_service,
        debt_service_coverage,
        levered_cash_flows,
        equity_invested,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn base_input() -> RoiInput {
        RoiInput {
            profile: FinancialProfile::new(dec!(1000000), dec!(200000), dec!(500000)),
            purchase_price: dec!(500000),
            investment_period_years: 5,
            revenue_growth_rate: dec!(0.05),
            profit_margin: dec!(0.20),
            exit_multiple: dec!(3),
            additional_investment: dec!(50000),
            working_capital: dec!(50000),
            discount_rate: None,
            sensitivity: None,
            financing: None,
        }
    }

    #[test]
    fn test_cash_flow_lengths_and_running_sum() {
        let out = calculate_roi(&base_input(), &RoiAssumptions::default())
            .unwrap()
            .result;
        assert_eq!(out.yearly_cash_flows.len(), 5);
        assert_eq!(out.cumulative_cash_flows.len(), 5);
        let sum: Decimal = out.yearly_cash_flows.iter().copied().sum();
        assert_eq!(out.cumulative_cash_flows[4], sum);
        assert_eq!(out.total_cash_flow, sum);
    }

    #[test]
    fn test_year_one_cash_flow() {
        let out = calculate_roi(&base_input(), &RoiAssumptions::default())
            .unwrap()
            .result;
        // 1,000,000 * 1.05 * 0.20
        assert_eq!(out.yearly_cash_flows[0], dec!(210000));
        assert_eq!(out.total_investment, dec!(600000));
    }

    #[test]
    fn test_exit_value_uses_final_year_profit() {
        let out = calculate_roi(&base_input(), &RoiAssumptions::default())
            .unwrap()
            .result;
        assert_eq!(out.exit_value, out.yearly_cash_flows[4] * dec!(3));
    }

    #[test]
    fn test_payback_year() {
        let out = calculate_roi(&base_input(), &RoiAssumptions::default())
            .unwrap()
            .result;
        // 210,000 + 220,500 + 231,525 = 662,025 >= 600,000 in year 3
        assert_eq!(out.payback_period_years, dec!(3));
        assert!(out.payback_reached);
    }

    #[test]
    fn test_payback_saturates() {
        let mut input = base_input();
        input.profit_margin = dec!(0.01);
        let out = calculate_roi(&input, &RoiAssumptions::default()).unwrap();
        assert!(!out.result.payback_reached);
        assert_eq!(out.result.payback_period_years, dec!(5));
        assert_eq!(out.result.risk_tier, RiskTier::High);
        assert!(out.warnings.iter().any(|w| w.contains("payback")));
    }

    #[test]
    fn test_zero_investment_roi_is_zero() {
        let mut input = base_input();
        input.purchase_price = Decimal::ZERO;
        input.additional_investment = Decimal::ZERO;
        input.working_capital = Decimal::ZERO;
        let out = calculate_roi(&input, &RoiAssumptions::default()).unwrap();
        assert_eq!(out.result.total_roi, Decimal::ZERO);
        assert_eq!(out.result.annual_roi, Decimal::ZERO);
        assert!(out.result.irr.is_none());
    }

    #[test]
    fn test_zero_holding_period_rejected() {
        let mut input = base_input();
        input.investment_period_years = 0;
        assert!(calculate_roi(&input, &RoiAssumptions::default()).is_err());
    }

    #[test]
    fn test_npv_uses_default_discount_rate() {
        let out = calculate_roi(&base_input(), &RoiAssumptions::default())
            .unwrap()
            .result;
        assert_eq!(out.discount_rate, DEFAULT_DISCOUNT_RATE);
        let irr = out.irr.unwrap();
        // IRR above the 10% hurdle implies a positive NPV
        assert!(irr > dec!(0.10));
        assert!(out.npv > Decimal::ZERO);
    }

    #[test]
    fn test_npv_at_irr_is_near_zero() {
        let base = calculate_roi(&base_input(), &RoiAssumptions::default())
            .unwrap()
            .result;
        let mut input = base_input();
        input.discount_rate = base.irr;
        let out = calculate_roi(&input, &RoiAssumptions::default())
            .unwrap()
            .result;
        assert!(out.npv.abs() < dec!(1), "npv at irr = {}", out.npv);
    }

    #[test]
    fn test_financing_summary() {
        let mut input = base_input();
        input.financing = Some(LoanTerms::new(dec!(400000), dec!(6.0), 10));
        let out = calculate_roi(&input, &RoiAssumptions::default())
            .unwrap()
            .result;
        let fin = out.financing.unwrap();
        assert_eq!(fin.equity_invested, dec!(200000));
        assert_eq!(fin.levered_cash_flows.len(), 5);
        assert_eq!(
            fin.levered_cash_flows[0],
            out.yearly_cash_flows[0] - fin.annual_debt_service
        );
        // Debt service never leaks into the unlevered series
        assert_eq!(out.yearly_cash_flows[0], dec!(210000));
        assert!(fin.debt_service_coverage.unwrap() > dec!(3.9));
    }

    #[test]
    fn test_interest_free_seller_note_carries_debt_service() {
        let mut input = base_input();
        input.financing = Some(LoanTerms::new(dec!(480000), Decimal::ZERO, 10));
        let out = calculate_roi(&input, &RoiAssumptions::default())
            .unwrap()
            .result;
        let fin = out.financing.unwrap();
        assert_eq!(fin.annual_debt_service, dec!(48000));
        assert_eq!(fin.levered_cash_flows[0], dec!(162000));
        assert_eq!(fin.debt_service_coverage, Some(dec!(4.375)));
        assert_eq!(fin.equity_invested, dec!(120000));
    }

    #[test]
    fn test_unrepresentable_profit_is_an_error() {
        let mut input = base_input();
        input.profile.annual_revenue = Decimal::MAX / dec!(2);
        input.revenue_growth_rate = Decimal::ZERO;
        input.profit_margin = Decimal::ONE;
        input.investment_period_years = 2;
        assert!(matches!(
            calculate_roi(&input, &RoiAssumptions::default()),
            Err(BizValError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_unrepresentable_total_investment_is_an_error() {
        let mut input = base_input();
        input.purchase_price = Decimal::MAX;
        assert!(calculate_roi(&input, &RoiAssumptions::default()).is_err());
    }

    #[test]
    fn test_long_holding_period_at_high_discount_rate() {
        let mut input = base_input();
        input.investment_period_years = 30;
        input.revenue_growth_rate = Decimal::ZERO;
        input.discount_rate = Some(dec!(10));
        let out = calculate_roi(&input, &RoiAssumptions::default()).unwrap();
        assert_eq!(out.result.yearly_cash_flows.len(), 30);
        // -600000 + 200000 * (1 - 11^-30) / 10; the exit is discounted away
        assert!((out.result.npv - dec!(-580000)).abs() < dec!(0.01), "npv = {}", out.result.npv);
    }

    #[test]
    fn test_holding_period_beyond_cap_rejected() {
        let mut input = base_input();
        input.investment_period_years = u32::MAX;
        assert!(calculate_roi(&input, &RoiAssumptions::default()).is_err());
        input.investment_period_years = MAX_HOLDING_PERIOD_YEARS + 1;
        assert!(calculate_roi(&input, &RoiAssumptions::default()).is_err());
    }

    #[test]
    fn test_financing_term_beyond_cap_rejected() {
        let mut input = base_input();
        input.financing = Some(LoanTerms::new(dec!(400000), dec!(6.0), i32::MAX));
        assert!(calculate_roi(&input, &RoiAssumptions::default()).is_err());
    }
}
