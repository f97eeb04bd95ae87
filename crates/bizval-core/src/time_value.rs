use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::BizValError;
use crate::types::{Money, Rate};
use crate::BizValResult;

/// Lower edge of the IRR search bracket (-99%).
pub const IRR_LOWER_BOUND: Rate = dec!(-0.99);
/// Upper edge of the IRR search bracket (+1000%).
pub const IRR_UPPER_BOUND: Rate = dec!(10.0);
/// Half-width of the final bracket at which bisection stops.
pub const IRR_TOLERANCE: Rate = dec!(0.0000001);
pub const MAX_IRR_ITERATIONS: u32 = 200;

/// Net Present Value of a series of cash flows.
///
/// Index 0 is undiscounted (today); index `t` is discounted by `(1 + rate)^t`.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> BizValResult<Money> {
    if rate <= dec!(-1) {
        return Err(BizValError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    checked_npv(rate, cash_flows).ok_or_else(|| BizValError::DivisionByZero {
        context: format!("NPV discount factor at rate {rate}"),
    })
}

/// NPV that reports `None` instead of overflowing or dividing by an
/// underflowed discount factor. Flows whose discount factor exceeds the
/// decimal range contribute less than one unit each and are dropped.
fn checked_npv(rate: Rate, cash_flows: &[Money]) -> Option<Money> {
    let one_plus_r = Decimal::ONE + rate;
    if one_plus_r <= Decimal::ZERO {
        return None;
    }

    let mut result = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            match discount.checked_mul(one_plus_r) {
                Some(d) => discount = d,
                None => break,
            }
        }
        if discount.is_zero() {
            return None;
        }
        result = result.checked_add(cf.checked_div(discount)?)?;
    }

    Some(result)
}

/// NPV used while bracketing. Where the decimal range is exhausted the sign
/// is taken from the flow that dominates in that limit: the last non-zero
/// flow as the rate approaches -100%, the first one as it grows large.
fn bracket_npv(rate: Rate, cash_flows: &[Money]) -> Money {
    if let Some(v) = checked_npv(rate, cash_flows) {
        return v;
    }
    let dominant = if rate < Decimal::ZERO {
        cash_flows.iter().rev().find(|cf| !cf.is_zero())
    } else {
        cash_flows.iter().find(|cf| !cf.is_zero())
    };
    dominant.copied().unwrap_or(Decimal::ZERO)
}

/// Internal Rate of Return by bracketed bisection on
/// [`IRR_LOWER_BOUND`, `IRR_UPPER_BOUND`].
///
/// Fails with `ConvergenceFailure` when the NPV has no sign change inside the
/// bracket or the iteration cap is hit.
pub fn irr(cash_flows: &[Money]) -> BizValResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(BizValError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let mut lo = IRR_LOWER_BOUND;
    let mut hi = IRR_UPPER_BOUND;
    let mut f_lo = bracket_npv(lo, cash_flows);
    let f_hi = bracket_npv(hi, cash_flows);

    if f_lo.is_zero() {
        return Ok(lo);
    }
    if f_hi.is_zero() {
        return Ok(hi);
    }
    if f_lo.is_sign_positive() == f_hi.is_sign_positive() {
        tracing::warn!(%f_lo, %f_hi, "IRR not bracketed between -99% and +1000%");
        return Err(BizValError::ConvergenceFailure {
            function: "IRR".into(),
            iterations: 0,
            last_delta: f_lo,
        });
    }

    for i in 0..MAX_IRR_ITERATIONS {
        let mid = (lo + hi) / dec!(2);
        let f_mid = bracket_npv(mid, cash_flows);

        if f_mid.is_zero() || (hi - lo) / dec!(2) < IRR_TOLERANCE {
            tracing::debug!(irr = %mid, iterations = i + 1, "IRR converged");
            return Ok(mid);
        }

        if f_mid.is_sign_positive() == f_lo.is_sign_positive() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    let mid = (lo + hi) / dec!(2);
    tracing::warn!(iterations = MAX_IRR_ITERATIONS, "IRR bisection hit iteration cap");
    Err(BizValError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: bracket_npv(mid, cash_flows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_npv_basic() {
        let cfs = vec![dec!(-1000), dec!(300), dec!(400), dec!(500)];
        let result = npv(dec!(0.10), &cfs).unwrap();
        // NPV at 10%: -1000 + 300/1.1 + 400/1.21 + 500/1.331 ≈ -21.04
        assert!((result - dec!(-21.04)).abs() < dec!(1.0));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_rejects_rate_below_minus_one() {
        assert!(npv(dec!(-1.5), &[dec!(-100), dec!(50)]).is_err());
    }

    #[test]
    fn test_npv_long_horizon_at_high_rate() {
        // 11^28 leaves the decimal range; later flows are negligible
        let mut cfs = vec![dec!(-1000)];
        cfs.extend(std::iter::repeat(dec!(100)).take(40));
        let result = npv(dec!(10), &cfs).unwrap();
        // -1000 + 100 * (1 - 11^-40) / 10 ≈ -990
        assert!((result - dec!(-990)).abs() < dec!(0.01), "got {result}");
    }

    #[test]
    fn test_irr_single_period() {
        // -100 today, +110 in one year => 10%
        let result = irr(&[dec!(-100), dec!(110)]).unwrap();
        assert!((result - dec!(0.10)).abs() < dec!(0.001), "got {result}");
    }

    #[test]
    fn test_irr_annuity() {
        let cfs = vec![dec!(-1000), dec!(400), dec!(400), dec!(400)];
        let result = irr(&cfs).unwrap();
        // IRR should be ~9.7%
        assert!((result - dec!(0.097)).abs() < dec!(0.01));
    }

    #[test]
    fn test_irr_negative_return() {
        // Lose half the money in one year => -50%
        let result = irr(&[dec!(-100), dec!(50)]).unwrap();
        assert!((result - dec!(-0.5)).abs() < dec!(0.001), "got {result}");
    }

    #[test]
    fn test_irr_no_sign_change_fails() {
        let result = irr(&[dec!(100), dec!(50), dec!(50)]);
        assert!(matches!(
            result,
            Err(BizValError::ConvergenceFailure { .. })
        ));
    }

    #[test]
    fn test_irr_requires_two_flows() {
        assert!(matches!(
            irr(&[dec!(-100)]),
            Err(BizValError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_irr_long_horizon_does_not_overflow() {
        let mut cfs = vec![dec!(-1000000)];
        cfs.extend(std::iter::repeat(dec!(150000)).take(30));
        let result = irr(&cfs).unwrap();
        // 30-year annuity at 15% of principal => ~14.8%
        assert!(result > dec!(0.14) && result < dec!(0.16), "got {result}");
    }
}
