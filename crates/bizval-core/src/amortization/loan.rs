use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate};

/// Monthly rates below this are treated as interest-free (payment = principal / n).
pub const MIN_MONTHLY_RATE: Rate = dec!(0.000000001);

/// Longest loan term accepted by the schedule and financing calculators.
pub const MAX_TERM_YEARS: i32 = 100;

/// Fixed-rate loan terms. The rate is a percentage (6.0 = 6%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate_percent: Decimal,
    pub term_years: i32,
}

impl LoanTerms {
    pub fn new(principal: Money, annual_rate_percent: Decimal, term_years: i32) -> Self {
        Self {
            principal,
            annual_rate_percent,
            term_years,
        }
    }

    pub fn monthly_rate(&self) -> Rate {
        self.annual_rate_percent / dec!(100) / dec!(12)
    }

    pub fn number_of_payments(&self) -> i64 {
        i64::from(self.term_years) * 12
    }

    /// Annual debt service, see [`annual_payment`].
    pub fn annual_payment(&self) -> Money {
        annual_payment(self.principal, self.annual_rate_percent, self.term_years)
    }

    /// Twelve level monthly payments, matching the amortization schedule.
    ///
    /// Unlike [`annual_payment`] an interest-free loan still carries its
    /// straight-line principal repayment. Zero when there is nothing to
    /// repay; `None` when the payment leaves the decimal range.
    pub fn annual_debt_service(&self) -> Option<Money> {
        if self.principal <= Decimal::ZERO || self.term_years <= 0 {
            return Some(Decimal::ZERO);
        }
        monthly_payment(self.principal, self.monthly_rate(), self.number_of_payments())?
            .checked_mul(dec!(12))
    }
}

/// Level monthly payment for `principal` over `n` months at `monthly_rate`.
///
/// Callers guarantee `n > 0`. Zero-ish rates use the `principal / n` limit;
/// if `(1 + r)^n` leaves the decimal range the payment is the interest-only
/// limit `principal * r`. `None` when the payment itself is not representable.
pub fn monthly_payment(principal: Money, monthly_rate: Rate, n: i64) -> Option<Money> {
    let straight_line = || principal.checked_div(Decimal::from(n));
    if monthly_rate.abs() < MIN_MONTHLY_RATE {
        return straight_line();
    }
    match (Decimal::ONE + monthly_rate).checked_powi(n) {
        Some(factor) if factor != Decimal::ONE => {
            let ratio = monthly_rate
                .checked_mul(factor)?
                .checked_div(factor.checked_sub(Decimal::ONE)?)?;
            principal.checked_mul(ratio)
        }
        Some(_) => straight_line(),
        None => principal.checked_mul(monthly_rate),
    }
}

/// Annual payment on a fixed-rate amortizing loan (monthly payment x 12).
///
/// Returns 0 when `loan_amount <= 0`, `annual_rate_percent <= 0` or
/// `years <= 0`. Saturates at `Decimal::MAX` outside the decimal range.
pub fn annual_payment(loan_amount: Money, annual_rate_percent: Decimal, years: i32) -> Money {
    if loan_amount <= Decimal::ZERO || annual_rate_percent <= Decimal::ZERO || years <= 0 {
        return Decimal::ZERO;
    }
    let monthly_rate = annual_rate_percent / dec!(100) / dec!(12);
    let n = i64::from(years) * 12;
    monthly_payment(loan_amount, monthly_rate, n)
        .and_then(|p| p.checked_mul(dec!(12)))
        .unwrap_or(Decimal::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_loan() {
        // 400k at 6% over 10 years: 4,440.82/month
        let annual = annual_payment(dec!(400000), dec!(6.0), 10);
        assert!((annual - dec!(53289.84)).abs() < dec!(0.01), "got {annual}");
    }

    #[test]
    fn test_early_outs() {
        assert_eq!(annual_payment(dec!(0), dec!(6), 10), Decimal::ZERO);
        assert_eq!(annual_payment(dec!(-5), dec!(6), 10), Decimal::ZERO);
        assert_eq!(annual_payment(dec!(1000), dec!(0), 10), Decimal::ZERO);
        assert_eq!(annual_payment(dec!(1000), dec!(6), 0), Decimal::ZERO);
        assert_eq!(annual_payment(dec!(1000), dec!(6), -3), Decimal::ZERO);
    }

    #[test]
    fn test_tiny_rate_matches_straight_line() {
        let p = monthly_payment(dec!(12000), dec!(0.0000000001), 12);
        assert_eq!(p, Some(dec!(1000)));
    }

    #[test]
    fn test_small_rate_close_to_straight_line() {
        // 0.01% annual: interest is negligible
        let annual = annual_payment(dec!(120000), dec!(0.01), 10);
        assert!((annual - dec!(12000)).abs() < dec!(10), "got {annual}");
    }

    #[test]
    fn test_loan_terms_derived_fields() {
        let terms = LoanTerms::new(dec!(250000), dec!(7.5), 7);
        assert_eq!(terms.number_of_payments(), 84);
        assert_eq!(terms.monthly_rate(), dec!(7.5) / dec!(100) / dec!(12));
        assert_eq!(terms.annual_payment(), annual_payment(dec!(250000), dec!(7.5), 7));
    }

    #[test]
    fn test_interest_free_debt_service_repays_principal() {
        let terms = LoanTerms::new(dec!(480000), Decimal::ZERO, 10);
        assert_eq!(terms.annual_payment(), Decimal::ZERO);
        assert_eq!(terms.annual_debt_service(), Some(dec!(48000)));
    }

    #[test]
    fn test_debt_service_nothing_to_repay() {
        assert_eq!(LoanTerms::new(dec!(0), dec!(6), 10).annual_debt_service(), Some(Decimal::ZERO));
        assert_eq!(LoanTerms::new(dec!(1000), dec!(6), 0).annual_debt_service(), Some(Decimal::ZERO));
    }

    #[test]
    fn test_unrepresentable_payment_is_none() {
        assert_eq!(monthly_payment(Decimal::MAX, dec!(2), 12), None);
        assert_eq!(annual_payment(Decimal::MAX, dec!(600), 1), Decimal::MAX);
    }
}
