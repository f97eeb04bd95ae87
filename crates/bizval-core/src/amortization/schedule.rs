use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::loan::{monthly_payment, LoanTerms, MAX_TERM_YEARS};
use crate::error::BizValError;
use crate::types::*;
use crate::BizValResult;

/// One year of a loan's amortization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationYear {
    pub year: u32,
    pub opening_balance: Money,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_balance: Money,
}

/// Output for a full amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub monthly_payment: Money,
    pub annual_payment: Money,
    pub number_of_payments: i64,
    pub years: Vec<AmortizationYear>,
    pub total_interest: Money,
    pub total_paid: Money,
}

fn overflow(field: &str) -> BizValError {
    BizValError::InvalidInput {
        field: field.into(),
        reason: "Schedule exceeds the representable range".into(),
    }
}

/// Build a year-by-year amortization schedule for a fixed-rate loan.
///
/// Payments are monthly; each year aggregates twelve of them. The final
/// payment absorbs rounding residue so the closing balance is exactly zero.
pub fn build_amortization_schedule(
    terms: &LoanTerms,
) -> BizValResult<ComputationOutput<AmortizationSchedule>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if terms.term_years <= 0 {
        return Err(BizValError::InvalidInput {
            field: "term_years".into(),
            reason: "Loan term must be at least 1 year".into(),
        });
    }
    if terms.term_years > MAX_TERM_YEARS {
        return Err(BizValError::InvalidInput {
            field: "term_years".into(),
            reason: format!("Loan term cannot exceed {MAX_TERM_YEARS} years"),
        });
    }
    if terms.principal < Decimal::ZERO {
        return Err(BizValError::InvalidInput {
            field: "principal".into(),
            reason: "Principal cannot be negative".into(),
        });
    }
    if terms.annual_rate_percent < Decimal::ZERO {
        return Err(BizValError::InvalidInput {
            field: "annual_rate_percent".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    if terms.annual_rate_percent.is_zero() {
        warnings.push("Zero interest rate: principal is repaid straight-line".into());
    }
    if terms.annual_rate_percent > dec!(100) {
        warnings.push(format!(
            "Annual rate of {}% looks like a fraction entered as a percentage",
            terms.annual_rate_percent
        ));
    }

    let r = terms.monthly_rate();
    let n = terms.number_of_payments();
    let payment = monthly_payment(terms.principal, r, n).ok_or_else(|| overflow("principal"))?;
    let annual = payment.checked_mul(dec!(12)).ok_or_else(|| overflow("principal"))?;

    let mut years = Vec::with_capacity(terms.term_years as usize);
    let mut balance = terms.principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;

    for year in 1..=terms.term_years as u32 {
        let opening = balance;
        let mut year_interest = Decimal::ZERO;
        let mut year_principal = Decimal::ZERO;
        let mut year_payment = Decimal::ZERO;

        for month in 1..=12u32 {
            let interest = balance
                .checked_mul(r)
                .ok_or_else(|| overflow("annual_rate_percent"))?;
            let last = year == terms.term_years as u32 && month == 12;
            let principal = if last {
                balance
            } else {
                (payment - interest).min(balance)
            };
            balance -= principal;
            let paid = interest
                .checked_add(principal)
                .ok_or_else(|| overflow("annual_rate_percent"))?;
            year_interest = year_interest
                .checked_add(interest)
                .ok_or_else(|| overflow("annual_rate_percent"))?;
            year_principal += principal;
            year_payment = year_payment
                .checked_add(paid)
                .ok_or_else(|| overflow("annual_rate_percent"))?;
        }

        total_interest = total_interest
            .checked_add(year_interest)
            .ok_or_else(|| overflow("annual_rate_percent"))?;
        total_paid = total_paid
            .checked_add(year_payment)
            .ok_or_else(|| overflow("annual_rate_percent"))?;

        years.push(AmortizationYear {
            year,
            opening_balance: opening,
            payment: year_payment,
            interest: year_interest,
            principal: year_principal,
            closing_balance: balance,
        });
    }

    let output = AmortizationSchedule {
        monthly_payment: payment,
        annual_payment: annual,
        number_of_payments: n,
        years,
        total_interest,
        total_paid,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Loan Amortization",
        terms,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_schedule_pays_off_loan() {
        let terms = LoanTerms::new(dec!(400000), dec!(6.0), 10);
        let out = build_amortization_schedule(&terms).unwrap().result;
        assert_eq!(out.years.len(), 10);
        assert_eq!(out.years.last().unwrap().closing_balance, Decimal::ZERO);
        let principal_sum: Decimal = out.years.iter().map(|y| y.principal).sum();
        assert!((principal_sum - dec!(400000)).abs() < dec!(0.000001));
        assert!((out.total_paid - out.total_interest - dec!(400000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_interest_declines_each_year() {
        let terms = LoanTerms::new(dec!(100000), dec!(8), 5);
        let out = build_amortization_schedule(&terms).unwrap().result;
        for w in out.years.windows(2) {
            assert!(w[0].interest > w[1].interest);
            assert_eq!(w[0].closing_balance, w[1].opening_balance);
        }
    }

    #[test]
    fn test_zero_rate_straight_line() {
        let terms = LoanTerms::new(dec!(120000), dec!(0), 10);
        let out = build_amortization_schedule(&terms).unwrap();
        assert_eq!(out.result.monthly_payment, dec!(1000));
        assert_eq!(out.result.total_interest, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_zero_term_rejected() {
        let terms = LoanTerms::new(dec!(1000), dec!(5), 0);
        assert!(build_amortization_schedule(&terms).is_err());
    }

    #[test]
    fn test_negative_principal_rejected() {
        let terms = LoanTerms::new(dec!(-1000), dec!(5), 3);
        assert!(build_amortization_schedule(&terms).is_err());
    }

    #[test]
    fn test_term_beyond_cap_rejected() {
        let terms = LoanTerms::new(dec!(1000), dec!(5), i32::MAX);
        assert!(build_amortization_schedule(&terms).is_err());
        let terms = LoanTerms::new(dec!(1000), dec!(5), MAX_TERM_YEARS);
        assert!(build_amortization_schedule(&terms).is_ok());
    }

    #[test]
    fn test_unrepresentable_principal_is_an_error() {
        let terms = LoanTerms::new(Decimal::MAX, dec!(2400), 1);
        assert!(build_amortization_schedule(&terms).is_err());
    }

    #[test]
    fn test_interest_free_schedule_matches_debt_service() {
        let terms = LoanTerms::new(dec!(480000), Decimal::ZERO, 10);
        let out = build_amortization_schedule(&terms).unwrap().result;
        assert_eq!(Some(out.annual_payment), terms.annual_debt_service());
    }
}
