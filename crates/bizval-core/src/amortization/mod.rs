pub mod loan;
pub mod schedule;

pub use loan::{annual_payment, monthly_payment, LoanTerms, MAX_TERM_YEARS};
pub use schedule::{build_amortization_schedule, AmortizationSchedule, AmortizationYear};
