pub mod assumptions;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "valuation")]
pub mod valuation;

#[cfg(feature = "amortization")]
pub mod amortization;

#[cfg(feature = "roi")]
pub mod roi;

#[cfg(feature = "scenarios")]
pub mod scenarios;

#[cfg(feature = "benchmark")]
pub mod benchmark;

#[cfg(feature = "offer")]
pub mod offer;

pub use error::BizValError;
pub use types::*;

/// Standard result type for all bizval operations
pub type BizValResult<T> = Result<T, BizValError>;
