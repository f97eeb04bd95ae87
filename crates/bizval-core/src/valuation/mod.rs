pub mod methodology;
pub mod summary;

pub use methodology::{
    calculate_valuation, ValuationInput, ValuationMethodology, ValuationParams, ValuationResult,
};
pub use summary::{summarize_valuations, ValuationSummary};
