pub mod recommendation;

pub use recommendation::{
    recommend_offer, OfferInput, OfferPolicy, OfferRecommendation, OfferRiskFactor, RiskSeverity,
};
