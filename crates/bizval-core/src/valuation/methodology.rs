use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

use crate::error::BizValError;
use crate::types::{with_metadata, ComputationOutput, FinancialProfile, Money, Multiple};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How a business is valued.
///
/// The four driver multiples scale a field of [`FinancialProfile`]. Profit is
/// used as the stand-in for both EBITDA and SDE; no depreciation or owner
/// add-backs are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValuationMethodology {
    RevenueMultiple,
    ProfitMultiple,
    EbitdaMultiple,
    SdeMultiple,
    /// Tangible assets plus blue-sky (goodwill). The multiple is not used.
    AssetBased,
    /// Classification only; value is supplied by the caller.
    DiscountedCashFlow,
    /// Classification only; value is supplied by the caller.
    MarketComparison,
}

impl ValuationMethodology {
    pub const ALL: [ValuationMethodology; 7] = [
        ValuationMethodology::RevenueMultiple,
        ValuationMethodology::ProfitMultiple,
        ValuationMethodology::EbitdaMultiple,
        ValuationMethodology::SdeMultiple,
        ValuationMethodology::AssetBased,
        ValuationMethodology::DiscountedCashFlow,
        ValuationMethodology::MarketComparison,
    ];

    /// Name of the profile field the multiple is applied to.
    pub fn driver(&self) -> &'static str {
        match self {
            Self::RevenueMultiple => "annual_revenue",
            Self::ProfitMultiple | Self::EbitdaMultiple | Self::SdeMultiple => "annual_profit",
            Self::AssetBased => "manual_asset_value + manual_blue_sky",
            Self::DiscountedCashFlow | Self::MarketComparison => "asking_price",
        }
    }

    /// True for the methodologies whose value is `driver * multiple`.
    pub fn is_driver_multiple(&self) -> bool {
        matches!(
            self,
            Self::RevenueMultiple | Self::ProfitMultiple | Self::EbitdaMultiple | Self::SdeMultiple
        )
    }

    /// Value a business under this methodology.
    ///
    /// Never fails: negative multiples and negative profit pass through
    /// arithmetically, and no rounding is applied.
    pub fn apply(&self, profile: &FinancialProfile, params: &ValuationParams) -> ValuationResult {
        let (calculated_value, multiple) = match self {
            Self::RevenueMultiple => (profile.annual_revenue * params.multiple, params.multiple),
            Self::ProfitMultiple | Self::EbitdaMultiple | Self::SdeMultiple => {
                (profile.annual_profit * params.multiple, params.multiple)
            }
            Self::AssetBased => (
                params.manual_asset_value.unwrap_or(Decimal::ZERO)
                    + params.manual_blue_sky.unwrap_or(Decimal::ZERO),
                Decimal::ZERO,
            ),
            Self::DiscountedCashFlow | Self::MarketComparison => match params.manual_value {
                Some(v) => (v, params.multiple),
                None => (profile.asking_price * params.multiple, params.multiple),
            },
        };

        ValuationResult {
            calculated_value,
            multiple,
            methodology: *self,
        }
    }
}

impl std::fmt::Display for ValuationMethodology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RevenueMultiple => write!(f, "Revenue Multiple"),
            Self::ProfitMultiple => write!(f, "Profit Multiple"),
            Self::EbitdaMultiple => write!(f, "EBITDA Multiple"),
            Self::SdeMultiple => write!(f, "SDE Multiple"),
            Self::AssetBased => write!(f, "Asset Based"),
            Self::DiscountedCashFlow => write!(f, "Discounted Cash Flow"),
            Self::MarketComparison => write!(f, "Market Comparison"),
        }
    }
}

impl FromStr for ValuationMethodology {
    type Err = BizValError;

    /// Accepts `revenue-multiple`, `revenue_multiple`, `RevenueMultiple`,
    /// `Revenue Multiple` and the short forms `revenue`, `profit`, `ebitda`,
    /// `sde`, `asset`, `dcf`, `market`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "revenuemultiple" | "revenue" => Ok(Self::RevenueMultiple),
            "profitmultiple" | "profit" => Ok(Self::ProfitMultiple),
            "ebitdamultiple" | "ebitda" => Ok(Self::EbitdaMultiple),
            "sdemultiple" | "sde" => Ok(Self::SdeMultiple),
            "assetbased" | "asset" => Ok(Self::AssetBased),
            "discountedcashflow" | "dcf" => Ok(Self::DiscountedCashFlow),
            "marketcomparison" | "market" => Ok(Self::MarketComparison),
            _ => Err(BizValError::InvalidInput {
                field: "methodology".into(),
                reason: format!("Unknown valuation methodology '{s}'"),
            }),
        }
    }
}

/// Per-call parameters for [`ValuationMethodology::apply`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValuationParams {
    #[serde(default)]
    pub multiple: Multiple,
    /// Tangible asset value (asset-based only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_asset_value: Option<Money>,
    /// Goodwill / intangible value (asset-based only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_blue_sky: Option<Money>,
    /// Externally derived value (DCF / market comparison only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manual_value: Option<Money>,
}

impl ValuationParams {
    pub fn with_multiple(multiple: Multiple) -> Self {
        Self {
            multiple,
            ..Self::default()
        }
    }
}

/// A single valuation of a business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub calculated_value: Money,
    pub multiple: Multiple,
    pub methodology: ValuationMethodology,
}

/// Input for a single valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValuationInput {
    pub profile: FinancialProfile,
    pub methodology: ValuationMethodology,
    #[serde(flatten)]
    pub params: ValuationParams,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Value a business and wrap the result in the standard envelope.
pub fn calculate_valuation(input: &ValuationInput) -> ComputationOutput<ValuationResult> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let methodology = input.methodology;

    match methodology {
        ValuationMethodology::ProfitMultiple
        | ValuationMethodology::EbitdaMultiple
        | ValuationMethodology::SdeMultiple => {
            if input.profile.annual_profit < Decimal::ZERO {
                warnings.push(format!(
                    "Annual profit is negative; {methodology} produces a negative value"
                ));
            }
            if methodology != ValuationMethodology::ProfitMultiple {
                warnings.push(format!(
                    "{methodology} uses annual profit as a proxy; no add-backs are applied"
                ));
            }
        }
        ValuationMethodology::AssetBased => {
            if !input.params.multiple.is_zero() {
                warnings.push("Multiple is ignored for asset-based valuations".into());
            }
            if input.params.manual_asset_value.is_none() {
                warnings.push("No asset value supplied; using 0".into());
            }
            if input.params.manual_blue_sky.is_none() {
                warnings.push("No blue-sky value supplied; using 0".into());
            }
        }
        ValuationMethodology::DiscountedCashFlow | ValuationMethodology::MarketComparison => {
            if input.params.manual_value.is_none() {
                warnings.push(format!(
                    "No manual value supplied for {methodology}; using asking price x multiple"
                ));
            }
        }
        ValuationMethodology::RevenueMultiple => {}
    }

    if input.params.multiple < Decimal::ZERO && methodology != ValuationMethodology::AssetBased {
        warnings.push("Multiple is negative".into());
    }

    let result = methodology.apply(&input.profile, &input.params);

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        &format!("Business Valuation: {methodology}"),
        input,
        warnings,
        elapsed,
        result,
    )
}
