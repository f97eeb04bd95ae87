use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;
use crate::BizValResult;

/// Qualitative risk of an industry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BenchmarkRisk {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for BenchmarkRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

/// Reference multiples and size for one industry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndustryBenchmark {
    pub industry: String,
    pub typical_growth_rate: Rate,
    /// Average annual revenue of businesses sold in this industry
    pub average_business_size: Money,
    pub revenue_multiple: Multiple,
    pub profit_multiple: Multiple,
    pub ebitda_multiple: Multiple,
    pub sde_multiple: Multiple,
    pub risk_level: BenchmarkRisk,
}

/// Immutable lookup from industry name to benchmark.
///
/// Keys are matched case-insensitively. Serialises as a list of benchmarks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<IndustryBenchmark>", into = "Vec<IndustryBenchmark>")]
pub struct BenchmarkTable {
    entries: BTreeMap<String, IndustryBenchmark>,
}

impl BenchmarkTable {
    pub fn new(benchmarks: impl IntoIterator<Item = IndustryBenchmark>) -> Self {
        let entries = benchmarks
            .into_iter()
            .map(|b| (key(&b.industry), b))
            .collect();
        Self { entries }
    }

    /// Load a table from a JSON array of benchmarks.
    pub fn from_json_str(json: &str) -> BizValResult<Self> {
        let benchmarks: Vec<IndustryBenchmark> = serde_json::from_str(json)?;
        Ok(Self::new(benchmarks))
    }

    pub fn get(&self, industry: &str) -> Option<&IndustryBenchmark> {
        self.entries.get(&key(industry))
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndustryBenchmark> {
        self.entries.values()
    }

    pub fn industries(&self) -> Vec<&str> {
        self.entries.values().map(|b| b.industry.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reference data for common owner-operated industries.
    pub fn standard() -> Self {
        Self::new([
            bench("Retail", dec!(0.03), dec!(1200000), dec!(0.45), dec!(2.2), dec!(3.5), dec!(2.0), BenchmarkRisk::Medium),
            bench("Restaurant", dec!(0.04), dec!(900000), dec!(0.35), dec!(2.0), dec!(3.0), dec!(1.9), BenchmarkRisk::High),
            bench("Professional Services", dec!(0.06), dec!(1500000), dec!(0.90), dec!(2.8), dec!(4.5), dec!(2.6), BenchmarkRisk::Low),
            bench("Manufacturing", dec!(0.04), dec!(4000000), dec!(0.70), dec!(3.5), dec!(5.0), dec!(3.2), BenchmarkRisk::Medium),
            bench("Technology", dec!(0.12), dec!(2500000), dec!(1.80), dec!(4.0), dec!(7.0), dec!(3.8), BenchmarkRisk::Medium),
            bench("Healthcare", dec!(0.07), dec!(2000000), dec!(0.85), dec!(3.2), dec!(5.5), dec!(3.0), BenchmarkRisk::Low),
            bench("Construction", dec!(0.05), dec!(3000000), dec!(0.40), dec!(2.5), dec!(3.8), dec!(2.3), BenchmarkRisk::High),
            bench("E-commerce", dec!(0.10), dec!(1000000), dec!(1.10), dec!(3.0), dec!(4.5), dec!(3.0), BenchmarkRisk::Medium),
            bench("Automotive Services", dec!(0.03), dec!(1100000), dec!(0.50), dec!(2.4), dec!(3.6), dec!(2.3), BenchmarkRisk::Medium),
            bench("Wholesale & Distribution", dec!(0.03), dec!(5000000), dec!(0.40), dec!(2.8), dec!(4.2), dec!(2.6), BenchmarkRisk::Medium),
        ])
    }
}

impl From<Vec<IndustryBenchmark>> for BenchmarkTable {
    fn from(benchmarks: Vec<IndustryBenchmark>) -> Self {
        Self::new(benchmarks)
    }
}

impl From<BenchmarkTable> for Vec<IndustryBenchmark> {
    fn from(table: BenchmarkTable) -> Self {
        table.entries.into_values().collect()
    }
}

fn key(industry: &str) -> String {
    industry.trim().to_lowercase()
}

#[allow(clippy::too_many_arguments)]
fn bench(
    industry: &str,
    typical_growth_rate: Rate,
    average_business_size: Money,
    revenue_multiple: Multiple,
    profit_multiple: Multiple,
    ebitda_multiple: Multiple,
    sde_multiple: Multiple,
    risk_level: BenchmarkRisk,
) -> IndustryBenchmark {
    IndustryBenchmark {
        industry: industry.to_string(),
        typical_growth_rate,
        average_business_size,
        revenue_multiple,
        profit_multiple,
        ebitda_multiple,
        sde_multiple,
        risk_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let table = BenchmarkTable::standard();
        assert!(table.get("retail").is_some());
        assert!(table.get("  RETAIL ").is_some());
        assert_eq!(
            table.get("professional services").unwrap().industry,
            "Professional Services"
        );
        assert!(table.get("Space Mining").is_none());
    }

    #[test]
    fn test_standard_is_sane() {
        let table = BenchmarkTable::standard();
        assert_eq!(table.len(), 10);
        for b in table.iter() {
            assert!(b.revenue_multiple > rust_decimal::Decimal::ZERO, "{}", b.industry);
            assert!(b.profit_multiple > b.revenue_multiple, "{}", b.industry);
            assert!(b.average_business_size > rust_decimal::Decimal::ZERO);
        }
    }

    #[test]
    fn test_json_load() {
        let json = r#"[{
            "industry": "Laundromat",
            "typical_growth_rate": "0.02",
            "average_business_size": "400000",
            "revenue_multiple": "1.1",
            "profit_multiple": "3.5",
            "ebitda_multiple": "4.0",
            "sde_multiple": "3.3",
            "risk_level": "Low"
        }]"#;
        let table = BenchmarkTable::from_json_str(json).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("LAUNDROMAT").unwrap().profit_multiple, dec!(3.5));
    }

    #[test]
    fn test_json_invalid() {
        assert!(BenchmarkTable::from_json_str("{not json").is_err());
    }
}
