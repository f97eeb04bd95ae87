pub mod comparator;
pub mod table;

pub use comparator::{
    compare_to_benchmark, BenchmarkAnalysis, BenchmarkPolicy, MultipleComparison,
    MultiplePosition,
};
pub use table::{BenchmarkRisk, BenchmarkTable, IndustryBenchmark};
