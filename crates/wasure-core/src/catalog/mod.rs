//! Benchmark and runtime definitions on disk.

pub mod benchmarks;
pub mod runtimes;

pub use benchmarks::{BenchmarkCatalog, BenchmarkGroup, BENCHMARKS_FILE};
pub use runtimes::RuntimeCatalog;
