//! Runs WebAssembly benchmarks under WebAssembly runtimes and measures them.
//!
//! The [`engine`] turns a (benchmark, runtime) pair into timed child
//! processes and per-iteration records. [`catalog`] reads the benchmark and
//! runtime definitions, [`storage`] persists a [`ResultsDocument`] and
//! [`report`] reduces one for display or export.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod errors;
pub mod model;
pub mod report;
pub mod storage;

pub use config::RunConfig;
pub use errors::{Result, WasureError};
pub use model::{
    BenchmarkResults, BenchmarkSpec, IterationRecord, ResultsDocument, RuntimeResults,
    RuntimeSpec, ALL_SELECTOR,
};
