//! Benchmark execution and measurement engine.
//!
//! Leaves first: [`template`] renders command lines, [`process`] runs them
//! (with [`memory`] sampling), [`aot`] precompiles payloads, [`analyze`]
//! scrapes output, [`iteration`] drives one pair and [`orchestrator`] drives
//! the whole selection.

pub mod analyze;
pub mod aot;
pub mod iteration;
pub mod memory;
pub mod orchestrator;
pub mod process;
pub mod template;

pub use iteration::run_iterations;
pub use orchestrator::{run_all, ProgressEvent, ProgressSink};
pub use process::{run_command, ProcessOutcome};
