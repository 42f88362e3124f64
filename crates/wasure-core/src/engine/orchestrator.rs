//! Run orchestrator: the runtime-major cross product of a resolved selection.

use crate::config::RunConfig;
use crate::engine::iteration::run_iterations;
use crate::model::{BenchmarkSpec, ResultsDocument, RuntimeSpec};
use std::sync::Arc;

/// One finished (runtime, benchmark) pair.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
    pub runtime: String,
    pub benchmark: String,
    /// The pair produced no records (AOT failure or bad patterns).
    pub skipped: bool,
    /// Iterations with a non-zero return code.
    pub failed_iterations: usize,
}

/// Called once per pair, in execution order.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Runs every benchmark under every runtime, one pair at a time.
///
/// Every selected runtime gets an entry in the document, even if no
/// benchmark ran under it.
pub async fn run_all(
    runtimes: &[RuntimeSpec],
    benchmarks: &[BenchmarkSpec],
    config: &RunConfig,
    progress: Option<ProgressSink>,
) -> ResultsDocument {
    let mut doc = ResultsDocument::new();
    let total = runtimes.len() * benchmarks.len();
    let mut done = 0;

    for runtime in runtimes {
        doc.runtime_mut(&runtime.name);
        for benchmark in benchmarks {
            tracing::info!(
                benchmark = %benchmark.name,
                runtime = %runtime.name,
                "running benchmark"
            );
            let iterations = run_iterations(benchmark, runtime, config).await;

            done += 1;
            if let Some(sink) = &progress {
                sink(ProgressEvent {
                    done,
                    total,
                    runtime: runtime.name.clone(),
                    benchmark: benchmark.name.clone(),
                    skipped: iterations.is_none(),
                    failed_iterations: iterations
                        .as_deref()
                        .map(|records| records.iter().filter(|r| !r.succeeded()).count())
                        .unwrap_or(0),
                });
            }
            doc.insert(&runtime.name, &benchmark.name, iterations);
        }
    }

    doc
}
