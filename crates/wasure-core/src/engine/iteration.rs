//! Iteration controller for a single (benchmark, runtime) pair.
//!
//! `Init -> [Precompiling] -> Running(1..=repeat) -> Cleanup -> Done`.
//! A failed precompile goes straight to `Done` and the pair yields no records.

use crate::config::RunConfig;
use crate::engine::analyze::{Analysis, OutputPatterns};
use crate::engine::aot::{precompile, Precompiled};
use crate::engine::process::{run_command, ProcessOutcome};
use crate::engine::template::render_run_command;
use crate::model::{BenchmarkSpec, IterationRecord, RuntimeSpec};
use std::path::PathBuf;

/// Absolute payload path for a flattened benchmark.
pub fn payload_path(benchmark: &BenchmarkSpec, config: &RunConfig) -> PathBuf {
    config.benchmarks_dir.join(&benchmark.path)
}

/// Folds one process outcome and its analysis into a record.
///
/// A non-zero exit or a failed validation zeroes `elapsed_time` and `score`;
/// the real return code is always kept.
pub fn build_record(outcome: ProcessOutcome, analysis: Analysis, store_output: bool) -> IterationRecord {
    let failed = outcome.return_code != 0 || !analysis.valid;
    let (elapsed_time, score) = if failed {
        (0, 0.0)
    } else {
        (outcome.elapsed_ns(), analysis.score)
    };

    IterationRecord {
        elapsed_time,
        score,
        return_code: outcome.return_code,
        output: store_output.then_some(outcome.output),
        stats: analysis.stats,
        max_memory_rss: outcome.memory.map(|m| m.rss),
        max_memory_vms: outcome.memory.map(|m| m.vms),
    }
}

/// Runs every iteration of `benchmark` under `runtime`.
///
/// Returns `None` when the pair was skipped: AOT compilation failed or the
/// benchmark/runtime patterns do not compile.
pub async fn run_iterations(
    benchmark: &BenchmarkSpec,
    runtime: &RuntimeSpec,
    config: &RunConfig,
) -> Option<Vec<IterationRecord>> {
    let patterns = match OutputPatterns::compile(benchmark, runtime) {
        Ok(patterns) => patterns,
        Err(e) => {
            tracing::error!(
                benchmark = %benchmark.name,
                runtime = %runtime.name,
                error = %e,
                "skipping pair"
            );
            return None;
        }
    };

    let source = payload_path(benchmark, config);

    // Held until the end of this function; dropping it removes the artifact.
    let artifact = match precompile(runtime, benchmark, &source, config).await {
        Precompiled::NotRequired => None,
        Precompiled::Ready(artifact) => Some(artifact),
        Precompiled::Failed => return None,
    };
    let payload = artifact.as_ref().map(|a| a.path()).unwrap_or(&source);

    let command = render_run_command(runtime, benchmark, payload);
    let repeat = config.iterations();
    let exec = config.exec_options();
    let mut records = Vec::with_capacity(repeat as usize);

    for i in 1..=repeat {
        tracing::info!(iteration = i, repeat, "running iteration");
        let outcome = run_command(&command, &config.runtimes_dir, &exec).await;
        tracing::debug!(output = %outcome.output, "benchmark output");

        let analysis = patterns.analyze(&outcome.output);
        if !analysis.valid {
            tracing::warn!(
                benchmark = %benchmark.name,
                runtime = %runtime.name,
                "output validation failed"
            );
        }
        if outcome.return_code != 0 {
            tracing::warn!(
                benchmark = %benchmark.name,
                return_code = outcome.return_code,
                "benchmark failed"
            );
        }

        let record = build_record(outcome, analysis, config.store_output);
        tracing::info!(
            elapsed_ns = record.elapsed_time,
            score = record.score,
            "iteration finished"
        );
        if let (Some(rss), Some(vms)) = (record.max_memory_rss, record.max_memory_vms) {
            tracing::debug!(rss_kib = rss / 1024, vms_kib = vms / 1024, "peak memory");
        }
        tracing::debug!(stats = ?record.stats, "stats");
        records.push(record);
    }

    drop(artifact);
    Some(records)
}
