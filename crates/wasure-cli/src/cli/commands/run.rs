use super::super::args::RunArgs;
use super::{absolute, parse_timeout, resolve};
use crate::exit_codes::{NOTHING_TO_RUN, SUCCESS};
use anyhow::Context;
use std::sync::Arc;
use wasure_core::engine::{run_all, ProgressEvent, ProgressSink};
use wasure_core::storage::save_results;

pub fn format_progress_line(ev: &ProgressEvent) -> String {
    let status = if ev.skipped {
        "skipped".to_string()
    } else if ev.failed_iterations > 0 {
        format!("{} failed", ev.failed_iterations)
    } else {
        "ok".to_string()
    };
    format!(
        "[{}/{}] {} / {}: {}",
        ev.done, ev.total, ev.runtime, ev.benchmark, status
    )
}

fn stderr_progress() -> ProgressSink {
    Arc::new(|ev: ProgressEvent| eprintln!("{}", format_progress_line(&ev)))
}

pub(crate) async fn run(args: RunArgs) -> anyhow::Result<i32> {
    let mut selection = resolve(&args.catalog, &args.runtimes, &args.benchmarks)?;
    if !selection.has_work() {
        return Ok(NOTHING_TO_RUN);
    }

    selection.config.repeat = args.repeat;
    selection.config.store_output = !args.no_store_output;
    selection.config.sample_memory = args.memory;
    selection.config.timeout = parse_timeout(args.timeout)?;

    let progress = (selection.runtimes.len() * selection.benchmarks.len() > 1).then(stderr_progress);
    let doc = run_all(
        &selection.runtimes,
        &selection.benchmarks,
        &selection.config,
        progress,
    )
    .await;

    let results_dir = absolute(&args.results.results_dir)?;
    let path = save_results(&doc, &results_dir).context("failed to save results")?;
    println!("Results saved to {}", path.display());
    Ok(SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(skipped: bool, failed_iterations: usize) -> ProgressEvent {
        ProgressEvent {
            done: 2,
            total: 6,
            runtime: "wamr".into(),
            benchmark: "coremark".into(),
            skipped,
            failed_iterations,
        }
    }

    #[test]
    fn progress_line_reports_pair_status() {
        assert_eq!(format_progress_line(&event(false, 0)), "[2/6] wamr / coremark: ok");
        assert_eq!(format_progress_line(&event(false, 3)), "[2/6] wamr / coremark: 3 failed");
        assert_eq!(format_progress_line(&event(true, 0)), "[2/6] wamr / coremark: skipped");
    }
}
