use super::super::args::CheckArgs;
use super::{parse_timeout, resolve};
use crate::exit_codes::{CHECK_FAILED, NOTHING_TO_RUN, SUCCESS};
use wasure_core::engine::run_all;
use wasure_core::model::BenchmarkResults;
use wasure_core::ResultsDocument;

const PASS: &str = "✓";
const FAIL: &str = "X";

/// A pair passes when it ran and its single iteration exited cleanly.
fn passed(result: &BenchmarkResults) -> bool {
    result
        .iterations
        .as_deref()
        .and_then(|records| records.first())
        .is_some_and(|r| r.succeeded())
}

pub fn render_check(doc: &ResultsDocument) -> (String, bool) {
    let mut out = String::new();
    let mut all_passed = true;
    for (runtime, results) in doc.runtimes() {
        out.push_str(&format!(" * {runtime}\n"));
        for (benchmark, result) in &results.benchmarks {
            let ok = passed(result);
            all_passed &= ok;
            let status = if ok { PASS } else { FAIL };
            out.push_str(&format!("  ↳ {benchmark}: {status}\n"));
        }
    }
    (out, all_passed)
}

pub(crate) async fn run(args: CheckArgs) -> anyhow::Result<i32> {
    let mut selection = resolve(&args.catalog, &args.runtimes, std::slice::from_ref(&args.benchmark))?;
    if !selection.has_work() {
        return Ok(NOTHING_TO_RUN);
    }

    selection.config.repeat = 1;
    selection.config.store_output = false;
    selection.config.timeout = parse_timeout(args.timeout)?;

    let doc = run_all(
        &selection.runtimes,
        &selection.benchmarks,
        &selection.config,
        None,
    )
    .await;

    let (table, all_passed) = render_check(&doc);
    print!("{table}");
    Ok(if all_passed { SUCCESS } else { CHECK_FAILED })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasure_core::IterationRecord;

    fn record(return_code: i32) -> IterationRecord {
        IterationRecord {
            elapsed_time: if return_code == 0 { 5 } else { 0 },
            score: 0.0,
            return_code,
            output: None,
            stats: Default::default(),
            max_memory_rss: None,
            max_memory_vms: None,
        }
    }

    #[test]
    fn skipped_and_failed_pairs_are_marked() {
        let mut doc = ResultsDocument::new();
        doc.insert("wasmtime", "coremark", Some(vec![record(0)]));
        doc.insert("wamr", "coremark", Some(vec![record(139)]));
        doc.insert("wamr-aot", "coremark", None);

        let (table, all_passed) = render_check(&doc);
        assert!(!all_passed);
        assert_eq!(
            table,
            " * wasmtime\n  ↳ coremark: ✓\n * wamr\n  ↳ coremark: X\n * wamr-aot\n  ↳ coremark: X\n"
        );
    }

    #[test]
    fn clean_run_passes() {
        let mut doc = ResultsDocument::new();
        doc.insert("wasmtime", "coremark", Some(vec![record(0)]));
        assert!(render_check(&doc).1);
    }
}
