//! Per-iteration CSV export, benchmark-major.

use crate::errors::{Result, WasureError};
use crate::model::{IterationRecord, ResultsDocument};
use std::path::{Path, PathBuf};

const HEADER: [&str; 6] = [
    "benchmark",
    "runtime",
    "run_index",
    "elapsed_time",
    "score",
    "return_code",
];
const MEMORY_HEADER: [&str; 2] = ["max_memory_rss", "max_memory_vms"];

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvOptions {
    /// Append peak memory columns.
    pub memory: bool,
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row(out: &mut String, fields: &[String]) {
    let line = fields.iter().map(|f| escape(f)).collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push('\n');
}

fn optional(value: Option<u64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// `(benchmark, runtime, records)` grouped by benchmark in first-seen order.
fn benchmark_major(doc: &ResultsDocument) -> Vec<(&str, Vec<(&str, &[IterationRecord])>)> {
    let mut grouped: Vec<(&str, Vec<(&str, &[IterationRecord])>)> = Vec::new();
    for (runtime, results) in doc.runtimes() {
        for (benchmark, result) in &results.benchmarks {
            let Some(records) = result.iterations.as_deref() else {
                continue;
            };
            let entry = (runtime.as_str(), records);
            match grouped.iter_mut().find(|(name, _)| *name == benchmark) {
                Some((_, runtimes)) => runtimes.push(entry),
                None => grouped.push((benchmark.as_str(), vec![entry])),
            }
        }
    }
    grouped
}

/// Renders every iteration of `doc` as CSV. Skipped pairs produce no rows.
pub fn render_csv(doc: &ResultsDocument, opts: CsvOptions) -> String {
    let mut out = String::new();
    let mut header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
    if opts.memory {
        header.extend(MEMORY_HEADER.iter().map(|h| h.to_string()));
    }
    push_row(&mut out, &header);

    for (benchmark, runtimes) in benchmark_major(doc) {
        for (runtime, records) in runtimes {
            for (i, record) in records.iter().enumerate() {
                let mut row = vec![
                    benchmark.to_string(),
                    runtime.to_string(),
                    (i + 1).to_string(),
                    record.elapsed_time.to_string(),
                    record.score.to_string(),
                    record.return_code.to_string(),
                ];
                if opts.memory {
                    row.push(optional(record.max_memory_rss));
                    row.push(optional(record.max_memory_vms));
                }
                push_row(&mut out, &row);
            }
        }
    }
    out
}

/// `<dir>/<results stem>.csv`.
pub fn csv_path(results_file: &Path, dir: &Path) -> PathBuf {
    let stem = results_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    dir.join(format!("{stem}.csv"))
}

/// Writes the CSV for `doc` into `dir` (created if missing).
pub fn export_csv(
    doc: &ResultsDocument,
    results_file: &Path,
    dir: &Path,
    opts: CsvOptions,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| WasureError::io(dir, e))?;
    let path = csv_path(results_file, dir);
    std::fs::write(&path, render_csv(doc, opts)).map_err(|e| WasureError::io(&path, e))?;
    tracing::info!(path = %path.display(), "results exported");
    Ok(path)
}
