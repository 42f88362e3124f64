//! Results documents on disk, one timestamped JSON file per run.

use crate::errors::{Result, WasureError};
use crate::model::ResultsDocument;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

pub const RESULTS_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `<dir>/<timestamp>.json`, or `<timestamp>_N.json` for the first free `N`.
pub fn results_path(dir: &Path, at: DateTime<Local>) -> PathBuf {
    let stem = at.format(RESULTS_TIMESTAMP_FORMAT).to_string();
    let candidate = dir.join(format!("{stem}.json"));
    if !candidate.exists() {
        return candidate;
    }
    (1u32..)
        .map(|n| dir.join(format!("{stem}_{n}.json")))
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

/// Writes `doc` into `dir` (created if missing) and returns the file path.
pub fn save_results(doc: &ResultsDocument, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(|e| WasureError::io(dir, e))?;
    let path = results_path(dir, Local::now());
    let json = serde_json::to_string_pretty(doc).map_err(|e| WasureError::json(&path, e))?;
    std::fs::write(&path, json).map_err(|e| WasureError::io(&path, e))?;
    tracing::info!(path = %path.display(), "results saved");
    Ok(path)
}

pub fn load_results(path: &Path) -> Result<ResultsDocument> {
    let raw = std::fs::read_to_string(path).map_err(|e| WasureError::io(path, e))?;
    let doc: ResultsDocument = serde_json::from_str(&raw).map_err(|e| WasureError::json(path, e))?;
    if doc.is_empty() {
        return Err(WasureError::EmptyResults {
            path: path.to_path_buf(),
        });
    }
    Ok(doc)
}
