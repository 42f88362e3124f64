//! Error type for the fallible edges of the engine.
//!
//! Only catalog loading, pattern compilation and results persistence can fail.
//! A benchmark that crashes, exits non-zero or prints garbage is recorded as
//! data in its [`IterationRecord`](crate::model::IterationRecord), never as an
//! `Err`.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WasureError>;

#[derive(Debug, Error)]
pub enum WasureError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid {field} pattern `{pattern}`: {source}")]
    InvalidPattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{field} pattern `{pattern}` has no capture group named `{group}`")]
    MissingCaptureGroup {
        field: String,
        pattern: String,
        group: String,
    },

    #[error("no results found in {}", path.display())]
    EmptyResults { path: PathBuf },
}

impl WasureError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
