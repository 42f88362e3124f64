//! Runtime catalog: `{"runtimes": [...]}`.

use crate::errors::{Result, WasureError};
use crate::model::{RuntimeSpec, ALL_SELECTOR};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct RuntimesFile {
    #[serde(default)]
    runtimes: Vec<serde_json::Value>,
}

fn parse_entry(entry: serde_json::Value) -> Option<RuntimeSpec> {
    match serde_json::from_value::<RuntimeSpec>(entry) {
        Ok(spec) if spec.name == ALL_SELECTOR => {
            tracing::warn!("runtime name `all` is reserved, ignoring");
            None
        }
        Ok(spec) => Some(spec),
        Err(e) => {
            tracing::debug!(error = %e, "dropping runtime entry");
            None
        }
    }
}

/// Runtimes as declared, parents with their nested subruntimes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuntimeCatalog {
    runtimes: Vec<RuntimeSpec>,
}

impl RuntimeCatalog {
    pub fn new(runtimes: Vec<RuntimeSpec>) -> Self {
        Self { runtimes }
    }

    /// A missing or blank file is an empty catalog. Invalid JSON is an error.
    pub fn load(file: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(file) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(file = %file.display(), "runtimes file not found");
                return Ok(Self::default());
            }
            Err(e) => return Err(WasureError::io(file, e)),
        };
        if raw.trim().is_empty() {
            tracing::warn!(file = %file.display(), "runtimes file is empty");
            return Ok(Self::default());
        }
        Self::parse(&raw).map_err(|e| WasureError::json(file, e))
    }

    pub fn parse(raw: &str) -> std::result::Result<Self, serde_json::Error> {
        let file: RuntimesFile = serde_json::from_str(raw)?;
        let runtimes = file
            .runtimes
            .into_iter()
            .filter_map(parse_entry)
            .collect();
        Ok(Self { runtimes })
    }

    pub fn runtimes(&self) -> &[RuntimeSpec] {
        &self.runtimes
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }

    /// Parent then each of its subruntimes, as independent runtimes.
    /// Subruntimes nested deeper than one level are discarded.
    pub fn expand(&self) -> Vec<RuntimeSpec> {
        let mut flat = Vec::new();
        for runtime in &self.runtimes {
            let mut parent = runtime.clone();
            let children = std::mem::take(&mut parent.subruntimes);
            flat.push(parent);
            for mut child in children {
                if child.name == ALL_SELECTOR {
                    tracing::warn!(parent = %runtime.name, "subruntime name `all` is reserved, ignoring");
                    continue;
                }
                child.subruntimes.clear();
                flat.push(child);
            }
        }
        flat
    }

    /// `all` anywhere selects everything; otherwise catalog order is kept
    /// and unknown names are reported.
    pub fn select<S: AsRef<str>>(&self, selectors: &[S]) -> Vec<RuntimeSpec> {
        let flat = self.expand();
        if selectors.iter().any(|s| s.as_ref() == ALL_SELECTOR) {
            return flat;
        }
        for selector in selectors.iter().map(AsRef::as_ref) {
            if !flat.iter().any(|r| r.name == selector) {
                tracing::warn!(runtime = selector, "runtime not found");
            }
        }
        flat.into_iter()
            .filter(|r| selectors.iter().any(|s| s.as_ref() == r.name))
            .collect()
    }
}
