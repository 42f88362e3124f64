//! Benchmark groups: `<root>/<group>/benchmarks.json`.

use crate::errors::{Result, WasureError};
use crate::model::{BenchmarkSpec, ALL_SELECTOR};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const BENCHMARKS_FILE: &str = "benchmarks.json";
const WASM_EXTENSION: &str = ".wasm";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkGroup {
    pub name: String,
    pub benchmarks: Vec<BenchmarkSpec>,
}

impl BenchmarkGroup {
    pub fn get(&self, name: &str) -> Option<&BenchmarkSpec> {
        self.benchmarks.iter().find(|b| b.name == name)
    }

    /// The benchmark with its path rewritten to `<group>/<path>`.
    fn flatten(&self, benchmark: &BenchmarkSpec) -> BenchmarkSpec {
        let mut flat = benchmark.clone();
        if !Path::new(&benchmark.path).is_absolute() {
            flat.path = format!("{}/{}", self.name, benchmark.path);
        }
        flat
    }
}

#[derive(Deserialize)]
struct BenchmarksFile {
    #[serde(default)]
    benchmarks: Vec<serde_json::Value>,
}

/// Reads one group file. Anything unreadable yields an empty group.
fn parse_group_file(file: &Path) -> Vec<BenchmarkSpec> {
    let raw = match std::fs::read_to_string(file) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::info!(file = %file.display(), error = %e, "skipping unreadable benchmark file");
            return Vec::new();
        }
    };
    if raw.trim().is_empty() {
        tracing::info!(file = %file.display(), "benchmark file is empty, skipping");
        return Vec::new();
    }

    let parsed: BenchmarksFile = match serde_json::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::info!(file = %file.display(), error = %e, "failed to parse benchmark file");
            return Vec::new();
        }
    };

    parsed
        .benchmarks
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<BenchmarkSpec>(entry) {
            Ok(spec) if spec.name == ALL_SELECTOR => {
                tracing::warn!(file = %file.display(), "benchmark name `all` is reserved, ignoring");
                None
            }
            Ok(spec) => Some(spec),
            Err(e) => {
                tracing::debug!(file = %file.display(), error = %e, "dropping benchmark entry");
                None
            }
        })
        .collect()
}

/// Every benchmark group found under a benchmarks directory.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkCatalog {
    root: PathBuf,
    groups: Vec<BenchmarkGroup>,
}

impl BenchmarkCatalog {
    /// Scans `root`. A missing directory yields an empty catalog; any other
    /// failure to list it is an error.
    pub fn load(root: &Path) -> Result<Self> {
        let entries = match std::fs::read_dir(root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::error!(dir = %root.display(), "benchmarks folder not found");
                return Ok(Self {
                    root: root.to_path_buf(),
                    groups: Vec::new(),
                });
            }
            Err(e) => return Err(WasureError::io(root, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| WasureError::io(root, e))?;
            if !entry.path().join(BENCHMARKS_FILE).is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == ALL_SELECTOR {
                tracing::warn!(dir = %entry.path().display(), "group name `all` is reserved, ignoring");
                continue;
            }
            names.push(name);
        }
        names.sort();

        let groups = names
            .into_iter()
            .filter_map(|name| {
                let benchmarks = parse_group_file(&root.join(&name).join(BENCHMARKS_FILE));
                (!benchmarks.is_empty()).then_some(BenchmarkGroup { name, benchmarks })
            })
            .collect();

        Ok(Self {
            root: root.to_path_buf(),
            groups,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn groups(&self) -> &[BenchmarkGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&BenchmarkGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Resolves selectors into flattened benchmarks, catalog entries first
    /// and ad-hoc `.wasm` files last. Duplicates keep their first position.
    pub fn select<S: AsRef<str>>(&self, selectors: &[S]) -> Vec<BenchmarkSpec> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut picked = Vec::new();
        let mut push = |group: &str, spec: BenchmarkSpec| {
            if seen.insert((group.to_string(), spec.name.clone())) {
                picked.push(spec);
            }
        };

        let select_all = selectors.iter().any(|s| s.as_ref() == ALL_SELECTOR);
        if select_all {
            for group in &self.groups {
                for b in &group.benchmarks {
                    push(&group.name, group.flatten(b));
                }
            }
        } else {
            for selector in selectors.iter().map(AsRef::as_ref) {
                if selector.ends_with(WASM_EXTENSION) {
                    continue;
                }
                for (group, spec) in self.resolve_named(selector) {
                    push(group, spec);
                }
            }
        }

        for selector in selectors.iter().map(AsRef::as_ref) {
            if let Some(spec) = wasm_file_benchmark(selector) {
                let key = spec.path.clone();
                push(&key, spec);
            }
        }

        picked
    }

    fn resolve_named<'a>(&'a self, selector: &str) -> Vec<(&'a str, BenchmarkSpec)> {
        match selector.split_once('/') {
            None => match self.group(selector) {
                Some(group) => group
                    .benchmarks
                    .iter()
                    .map(|b| (group.name.as_str(), group.flatten(b)))
                    .collect(),
                None => {
                    tracing::warn!(selector, "benchmark group not found");
                    Vec::new()
                }
            },
            Some((group_name, name)) => {
                let Some(group) = self.group(group_name) else {
                    tracing::warn!(group = group_name, "benchmark group not found");
                    return Vec::new();
                };
                match group.get(name) {
                    Some(b) => vec![(group.name.as_str(), group.flatten(b))],
                    None => {
                        tracing::warn!(group = group_name, benchmark = name, "benchmark not found in group");
                        Vec::new()
                    }
                }
            }
        }
    }
}

/// An existing `.wasm` file given directly on the command line.
fn wasm_file_benchmark(selector: &str) -> Option<BenchmarkSpec> {
    if !selector.ends_with(WASM_EXTENSION) {
        return None;
    }
    let path = Path::new(selector);
    if !path.is_file() {
        tracing::warn!(path = selector, "benchmark file not found");
        return None;
    }
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let name = path.file_name()?.to_string_lossy().into_owned();
    Some(BenchmarkSpec::new(name, absolute.to_string_lossy()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_group(root: &Path, group: &str, body: &str) {
        fs::create_dir_all(root.join(group)).unwrap();
        fs::write(root.join(group).join(BENCHMARKS_FILE), body).unwrap();
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_group(
            dir.path(),
            "coremark",
            r#"{"benchmarks": [
                {"name": "coremark", "path": "coremark.wasm", "score-parser": "Score: (?P<score>[0-9.]+)"},
                {"name": "coremark-1000", "path": "coremark-1000.wasm"},
                {"name": "no-path"}
            ]}"#,
        );
        write_group(
            dir.path(),
            "polybench",
            r#"{"benchmarks": [{"name": "gemm", "path": "gemm.wasm", "args": "{path}/data"}]}"#,
        );
        write_group(dir.path(), "broken", "{not json");
        write_group(dir.path(), "empty", "");
        write_group(dir.path(), "all", r#"{"benchmarks": [{"name": "x", "path": "x.wasm"}]}"#);
        fs::create_dir_all(dir.path().join("not-a-group")).unwrap();
        dir
    }

    fn names(specs: &[BenchmarkSpec]) -> Vec<&str> {
        specs.iter().map(|b| b.name.as_str()).collect()
    }

    #[test]
    fn load_keeps_only_valid_groups_sorted() {
        let dir = fixture();
        let catalog = BenchmarkCatalog::load(dir.path()).unwrap();
        let groups: Vec<_> = catalog.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(groups, ["coremark", "polybench"]);
        assert_eq!(catalog.group("coremark").unwrap().benchmarks.len(), 2);
    }

    #[test]
    fn missing_root_is_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = BenchmarkCatalog::load(&dir.path().join("nope")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn all_selects_every_benchmark_flattened() {
        let dir = fixture();
        let catalog = BenchmarkCatalog::load(dir.path()).unwrap();
        let picked = catalog.select(&["all"]);
        assert_eq!(names(&picked), ["coremark", "coremark-1000", "gemm"]);
        assert_eq!(picked[0].path, "coremark/coremark.wasm");
        assert_eq!(picked[2].args.as_deref(), Some("{path}/data"));
    }

    #[test]
    fn group_and_single_selectors_are_deduplicated() {
        let dir = fixture();
        let catalog = BenchmarkCatalog::load(dir.path()).unwrap();
        let picked = catalog.select(&["coremark/coremark-1000", "coremark", "polybench/gemm"]);
        assert_eq!(names(&picked), ["coremark-1000", "coremark", "gemm"]);
    }

    #[test]
    fn unknown_selectors_contribute_nothing() {
        let dir = fixture();
        let catalog = BenchmarkCatalog::load(dir.path()).unwrap();
        assert!(catalog.select(&["nope", "coremark/nope", "missing.wasm"]).is_empty());
    }

    #[test]
    fn wasm_files_become_ad_hoc_benchmarks() {
        let dir = fixture();
        let file = dir.path().join("local.wasm");
        fs::write(&file, b"\0asm").unwrap();
        let catalog = BenchmarkCatalog::load(dir.path()).unwrap();

        let selector = file.to_string_lossy().into_owned();
        let picked = catalog.select(&[selector.as_str(), "polybench"]);
        assert_eq!(names(&picked), ["gemm", "local.wasm"]);
        assert!(Path::new(&picked[1].path).is_absolute());
    }
}
