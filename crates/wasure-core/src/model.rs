//! Catalog entries and measurement records.
//!
//! JSON field names follow the catalog and results file formats
//! (`output-validator`, `aot-command`, ... on input; snake_case on output).

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Selector that matches every benchmark or runtime. Never a valid catalog name.
pub const ALL_SELECTOR: &str = "all";

/// A benchmark payload and the rules used to judge its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BenchmarkSpec {
    pub name: String,
    /// Payload location, relative to the benchmarks directory once flattened.
    pub path: String,
    /// Argument template. `{path}` expands to the payload's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_validator: Option<String>,
    /// Regex with a named group `score`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_parser: Option<String>,
}

impl BenchmarkSpec {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            args: None,
            entrypoint: None,
            output_validator: None,
            score_parser: None,
        }
    }
}

/// A runtime and the templates used to invoke it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeSpec {
    pub name: String,
    /// Placeholders: `{payload}`, `{entrypoint}`, `{entrypoint_flag}`, `{args}`, `{mount_dir}`.
    pub command: String,
    /// Placeholders: `{input}`, `{output}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aot_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrypoint_flag: Option<String>,
    /// Stat name to regex with a capture group of the same name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub stats_parser: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subruntimes: Vec<RuntimeSpec>,
}

impl RuntimeSpec {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            aot_command: None,
            entrypoint_flag: None,
            stats_parser: IndexMap::new(),
            subruntimes: Vec::new(),
        }
    }

    /// The AOT template, if one is declared and not blank.
    pub fn aot_template(&self) -> Option<&str> {
        self.aot_command
            .as_deref()
            .filter(|cmd| !cmd.trim().is_empty())
    }
}

/// Outcome of one timed iteration.
///
/// When `return_code != 0` or output validation failed, `elapsed_time` and
/// `score` are 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Nanoseconds from spawn to exit.
    pub elapsed_time: u64,
    pub score: f64,
    pub return_code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Scraped values, in the order the runtime declares its parsers.
    #[serde(
        default,
        skip_serializing_if = "IndexMap::is_empty",
        deserialize_with = "stat_values"
    )]
    pub stats: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_memory_rss: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_memory_vms: Option<u64>,
}

/// Accepts non-string stat values, as written by older result files
/// (`"max_memory_rss": 1234`), and keeps them as their JSON text.
fn stat_values<'de, D: Deserializer<'de>>(deserializer: D) -> Result<IndexMap<String, String>, D::Error> {
    let raw = IndexMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(name, value)| {
            let text = match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (name, text)
        })
        .collect())
}

impl IterationRecord {
    pub fn succeeded(&self) -> bool {
        self.return_code == 0
    }
}

/// One benchmark's entry under a runtime. `iterations` is `None` when the
/// pair was skipped because AOT compilation failed, and serializes as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkResults {
    pub iterations: Option<Vec<IterationRecord>>,
}

impl BenchmarkResults {
    pub fn is_skipped(&self) -> bool {
        self.iterations.is_none()
    }

    pub fn records(&self) -> &[IterationRecord] {
        self.iterations.as_deref().unwrap_or_default()
    }
}

/// Benchmark name to results, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeResults {
    pub benchmarks: IndexMap<String, BenchmarkResults>,
}

impl RuntimeResults {
    pub fn get(&self, benchmark: &str) -> Option<&BenchmarkResults> {
        self.benchmarks.get(benchmark)
    }

    /// A repeated name replaces the earlier entry and keeps its position.
    pub fn insert(
        &mut self,
        benchmark: &str,
        iterations: Option<Vec<IterationRecord>>,
    ) -> Option<BenchmarkResults> {
        self.benchmarks
            .insert(benchmark.to_string(), BenchmarkResults { iterations })
    }
}

/// `runtime -> benchmark -> [IterationRecord]`, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultsDocument {
    runtimes: IndexMap<String, RuntimeResults>,
}

impl ResultsDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }

    pub fn runtimes(&self) -> &IndexMap<String, RuntimeResults> {
        &self.runtimes
    }

    pub fn runtime(&self, name: &str) -> Option<&RuntimeResults> {
        self.runtimes.get(name)
    }

    /// Returns the entry for `name`, creating an empty one at the end if needed.
    pub fn runtime_mut(&mut self, name: &str) -> &mut RuntimeResults {
        self.runtimes.entry(name.to_string()).or_default()
    }

    pub fn insert(
        &mut self,
        runtime: &str,
        benchmark: &str,
        iterations: Option<Vec<IterationRecord>>,
    ) {
        if self.runtime_mut(runtime).insert(benchmark, iterations).is_some() {
            tracing::warn!(
                runtime,
                benchmark,
                "duplicate benchmark name, replacing earlier results"
            );
        }
    }

    pub fn get(&self, runtime: &str, benchmark: &str) -> Option<&BenchmarkResults> {
        self.runtime(runtime)?.get(benchmark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(elapsed_time: u64, score: f64) -> IterationRecord {
        IterationRecord {
            elapsed_time,
            score,
            return_code: 0,
            output: None,
            stats: IndexMap::new(),
            max_memory_rss: None,
            max_memory_vms: None,
        }
    }

    #[test]
    fn benchmark_spec_reads_kebab_case_fields() {
        let raw = r#"{
            "name": "coremark",
            "path": "coremark.wasm",
            "output-validator": "Correct operation validated",
            "score-parser": "Score: (?P<score>[0-9.]+)"
        }"#;
        let spec: BenchmarkSpec = serde_json::from_str(raw).unwrap();
        assert_eq!(spec.name, "coremark");
        assert_eq!(spec.output_validator.as_deref(), Some("Correct operation validated"));
        assert_eq!(spec.score_parser.as_deref(), Some("Score: (?P<score>[0-9.]+)"));
        assert!(spec.args.is_none());
    }

    #[test]
    fn runtime_spec_reads_subruntimes_and_ignores_extra_fields() {
        let raw = r#"{
            "name": "wamr",
            "desc": "WebAssembly Micro Runtime",
            "command": "wamr/iwasm {payload}",
            "aot-command": "  ",
            "stats-parser": {"cycles": "cycles=(?P<cycles>\\d+)"},
            "subruntimes": [{"name": "wamr-jit", "command": "wamr/iwasm-jit {payload}"}]
        }"#;
        let spec: RuntimeSpec = serde_json::from_str(raw).unwrap();
        assert_eq!(spec.subruntimes.len(), 1);
        assert_eq!(spec.subruntimes[0].name, "wamr-jit");
        assert_eq!(spec.stats_parser.len(), 1);
        assert_eq!(spec.aot_template(), None);
    }

    #[test]
    fn record_omits_absent_optional_fields() {
        let v = serde_json::to_value(record(10, 0.0)).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert!(obj.contains_key("elapsed_time"));
        assert!(!obj.contains_key("output"));
        assert!(!obj.contains_key("stats"));
        assert!(!obj.contains_key("max_memory_rss"));
    }

    #[test]
    fn document_preserves_execution_order_through_json() {
        let mut doc = ResultsDocument::new();
        doc.insert("zeta", "b2", Some(vec![record(5, 1.0)]));
        doc.insert("zeta", "a1", None);
        doc.insert("alpha", "b2", Some(vec![record(7, 0.0), record(8, 0.0)]));

        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());
        assert!(json.contains(r#""a1":null"#));

        let back: ResultsDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
        let names: Vec<_> = back.runtimes()["zeta"]
            .benchmarks
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(names, ["b2", "a1"]);
        assert!(back.get("zeta", "a1").unwrap().is_skipped());
    }

    #[test]
    fn duplicate_benchmark_replaces_in_place() {
        let mut doc = ResultsDocument::new();
        doc.insert("rt", "x", Some(vec![record(1, 0.0)]));
        doc.insert("rt", "y", Some(vec![record(2, 0.0)]));
        doc.insert("rt", "x", Some(vec![record(3, 0.0)]));

        let rt = doc.runtime("rt").unwrap();
        assert_eq!(rt.benchmarks.len(), 2);
        let (name, first) = rt.benchmarks.get_index(0).unwrap();
        assert_eq!(name, "x");
        assert_eq!(first.records()[0].elapsed_time, 3);
    }

    #[test]
    fn runtime_without_benchmarks_serializes_as_empty_object() {
        let mut doc = ResultsDocument::new();
        doc.runtime_mut("wasmtime");
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"wasmtime":{}}"#);
    }

    #[test]
    fn numeric_stats_from_older_files_are_kept_as_text() {
        let raw = r#"{"wamr": {"coremark": [{
            "elapsed_time": 10,
            "score": 1.5,
            "return_code": 0,
            "stats": {"max_memory_rss": 1234, "cycles": "99", "ok": true}
        }]}}"#;
        let doc: ResultsDocument = serde_json::from_str(raw).unwrap();
        let stats = &doc.get("wamr", "coremark").unwrap().records()[0].stats;
        assert_eq!(stats["max_memory_rss"], "1234");
        assert_eq!(stats["cycles"], "99");
        assert_eq!(stats["ok"], "true");
    }

    #[test]
    fn stats_parsers_keep_declaration_order() {
        let raw = r#"{
            "name": "wamr",
            "command": "iwasm {payload}",
            "stats-parser": {"zeta": "z=(?P<zeta>\\d+)", "alpha": "a=(?P<alpha>\\d+)"}
        }"#;
        let spec: RuntimeSpec = serde_json::from_str(raw).unwrap();
        let names: Vec<_> = spec.stats_parser.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha"]);
    }
}
