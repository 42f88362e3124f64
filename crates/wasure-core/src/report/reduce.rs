//! Reduces raw iterations to one comparable number per (benchmark, runtime).

use crate::model::{IterationRecord, ResultsDocument};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Higher is better.
    Score,
    /// Lower is better.
    ElapsedTime,
}

impl Metric {
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Score => "score",
            Metric::ElapsedTime => "elapsed_time",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    fn of(values: impl Iterator<Item = f64> + Clone) -> Option<Self> {
        let n = values.clone().count();
        if n == 0 {
            return None;
        }
        let sum: f64 = values.clone().sum();
        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        Some(Self {
            avg: sum / n as f64,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairStatistics {
    pub elapsed_time: Summary,
    pub score: Summary,
    /// Iterations that survived filtering.
    pub samples: usize,
}

impl PairStatistics {
    pub fn metric(&self, metric: Metric) -> Summary {
        match metric {
            Metric::Score => self.score,
            Metric::ElapsedTime => self.elapsed_time,
        }
    }

    /// `None` when every iteration failed.
    pub fn from_records(records: &[IterationRecord]) -> Option<Self> {
        let kept: Vec<&IterationRecord> = records.iter().filter(|r| r.elapsed_time > 0).collect();
        Some(Self {
            elapsed_time: Summary::of(kept.iter().map(|r| r.elapsed_time as f64))?,
            score: Summary::of(kept.iter().map(|r| r.score))?,
            samples: kept.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeStatistics {
    pub runtime: String,
    pub benchmarks: Vec<(String, PairStatistics)>,
}

impl RuntimeStatistics {
    pub fn get(&self, benchmark: &str) -> Option<&PairStatistics> {
        self.benchmarks
            .iter()
            .find(|(name, _)| name == benchmark)
            .map(|(_, stats)| stats)
    }
}

/// Per-pair summaries in execution order. Pairs with no surviving iteration
/// are dropped, and so are runtimes left with nothing.
pub fn compute_statistics(doc: &ResultsDocument) -> Vec<RuntimeStatistics> {
    doc.runtimes()
        .iter()
        .filter_map(|(runtime, results)| {
            let benchmarks: Vec<_> = results
                .benchmarks
                .iter()
                .filter_map(|(name, b)| Some((name.clone(), PairStatistics::from_records(b.records())?)))
                .collect();
            (!benchmarks.is_empty()).then(|| RuntimeStatistics {
                runtime: runtime.clone(),
                benchmarks,
            })
        })
        .collect()
}

/// Sorted names of every benchmark with data under some runtime.
pub fn benchmark_names(stats: &[RuntimeStatistics]) -> Vec<String> {
    stats
        .iter()
        .flat_map(|r| r.benchmarks.iter().map(|(name, _)| name.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Score when any runtime averages a positive score, elapsed time otherwise.
pub fn select_metrics(stats: &[RuntimeStatistics], benchmarks: &[String]) -> BTreeMap<String, Metric> {
    benchmarks
        .iter()
        .map(|benchmark| {
            let use_score = stats
                .iter()
                .filter_map(|r| r.get(benchmark))
                .any(|s| s.score.avg > 0.0);
            let metric = if use_score { Metric::Score } else { Metric::ElapsedTime };
            (benchmark.clone(), metric)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Percent of the best runtime per benchmark.
    Normalized,
    /// Raw averages; every benchmark had a single runtime.
    Absolute,
}

/// A value with its asymmetric error bar (`avg - min`, `max - avg`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub value: f64,
    pub err_low: f64,
    pub err_high: f64,
}

impl Cell {
    fn from_summary(s: Summary) -> Self {
        Self {
            value: s.avg,
            err_low: s.avg - s.min,
            err_high: s.max - s.avg,
        }
    }

    fn scaled(self, factor: f64) -> Self {
        Self {
            value: self.value * factor,
            err_low: self.err_low * factor,
            err_high: self.err_high * factor,
        }
    }

    const ZERO: Cell = Cell {
        value: 0.0,
        err_low: 0.0,
        err_high: 0.0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewRow {
    pub runtime: String,
    /// Benchmarks this runtime has data for.
    pub cells: BTreeMap<String, Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReducedView {
    pub mode: ViewMode,
    pub benchmarks: Vec<String>,
    pub metrics: BTreeMap<String, Metric>,
    pub rows: Vec<ViewRow>,
}

impl ReducedView {
    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    pub fn cell(&self, runtime: &str, benchmark: &str) -> Option<Cell> {
        self.rows
            .iter()
            .find(|r| r.runtime == runtime)?
            .cells
            .get(benchmark)
            .copied()
    }
}

fn single_runtime_everywhere(stats: &[RuntimeStatistics], benchmarks: &[String]) -> bool {
    benchmarks
        .iter()
        .all(|b| stats.iter().filter(|r| r.get(b).is_some()).count() == 1)
}

/// Factor for a cell whose average is `value`, given every average of the
/// benchmark. `None` means the cell reports 0.
fn scale_factor(metric: Metric, averages: &[f64], value: f64) -> Option<f64> {
    match metric {
        Metric::Score => {
            let max = averages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (max > 0.0).then(|| 100.0 / max)
        }
        Metric::ElapsedTime => {
            let min = averages
                .iter()
                .copied()
                .filter(|v| *v > 0.0)
                .fold(f64::INFINITY, f64::min);
            (min.is_finite() && value > 0.0).then(|| 100.0 / min)
        }
    }
}

pub fn build_view(stats: &[RuntimeStatistics]) -> ReducedView {
    let benchmarks = benchmark_names(stats);
    let metrics = select_metrics(stats, &benchmarks);
    let mode = if !benchmarks.is_empty() && single_runtime_everywhere(stats, &benchmarks) {
        ViewMode::Absolute
    } else {
        ViewMode::Normalized
    };

    let mut rows: Vec<ViewRow> = stats
        .iter()
        .map(|r| ViewRow {
            runtime: r.runtime.clone(),
            cells: BTreeMap::new(),
        })
        .collect();

    for benchmark in &benchmarks {
        let metric = metrics[benchmark];
        let summaries: Vec<(usize, Summary)> = stats
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.get(benchmark).map(|s| (i, s.metric(metric))))
            .collect();

        let averages: Vec<f64> = summaries.iter().map(|(_, s)| s.avg).collect();

        for (i, summary) in summaries {
            let factor = match mode {
                ViewMode::Absolute => Some(1.0),
                ViewMode::Normalized => scale_factor(metric, &averages, summary.avg),
            };
            let cell = factor.map_or(Cell::ZERO, |f| Cell::from_summary(summary).scaled(f));
            rows[i].cells.insert(benchmark.clone(), cell);
        }
    }

    ReducedView {
        mode,
        benchmarks,
        metrics,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(elapsed_time: u64, score: f64) -> IterationRecord {
        IterationRecord {
            elapsed_time,
            score,
            return_code: if elapsed_time > 0 { 0 } else { 1 },
            output: None,
            stats: Default::default(),
            max_memory_rss: None,
            max_memory_vms: None,
        }
    }

    fn doc(entries: &[(&str, &str, Vec<IterationRecord>)]) -> ResultsDocument {
        let mut doc = ResultsDocument::new();
        for (rt, b, records) in entries {
            doc.insert(rt, b, Some(records.clone()));
        }
        doc
    }

    #[test]
    fn failed_iterations_are_ignored() {
        let d = doc(&[("a", "b", vec![run(100, 0.0), run(0, 0.0), run(300, 0.0)])]);
        let stats = compute_statistics(&d);
        let s = stats[0].get("b").unwrap();
        assert_eq!(s.samples, 2);
        assert_eq!(s.elapsed_time.avg, 200.0);
        assert_eq!(s.elapsed_time.min, 100.0);
        assert_eq!(s.elapsed_time.max, 300.0);
    }

    #[test]
    fn all_failed_pair_and_empty_runtime_are_dropped() {
        let mut d = doc(&[
            ("a", "ok", vec![run(10, 0.0)]),
            ("a", "broken", vec![run(0, 0.0)]),
            ("b", "broken", vec![run(0, 0.0)]),
        ]);
        d.insert("c", "skipped", None);
        let stats = compute_statistics(&d);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].benchmarks.len(), 1);
        assert!(stats[0].get("broken").is_none());
    }

    #[test]
    fn score_metric_wins_when_any_runtime_scores() {
        let d = doc(&[
            ("a", "cm", vec![run(10, 0.0)]),
            ("b", "cm", vec![run(10, 5.0)]),
            ("a", "t", vec![run(10, 0.0)]),
        ]);
        let stats = compute_statistics(&d);
        let metrics = select_metrics(&stats, &benchmark_names(&stats));
        assert_eq!(metrics["cm"], Metric::Score);
        assert_eq!(metrics["t"], Metric::ElapsedTime);
    }

    #[test]
    fn scores_normalize_to_the_best() {
        let d = doc(&[
            ("a", "cm", vec![run(10, 1500.0)]),
            ("b", "cm", vec![run(10, 750.0)]),
        ]);
        let view = build_view(&compute_statistics(&d));
        assert_eq!(view.mode, ViewMode::Normalized);
        assert_eq!(view.cell("a", "cm").unwrap().value, 100.0);
        assert_eq!(view.cell("b", "cm").unwrap().value, 50.0);
    }

    #[test]
    fn elapsed_normalizes_to_the_fastest_and_scales_error_bars() {
        let d = doc(&[
            ("fast", "t", vec![run(1_000_000, 0.0)]),
            ("slow", "t", vec![run(3_000_000, 0.0), run(5_000_000, 0.0)]),
        ]);
        let view = build_view(&compute_statistics(&d));
        assert_eq!(view.cell("fast", "t").unwrap().value, 100.0);
        let slow = view.cell("slow", "t").unwrap();
        assert_eq!(slow.value, 400.0);
        assert_eq!(slow.err_low, 100.0);
        assert_eq!(slow.err_high, 100.0);
    }

    #[test]
    fn single_runtime_per_benchmark_reports_absolute_values() {
        let d = doc(&[
            ("a", "x", vec![run(1_000, 0.0)]),
            ("b", "y", vec![run(10, 42.0)]),
        ]);
        let view = build_view(&compute_statistics(&d));
        assert_eq!(view.mode, ViewMode::Absolute);
        assert_eq!(view.cell("a", "x").unwrap().value, 1_000.0);
        assert_eq!(view.cell("b", "y").unwrap().value, 42.0);
    }

    #[test]
    fn zero_scores_never_divide() {
        assert_eq!(scale_factor(Metric::Score, &[0.0, 0.0], 0.0), None);
        assert_eq!(scale_factor(Metric::ElapsedTime, &[0.0], 0.0), None);
        assert_eq!(scale_factor(Metric::ElapsedTime, &[0.0, 50.0], 0.0), None);
        assert_eq!(scale_factor(Metric::ElapsedTime, &[0.0, 50.0], 50.0), Some(2.0));
    }

    #[test]
    fn empty_document_gives_empty_view() {
        let view = build_view(&[]);
        assert!(view.is_empty());
        assert_eq!(view.mode, ViewMode::Normalized);
    }

    proptest! {
        #[test]
        fn normalized_scores_stay_within_percent(scores in prop::collection::vec(0.0f64..1e6, 2..6)) {
            let entries: Vec<_> = scores
                .iter()
                .enumerate()
                .map(|(i, s)| (format!("rt{i}"), vec![run(10, *s)]))
                .collect();
            let mut d = ResultsDocument::new();
            for (rt, records) in &entries {
                d.insert(rt, "b", Some(records.clone()));
            }
            let view = build_view(&compute_statistics(&d));
            for row in &view.rows {
                let v = row.cells["b"].value;
                prop_assert!(v.is_finite());
                prop_assert!((0.0..=100.0 + 1e-9).contains(&v));
            }
        }

        #[test]
        fn normalized_times_are_relative_to_fastest(times in prop::collection::vec(1u64..1_000_000_000, 2..6)) {
            let mut d = ResultsDocument::new();
            for (i, t) in times.iter().enumerate() {
                d.insert(&format!("rt{i}"), "b", Some(vec![run(*t, 0.0)]));
            }
            let view = build_view(&compute_statistics(&d));
            let values: Vec<f64> = view.rows.iter().map(|r| r.cells["b"].value).collect();
            let best = values.iter().copied().fold(f64::INFINITY, f64::min);
            prop_assert!((best - 100.0).abs() < 1e-9);
            prop_assert!(values.iter().all(|v| *v >= 100.0 - 1e-9));
        }
    }
}
