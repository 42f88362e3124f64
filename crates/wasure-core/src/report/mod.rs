//! Downstream of a finished run: statistics, CSV and console tables.

pub mod console;
pub mod csv;
pub mod reduce;

pub use console::render_table;
pub use csv::{csv_path, export_csv, render_csv, CsvOptions};
pub use reduce::{
    benchmark_names, build_view, compute_statistics, select_metrics, Cell, Metric,
    PairStatistics, ReducedView, RuntimeStatistics, Summary, ViewMode, ViewRow,
};
