//! Plain-text rendering of a [`ReducedView`].

use super::reduce::{Cell, Metric, ReducedView, ViewMode};

fn format_cell(cell: Option<Cell>, metric: Metric, mode: ViewMode) -> String {
    let Some(cell) = cell else {
        return "-".to_string();
    };
    match mode {
        ViewMode::Normalized => format!("{:.1}%", cell.value),
        ViewMode::Absolute => match metric {
            Metric::Score => format!("{:.2}", cell.value),
            Metric::ElapsedTime => format_nanos(cell.value),
        },
    }
}

fn format_nanos(ns: f64) -> String {
    if ns >= 1e9 {
        format!("{:.3}s", ns / 1e9)
    } else if ns >= 1e6 {
        format!("{:.3}ms", ns / 1e6)
    } else if ns >= 1e3 {
        format!("{:.3}us", ns / 1e3)
    } else {
        format!("{ns:.0}ns")
    }
}

/// One line per benchmark, one column per runtime.
pub fn render_table(view: &ReducedView) -> String {
    let mut header = vec!["benchmark".to_string()];
    header.extend(view.rows.iter().map(|r| r.runtime.clone()));

    let mut lines = vec![header];
    for benchmark in &view.benchmarks {
        let metric = view
            .metrics
            .get(benchmark)
            .copied()
            .unwrap_or(Metric::ElapsedTime);
        let mut line = vec![format!("{benchmark} ({metric})")];
        line.extend(
            view.rows
                .iter()
                .map(|row| format_cell(row.cells.get(benchmark).copied(), metric, view.mode)),
        );
        lines.push(line);
    }

    let columns = lines.first().map(Vec::len).unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| lines.iter().map(|l| l[c].chars().count()).max().unwrap_or(0))
        .collect();

    let mut out = String::new();
    for line in &lines {
        let cells: Vec<String> = line
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (text, &width))| {
                if i == 0 {
                    format!("{text:<width$}")
                } else {
                    format!("{text:>width$}")
                }
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}
