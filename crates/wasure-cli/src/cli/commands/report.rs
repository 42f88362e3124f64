use super::super::args::ReportArgs;
use super::absolute;
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use wasure_core::report::{build_view, compute_statistics, render_table, ViewMode};
use wasure_core::storage::load_results;

pub(crate) fn run(args: ReportArgs) -> anyhow::Result<i32> {
    let results_file = absolute(&args.results_file)?;
    let doc = load_results(&results_file).context("failed to load results")?;

    let view = build_view(&compute_statistics(&doc));
    if view.is_empty() {
        println!("No successful iterations in {}.", results_file.display());
        return Ok(SUCCESS);
    }

    let heading = match view.mode {
        ViewMode::Normalized => "Relative to the best runtime per benchmark (100% = best)",
        ViewMode::Absolute => "Average values",
    };
    println!("{heading}");
    print!("{}", render_table(&view));
    Ok(SUCCESS)
}
