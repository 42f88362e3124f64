use super::super::args::ExportArgs;
use super::absolute;
use crate::exit_codes::SUCCESS;
use anyhow::Context;
use wasure_core::report::{export_csv, CsvOptions};
use wasure_core::storage::load_results;

pub(crate) fn run(args: ExportArgs) -> anyhow::Result<i32> {
    let results_file = absolute(&args.results_file)?;
    let csv_dir = absolute(&args.csv_dir)?;

    let doc = load_results(&results_file).context("failed to load results")?;
    let path = export_csv(
        &doc,
        &results_file,
        &csv_dir,
        CsvOptions {
            memory: args.memory,
        },
    )
    .context("failed to export results")?;

    println!("Results exported to {}", path.display());
    Ok(SUCCESS)
}
