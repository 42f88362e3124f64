use clap::{Parser, Subcommand};

pub mod common;
pub mod run;
pub use common::*;
pub use run::*;

#[derive(Parser)]
#[command(
    name = "wasure",
    version,
    about = "Run WebAssembly benchmarks across runtimes and compare the results"
)]
pub struct Cli {
    /// Log verbosity; RUST_LOG takes precedence when set
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run benchmarks on runtimes and save the results
    Run(RunArgs),
    /// Run a benchmark once per runtime and report which ones pass
    Check(CheckArgs),
    /// Export a results file to CSV
    Export(ExportArgs),
    /// Print a comparison table for a results file
    Report(ReportArgs),
    /// Inspect the benchmark catalog
    Benchmarks(BenchmarksArgs),
    /// Inspect the runtime catalog
    Runtimes(RuntimesArgs),
}
