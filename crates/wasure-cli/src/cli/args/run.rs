use super::common::{BenchmarksDirArg, CatalogArgs, ResultsDirArg, RuntimesFileArg};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use wasure_core::ALL_SELECTOR;

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Runtimes to use; `all` selects every runtime and subruntime
    #[arg(short = 'r', long, num_args = 1.., default_value = ALL_SELECTOR)]
    pub runtimes: Vec<String>,

    /// Benchmarks to run: `all`, a group, `group/name` or a path to a .wasm file
    #[arg(short = 'b', long, num_args = 1.., default_value = ALL_SELECTOR)]
    pub benchmarks: Vec<String>,

    /// Iterations per benchmark and runtime
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,

    /// Do not keep benchmark output in the results file
    #[arg(long)]
    pub no_store_output: bool,

    /// Sample peak memory (RSS and VMS) of every iteration
    #[arg(long)]
    pub memory: bool,

    /// Kill an iteration after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    #[command(flatten)]
    pub results: ResultsDirArg,
}

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    /// Benchmark to check: a group, `group/name` or a path to a .wasm file
    pub benchmark: String,

    /// Runtimes to check against
    #[arg(short = 'r', long, num_args = 1.., default_value = ALL_SELECTOR)]
    pub runtimes: Vec<String>,

    /// Kill an iteration after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(Args, Clone, Debug)]
pub struct ExportArgs {
    /// Results file to export
    pub results_file: PathBuf,

    /// Folder where the CSV is written
    #[arg(long = "csv-dir", default_value = wasure_core::config::DEFAULT_RESULTS_DIR, env = "WASURE_RESULTS_DIR")]
    pub csv_dir: PathBuf,

    /// Include peak memory columns
    #[arg(long)]
    pub memory: bool,
}

#[derive(Args, Clone, Debug)]
pub struct ReportArgs {
    /// Results file to summarize
    pub results_file: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct BenchmarksArgs {
    #[command(subcommand)]
    pub cmd: BenchmarksSub,
}

#[derive(Subcommand, Clone, Debug)]
pub enum BenchmarksSub {
    /// List benchmark groups and their benchmarks
    List(BenchmarksDirArg),
}

#[derive(Args, Clone, Debug)]
pub struct RuntimesArgs {
    #[command(subcommand)]
    pub cmd: RuntimesSub,
}

#[derive(Subcommand, Clone, Debug)]
pub enum RuntimesSub {
    /// List installed runtimes and their subruntimes
    List(RuntimesFileArg),
}
