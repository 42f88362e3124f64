//! Shared argument types used across multiple commands.

use clap::ValueEnum;
use std::path::PathBuf;
use wasure_core::config::{
    DEFAULT_BENCHMARKS_DIR, DEFAULT_RESULTS_DIR, DEFAULT_RUNTIMES_DIR, DEFAULT_RUNTIMES_FILE,
};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(clap::Args, Clone, Debug)]
pub struct BenchmarksDirArg {
    /// Folder holding one subfolder per benchmark group
    #[arg(long, default_value = DEFAULT_BENCHMARKS_DIR, env = "WASURE_BENCHMARKS_DIR")]
    pub benchmarks_dir: PathBuf,
}

#[derive(clap::Args, Clone, Debug)]
pub struct RuntimesFileArg {
    /// JSON file listing the installed runtimes
    #[arg(long, default_value = DEFAULT_RUNTIMES_FILE, env = "WASURE_RUNTIMES_FILE")]
    pub runtimes_file: PathBuf,
}

/// Everything needed to resolve and execute (benchmark, runtime) pairs.
#[derive(clap::Args, Clone, Debug)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub benchmarks: BenchmarksDirArg,

    #[command(flatten)]
    pub runtimes: RuntimesFileArg,

    /// Working directory of every runtime command
    #[arg(long, default_value = DEFAULT_RUNTIMES_DIR, env = "WASURE_RUNTIMES_DIR")]
    pub runtimes_dir: PathBuf,
}

#[derive(clap::Args, Clone, Debug)]
pub struct ResultsDirArg {
    /// Folder where results files are written
    #[arg(long, default_value = DEFAULT_RESULTS_DIR, env = "WASURE_RESULTS_DIR")]
    pub results_dir: PathBuf,
}
