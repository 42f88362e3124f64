use super::args::*;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wasure_core::catalog::{BenchmarkCatalog, RuntimeCatalog};
use wasure_core::{BenchmarkSpec, RunConfig, RuntimeSpec};

pub mod check;
pub mod export;
pub mod list;
pub mod report;
pub mod run;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Run(args) => run::run(args).await,
        Command::Check(args) => check::run(args).await,
        Command::Export(args) => export::run(args),
        Command::Report(args) => report::run(args),
        Command::Benchmarks(args) => match args.cmd {
            BenchmarksSub::List(arg) => list::benchmarks(arg),
        },
        Command::Runtimes(args) => match args.cmd {
            RuntimesSub::List(arg) => list::runtimes(arg),
        },
    }
}

/// Resolves `path` against the current directory.
pub(crate) fn absolute(path: &Path) -> anyhow::Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("failed to resolve {}", path.display()))
}

pub(crate) fn parse_timeout(secs: Option<f64>) -> anyhow::Result<Option<Duration>> {
    secs.map(|s| {
        Duration::try_from_secs_f64(s).map_err(|e| anyhow::anyhow!("invalid --timeout {s}: {e}"))
    })
    .transpose()
}

/// Runtimes and flattened benchmarks picked by the selectors, plus the
/// directories every command must run against.
pub(crate) struct Selection {
    pub runtimes: Vec<RuntimeSpec>,
    pub benchmarks: Vec<BenchmarkSpec>,
    pub config: RunConfig,
}

pub(crate) fn resolve(
    catalog: &CatalogArgs,
    runtime_selectors: &[String],
    benchmark_selectors: &[String],
) -> anyhow::Result<Selection> {
    let benchmarks_dir = absolute(&catalog.benchmarks.benchmarks_dir)?;
    let runtimes_file = absolute(&catalog.runtimes.runtimes_file)?;
    let runtimes_dir = absolute(&catalog.runtimes_dir)?;

    let runtimes = RuntimeCatalog::load(&runtimes_file)
        .context("failed to load runtimes")?
        .select(runtime_selectors);
    tracing::debug!(
        runtimes = ?runtimes.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        "using runtimes"
    );

    let benchmarks = BenchmarkCatalog::load(&benchmarks_dir)
        .context("failed to load benchmarks")?
        .select(benchmark_selectors);
    tracing::debug!(
        benchmarks = ?benchmarks.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
        "using benchmarks"
    );

    Ok(Selection {
        runtimes,
        benchmarks,
        config: RunConfig {
            runtimes_dir,
            benchmarks_dir,
            ..RunConfig::default()
        },
    })
}

impl Selection {
    /// Logs and returns `false` when there is nothing to execute.
    pub fn has_work(&self) -> bool {
        if self.runtimes.is_empty() {
            tracing::error!("no runtimes found");
            return false;
        }
        if self.benchmarks.is_empty() {
            tracing::error!("no benchmarks found");
            return false;
        }
        true
    }
}
