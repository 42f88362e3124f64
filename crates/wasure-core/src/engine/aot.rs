//! Ahead-of-time precompilation, once per (benchmark, runtime) pair.

use crate::config::RunConfig;
use crate::engine::process::run_command;
use crate::engine::template::render_aot_command;
use crate::model::{BenchmarkSpec, RuntimeSpec};
use std::path::{Path, PathBuf};

pub const ARTIFACT_EXTENSION: &str = "aot";

/// `<dir>/<stem>.aot` next to the payload.
pub fn artifact_path(payload: &Path) -> PathBuf {
    payload.with_extension(ARTIFACT_EXTENSION)
}

/// A compiled artifact on disk. The file is removed when this is dropped,
/// whatever happened to the iterations that used it.
#[derive(Debug)]
pub struct AotArtifact {
    path: PathBuf,
}

impl AotArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AotArtifact {
    fn drop(&mut self) {
        remove_artifact(&self.path);
    }
}

fn remove_artifact(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "removed precompiled file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not remove precompiled file"),
    }
}

#[derive(Debug)]
pub enum Precompiled {
    /// The runtime declares no AOT step.
    NotRequired,
    Ready(AotArtifact),
    /// Compilation failed; the pair must not run.
    Failed,
}

/// Runs the runtime's `aot-command` for `payload`, if it has one.
pub async fn precompile(
    runtime: &RuntimeSpec,
    benchmark: &BenchmarkSpec,
    payload: &Path,
    config: &RunConfig,
) -> Precompiled {
    let Some(template) = runtime.aot_template() else {
        return Precompiled::NotRequired;
    };

    let output_path = artifact_path(payload);
    let command = render_aot_command(template, payload, &output_path);
    tracing::debug!(command = %command, "running AOT command");

    let outcome = run_command(&command, &config.runtimes_dir, &config.aot_exec_options()).await;
    tracing::debug!(output = %outcome.output, "AOT output");

    if outcome.return_code != 0 {
        tracing::error!(
            benchmark = %benchmark.name,
            runtime = %runtime.name,
            return_code = outcome.return_code,
            error = %outcome.output,
            "AOT compilation failed"
        );
        remove_artifact(&output_path);
        return Precompiled::Failed;
    }

    tracing::info!(
        benchmark = %benchmark.name,
        runtime = %runtime.name,
        "AOT compilation succeeded"
    );
    Precompiled::Ready(AotArtifact { path: output_path })
}
