use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BENCHMARKS_DIR: &str = "benchmarks";
pub const DEFAULT_RUNTIMES_DIR: &str = "runtimes";
pub const DEFAULT_RUNTIMES_FILE: &str = "runtimes/runtimes.json";
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Memory poll interval while a child runs.
pub const DEFAULT_MEMORY_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Policy for one measurement run, passed down explicitly to every stage.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Iterations per (benchmark, runtime) pair. Values below 1 are treated as 1.
    pub repeat: u32,
    /// Keep captured output in each record.
    pub store_output: bool,
    /// Track peak RSS/VMS of the child and its descendants.
    pub sample_memory: bool,
    pub memory_poll_interval: Duration,
    /// Kill a benchmark (or AOT compile) that runs longer than this.
    pub timeout: Option<Duration>,
    /// Working directory of every runtime command.
    pub runtimes_dir: PathBuf,
    /// Root that flattened benchmark paths are relative to.
    pub benchmarks_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            repeat: 1,
            store_output: true,
            sample_memory: false,
            memory_poll_interval: DEFAULT_MEMORY_POLL_INTERVAL,
            timeout: None,
            runtimes_dir: PathBuf::from(DEFAULT_RUNTIMES_DIR),
            benchmarks_dir: PathBuf::from(DEFAULT_BENCHMARKS_DIR),
        }
    }
}

impl RunConfig {
    pub fn iterations(&self) -> u32 {
        self.repeat.max(1)
    }

    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            sample_memory: self.sample_memory,
            memory_poll_interval: self.memory_poll_interval,
            timeout: self.timeout,
        }
    }

    /// Options for the AOT step: same timeout, never sampled.
    pub fn aot_exec_options(&self) -> ExecOptions {
        ExecOptions {
            sample_memory: false,
            ..self.exec_options()
        }
    }
}

/// Per-process execution knobs derived from [`RunConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOptions {
    pub sample_memory: bool,
    pub memory_poll_interval: Duration,
    pub timeout: Option<Duration>,
}

impl Default for ExecOptions {
    fn default() -> Self {
        RunConfig::default().exec_options()
    }
}
