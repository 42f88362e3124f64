//! Process runner: one child per call, timed from spawn to exit.
//!
//! The child's pipes are drained by a background task so a chatty benchmark
//! cannot fill a pipe and stall. A timeout bounds both the exit wait and the
//! pipe drain, since a background process can hold the pipes open after the
//! shell itself has exited. When memory sampling is on, a blocking
//! sampler polls the process tree until the exit is observed; the exit wait
//! itself never depends on the sampler, so sampling overhead does not leak
//! into the measured time.

use crate::config::ExecOptions;
use crate::engine::memory::{MemoryPeak, MemoryProbe};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{ChildStderr, ChildStdout, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Recorded when the command could not be started at all.
pub const SPAWN_FAILURE_CODE: i32 = 127;
/// Recorded when the command was killed for exceeding its timeout.
pub const TIMEOUT_CODE: i32 = 124;

/// How long to keep reading the pipes after the process group was killed.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub elapsed: Duration,
    /// Trimmed stdout followed by trimmed stderr.
    pub output: String,
    pub return_code: i32,
    /// Present only when sampling was requested.
    pub memory: Option<MemoryPeak>,
    pub timed_out: bool,
}

impl ProcessOutcome {
    pub fn elapsed_ns(&self) -> u64 {
        u64::try_from(self.elapsed.as_nanos()).unwrap_or(u64::MAX)
    }

    fn spawn_failure(command: &str, err: &std::io::Error) -> Self {
        Self {
            elapsed: Duration::ZERO,
            output: format!("failed to spawn `{command}`: {err}"),
            return_code: SPAWN_FAILURE_CODE,
            memory: None,
            timed_out: false,
        }
    }
}

fn shell_command(command: &str) -> Command {
    #[cfg(unix)]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        // Own process group, so a timeout can take down the whole tree.
        cmd.process_group(0);
        cmd
    }
    #[cfg(not(unix))]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }
}

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        if let Err(e) = pipe.read_to_end(&mut buf).await {
            tracing::debug!(error = %e, "pipe read ended early");
        }
    }
    buf
}

type Drained = (Vec<u8>, Vec<u8>);

fn drain(stdout: Option<ChildStdout>, stderr: Option<ChildStderr>) -> JoinHandle<Drained> {
    tokio::spawn(async move { tokio::join!(read_all(stdout), read_all(stderr)) })
}

fn combine((stdout, stderr): Drained) -> String {
    let mut output = String::from_utf8_lossy(&stdout).trim().to_string();
    output.push_str(String::from_utf8_lossy(&stderr).trim());
    output
}

fn exit_code(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Kills every process left in the child's group. The group id is the
/// shell's pid, taken at spawn since it is gone once the shell is reaped.
fn kill_group(pgid: Option<u32>) {
    #[cfg(unix)]
    if let Some(raw) = pgid.and_then(|pid| i32::try_from(pid).ok()) {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;
        let _ = killpg(Pid::from_raw(raw), Signal::SIGKILL);
    }
    #[cfg(not(unix))]
    let _ = pgid;
}

enum Exit {
    Status(std::io::Result<ExitStatus>),
    TimedOut,
}

/// Runs `command` through the platform shell in `cwd`.
///
/// Never fails: spawn errors, signals and timeouts are folded into the
/// returned return code and output.
pub async fn run_command(command: &str, cwd: &Path, opts: &ExecOptions) -> ProcessOutcome {
    let mut cmd = shell_command(command);
    cmd.current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(command, cwd = %cwd.display(), "spawning");

    let started = Instant::now();
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::warn!(command, error = %e, "spawn failed");
            return ProcessOutcome::spawn_failure(command, &e);
        }
    };

    let pgid = child.id();
    let mut pipes = drain(child.stdout.take(), child.stderr.take());

    let stop = Arc::new(AtomicBool::new(false));
    let sampler = match (opts.sample_memory, child.id()) {
        (true, Some(pid)) => {
            let probe = MemoryProbe::new(pid);
            let stop = Arc::clone(&stop);
            let interval = opts.memory_poll_interval;
            Some(tokio::task::spawn_blocking(move || probe.run(interval, stop)))
        }
        _ => None,
    };

    let deadline = opts.timeout.map(|t| started + t);
    let mut exit = tokio::select! {
        status = child.wait() => Exit::Status(status),
        _ = sleep_until(deadline) => {
            kill_group(pgid);
            let _ = child.start_kill();
            if let Err(e) = child.wait().await {
                tracing::debug!(error = %e, "wait after kill failed");
            }
            Exit::TimedOut
        }
    };
    let elapsed = started.elapsed();

    stop.store(true, Ordering::Release);
    let memory = match sampler {
        Some(handle) => Some(handle.await.unwrap_or_default()),
        None if opts.sample_memory => Some(MemoryPeak::default()),
        None => None,
    };

    let killed = matches!(exit, Exit::TimedOut);
    let drained = match (deadline, killed) {
        (_, true) => None,
        (Some(deadline), _) => match tokio::time::timeout_at(deadline, &mut pipes).await {
            Ok(drained) => Some(drained),
            Err(_) => {
                tracing::debug!("output still open at the deadline");
                exit = Exit::TimedOut;
                None
            }
        },
        (None, _) => Some((&mut pipes).await),
    };
    // Nothing started by this command may outlive the iteration.
    kill_group(pgid);
    let drained = match drained {
        Some(drained) => drained,
        None => match tokio::time::timeout(DRAIN_GRACE, &mut pipes).await {
            Ok(drained) => drained,
            Err(_) => {
                pipes.abort();
                Ok(Drained::default())
            }
        },
    };
    let mut output = combine(drained.unwrap_or_default());

    let (return_code, timed_out) = match exit {
        Exit::Status(Ok(status)) => (exit_code(&status), false),
        Exit::Status(Err(e)) => {
            output.push_str(&format!("\nfailed to wait for child: {e}"));
            (-1, false)
        }
        Exit::TimedOut => {
            let limit = opts.timeout.unwrap_or_default();
            output.push_str(&format!("\nprocess timed out after {limit:?}"));
            (TIMEOUT_CODE, true)
        }
    };

    tracing::debug!(
        elapsed_ns = elapsed.as_nanos() as u64,
        return_code,
        timed_out,
        "process exited"
    );

    ProcessOutcome {
        elapsed,
        output,
        return_code,
        memory,
        timed_out,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn opts() -> ExecOptions {
        ExecOptions::default()
    }

    fn cwd() -> std::path::PathBuf {
        std::env::temp_dir()
    }

    #[tokio::test]
    async fn captures_stdout_then_stderr() {
        let out = run_command("echo out; echo err 1>&2", &cwd(), &opts()).await;
        assert_eq!(out.return_code, 0);
        assert_eq!(out.output, "outerr");
        assert!(out.elapsed > Duration::ZERO);
        assert!(out.memory.is_none());
    }

    #[tokio::test]
    async fn reports_non_zero_exit() {
        let out = run_command("echo error; exit 3", &cwd(), &opts()).await;
        assert_eq!(out.return_code, 3);
        assert_eq!(out.output, "error");
    }

    #[tokio::test]
    async fn missing_binary_is_a_return_code_not_a_panic() {
        let out = run_command("definitely-not-a-real-binary-xyz", &cwd(), &opts()).await;
        assert_eq!(out.return_code, 127);
        assert!(!out.output.is_empty());
    }

    #[tokio::test]
    async fn bad_working_directory_is_a_spawn_failure() {
        let out = run_command("true", Path::new("/nonexistent/dir/for/wasure"), &opts()).await;
        assert_eq!(out.return_code, SPAWN_FAILURE_CODE);
        assert!(out.output.contains("failed to spawn"));
    }

    #[tokio::test]
    async fn runs_in_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();
        let out = run_command("cat marker.txt", dir.path(), &opts()).await;
        assert_eq!(out.output, "here");
    }

    #[tokio::test]
    async fn signal_maps_to_128_plus_signal() {
        let out = run_command("kill -9 $$", &cwd(), &opts()).await;
        assert_eq!(out.return_code, 128 + 9);
    }

    #[tokio::test]
    async fn timeout_kills_the_process_tree() {
        let mut o = opts();
        o.timeout = Some(Duration::from_millis(200));
        let started = std::time::Instant::now();
        let out = run_command("sleep 30 | cat", &cwd(), &o).await;
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(out.timed_out);
        assert_eq!(out.return_code, TIMEOUT_CODE);
        assert!(out.output.contains("timed out"));
    }

    #[tokio::test]
    async fn timeout_covers_background_child_holding_output() {
        let mut o = opts();
        o.timeout = Some(Duration::from_millis(300));
        let started = std::time::Instant::now();
        let out = run_command("sleep 5 & echo hi", &cwd(), &o).await;
        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(out.timed_out);
        assert_eq!(out.return_code, TIMEOUT_CODE);
        assert!(out.output.starts_with("hi"));
    }

    #[tokio::test]
    async fn background_child_finishing_in_time_is_not_a_timeout() {
        let mut o = opts();
        o.timeout = Some(Duration::from_secs(10));
        let out = run_command("(sleep 0.2; echo late) & echo early", &cwd(), &o).await;
        assert!(!out.timed_out);
        assert_eq!(out.return_code, 0);
        assert_eq!(out.output, "early\nlate");
    }

    #[cfg(target_os = "linux")]
    fn alive(pid: &str) -> bool {
        std::fs::read_to_string(format!("/proc/{pid}/stat"))
            .ok()
            .and_then(|stat| stat.rsplit(')').next().map(|rest| !rest.trim_start().starts_with('Z')))
            .unwrap_or(false)
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn leftover_processes_are_killed_after_exit() {
        let out = run_command("sleep 30 >/dev/null 2>&1 & echo $!", &cwd(), &opts()).await;
        assert_eq!(out.return_code, 0);
        let pid = out.output.trim().to_string();
        let started = std::time::Instant::now();
        while alive(&pid) && started.elapsed() < Duration::from_secs(5) {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!alive(&pid), "background sleep {pid} survived the iteration");
    }

    #[tokio::test]
    async fn memory_sampling_reports_peak() {
        let mut o = opts();
        o.sample_memory = true;
        let out = run_command("sleep 0.3", &cwd(), &o).await;
        assert_eq!(out.return_code, 0);
        let peak = out.memory.expect("sampling was requested");
        assert!(peak.rss > 0);
        assert!(peak.vms >= peak.rss);
    }

    #[tokio::test]
    async fn memory_sampling_survives_instant_exit() {
        let mut o = opts();
        o.sample_memory = true;
        let out = run_command("true", &cwd(), &o).await;
        assert_eq!(out.return_code, 0);
        assert!(out.memory.is_some());
    }
}
