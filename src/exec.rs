// CLASSIFICATION: COMMUNITY
// Filename: exec.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Out-of-process execution of toolchain binaries.
//!
//! Every build step, disassembly and auxiliary invocation goes through an
//! [`Executor`]. Failures to launch and wall-clock timeouts are reported
//! in-band on [`ExecResult`] so callers branch on them instead of unwinding.
//! The deadline covers the whole invocation: the process and every reader of
//! its output streams.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use thiserror::Error;

/// Exit code reported when the process could not be started.
pub const LAUNCH_FAILURE_EXIT_CODE: i32 = -1;
/// Exit code reported when the process was killed at its deadline.
pub const TIMEOUT_EXIT_CODE: i32 = 124;
/// Exit code reported when a started process could not be supervised.
pub const SUPERVISION_FAILURE_EXIT_CODE: i32 = 125;
/// Line appended to stderr for a timed-out process.
pub const TIMEOUT_MESSAGE: &str = "Killed - processing time exceeded";
/// Line appended to a stream that hit the output cap.
pub const TRUNCATED_MESSAGE: &str = "[Truncated]";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_OUTPUT_BYTES: usize = 64 * 1024;
const POLL_INTERVAL: Duration = Duration::from_millis(5);
/// Time allowed after a kill for readers to drain what is left in the pipes.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Options for a single process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOptions {
    /// Working directory; the parent's when `None`.
    pub cwd: Option<PathBuf>,
    /// Variables set on top of the inherited environment.
    pub env: BTreeMap<String, String>,
    /// Wall-clock limit after which the process is killed.
    pub timeout: Duration,
    /// Per-stream capture limit.
    pub max_output_bytes: usize,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            cwd: None,
            env: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
        }
    }
}

impl ExecOptions {
    /// Options running in `cwd` with the given limit.
    pub fn in_dir(cwd: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            cwd: Some(cwd.into()),
            timeout,
            ..Self::default()
        }
    }
}

/// Outcome of one process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    pub code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub timed_out: bool,
    /// Set when the binary could not be started.
    pub launch_failure: Option<String>,
    /// Set when the process started but waiting on it failed.
    pub supervision_failure: Option<String>,
    /// Either stream hit the capture limit.
    pub truncated: bool,
    pub elapsed: Duration,
}

/// Why a process invocation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepFailure {
    Launch(String),
    Supervision(String),
    Timeout,
    Exit(i32),
}

impl ExecResult {
    /// Result for a process that never started.
    pub fn launch_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            code: LAUNCH_FAILURE_EXIT_CODE,
            stdout: Vec::new(),
            stderr: vec![message.clone()],
            timed_out: false,
            launch_failure: Some(message),
            supervision_failure: None,
            truncated: false,
            elapsed: Duration::ZERO,
        }
    }

    /// Result for a process that was started, then killed because it could
    /// not be waited on.
    pub fn supervision_failed(message: impl Into<String>, elapsed: Duration) -> Self {
        let message = message.into();
        Self {
            code: SUPERVISION_FAILURE_EXIT_CODE,
            stdout: Vec::new(),
            stderr: vec![message.clone()],
            timed_out: false,
            launch_failure: None,
            supervision_failure: Some(message),
            truncated: false,
            elapsed,
        }
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failure().is_none()
    }

    /// Classify the outcome; `None` for a clean zero exit.
    #[must_use]
    pub fn failure(&self) -> Option<StepFailure> {
        if let Some(msg) = &self.launch_failure {
            return Some(StepFailure::Launch(msg.clone()));
        }
        if let Some(msg) = &self.supervision_failure {
            return Some(StepFailure::Supervision(msg.clone()));
        }
        if self.timed_out {
            return Some(StepFailure::Timeout);
        }
        if self.code != 0 {
            return Some(StepFailure::Exit(self.code));
        }
        None
    }
}

/// Internal process errors, surfaced to callers only as [`ExecResult`] fields.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to launch {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed waiting for {command}: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
        elapsed: Duration,
    },
}

/// Process invocation boundary.
pub trait Executor: Send + Sync {
    fn execute(&self, command: &Path, args: &[String], options: &ExecOptions) -> ExecResult;
}

/// Bytes captured from one output stream.
#[derive(Debug, Default)]
struct Capture {
    buf: Vec<u8>,
    truncated: bool,
}

type SharedCapture = Arc<Mutex<Capture>>;

fn lock(capture: &Mutex<Capture>) -> MutexGuard<'_, Capture> {
    capture.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Read `reader` on its own thread; `done` fires when the stream closes.
fn spawn_reader<R: Read + Send + 'static>(
    reader: Option<R>,
    cap: usize,
    done: Sender<()>,
) -> SharedCapture {
    let capture = SharedCapture::default();
    let sink = Arc::clone(&capture);
    thread::spawn(move || {
        if let Some(reader) = reader {
            read_capped(reader, cap, &sink);
        }
        let _ = done.send(());
    });
    capture
}

/// Wait for up to `open` readers to finish, giving up at `until`.
fn await_readers(done: &Receiver<()>, open: &mut usize, until: Instant) {
    while *open > 0 {
        let left = until.saturating_duration_since(Instant::now());
        match done.recv_timeout(left) {
            Ok(()) => *open -= 1,
            Err(RecvTimeoutError::Timeout) => return,
            // Every reader has finished or died.
            Err(RecvTimeoutError::Disconnected) => *open = 0,
        }
    }
}

/// Executor backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }

    fn run(
        &self,
        command: &Path,
        args: &[String],
        options: &ExecOptions,
    ) -> Result<ExecResult, ExecError> {
        let label = command.display().to_string();
        let mut cmd = Command::new(command);
        cmd.args(args)
            .envs(&options.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &options.cwd {
            cmd.current_dir(cwd);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            command: label.clone(),
            source,
        })?;
        debug!("spawned {label} pid={} args={args:?}", child.id());

        let cap = options.max_output_bytes;
        let (done_tx, done_rx) = mpsc::channel();
        let stdout_capture = spawn_reader(child.stdout.take(), cap, done_tx.clone());
        let stderr_capture = spawn_reader(child.stderr.take(), cap, done_tx);

        let wait_error = |source| ExecError::Wait {
            command: label.clone(),
            source,
            elapsed: start.elapsed(),
        };
        let deadline = start.checked_add(options.timeout);
        let mut status = None;
        let mut open = 2;
        // Finished means the child exited and both streams closed. A
        // descendant still holding a pipe keeps the invocation running.
        let finished = loop {
            if status.is_none() {
                match child.try_wait() {
                    Ok(exited) => status = exited,
                    Err(source) => {
                        kill_tree(&mut child);
                        let _ = child.wait();
                        return Err(wait_error(source));
                    }
                }
            }
            if let (Some(exited), 0) = (status, open) {
                break Some(exited);
            }
            let now = Instant::now();
            if deadline.is_some_and(|d| now >= d) {
                break None;
            }
            let step = deadline.map_or(POLL_INTERVAL, |d| POLL_INTERVAL.min(d - now));
            await_readers(&done_rx, &mut open, now + step);
        };

        let timed_out = finished.is_none();
        let status = match finished {
            Some(exited) => exited,
            None => {
                kill_tree(&mut child);
                let exited = match status {
                    Some(exited) => exited,
                    None => child.wait().map_err(&wait_error)?,
                };
                await_readers(&done_rx, &mut open, Instant::now() + DRAIN_GRACE);
                if open > 0 {
                    // Readers blocked on a pipe held by a process outside the
                    // group are abandoned; they end when that process does.
                    warn!("{label}: {open} output stream(s) still open after kill");
                }
                exited
            }
        };

        let stdout_capture = std::mem::take(&mut *lock(&stdout_capture));
        let stderr_capture = std::mem::take(&mut *lock(&stderr_capture));
        let mut stdout = split_lines(&stdout_capture.buf);
        let mut stderr = split_lines(&stderr_capture.buf);
        if stdout_capture.truncated {
            stdout.push(TRUNCATED_MESSAGE.to_owned());
        }
        if stderr_capture.truncated {
            stderr.push(TRUNCATED_MESSAGE.to_owned());
        }
        let code = if timed_out {
            stderr.push(TIMEOUT_MESSAGE.to_owned());
            TIMEOUT_EXIT_CODE
        } else {
            exit_code(status)
        };

        Ok(ExecResult {
            code,
            stdout,
            stderr,
            timed_out,
            launch_failure: None,
            supervision_failure: None,
            truncated: stdout_capture.truncated || stderr_capture.truncated,
            elapsed: start.elapsed(),
        })
    }
}

impl Executor for ProcessExecutor {
    fn execute(&self, command: &Path, args: &[String], options: &ExecOptions) -> ExecResult {
        match self.run(command, args, options) {
            Ok(result) => result,
            Err(err) => {
                if let ExecError::Wait { elapsed, .. } = &err {
                    warn!("supervision of {} failed: {err}", command.display());
                    return ExecResult::supervision_failed(err.to_string(), *elapsed);
                }
                debug!("execution of {} failed: {err}", command.display());
                ExecResult::launch_failed(err.to_string())
            }
        }
    }
}

#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    // The child leads its own process group, so this also reaps helpers it
    // forked that would otherwise keep the pipes open. The group outlives its
    // leader while any member remains.
    if let Ok(pgid) = i32::try_from(child.id()) {
        // SAFETY: kill(2) takes no pointers; a stale pgid only yields ESRCH.
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}

fn exit_code(status: ExitStatus) -> i32 {
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
    1
}

/// Copy `reader` into `sink` up to `cap` bytes, then keep draining so the
/// writer never blocks on a full pipe.
fn read_capped<R: Read>(mut reader: R, cap: usize, sink: &Mutex<Capture>) {
    let mut chunk = [0u8; 8192];
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        let mut capture = lock(sink);
        if capture.truncated {
            continue;
        }
        let remaining = cap.saturating_sub(capture.buf.len());
        if n <= remaining {
            capture.buf.extend_from_slice(&chunk[..n]);
        } else {
            capture.buf.extend_from_slice(&chunk[..remaining]);
            capture.truncated = true;
        }
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::to_owned)
        .collect()
}
