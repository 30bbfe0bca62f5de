//! Run the search binary as a bounded child process
//!
//! One process per call. Output is buffered in full and handed back when the
//! process terminates; nothing is streamed. Two fixed limits apply:
//! [`MAX_BUFFER_BYTES`] across stdout and stderr together, and [`TIMEOUT`].
//! Hitting either kills the child and keeps whatever was captured.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::RunError;

/// Combined stdout + stderr ceiling
pub const MAX_BUFFER_BYTES: usize = 10_000_000;

/// Wall-clock budget for one invocation
pub const TIMEOUT: Duration = Duration::from_millis(60_000);

const READ_CHUNK: usize = 8 * 1024;

/// Arguments for one run: `args` followed by the trailing `target`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    args: Vec<String>,
    target: String,
}

impl Invocation {
    pub fn new<I, S>(args: I, target: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            target: target.into(),
        }
    }

    /// Split a value list whose last entry is the target
    pub fn from_trailing(mut values: Vec<String>) -> Option<Self> {
        let target = values.pop()?;
        Some(Self { args: values, target })
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Full argument vector with the target as the final positional argument
    pub fn argv(&self) -> Vec<&str> {
        self.args
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.target.as_str()))
            .collect()
    }
}

/// What the child process left behind
///
/// `error` is `None` only for a clean zero exit. Output is kept in every case,
/// truncated at the buffer ceiling.
#[derive(Debug)]
pub struct RawTermination {
    pub error: Option<RunError>,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Limits {
    pub(crate) max_buffer: usize,
    pub(crate) timeout: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_buffer: MAX_BUFFER_BYTES,
            timeout: TIMEOUT,
        }
    }
}

#[derive(Debug, Default)]
struct Captured {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

enum Stream {
    Stdout,
    Stderr,
}

impl Captured {
    /// Append a chunk, keeping the combined size at or below `limit`
    fn push(&mut self, stream: Stream, chunk: &[u8], limit: usize) -> Result<(), RunError> {
        let room = limit.saturating_sub(self.stdout.len() + self.stderr.len());
        let buf = match stream {
            Stream::Stdout => &mut self.stdout,
            Stream::Stderr => &mut self.stderr,
        };

        if chunk.len() > room {
            buf.extend_from_slice(&chunk[..room]);
            return Err(RunError::OutputLimit { limit });
        }
        buf.extend_from_slice(chunk);
        Ok(())
    }

    fn into_termination(self, error: Option<RunError>) -> RawTermination {
        RawTermination {
            error,
            stdout: String::from_utf8_lossy(&self.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&self.stderr).into_owned(),
        }
    }
}

/// Run `program` with the invocation's arguments under the fixed limits
pub async fn invoke(program: &Path, invocation: &Invocation) -> RawTermination {
    invoke_with_limits(program, invocation, Limits::default()).await
}

pub(crate) async fn invoke_with_limits(program: &Path, invocation: &Invocation, limits: Limits) -> RawTermination {
    debug!(?program, argv = ?invocation.argv(), "invoke: spawning");

    let spawned = Command::new(program)
        .args(invocation.argv())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(source) => {
            debug!(%source, "invoke: spawn failed");
            let error = RunError::Spawn {
                program: program.to_path_buf(),
                source,
            };
            return Captured::default().into_termination(Some(error));
        }
    };

    let mut captured = Captured::default();
    let result = tokio::time::timeout(limits.timeout, collect(&mut child, &mut captured, limits.max_buffer)).await;

    let error = match result {
        Ok(Ok(status)) => {
            debug!(?status, "invoke: process exited");
            exit_error(status)
        }
        Ok(Err(e)) => {
            debug!(%e, "invoke: aborting process");
            terminate(&mut child).await;
            Some(e)
        }
        Err(_) => {
            debug!(timeout_ms = limits.timeout.as_millis() as u64, "invoke: process timed out");
            terminate(&mut child).await;
            Some(RunError::Timeout {
                timeout_ms: limits.timeout.as_millis() as u64,
            })
        }
    };

    debug!(
        stdout_len = captured.stdout.len(),
        stderr_len = captured.stderr.len(),
        "invoke: output captured"
    );
    captured.into_termination(error)
}

/// Drain both pipes to EOF, then reap the child
async fn collect(child: &mut Child, captured: &mut Captured, limit: usize) -> Result<ExitStatus, RunError> {
    let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Ok(child.wait().await?);
    };

    let mut out_chunk = [0u8; READ_CHUNK];
    let mut err_chunk = [0u8; READ_CHUNK];
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_chunk), if out_open => match read? {
                0 => out_open = false,
                n => captured.push(Stream::Stdout, &out_chunk[..n], limit)?,
            },
            read = stderr.read(&mut err_chunk), if err_open => match read? {
                0 => err_open = false,
                n => captured.push(Stream::Stderr, &err_chunk[..n], limit)?,
            },
        }
    }

    Ok(child.wait().await?)
}

async fn terminate(child: &mut Child) {
    if let Err(e) = child.kill().await {
        warn!(%e, "terminate: failed to kill child process");
    }
}

fn exit_error(status: ExitStatus) -> Option<RunError> {
    if status.success() {
        return None;
    }
    match status.code() {
        Some(code) => Some(RunError::Exited { code }),
        None => Some(RunError::Signaled {
            signal: signal_name(status),
        }),
    }
}

#[cfg(unix)]
fn signal_name(status: ExitStatus) -> String {
    use nix::sys::signal::Signal;
    use std::os::unix::process::ExitStatusExt;

    match status.signal() {
        Some(raw) => Signal::try_from(raw)
            .map(|signal| signal.as_str().to_string())
            .unwrap_or_else(|_| raw.to_string()),
        None => "unknown".to_string(),
    }
}

#[cfg(not(unix))]
fn signal_name(_status: ExitStatus) -> String {
    "unknown".to_string()
}
