//! Subprocess supervision.
//!
//! A child is spawned with stdout and stderr piped into one shared capture buffer, then raced
//! against the deadline and the caller's cancellation token. Whichever finishes first decides
//! the [`Outcome`]; a killed child still contributes whatever it wrote before it died.

use crate::exit_codes::{CANCELLED, FAILURE, SUCCESS, TIMED_OUT};
use std::fmt::Display;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How long readers may keep draining after a kill. Grandchildren can hold the pipes open.
const READER_GRACE: Duration = Duration::from_millis(100);

const READ_CHUNK: usize = 8 * 1024;

/// A fixed point in time by which a block must finish.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// Deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    pub fn at(&self) -> Instant {
        self.at
    }

    /// The duration this deadline was created with.
    pub fn budget(&self) -> Duration {
        self.budget
    }
}

/// Captured output and normalized exit code of one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub output: String,
    pub exit_code: i32,
}

impl Outcome {
    pub fn success(output: String) -> Self {
        Self {
            output,
            exit_code: SUCCESS,
        }
    }

    pub fn exited(output: String, exit_code: i32) -> Self {
        Self { output, exit_code }
    }

    /// Launch or I/O failure: the error text follows whatever was captured.
    pub fn failure(output: String, err: &dyn Display) -> Self {
        Self {
            output: with_notice(output, &err.to_string()),
            exit_code: FAILURE,
        }
    }

    pub fn timed_out(output: String, budget: Duration) -> Self {
        Self {
            output: with_notice(output, &format!("command timed out after {budget:?}")),
            exit_code: TIMED_OUT,
        }
    }

    pub fn cancelled(output: String) -> Self {
        Self {
            output: with_notice(output, "command canceled"),
            exit_code: CANCELLED,
        }
    }
}

fn with_notice(mut output: String, notice: &str) -> String {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    output.push_str(notice);
    output
}

/// Result of trying to launch one program.
#[derive(Debug)]
pub enum Attempt {
    /// The program does not exist on this host
    NotFound(io::Error),
    /// The program exists but could not be started
    LaunchError(io::Error),
    /// The program started; this is how it ended
    Ran(Outcome),
}

/// Append-only buffer shared by the stdout and stderr readers.
#[derive(Debug, Clone, Default)]
struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    fn append(&self, bytes: &[u8]) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(bytes);
    }

    fn snapshot(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Copy `pipe` into the buffer chunk by chunk until EOF.
    fn drain_from<R>(&self, mut pipe: R) -> JoinHandle<io::Result<()>>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = self.clone();
        tokio::spawn(async move {
            let mut chunk = [0u8; READ_CHUNK];
            loop {
                let n = pipe.read(&mut chunk).await?;
                if n == 0 {
                    return Ok(());
                }
                buffer.append(&chunk[..n]);
            }
        })
    }
}

enum Finish {
    Exited(ExitStatus),
    WaitFailed(io::Error),
    TimedOut,
    Cancelled,
}

/// Spawn `command` and supervise it until it exits, the deadline passes, or `cancel` fires.
///
/// When `input` is given it is written to the child's stdin, which is then closed; otherwise
/// stdin is null.
pub async fn supervise(
    mut command: Command,
    input: Option<&str>,
    deadline: Deadline,
    cancel: &CancellationToken,
) -> Attempt {
    command
        .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    log::debug!("Spawning {:?}", command.as_std());
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Attempt::NotFound(e),
        Err(e) => return Attempt::LaunchError(e),
    };

    let capture = CaptureBuffer::default();
    let mut readers = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        readers.push(capture.drain_from(stdout));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(capture.drain_from(stderr));
    }

    let writer = match (input, child.stdin.take()) {
        (Some(text), Some(mut stdin)) => {
            let bytes = text.as_bytes().to_vec();
            Some(tokio::spawn(async move { stdin.write_all(&bytes).await }))
        }
        _ => None,
    };

    let finish = tokio::select! {
        biased;
        status = child.wait() => match status {
            Ok(status) => Finish::Exited(status),
            Err(e) => Finish::WaitFailed(e),
        },
        _ = tokio::time::sleep_until(deadline.at()) => Finish::TimedOut,
        _ = cancel.cancelled() => Finish::Cancelled,
    };

    let outcome = match finish {
        Finish::Exited(status) => {
            let mut io_error = finish_readers(&mut readers, deadline.at()).await;
            if let Some(handle) = writer
                && let Some(e) = stdin_error(handle).await
            {
                io_error.get_or_insert(e);
            }
            let output = capture.snapshot();
            match io_error {
                Some(e) => Outcome::failure(output, &e),
                None => Outcome::exited(output, exit_code_of(status)),
            }
        }
        Finish::WaitFailed(e) => {
            stop(&mut child, &mut readers, writer).await;
            Outcome::failure(capture.snapshot(), &e)
        }
        Finish::TimedOut => {
            log::warn!("Block exceeded its {:?} deadline; killing it", deadline.budget());
            stop(&mut child, &mut readers, writer).await;
            Outcome::timed_out(capture.snapshot(), deadline.budget())
        }
        Finish::Cancelled => {
            log::warn!("Block cancelled by caller; killing it");
            stop(&mut child, &mut readers, writer).await;
            Outcome::cancelled(capture.snapshot())
        }
    };

    Attempt::Ran(outcome)
}

/// Kill the child and give the readers a short grace period to pick up buffered output.
async fn stop(
    child: &mut tokio::process::Child,
    readers: &mut [JoinHandle<io::Result<()>>],
    writer: Option<JoinHandle<io::Result<()>>>,
) {
    if let Err(e) = child.kill().await {
        log::debug!("Failed to kill child: {e}");
    }
    if let Some(handle) = writer {
        handle.abort();
    }
    let _ = finish_readers(readers, Instant::now() + READER_GRACE).await;
}

/// Wait for every reader until `limit`; readers still running then are aborted.
/// Returns the first read error, if any.
async fn finish_readers(readers: &mut [JoinHandle<io::Result<()>>], limit: Instant) -> Option<io::Error> {
    let mut first_error = None;
    for handle in readers.iter_mut() {
        match tokio::time::timeout_at(limit, &mut *handle).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => {
                first_error.get_or_insert(e);
            }
            Ok(Err(join_err)) => {
                first_error.get_or_insert(io::Error::other(join_err));
            }
            Err(_) => handle.abort(),
        }
    }
    first_error
}

/// A stdin write failure, ignoring the child closing its end early.
async fn stdin_error(handle: JoinHandle<io::Result<()>>) -> Option<io::Error> {
    match handle.await {
        Ok(Ok(())) => None,
        Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => None,
        Ok(Err(e)) => Some(e),
        Err(join_err) => Some(io::Error::other(join_err)),
    }
}

#[cfg(unix)]
fn exit_code_of(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(FAILURE)
}

#[cfg(not(unix))]
fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(FAILURE)
}
