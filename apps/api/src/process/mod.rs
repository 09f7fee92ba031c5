//! External process invocation. The one place Kaam spawns OS processes.
//!
//! Both engines (the resume scorer and the document text extractor) follow the
//! same contract: the payload is passed as the final command-line argument,
//! stdin is closed, stdout and stderr are drained concurrently for the whole
//! life of the process, and the exit code decides success. The wrappers in
//! `scorer` and `extractor` only differ in how they serialize the payload and
//! parse stdout.

use std::borrow::Cow;
use std::process::Stdio;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::ProcessConfig;

pub mod extractor;
pub mod scorer;

/// How much of stderr is kept in logs on failure.
const STDERR_LOG_TAIL_BYTES: usize = 4096;
const READ_CHUNK_BYTES: usize = 8192;
/// How long to keep reading the pipes once the child has exited.
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit. `stderr` is kept for diagnosis but is not part of the
    /// display message.
    #[error("process exited with code {code:?}")]
    Exit { code: Option<i32>, stderr: String },

    #[error("invalid output format: {0}")]
    OutputFormat(String),

    /// The request payload could not be encoded; nothing was launched.
    #[error("could not serialize request payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("process timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to read process output: {0}")]
    Io(#[from] std::io::Error),
}

/// One run of an external process. Buffers fill as the child writes.
#[derive(Debug)]
pub struct ProcessInvocation {
    pub id: Uuid,
    pub program: String,
    pub arguments: Vec<String>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
}

impl ProcessInvocation {
    pub fn new(program: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            program: program.into(),
            arguments,
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: None,
        }
    }

    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    /// Runs the process to completion. Returns the populated invocation only
    /// when the process exits with code 0.
    ///
    /// Completion is the child's exit. After it, output still buffered in the
    /// pipes is read for at most `PIPE_DRAIN_GRACE`; anything a leftover
    /// descendant writes later is dropped. Only the direct child is killed on
    /// timeout, so descendants it started in the background may outlive it.
    pub async fn run(mut self, timeout: Option<Duration>) -> Result<Self, InvokeError> {
        info!(
            invocation_id = %self.id,
            program = %self.program,
            arg_count = self.arguments.len(),
            "Spawning external process"
        );
        let started = Instant::now();

        let mut child = Command::new(&self.program)
            .args(&self.arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                error!(invocation_id = %self.id, program = %self.program, error = %source, "Process launch failed");
                InvokeError::Launch {
                    program: self.program.clone(),
                    source,
                }
            })?;

        let stdout_pipe = child.stdout.take();
        let stderr_pipe = child.stderr.take();
        let (stdout_buf, stderr_buf) = (&mut self.stdout, &mut self.stderr);
        let (invocation_id, program) = (self.id, &self.program);

        let drain = async {
            let pipes = async {
                tokio::try_join!(
                    drain_into(stdout_pipe, stdout_buf),
                    drain_into(stderr_pipe, stderr_buf),
                )
                .map(|_| ())
            };
            tokio::pin!(pipes);
            let wait = child.wait();
            tokio::pin!(wait);

            tokio::select! {
                drained = &mut pipes => {
                    drained?;
                    wait.await
                }
                status = &mut wait => {
                    let status = status?;
                    // A descendant may still hold the pipes open after the child exits.
                    match tokio::time::timeout(PIPE_DRAIN_GRACE, &mut pipes).await {
                        Ok(drained) => drained?,
                        Err(_) => warn!(
                            %invocation_id,
                            %program,
                            "Process exited but its output pipes stayed open, keeping what was read"
                        ),
                    }
                    Ok::<_, std::io::Error>(status)
                }
            }
        };

        let outcome = match timeout {
            Some(limit) => tokio::time::timeout(limit, drain).await.ok(),
            None => Some(drain.await),
        };

        let status = match outcome {
            Some(result) => result?,
            None => {
                let limit = timeout.unwrap_or_default();
                warn!(
                    invocation_id = %self.id,
                    program = %self.program,
                    timeout_ms = limit.as_millis() as u64,
                    stdout_bytes = self.stdout.len(),
                    "Process exceeded its time limit, killing it"
                );
                if let Err(e) = child.kill().await {
                    warn!(invocation_id = %self.id, error = %e, "Failed to kill timed-out process");
                }
                return Err(InvokeError::Timeout(limit));
            }
        };

        self.exit_code = status.code();
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if !status.success() {
            let stderr = self.stderr_text().into_owned();
            error!(
                invocation_id = %self.id,
                program = %self.program,
                exit_code = ?self.exit_code,
                elapsed_ms,
                stderr = %tail(&stderr, STDERR_LOG_TAIL_BYTES),
                "External process failed"
            );
            return Err(InvokeError::Exit {
                code: self.exit_code,
                stderr,
            });
        }

        if !self.stderr.is_empty() {
            debug!(
                invocation_id = %self.id,
                stderr = %tail(&self.stderr_text(), STDERR_LOG_TAIL_BYTES),
                "External process wrote to stderr"
            );
        }
        info!(
            invocation_id = %self.id,
            program = %self.program,
            elapsed_ms,
            stdout_bytes = self.stdout.len(),
            stderr_bytes = self.stderr.len(),
            "External process completed"
        );

        Ok(self)
    }
}

/// Launches the configured engine with `payload` as its last argument.
pub async fn invoke(config: &ProcessConfig, payload: String) -> Result<ProcessInvocation, InvokeError> {
    ProcessInvocation::new(config.program.display().to_string(), config.arguments(payload))
        .run(config.timeout)
        .await
}

async fn drain_into<R>(pipe: Option<R>, buf: &mut Vec<u8>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return Ok(());
    };
    let mut chunk = [0u8; READ_CHUNK_BYTES];
    loop {
        let n = pipe.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Last `max` bytes of `text`, cut on a char boundary.
fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}
