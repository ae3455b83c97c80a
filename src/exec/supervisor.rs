// src/exec/supervisor.rs

//! Lifecycle of one external tool run.
//!
//! A single task per invocation races four things with `tokio::select!`:
//! natural completion (both pipes drained, exit status collected), the
//! deadline timer, the progress ticker and consumer abandonment. Whatever
//! path wins, the process is reaped before a result exists, and every fault
//! is folded into an [`ExecutionResult`] rather than returned as an error.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::time::{interval_at, sleep, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::SupervisorConfig;

use super::command::ToolCommand;
use super::invocation::{ExecutionResult, FailureKind, Invocation};
use super::status::{StatusReporter, StatusStream};
use super::terminate::terminate_and_reap;

/// Internal faults of a supervised run. None of these escape the
/// supervisor; they become abnormal results.
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("working directory '{}' does not exist or is not a directory", .0.display())]
    MissingWorkingDir(PathBuf),

    #[error("failed to launch '{tool}': {source}")]
    Launch {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {stream} of tool process: {source}")]
    Capture {
        stream: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for tool process: {0}")]
    Wait(#[source] io::Error),

    #[error("failed to terminate tool process: {0}")]
    Terminate(#[source] io::Error),
}

impl SupervisorError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            SupervisorError::Launch { source, .. }
                if matches!(
                    source.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
                ) =>
            {
                FailureKind::LaunchFailure
            }
            _ => FailureKind::UnexpectedFailure,
        }
    }

    /// Text placed on the result's stderr.
    pub fn diagnostic(&self) -> String {
        match self {
            SupervisorError::Launch { tool, source }
                if source.kind() == io::ErrorKind::NotFound =>
            {
                format!(
                    "'{tool}' was not found. Install it first, or point `cli_path` \
                     (PETRIBOT_CLI_PATH) at the executable."
                )
            }
            SupervisorError::Launch { tool, source }
                if source.kind() == io::ErrorKind::PermissionDenied =>
            {
                format!(
                    "'{tool}' could not be executed (permission denied). \
                     Check that the file is executable, or point `cli_path` elsewhere."
                )
            }
            other => other.to_string(),
        }
    }

    fn into_result(self, elapsed: Duration) -> ExecutionResult {
        ExecutionResult::abnormal(self.failure_kind(), self.diagnostic(), elapsed)
    }
}

/// How the race inside one run was decided.
enum Outcome {
    Exited(Result<(ExitStatus, Vec<u8>, Vec<u8>), SupervisorError>),
    DeadlineElapsed,
    Abandoned,
}

/// Runs the external tool under a deadline.
///
/// Cheap to clone; clones share nothing mutable, so any number of runs may
/// proceed concurrently, each with its own process and timer.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    tool: ToolCommand,
    work_dir: PathBuf,
    timeout: Duration,
    progress_interval: Duration,
    status_buffer: usize,
}

impl ProcessSupervisor {
    pub fn new(tool: ToolCommand, work_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        let defaults = SupervisorConfig::default();
        Self {
            tool,
            work_dir: work_dir.into(),
            timeout,
            progress_interval: defaults.progress_interval(),
            status_buffer: defaults.status_buffer,
        }
    }

    pub fn from_config(cfg: &SupervisorConfig) -> Self {
        Self {
            tool: ToolCommand::from_config(cfg),
            work_dir: cfg.work_dir.clone(),
            timeout: cfg.timeout(),
            progress_interval: cfg.progress_interval(),
            status_buffer: cfg.status_buffer,
        }
    }

    pub fn with_progress_interval(mut self, every: Duration) -> Self {
        self.progress_interval = every;
        self
    }

    pub fn with_status_buffer(mut self, capacity: usize) -> Self {
        self.status_buffer = capacity;
        self
    }

    /// Build an invocation using the configured working directory, and the
    /// configured timeout unless `deadline` is given.
    pub fn invocation(&self, operation: impl Into<String>, deadline: Option<Duration>) -> Invocation {
        Invocation::new(
            operation,
            self.work_dir.clone(),
            deadline.unwrap_or(self.timeout),
        )
    }

    /// Run to completion and return the terminal result.
    pub async fn execute(&self, invocation: Invocation) -> ExecutionResult {
        let reporter = StatusReporter::detached();
        supervise(&self.tool, invocation, self.progress_interval, &reporter).await
    }

    /// Start a run on a background task and return its status stream.
    ///
    /// Must be called from within a Tokio runtime. Dropping the stream
    /// before the `Result` event kills and reaps the process.
    pub fn execute_with_status(&self, invocation: Invocation) -> StatusStream {
        let (reporter, stream) = StatusStream::channel(self.status_buffer);
        reporter.queued();

        let tool = self.tool.clone();
        let progress_every = self.progress_interval;
        tokio::spawn(async move {
            let result = supervise(&tool, invocation, progress_every, &reporter).await;
            reporter.finish(result).await;
        });

        stream
    }
}

/// One complete run. Never fails; faults become abnormal results.
async fn supervise(
    tool: &ToolCommand,
    invocation: Invocation,
    progress_every: Duration,
    reporter: &StatusReporter,
) -> ExecutionResult {
    let started = Instant::now();
    reporter.status("initializing");

    match run(tool, &invocation, progress_every, reporter, started).await {
        Ok(result) => result,
        Err(err) => {
            error!(
                tool = %tool.program(),
                error = %err,
                "supervised run failed"
            );
            err.into_result(started.elapsed())
        }
    }
}

async fn run(
    tool: &ToolCommand,
    invocation: &Invocation,
    progress_every: Duration,
    reporter: &StatusReporter,
    started: Instant,
) -> Result<ExecutionResult, SupervisorError> {
    if !invocation.working_dir.is_dir() {
        return Err(SupervisorError::MissingWorkingDir(
            invocation.working_dir.clone(),
        ));
    }

    if reporter.is_abandoned() {
        info!(tool = %tool.program(), "caller abandoned run before launch; not spawning");
        return Ok(abandoned_result(started));
    }

    info!(
        tool = %tool.program(),
        operation = %invocation.operation,
        working_dir = %invocation.working_dir.display(),
        deadline_secs = invocation.deadline.as_secs_f64(),
        unattended = tool.is_unattended(),
        "launching tool process"
    );

    let mut child = tool
        .build(invocation)
        .spawn()
        .map_err(|source| SupervisorError::Launch {
            tool: tool.program().to_string(),
            source,
        })?;

    let pid = child.id();
    reporter.status(match pid {
        Some(pid) => format!("executing (pid {pid})"),
        None => "executing".to_string(),
    });

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let outcome = {
        let completion = wait_with_output(&mut child, stdout, stderr);
        tokio::pin!(completion);

        let deadline = sleep(invocation.deadline);
        tokio::pin!(deadline);

        let mut ticker = progress_ticker(started, progress_every);

        loop {
            tokio::select! {
                res = &mut completion => break Outcome::Exited(res),
                _ = &mut deadline => break Outcome::DeadlineElapsed,
                _ = reporter.abandoned() => break Outcome::Abandoned,
                _ = next_tick(&mut ticker) => {
                    reporter.progress(format!(
                        "still running ({}s elapsed)",
                        started.elapsed().as_secs()
                    ));
                }
            }
        }
    };

    match outcome {
        Outcome::Exited(Ok((status, out, err))) => {
            let result = ExecutionResult::from_exit(status, &out, &err, started.elapsed());
            info!(
                pid,
                exit_code = result.exit_code,
                success = result.succeeded,
                elapsed_ms = result.elapsed.as_millis() as u64,
                "tool process exited"
            );
            Ok(result)
        }
        Outcome::Exited(Err(capture_err)) => {
            warn!(pid, error = %capture_err, "output capture failed; killing tool process");
            terminate_and_reap(&mut child)
                .await
                .map_err(SupervisorError::Terminate)?;
            Err(capture_err)
        }
        Outcome::DeadlineElapsed => {
            warn!(
                pid,
                deadline_secs = invocation.deadline.as_secs_f64(),
                "deadline elapsed; killing tool process"
            );
            terminate_and_reap(&mut child)
                .await
                .map_err(SupervisorError::Terminate)?;
            Ok(ExecutionResult::timed_out(
                invocation.deadline,
                started.elapsed(),
            ))
        }
        Outcome::Abandoned => {
            info!(pid, "status stream dropped by caller; killing tool process");
            terminate_and_reap(&mut child)
                .await
                .map_err(SupervisorError::Terminate)?;
            Ok(abandoned_result(started))
        }
    }
}

/// Heartbeat timer, or `None` when the first tick would lie beyond what
/// `Instant` can represent.
fn progress_ticker(started: Instant, every: Duration) -> Option<Interval> {
    let period = every.max(Duration::from_millis(1));
    let Some(first) = started.checked_add(period) else {
        debug!(?period, "progress interval out of range; heartbeat disabled");
        return None;
    };
    let mut ticker = interval_at(first, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    Some(ticker)
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn abandoned_result(started: Instant) -> ExecutionResult {
    ExecutionResult::abnormal(
        FailureKind::UnexpectedFailure,
        "run abandoned by caller before completion",
        started.elapsed(),
    )
}

/// Drain both pipes concurrently, then collect the exit status.
async fn wait_with_output<O, E>(
    child: &mut Child,
    stdout: Option<O>,
    stderr: Option<E>,
) -> Result<(ExitStatus, Vec<u8>, Vec<u8>), SupervisorError>
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let (out, err) = tokio::try_join!(
        read_all(stdout, "stdout"),
        read_all(stderr, "stderr")
    )?;
    let status = child.wait().await.map_err(SupervisorError::Wait)?;
    debug!(
        stdout_bytes = out.len(),
        stderr_bytes = err.len(),
        "tool output captured"
    );
    Ok((status, out, err))
}

async fn read_all<R>(pipe: Option<R>, stream: &'static str) -> Result<Vec<u8>, SupervisorError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf)
            .await
            .map_err(|source| SupervisorError::Capture { stream, source })?;
    }
    Ok(buf)
}
