// src/exec/invocation.rs

//! Request and outcome types for one supervised tool run.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Exit code reported for every abnormal termination (timeout, launch
/// failure, signal death, unexpected fault).
pub const ABNORMAL_EXIT_CODE: i32 = -1;

/// One request to run the external tool.
///
/// `operation` is untrusted text. It is handed to the tool as a single
/// argument and never interpreted by a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub operation: String,
    pub working_dir: PathBuf,
    pub deadline: Duration,
}

impl Invocation {
    pub fn new(
        operation: impl Into<String>,
        working_dir: impl Into<PathBuf>,
        deadline: Duration,
    ) -> Self {
        Self {
            operation: operation.into(),
            working_dir: working_dir.into(),
            deadline,
        }
    }
}

/// Why a run did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The tool could not be started (missing binary, not executable).
    LaunchFailure,
    /// The deadline elapsed; the process was killed and reaped.
    Timeout,
    /// The process ran to completion with a non-zero status.
    NonZeroExit,
    /// Anything else: pipe errors, wait errors, bad working directory.
    UnexpectedFailure,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::LaunchFailure => "launch failure",
            FailureKind::Timeout => "timeout",
            FailureKind::NonZeroExit => "non-zero exit",
            FailureKind::UnexpectedFailure => "unexpected failure",
        };
        f.write_str(s)
    }
}

/// Terminal outcome of an [`Invocation`]. Exactly one is produced per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub succeeded: bool,
    pub failure: Option<FailureKind>,
    pub elapsed: Duration,
}

impl ExecutionResult {
    /// Build a result from a process that exited on its own.
    ///
    /// Output bytes are decoded lossily; invalid UTF-8 becomes U+FFFD.
    /// A process killed by a signal has no exit code and reports
    /// [`ABNORMAL_EXIT_CODE`].
    pub fn from_exit(
        status: ExitStatus,
        stdout: &[u8],
        stderr: &[u8],
        elapsed: Duration,
    ) -> Self {
        let exit_code = status.code().unwrap_or(ABNORMAL_EXIT_CODE);
        let succeeded = exit_code == 0;
        Self {
            stdout: decode_lossy(stdout),
            stderr: decode_lossy(stderr),
            exit_code,
            succeeded,
            failure: (!succeeded).then_some(FailureKind::NonZeroExit),
            elapsed,
        }
    }

    /// Build an abnormal result carrying only a diagnostic on stderr.
    pub fn abnormal(kind: FailureKind, message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            stdout: String::new(),
            stderr: message.into(),
            exit_code: ABNORMAL_EXIT_CODE,
            succeeded: false,
            failure: Some(kind),
            elapsed,
        }
    }

    pub fn timed_out(deadline: Duration, elapsed: Duration) -> Self {
        Self::abnormal(
            FailureKind::Timeout,
            format!(
                "operation timed out after {} seconds",
                format_seconds(deadline)
            ),
            elapsed,
        )
    }
}

pub(crate) fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Whole seconds when the duration is whole, otherwise one decimal.
pub(crate) fn format_seconds(d: Duration) -> String {
    if d.subsec_millis() == 0 {
        d.as_secs().to_string()
    } else {
        format!("{:.1}", d.as_secs_f64())
    }
}
