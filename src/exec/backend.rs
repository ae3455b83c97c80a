// src/exec/backend.rs

//! Pluggable runner abstraction.
//!
//! The command router talks to an `OperationRunner` instead of a concrete
//! supervisor, so tests can swap in a runner that replays canned status
//! events without spawning processes. [`ProcessSupervisor`] is the production
//! implementation.

use super::status::StatusStream;
use super::supervisor::ProcessSupervisor;

/// Something that can run an operation and report progress on a stream.
pub trait OperationRunner: Send + Sync {
    /// Start running `operation` with the runner's default working directory
    /// and deadline. Each call is an independent run.
    fn run_with_status(&self, operation: &str) -> StatusStream;
}

impl OperationRunner for ProcessSupervisor {
    fn run_with_status(&self, operation: &str) -> StatusStream {
        self.execute_with_status(self.invocation(operation, None))
    }
}
