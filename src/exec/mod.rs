// src/exec/mod.rs

//! Supervised execution of the external tool.
//!
//! - [`invocation`] defines the request (`Invocation`) and the terminal
//!   outcome (`ExecutionResult`, `FailureKind`).
//! - [`command`] turns an invocation into an argv-based `tokio::process`
//!   command (no shell involved).
//! - [`status`] is the bounded channel carrying `StatusEvent`s from the
//!   supervisor task to the caller.
//! - [`supervisor`] owns the process lifecycle: launch, race against the
//!   deadline, capture, classify.
//! - [`terminate`] kills and reaps on the timeout and abandonment paths.
//! - [`backend`] provides the `OperationRunner` trait used by the router.

pub mod backend;
pub mod command;
pub mod invocation;
pub mod status;
pub mod supervisor;
pub mod terminate;

pub use backend::OperationRunner;
pub use command::ToolCommand;
pub use invocation::{ABNORMAL_EXIT_CODE, ExecutionResult, FailureKind, Invocation};
pub use status::{StatusEvent, StatusKind, StatusReporter, StatusStream};
pub use supervisor::{ProcessSupervisor, SupervisorError};
