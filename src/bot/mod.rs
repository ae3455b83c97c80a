// src/bot/mod.rs

//! Chat-facing layer: parse a message, call a collaborator, reply.
//!
//! - [`command`] parses text into a `BotCommand`.
//! - [`router`] dispatches commands and formats replies.
//! - [`text`] holds truncation helpers.
//! - [`console`] is a line-oriented stdin/stdout transport.

pub mod command;
pub mod console;
pub mod router;
pub mod text;

pub use command::BotCommand;
pub use router::{Router, format_execution_result};
pub use text::truncate_text;

use crate::errors::Result;
use crate::services::BoxFuture;

/// Where the router sends replies for one conversation.
pub trait ReplySink: Send {
    fn reply<'a>(&'a mut self, text: String) -> BoxFuture<'a, Result<()>>;
}
