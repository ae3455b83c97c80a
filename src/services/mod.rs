// src/services/mod.rs

//! External collaborators called by the command router.
//!
//! Each collaborator sits behind a small trait so the router can be driven
//! by fakes in tests:
//! - [`completion`]: remote chat-completion API (`CompletionClient`).
//! - [`fetcher`]: fetch a URL and reduce the HTML to text (`PageFetcher`).
//!
//! The external tool runner lives in [`crate::exec`].

use std::future::Future;
use std::pin::Pin;

pub mod completion;
pub mod fetcher;

pub use completion::{CompletionClient, HttpCompletionClient};
pub use fetcher::{HttpPageFetcher, PageFetcher, html_to_text};

/// Boxed, sendable future returned by collaborator traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
