// src/exec/status.rs

//! Ordered status events for one supervised run.
//!
//! The supervisor task holds a [`StatusReporter`]; the caller holds the
//! matching [`StatusStream`]. They are the two ends of a bounded mpsc
//! channel:
//!
//! - advisory events (`Queued`, `Status`, `Progress`) are sent with
//!   `try_send` and dropped when the consumer falls behind,
//! - the terminal `Result` is sent with an awaited `send` and is never
//!   dropped while the stream is alive,
//! - `StatusReporter::finish` consumes the reporter, so nothing can be sent
//!   after the result,
//! - dropping the `StatusStream` closes the channel, which the supervisor
//!   treats as abandonment and answers by killing the process.

use std::fmt;

use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::debug;

use super::invocation::ExecutionResult;

/// Discriminant of a [`StatusEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Queued,
    Status,
    Progress,
    Result,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusKind::Queued => "queued",
            StatusKind::Status => "status",
            StatusKind::Progress => "progress",
            StatusKind::Result => "result",
        };
        f.write_str(s)
    }
}

/// One advisory or terminal update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Queued,
    Status(String),
    Progress(String),
    Result(ExecutionResult),
}

impl StatusEvent {
    pub fn kind(&self) -> StatusKind {
        match self {
            StatusEvent::Queued => StatusKind::Queued,
            StatusEvent::Status(_) => StatusKind::Status,
            StatusEvent::Progress(_) => StatusKind::Progress,
            StatusEvent::Result(_) => StatusKind::Result,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            StatusEvent::Status(m) | StatusEvent::Progress(m) => Some(m),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&ExecutionResult> {
        match self {
            StatusEvent::Result(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StatusEvent::Result(_))
    }
}

/// Consumer end: a pull-based, finite sequence of [`StatusEvent`]s.
#[derive(Debug)]
pub struct StatusStream {
    rx: mpsc::Receiver<StatusEvent>,
    finished: bool,
}

impl StatusStream {
    /// Create a connected reporter/stream pair with the given buffer size.
    pub fn channel(capacity: usize) -> (StatusReporter, StatusStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            StatusReporter { tx: Some(tx) },
            StatusStream {
                rx,
                finished: false,
            },
        )
    }

    /// A stream that replays a fixed list of events and then ends.
    ///
    /// Used by fake runners in tests and by callers that already hold a
    /// result.
    pub fn from_events(events: Vec<StatusEvent>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            if let Err(err) = tx.try_send(event) {
                debug!(kind = %err.into_inner().kind(), "replayed event did not fit; dropping");
            }
        }
        StatusStream {
            rx,
            finished: false,
        }
    }

    /// Pull the next event.
    ///
    /// Returns `None` after the `Result` event, or if the producer went away
    /// without sending one.
    pub async fn next(&mut self) -> Option<StatusEvent> {
        if self.finished {
            return None;
        }
        let event = self.rx.recv().await;
        match &event {
            Some(e) if e.is_terminal() => {
                self.finished = true;
                self.rx.close();
            }
            None => self.finished = true,
            _ => {}
        }
        event
    }

    /// Drain advisory events and return the terminal result.
    pub async fn collect_result(mut self) -> Option<ExecutionResult> {
        while let Some(event) = self.next().await {
            if let StatusEvent::Result(result) = event {
                return Some(result);
            }
        }
        None
    }
}

/// Producer end, owned by the supervisor task.
///
/// A detached reporter has no consumer: advisory events go nowhere and
/// abandonment never fires.
#[derive(Debug)]
pub struct StatusReporter {
    tx: Option<mpsc::Sender<StatusEvent>>,
}

impl StatusReporter {
    pub fn detached() -> Self {
        Self { tx: None }
    }

    pub fn queued(&self) {
        self.advise(StatusEvent::Queued);
    }

    pub fn status(&self, message: impl Into<String>) {
        self.advise(StatusEvent::Status(message.into()));
    }

    pub fn progress(&self, message: impl Into<String>) {
        self.advise(StatusEvent::Progress(message.into()));
    }

    /// True once the consumer has dropped its stream.
    pub fn is_abandoned(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| tx.is_closed())
    }

    /// Resolves when the consumer drops its stream; never resolves for a
    /// detached reporter.
    pub async fn abandoned(&self) {
        match &self.tx {
            Some(tx) => tx.closed().await,
            None => std::future::pending().await,
        }
    }

    /// Deliver the terminal result and close the channel.
    ///
    /// Waits for buffer space rather than dropping the result.
    pub async fn finish(self, result: ExecutionResult) {
        if let Some(tx) = self.tx {
            if tx.send(StatusEvent::Result(result)).await.is_err() {
                debug!("status consumer gone before result delivery");
            }
        }
    }

    fn advise(&self, event: StatusEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                debug!(kind = %event.kind(), "status buffer full; dropping advisory event");
            }
            Err(TrySendError::Closed(_)) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::exec::invocation::FailureKind;

    fn sample_result() -> ExecutionResult {
        ExecutionResult::abnormal(FailureKind::UnexpectedFailure, "x", Duration::ZERO)
    }

    #[tokio::test]
    async fn stream_ends_after_result() {
        let (reporter, mut stream) = StatusStream::channel(4);
        reporter.queued();
        reporter.status("initializing");
        reporter.finish(sample_result()).await;

        assert_eq!(stream.next().await, Some(StatusEvent::Queued));
        assert_eq!(
            stream.next().await.map(|e| e.kind()),
            Some(StatusKind::Status)
        );
        assert_eq!(
            stream.next().await.map(|e| e.kind()),
            Some(StatusKind::Result)
        );
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn full_buffer_drops_advisory_but_keeps_result() {
        let (reporter, stream) = StatusStream::channel(1);
        reporter.queued();
        reporter.status("dropped");
        reporter.progress("dropped too");

        let finisher = tokio::spawn(reporter.finish(sample_result()));
        let events = {
            let mut stream = stream;
            let mut out = Vec::new();
            while let Some(e) = stream.next().await {
                out.push(e.kind());
            }
            out
        };
        finisher.await.unwrap();

        assert_eq!(events, vec![StatusKind::Queued, StatusKind::Result]);
    }

    #[tokio::test]
    async fn dropping_stream_signals_abandonment() {
        let (reporter, stream) = StatusStream::channel(2);
        assert!(!reporter.is_abandoned());
        drop(stream);
        tokio::time::timeout(Duration::from_secs(1), reporter.abandoned())
            .await
            .expect("abandonment should be observed");
        assert!(reporter.is_abandoned());
    }

    #[tokio::test]
    async fn detached_reporter_never_abandons() {
        let reporter = StatusReporter::detached();
        reporter.status("ignored");
        let waited =
            tokio::time::timeout(Duration::from_millis(50), reporter.abandoned()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn replayed_stream_yields_result() {
        let stream = StatusStream::from_events(vec![
            StatusEvent::Queued,
            StatusEvent::Result(sample_result()),
        ]);
        let result = stream.collect_result().await.expect("result");
        assert_eq!(result.failure, Some(FailureKind::UnexpectedFailure));
    }
}
