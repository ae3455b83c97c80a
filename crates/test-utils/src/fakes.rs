use std::sync::{Arc, Mutex};

use petribot::bot::ReplySink;
use petribot::errors::{PetribotError, Result};
use petribot::exec::{OperationRunner, StatusEvent, StatusStream};
use petribot::services::{BoxFuture, CompletionClient, PageFetcher};

/// Records every reply in order.
#[derive(Clone, Default)]
pub struct RecordingSink {
    replies: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }
}

impl ReplySink for RecordingSink {
    fn reply<'a>(&'a mut self, text: String) -> BoxFuture<'a, Result<()>> {
        let replies = Arc::clone(&self.replies);
        Box::pin(async move {
            replies.lock().unwrap().push(text);
            Ok(())
        })
    }
}

/// Completion client that answers from a fixed result.
pub struct FakeCompletion {
    answer: std::result::Result<String, String>,
    prompts: Arc<Mutex<Vec<String>>>,
    missing_key: Option<String>,
}

impl FakeCompletion {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_string()),
            prompts: Arc::default(),
            missing_key: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            prompts: Arc::default(),
            missing_key: None,
        }
    }

    pub fn without_key(env_var: &str) -> Self {
        Self {
            answer: Err(String::new()),
            prompts: Arc::default(),
            missing_key: Some(env_var.to_string()),
        }
    }

    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

impl CompletionClient for FakeCompletion {
    fn complete<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(var) = &self.missing_key {
                return Err(PetribotError::MissingApiKey(var.clone()));
            }
            self.answer.clone().map_err(PetribotError::Upstream)
        })
    }
}

/// Page fetcher that returns a fixed body or error.
pub struct FakeFetcher {
    body: std::result::Result<String, String>,
}

impl FakeFetcher {
    pub fn returning(body: &str) -> Self {
        Self {
            body: Ok(body.to_string()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            body: Err(message.to_string()),
        }
    }
}

impl PageFetcher for FakeFetcher {
    fn fetch_text<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move { self.body.clone().map_err(PetribotError::Upstream) })
    }
}

/// Runner that replays a scripted event list and records operations.
pub struct ScriptedRunner {
    events: Vec<StatusEvent>,
    operations: Arc<Mutex<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn new(events: Vec<StatusEvent>) -> Self {
        Self {
            events,
            operations: Arc::default(),
        }
    }

    pub fn operations(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.operations)
    }
}

impl OperationRunner for ScriptedRunner {
    fn run_with_status(&self, operation: &str) -> StatusStream {
        self.operations.lock().unwrap().push(operation.to_string());
        StatusStream::from_events(self.events.clone())
    }
}
