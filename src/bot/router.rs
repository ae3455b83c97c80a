// src/bot/router.rs

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::{PetribotError, Result};
use crate::exec::{ExecutionResult, FailureKind, OperationRunner, StatusEvent};
use crate::services::{CompletionClient, PageFetcher};

use super::ReplySink;
use super::command::BotCommand;
use super::text::truncate_text;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Available commands:

/start - start the bot
/help - show this help
/info - show bot information
/fetch <url> - fetch the text content of a web page
/deepseek <question> - ask the chat-completion model
/claude <operation> - run an operation with the local AI tool

Compatibility aliases:
/ask <question> - same as /deepseek
/computer <operation> - same as /claude

Any other message is echoed back.";

/// Dispatches parsed commands to collaborators and formats the replies.
pub struct Router {
    completion: Arc<dyn CompletionClient>,
    fetcher: Arc<dyn PageFetcher>,
    runner: Arc<dyn OperationRunner>,
    reply_limit: usize,
}

impl Router {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        fetcher: Arc<dyn PageFetcher>,
        runner: Arc<dyn OperationRunner>,
        reply_limit: usize,
    ) -> Self {
        Self {
            completion,
            fetcher,
            runner,
            reply_limit,
        }
    }

    /// Handle one incoming message.
    ///
    /// Collaborator failures become replies; only a failing sink is an error.
    pub async fn handle(&self, text: &str, sink: &mut dyn ReplySink) -> Result<()> {
        let command = BotCommand::parse(text);
        debug!(?command, "routing message");

        match command {
            BotCommand::Start => {
                sink.reply(
                    "Hello! 👋\n\n\
                     I'm PetriCode bot. I can help you with:\n\
                     • Message interaction\n\
                     • External information retrieval\n\
                     • Running operations with a local AI tool\n\n\
                     Use /help to see available commands."
                        .to_string(),
                )
                .await
            }
            BotCommand::Help => sink.reply(HELP_TEXT.to_string()).await,
            BotCommand::Info => {
                sink.reply(format!(
                    "🤖 PetriCode Bot v{VERSION}\n\n\
                     A chat bot for message interaction, external information \
                     retrieval and supervised local operations."
                ))
                .await
            }
            BotCommand::Fetch(None) => {
                sink.reply("Please provide a URL.\nUsage: /fetch <url>".to_string())
                    .await
            }
            BotCommand::Fetch(Some(url)) => self.fetch(&url, sink).await,
            BotCommand::Ask(None) => {
                sink.reply("Please provide a question.\nUsage: /deepseek <question>".to_string())
                    .await
            }
            BotCommand::Ask(Some(question)) => self.ask(&question, sink).await,
            BotCommand::Operate(None) => {
                sink.reply(
                    "Please describe the operation.\nUsage: /claude <operation>".to_string(),
                )
                .await
            }
            BotCommand::Operate(Some(operation)) => self.operate(&operation, sink).await,
            BotCommand::Unknown(name) => {
                sink.reply(format!("Unknown command: /{name}\nUse /help to see available commands."))
                    .await
            }
            BotCommand::Echo(text) => sink.reply(format!("You said: {text}")).await,
        }
    }

    async fn fetch(&self, url: &str, sink: &mut dyn ReplySink) -> Result<()> {
        sink.reply(format!("Fetching content from: {url}\n\nPlease wait..."))
            .await?;

        match self.fetcher.fetch_text(url).await {
            Ok(content) => {
                let content = truncate_text(&content, self.reply_limit);
                sink.reply(format!("Content:\n\n{content}")).await
            }
            Err(e) => {
                warn!(url, error = %e, "fetch failed");
                sink.reply(format!("Error fetching URL: {e}")).await
            }
        }
    }

    async fn ask(&self, question: &str, sink: &mut dyn ReplySink) -> Result<()> {
        sink.reply("Thinking...".to_string()).await?;

        match self.completion.complete(question).await {
            Ok(answer) => sink.reply(truncate_text(&answer, self.reply_limit)).await,
            Err(PetribotError::MissingApiKey(var)) => {
                sink.reply(format!(
                    "The chat-completion service is not configured: set {var} and restart."
                ))
                .await
            }
            Err(e) => {
                warn!(error = %e, "completion failed");
                sink.reply(format!("Error querying the model: {e}")).await
            }
        }
    }

    /// Relay status events as they arrive, then the formatted result.
    async fn operate(&self, operation: &str, sink: &mut dyn ReplySink) -> Result<()> {
        let mut stream = self.runner.run_with_status(operation);

        while let Some(event) = stream.next().await {
            match event {
                StatusEvent::Queued => {
                    sink.reply(format!("Queued operation: {operation}")).await?;
                }
                StatusEvent::Status(msg) => sink.reply(format!("Status: {msg}")).await?,
                StatusEvent::Progress(msg) => sink.reply(format!("Progress: {msg}")).await?,
                StatusEvent::Result(result) => {
                    info!(
                        exit_code = result.exit_code,
                        success = result.succeeded,
                        "operation finished"
                    );
                    let reply = format_execution_result(&result);
                    return sink.reply(truncate_text(&reply, self.reply_limit)).await;
                }
            }
        }

        warn!("status stream ended without a result");
        sink.reply("The operation ended without reporting a result.".to_string())
            .await
    }
}

/// User-facing text for a finished run.
///
/// Distinguishes a missing tool (install guidance), a timeout (narrow the
/// operation) and a run that failed (show what it printed).
pub fn format_execution_result(result: &ExecutionResult) -> String {
    match result.failure {
        None => {
            let stdout = result.stdout.trim_end();
            if stdout.is_empty() {
                "Operation completed (no output).".to_string()
            } else {
                format!("Operation completed:\n\n{stdout}")
            }
        }
        Some(FailureKind::LaunchFailure) => format!(
            "The local AI tool is not available.\n\n{}",
            result.stderr.trim_end()
        ),
        Some(FailureKind::Timeout) => format!(
            "The {}. Try a narrower, more specific operation.",
            result.stderr.trim_end()
        ),
        Some(FailureKind::NonZeroExit) => {
            let mut out = format!("Operation failed (exit code {}).", result.exit_code);
            let stderr = result.stderr.trim_end();
            let stdout = result.stdout.trim_end();
            if !stderr.is_empty() {
                out.push_str("\n\nError output:\n");
                out.push_str(stderr);
            }
            if !stdout.is_empty() {
                out.push_str("\n\nOutput:\n");
                out.push_str(stdout);
            }
            out
        }
        Some(FailureKind::UnexpectedFailure) => format!(
            "The operation could not be completed:\n{}",
            result.stderr.trim_end()
        ),
    }
}
