// src/bot/console.rs

//! Line-oriented transport: one message per stdin line, replies on stdout.
//!
//! Each line is handled on its own Tokio task so a long-running operation
//! does not hold up later messages. On EOF the transport waits for in-flight
//! messages; on Ctrl-C it aborts them, which drops their status streams and
//! makes the supervisors kill their processes.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::errors::Result;
use crate::services::BoxFuture;

use super::ReplySink;
use super::router::Router;

/// Writes each reply as a block prefixed with the message number.
pub struct WriterSink<W> {
    writer: W,
    message_id: u64,
}

impl<W> WriterSink<W> {
    pub fn new(writer: W, message_id: u64) -> Self {
        Self { writer, message_id }
    }
}

impl<W> ReplySink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn reply<'a>(&'a mut self, text: String) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let block = format!("[{}] {}\n", self.message_id, text);
            self.writer.write_all(block.as_bytes()).await?;
            self.writer.flush().await?;
            Ok(())
        })
    }
}

/// Run the console loop until stdin closes or Ctrl-C.
pub async fn run(router: Arc<Router>) -> Result<()> {
    info!("console transport started; one message per line, Ctrl-D to quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();
    let mut next_id: u64 = 1;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed; waiting for in-flight messages");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                let id = next_id;
                next_id += 1;
                let router = Arc::clone(&router);
                in_flight.spawn(async move {
                    let mut sink = WriterSink::new(tokio::io::stdout(), id);
                    if let Err(e) = router.handle(&line, &mut sink).await {
                        error!(message_id = id, error = %e, "failed to deliver reply");
                    }
                });
            }
            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                if let Err(e) = joined {
                    error!(error = %e, "message task failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received; aborting in-flight messages");
                in_flight.abort_all();
                break;
            }
        }
    }

    while let Some(joined) = in_flight.join_next().await {
        if let Err(e) = joined {
            if !e.is_cancelled() {
                error!(error = %e, "message task failed");
            }
        }
    }

    info!("console transport finished");
    Ok(())
}

/// Handle a single message, writing replies to stdout.
pub async fn handle_once(router: &Router, message: &str) -> Result<()> {
    let mut sink = WriterSink::new(tokio::io::stdout(), 1);
    router.handle(message, &mut sink).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writer_sink_prefixes_message_id() {
        let mut buf: Vec<u8> = Vec::new();
        {
            let mut sink = WriterSink::new(&mut buf, 7);
            sink.reply("hello".to_string()).await.unwrap();
            sink.reply("world".to_string()).await.unwrap();
        }
        assert_eq!(String::from_utf8(buf).unwrap(), "[7] hello\n[7] world\n");
    }
}
