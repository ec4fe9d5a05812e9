//! Event Indexer Main Entry Point
//!
//! Reads tracking event messages from stdin, one JSON object per line, and
//! indexes them into OpenSearch. Ctrl-C stops the indexer; end of input lets it
//! drain the queue and exit.

use dotenv::dotenv;
use event_indexer::{Dependencies, IndexingError};
use std::env;
use std::io::{self, BufRead};
use std::thread;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() -> Result<(), IndexingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("event_indexer=info,event_indexer_repository=info"));

    let json_output = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_output {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()
            .map_err(|e| IndexingError::config(e.to_string()))?;

        info!(
            service_name = "event-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true).pretty())
            .try_init()
            .map_err(|e| IndexingError::config(e.to_string()))?;

        info!(
            service_name = "event-indexer",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }

    Ok(())
}

/// Forward non-empty lines from `reader` into the queue until end of input.
///
/// Blocks the calling thread. Returns early once the queue receiver is gone.
fn forward_lines<R: BufRead>(reader: R, sender: mpsc::Sender<String>) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "Failed to read input, closing queue");
                return;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if sender.blocking_send(line.to_string()).is_err() {
            debug!("Queue receiver dropped, no longer reading input");
            return;
        }
    }

    info!("End of input reached, closing queue");
}

/// Read stdin on its own thread.
///
/// The thread is never joined: a read blocked on an open stdin must not keep the
/// process alive after shutdown.
fn spawn_stdin_reader(sender: mpsc::Sender<String>) -> Result<(), IndexingError> {
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || forward_lines(io::stdin().lock(), sender))
        .map(|_| ())
        .map_err(|e| IndexingError::init(format!("Failed to spawn stdin reader: {}", e)))
}

#[tokio::main]
async fn main() -> Result<(), IndexingError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing()?;

    info!("Starting Event Indexer");

    let mut deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let (sender, receiver) = mpsc::channel(deps.config.queue_capacity);
    spawn_stdin_reader(sender)?;

    deps.orchestrator.start(receiver)?;

    let result = deps.orchestrator.run_until(tokio::signal::ctrl_c()).await;

    let stats = deps.orchestrator.stats();
    match result {
        Ok(()) => {
            info!(
                received = stats.received,
                submitted = stats.submitted,
                decode_failures = stats.decode_failures,
                submit_failures = stats.submit_failures,
                "Event indexer completed successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Event indexer failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tokio::sync::mpsc::error::TryRecvError;

    #[test]
    fn test_forward_lines_skips_blank_lines_and_closes_queue() {
        let (sender, mut receiver) = mpsc::channel(8);

        forward_lines(Cursor::new("{\"event\":\"a\"}\n\n   \n  {\"event\":\"b\"}  \n"), sender);

        assert_eq!(receiver.try_recv().unwrap(), r#"{"event":"a"}"#);
        assert_eq!(receiver.try_recv().unwrap(), r#"{"event":"b"}"#);
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_forward_lines_returns_when_receiver_is_gone() {
        let (sender, receiver) = mpsc::channel(1);
        drop(receiver);

        forward_lines(Cursor::new("a\nb\nc\n"), sender);
    }
}
