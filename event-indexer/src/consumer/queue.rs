//! Queue abstraction for the ingestion loop.
//!
//! The queue is owned by an external producer; the loop only reads from it. A
//! queue yields `None` once the producer has closed it and every buffered message
//! has been read.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

/// An ordered source of raw messages.
///
/// `next_message` must be cancel-safe: if the returned future is dropped before it
/// completes, no message may be lost.
#[async_trait]
pub trait MessageQueue: Send {
    /// Wait for the next message, or `None` once the queue is closed and drained.
    async fn next_message(&mut self) -> Option<String>;
}

#[async_trait]
impl MessageQueue for mpsc::Receiver<String> {
    async fn next_message(&mut self) -> Option<String> {
        self.recv().await
    }
}

#[async_trait]
impl MessageQueue for mpsc::UnboundedReceiver<String> {
    async fn next_message(&mut self) -> Option<String> {
        self.recv().await
    }
}

/// Adapter that lets any stream of strings act as a queue.
///
/// The stream must itself be cancel-safe (e.g. `tokio_stream::wrappers::ReceiverStream`).
#[derive(Debug)]
pub struct StreamQueue<S> {
    stream: S,
}

impl<S> StreamQueue<S> {
    /// Wrap a stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl<S> MessageQueue for StreamQueue<S>
where
    S: Stream<Item = String> + Unpin + Send,
{
    async fn next_message(&mut self) -> Option<String> {
        self.stream.next().await
    }
}
