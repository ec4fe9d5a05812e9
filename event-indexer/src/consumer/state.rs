//! Consumer state of the ingestion loop.

use std::fmt;

/// Lifecycle state of one ingestion loop.
///
/// Transitions only move forward: `Running -> StopRequested -> Stopped`.
/// `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    /// Consuming messages from the queue.
    Running,
    /// A stop was requested or the queue closed; finishing up.
    StopRequested,
    /// The loop has exited and released the index connection.
    Stopped,
}

impl fmt::Display for ConsumerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::StopRequested => "stop_requested",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
