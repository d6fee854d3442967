//! Line-oriented transport to the motion controller
//!
//! The controller speaks newline-delimited text frames over one persistent
//! stream. Writes come from the owning controller; reads are delivered by a
//! single background task to one registered [`LineHandler`].

pub mod tcp;

use async_trait::async_trait;
use puzzlebot_core::{ConnectionError, Result};

pub use tcp::{TcpConnectionInfo, TcpTransport};

/// Outgoing half of a line transport
#[async_trait]
pub trait Transport: Send + Sync {
    /// Append a line terminator to `line`, write it and flush
    async fn write_line(&self, line: &str) -> Result<()>;

    /// Whether the background reader is still attached to the peer
    fn is_connected(&self) -> bool;
}

/// Receiver of incoming lines
///
/// Invoked from exactly one background task, one line at a time, in arrival
/// order. Implementations must not block for long; they run on the reader.
pub trait LineHandler: Send + Sync {
    /// A non-blank, trimmed line arrived
    fn on_line(&self, line: &str);

    /// The reader stopped because the peer closed or the stream failed
    fn on_connection_lost(&self, error: ConnectionError);
}
