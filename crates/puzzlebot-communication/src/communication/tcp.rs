//! TCP line transport
//!
//! Provides the persistent connection to a TinyG controller behind a
//! serial-to-network bridge. One background task owns the read half and
//! feeds lines to the registered handler; the write half is shared behind
//! an async mutex so each frame goes out whole.

use super::{LineHandler, Transport};
use async_trait::async_trait;
use puzzlebot_core::{ConnectionError, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Where the controller's network bridge lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TcpConnectionInfo {
    /// Hostname or IP address
    pub host: String,
    /// TCP port
    pub port: u16,
    /// Connect timeout in milliseconds
    pub timeout_ms: u64,
}

impl TcpConnectionInfo {
    /// Create connection info with the default connect timeout
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reject parameters that can never connect
    pub fn validate(&self) -> std::result::Result<(), ConnectionError> {
        if self.host.trim().is_empty() {
            return Err(ConnectionError::InvalidParameters {
                reason: "host must not be empty".to_string(),
            });
        }
        if self.port == 0 {
            return Err(ConnectionError::InvalidParameters {
                reason: "port must be > 0".to_string(),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConnectionError::InvalidParameters {
                reason: "timeout must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for TcpConnectionInfo {
    fn default() -> Self {
        Self {
            host: "192.168.1.74".to_string(),
            port: 2000,
            timeout_ms: 5000,
        }
    }
}

/// Persistent TCP connection with a background line reader
pub struct TcpTransport {
    address: String,
    writer: Mutex<OwnedWriteHalf>,
    connected: Arc<AtomicBool>,
    reader: JoinHandle<()>,
}

impl TcpTransport {
    /// Connect and start delivering lines to `handler`
    pub async fn connect(info: &TcpConnectionInfo, handler: Arc<dyn LineHandler>) -> Result<Self> {
        info.validate()?;
        let address = info.address();

        let connect = TcpStream::connect(&address);
        let stream = match tokio::time::timeout(Duration::from_millis(info.timeout_ms), connect).await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                tracing::warn!("Failed to connect to {}: {}", address, e);
                return Err(ConnectionError::FailedToOpen {
                    address,
                    reason: e.to_string(),
                }
                .into());
            }
            Err(_) => {
                tracing::warn!("Timed out connecting to {}", address);
                return Err(ConnectionError::ConnectionTimeout {
                    timeout_ms: info.timeout_ms,
                }
                .into());
            }
        };

        // Frames are tiny and latency matters more than throughput
        stream.set_nodelay(true)?;

        let (read_half, write_half) = stream.into_split();
        let connected = Arc::new(AtomicBool::new(true));
        let reader = tokio::spawn(read_loop(
            BufReader::new(read_half),
            handler,
            connected.clone(),
        ));

        tracing::info!("Connected to motion controller at {}", address);

        Ok(Self {
            address,
            writer: Mutex::new(write_half),
            connected,
            reader,
        })
    }

    /// Peer address this transport is connected to
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Stop the background reader; later writes fail
    pub fn shutdown(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.reader.abort();
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn write_line(&self, line: &str) -> Result<()> {
        if !self.is_connected() {
            return Err(ConnectionError::ConnectionLost {
                reason: format!("transport to {} is closed", self.address),
            }
            .into());
        }

        let mut frame = String::with_capacity(line.len() + 1);
        frame.push_str(line);
        frame.push('\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| ConnectionError::IoError {
                reason: e.to_string(),
            })?;
        writer.flush().await.map_err(|e| ConnectionError::IoError {
            reason: e.to_string(),
        })?;

        tracing::trace!(line, "tx");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Deliver lines until the stream ends or fails
///
/// Blank lines are dropped. The loss is reported exactly once.
pub(crate) async fn read_loop<R>(reader: R, handler: Arc<dyn LineHandler>, connected: Arc<AtomicBool>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let error = loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                tracing::trace!(line, "rx");
                handler.on_line(line);
            }
            Ok(None) => {
                break ConnectionError::ConnectionLost {
                    reason: "connection closed by peer".to_string(),
                };
            }
            Err(e) => {
                break ConnectionError::ConnectionLost {
                    reason: e.to_string(),
                };
            }
        }
    };

    connected.store(false, Ordering::SeqCst);
    tracing::error!("Controller connection lost: {}", error);
    handler.on_connection_lost(error);
}
