//! TCP line source for the SBS-1 feed.
//!
//! Received byte chunks are split on newlines; a partial trailing fragment is
//! retained and prefixed onto the next chunk, so a line split across two
//! reads is never dropped. The fragment is capped so a peer that never sends
//! a newline cannot grow it without bound.

use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{info, warn};

/// Longest partial line carried between reads. A well-formed feed line is
/// a few hundred bytes at most; anything past this is a runaway peer.
const MAX_FRAGMENT_LEN: usize = 8 * 1024;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("connection to {addr} refused: {source}")]
    ConnectionRefused {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no data received for {}s, closing the connection", .0.as_secs())]
    StreamTimeout(Duration),
    #[error("feed closed the connection")]
    StreamClosed,
    #[error("feed read failed: {0}")]
    Read(#[from] std::io::Error),
}

/// Restartable-per-connection source of raw feed lines.
pub struct FeedReader<R> {
    stream: R,
    idle_timeout: Duration,
    residual: Vec<u8>,
}

impl FeedReader<TcpStream> {
    pub async fn connect(
        host: &str,
        port: u16,
        idle_timeout: Duration,
    ) -> Result<Self, FeedError> {
        let addr = format!("{}:{}", host, port);
        let stream = TcpStream::connect(&addr).await.map_err(|source| {
            FeedError::ConnectionRefused {
                addr: addr.clone(),
                source,
            }
        })?;
        info!("Connected to feed at {}", addr);
        Ok(Self::new(stream, idle_timeout))
    }
}

impl<R: AsyncRead + Unpin> FeedReader<R> {
    pub fn new(stream: R, idle_timeout: Duration) -> Self {
        Self {
            stream,
            idle_timeout,
            residual: Vec::new(),
        }
    }

    /// All complete lines produced by one socket read; one call is one read
    /// cycle. May be empty when a read ends mid-line.
    ///
    /// Fails with `StreamTimeout` when no bytes arrive within the idle
    /// window, and `StreamClosed` on a zero-length read.
    pub async fn read_chunk(&mut self) -> Result<Vec<String>, FeedError> {
        let mut buf = [0u8; 4096];
        let n = timeout(self.idle_timeout, self.stream.read(&mut buf))
            .await
            .map_err(|_| FeedError::StreamTimeout(self.idle_timeout))??;
        if n == 0 {
            return Err(FeedError::StreamClosed);
        }
        self.residual.extend_from_slice(&buf[..n]);

        let mut lines = Vec::new();
        while let Some(pos) = self.residual.iter().position(|&b| b == b'\n') {
            let mut raw: Vec<u8> = self.residual.drain(..=pos).collect();
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            // Invalid UTF-8 is replaced rather than dropped, matching the
            // feed's lossy decode contract
            let line = String::from_utf8_lossy(&raw).into_owned();
            if !line.is_empty() {
                lines.push(line);
            }
        }
        if self.residual.len() > MAX_FRAGMENT_LEN {
            warn!(
                "Dropping {} byte fragment with no line terminator",
                self.residual.len()
            );
            self.residual.clear();
        }
        Ok(lines)
    }
}
