//! Transport - one connection per flush
//!
//! The worker opens a connection, writes the batch payload and shuts the
//! write side down. Nothing is pooled or reused between flushes.

use std::io;

use tokio::io::AsyncWrite;
use tokio::net::TcpStream;
use tracing::{debug, instrument};

/// Connection factory for flushes
#[trait_variant::make(Transport: Send)]
pub trait LocalTransport {
    /// Writable stream for a single batch
    type Connection: AsyncWrite + Unpin + Send;

    /// Target address (used in errors and logs)
    fn endpoint(&self) -> &str;

    /// Open a fresh connection to the endpoint
    async fn connect(&self) -> io::Result<Self::Connection>;
}

/// TCP transport (`host:port`, resolved on every connect)
#[derive(Debug, Clone)]
pub struct TcpTransport {
    endpoint: String,
    nodelay: bool,
}

impl TcpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            nodelay: true,
        }
    }

    /// Toggle TCP_NODELAY on new connections (default on)
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }
}

impl Transport for TcpTransport {
    type Connection = TcpStream;

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[instrument(name = "tcp_transport_connect", skip(self), fields(endpoint = %self.endpoint))]
    async fn connect(&self) -> io::Result<TcpStream> {
        let stream = TcpStream::connect(self.endpoint.as_str()).await?;
        stream.set_nodelay(self.nodelay)?;
        debug!(
            endpoint = %self.endpoint,
            local = ?stream.local_addr().ok(),
            "Connected"
        );
        Ok(stream)
    }
}
