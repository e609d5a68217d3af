//! In-memory transport for worker and client tests

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::{TimeZone, Utc};
use contracts::SimpleMetric;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;

use crate::transport::Transport;

/// How a `MemoryTransport` misbehaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    Healthy,
    Refuse,
    /// connect never completes
    Stall,
    Write,
    Shutdown,
}

/// Delivers each connection's bytes as one payload when it is shut down
#[derive(Debug, Clone)]
pub(crate) struct MemoryTransport {
    payloads: mpsc::UnboundedSender<String>,
    fault: Fault,
}

impl MemoryTransport {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (payloads, rx) = mpsc::unbounded_channel();
        (
            Self {
                payloads,
                fault: Fault::Healthy,
            },
            rx,
        )
    }

    fn with_fault(fault: Fault) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (mut transport, rx) = Self::new();
        transport.fault = fault;
        (transport, rx)
    }

    /// Every connect fails with ConnectionRefused
    pub(crate) fn refusing() -> (Self, mpsc::UnboundedReceiver<String>) {
        Self::with_fault(Fault::Refuse)
    }

    /// Every connect hangs until the flush is abandoned
    pub(crate) fn stalled() -> (Self, mpsc::UnboundedReceiver<String>) {
        Self::with_fault(Fault::Stall)
    }

    /// Writes fail with BrokenPipe; shutdown still delivers what was buffered
    pub(crate) fn failing_writes() -> (Self, mpsc::UnboundedReceiver<String>) {
        Self::with_fault(Fault::Write)
    }

    /// Shutdown delivers the payload, then fails
    pub(crate) fn failing_shutdown() -> (Self, mpsc::UnboundedReceiver<String>) {
        Self::with_fault(Fault::Shutdown)
    }
}

pub(crate) struct MemoryConnection {
    buf: Vec<u8>,
    payloads: mpsc::UnboundedSender<String>,
    fault: Fault,
}

impl AsyncWrite for MemoryConnection {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.fault == Fault::Write {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "broken pipe",
            )));
        }
        self.buf.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let payload = String::from_utf8_lossy(&std::mem::take(&mut self.buf)).into_owned();
        let _ = self.payloads.send(payload);
        if self.fault == Fault::Shutdown {
            return Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "connection reset",
            )));
        }
        Poll::Ready(Ok(()))
    }
}

impl Transport for MemoryTransport {
    type Connection = MemoryConnection;

    fn endpoint(&self) -> &str {
        "memory:0"
    }

    async fn connect(&self) -> io::Result<MemoryConnection> {
        match self.fault {
            Fault::Refuse => {
                return Err(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))
            }
            Fault::Stall => std::future::pending::<()>().await,
            _ => {}
        }
        Ok(MemoryConnection {
            buf: Vec::new(),
            payloads: self.payloads.clone(),
            fault: self.fault,
        })
    }
}

/// `m v=<n>i <n>000000000`
pub(crate) fn sample(n: i64) -> SimpleMetric {
    SimpleMetric::new("m")
        .with_time(Utc.timestamp_opt(n, 0).unwrap())
        .with_field("v", n)
}

pub(crate) fn sample_line(n: i64) -> String {
    format!("m v={n}i {n}000000000\n")
}
