//! # Dispatcher
//!
//! Batching metric client.
//!
//! Responsibilities:
//! - Accept records from any number of producers through a bounded queue
//! - Group them into batches by size and by time
//! - Ship each batch over a fresh connection as line protocol
//! - Report transport and encoding failures without blocking producers
//!
//! # Example
//!
//! ```no_run
//! use dispatcher::{CancellationToken, Client, SenderConfig, SimpleMetric};
//!
//! # async fn run() -> Result<(), dispatcher::DispatchError> {
//! let config = SenderConfig::new("localhost:8094").with_batch_size(100);
//! let client = Client::new(config, CancellationToken::new())?;
//!
//! client
//!     .send(SimpleMetric::new("cpu").with_tag("host", "a").with_field("usage", 0.5))
//!     .await;
//! client.close().await;
//! # Ok(())
//! # }
//! ```

mod batch;
mod client;
mod error;
mod policy;
mod stats;
mod transport;
mod worker;

#[cfg(test)]
mod testing;

pub use batch::BatchBuffer;
pub use client::{Client, ClientBuilder};
pub use error::DispatchError;
pub use policy::{should_arm_timer, should_flush_now, FlushPolicy, FlushTrigger};
pub use stats::{DispatchStats, StatsSnapshot};
pub use transport::{LocalTransport, TcpTransport, Transport};
pub use worker::{BoxedMetric, ErrorListener};

pub use contracts::{Metric, SenderConfig, SimpleMetric};
pub use line_protocol::{Encoder, LineProtocolEncoder};
pub use tokio_util::sync::CancellationToken;
