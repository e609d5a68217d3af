//! Client facade - the producer entry point
//!
//! Producers only ever touch the bounded queue. The worker behind it is
//! spawned on first use and owns all batch state.

use std::sync::{Arc, OnceLock};

use contracts::{Metric, SenderConfig};
use line_protocol::{Encoder, LineProtocolEncoder};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::DispatchError;
use crate::policy::FlushPolicy;
use crate::stats::{DispatchStats, StatsSnapshot};
use crate::transport::{TcpTransport, Transport};
use crate::worker::{Command, DispatchWorker, ErrorListener, WorkerContext};

/// Builder for a [`Client`]
pub struct ClientBuilder<T = TcpTransport> {
    config: SenderConfig,
    transport: T,
    encoder: Box<dyn Encoder>,
    listener: Option<ErrorListener>,
    token: CancellationToken,
}

impl ClientBuilder<TcpTransport> {
    /// Builder with TCP transport and line-protocol encoding
    pub fn new(config: SenderConfig) -> Self {
        let transport = TcpTransport::new(config.endpoint.clone());
        Self {
            config,
            transport,
            encoder: Box::new(LineProtocolEncoder::new()),
            listener: None,
            token: CancellationToken::new(),
        }
    }
}

impl<T: Transport + Sync + 'static> ClientBuilder<T> {
    /// Replace the transport
    pub fn transport<U: Transport + Sync + 'static>(self, transport: U) -> ClientBuilder<U> {
        ClientBuilder {
            config: self.config,
            transport,
            encoder: self.encoder,
            listener: self.listener,
            token: self.token,
        }
    }

    /// Replace the record encoder
    pub fn encoder(mut self, encoder: impl Encoder + 'static) -> Self {
        self.encoder = Box::new(encoder);
        self
    }

    /// Receive transport and encoding failures
    pub fn error_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&DispatchError) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
        self
    }

    /// Stop the worker when `token` is cancelled
    ///
    /// Cancellation discards anything buffered or queued.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Validate and build the client; the worker starts on first use
    ///
    /// # Errors
    /// `DispatchError::Config` if the endpoint is empty or the queue
    /// capacity is zero.
    #[instrument(
        name = "client_builder_build",
        skip(self),
        fields(endpoint = %self.config.endpoint)
    )]
    pub fn build(self) -> Result<Client<T>, DispatchError> {
        if self.config.endpoint.is_empty() {
            return Err(DispatchError::config("endpoint is required"));
        }
        if self.config.queue_capacity == 0 {
            return Err(DispatchError::config("queue_capacity must be > 0"));
        }

        let ctx = WorkerContext {
            policy: FlushPolicy::from_config(&self.config),
            transport: self.transport,
            encoder: self.encoder,
            listener: self.listener,
            token: self.token,
            stats: DispatchStats::new(),
        };

        Ok(Client {
            ctx: Arc::new(ctx),
            queue_capacity: self.config.queue_capacity,
            started: OnceLock::new(),
        })
    }
}

/// Running worker handle
struct Started {
    tx: mpsc::Sender<Command>,
    worker: JoinHandle<()>,
}

/// Batching metric client
///
/// `Client` is `Sync`; share it between producers behind an `Arc`.
/// Dropping it lets the worker flush what is pending and exit in the
/// background; [`Client::close`] does the same and waits for it.
pub struct Client<T: Transport + Sync + 'static = TcpTransport> {
    ctx: Arc<WorkerContext<T>>,
    queue_capacity: usize,
    started: OnceLock<Started>,
}

impl Client<TcpTransport> {
    /// TCP client with line-protocol encoding and no error listener
    pub fn new(config: SenderConfig, token: CancellationToken) -> Result<Self, DispatchError> {
        ClientBuilder::new(config).cancellation_token(token).build()
    }

    pub fn builder(config: SenderConfig) -> ClientBuilder<TcpTransport> {
        ClientBuilder::new(config)
    }
}

impl<T: Transport + Sync + 'static> Client<T> {
    /// Enqueue a record for transmission
    ///
    /// Suspends only while the queue is full. Never reports downstream
    /// failures; those go to the error listener. After cancellation the
    /// record is dropped.
    ///
    /// # Panics
    /// The first call on a client spawns the worker and must happen inside
    /// a Tokio runtime.
    pub async fn send(&self, metric: impl Metric + 'static) {
        if self.enqueue(Command::Record(Box::new(metric))).await {
            self.ctx.stats.inc_records_enqueued();
            observability::record_records_enqueued(1);
        }
    }

    /// Enqueue without waiting
    ///
    /// Returns true if queued, false if the queue is full or the worker
    /// has stopped (the record is dropped).
    pub fn try_send(&self, metric: impl Metric + 'static) -> bool {
        match self.queue().try_send(Command::Record(Box::new(metric))) {
            Ok(()) => {
                self.ctx.stats.inc_records_enqueued();
                observability::record_records_enqueued(1);
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.ctx.stats.inc_records_rejected();
                warn!(
                    endpoint = %self.ctx.transport.endpoint(),
                    capacity = self.queue_capacity,
                    "Queue full, metric dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.ctx.stats.inc_records_rejected();
                debug!("Dispatch worker stopped, metric dropped");
                false
            }
        }
    }

    /// Ask the worker to flush whatever is buffered
    ///
    /// Fire-and-forget: returns once the request is queued.
    pub async fn flush(&self) {
        self.enqueue(Command::Flush).await;
    }

    /// Stop accepting records, flush the remaining batch and wait for the worker
    ///
    /// Returns the final statistics. After cancellation this only waits.
    #[instrument(
        name = "client_close",
        skip(self),
        fields(endpoint = %self.ctx.transport.endpoint())
    )]
    pub async fn close(self) -> StatsSnapshot {
        if let Some(Started { tx, worker }) = self.started.into_inner() {
            drop(tx);
            if let Err(e) = worker.await {
                error!(error = ?e, "Dispatch worker panicked");
            }
        }
        debug!("Client closed");
        self.ctx.stats.snapshot()
    }

    /// Whether the worker has been spawned
    pub fn is_started(&self) -> bool {
        self.started.get().is_some()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.ctx.stats.snapshot()
    }

    pub fn endpoint(&self) -> &str {
        self.ctx.transport.endpoint()
    }

    pub fn policy(&self) -> FlushPolicy {
        self.ctx.policy
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.ctx.token
    }

    async fn enqueue(&self, command: Command) -> bool {
        match self.queue().send(command).await {
            Ok(()) => true,
            Err(_) => {
                debug!("Dispatch worker stopped, command dropped");
                false
            }
        }
    }

    /// Producer side of the queue, spawning the worker exactly once
    fn queue(&self) -> &mpsc::Sender<Command> {
        &self.started.get_or_init(|| self.start()).tx
    }

    fn start(&self) -> Started {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let worker = DispatchWorker::new(Arc::clone(&self.ctx), rx);
        let worker = tokio::spawn(worker.run());

        info!(
            endpoint = %self.ctx.transport.endpoint(),
            queue_capacity = self.queue_capacity,
            "Dispatch worker spawned"
        );

        Started { tx, worker }
    }
}
