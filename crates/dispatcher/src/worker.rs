//! Dispatch worker - sole owner of the batch
//!
//! One task per client. It waits on three sources at once:
//! - cancellation
//! - the batch deadline (only while a batch is pending)
//! - the producer queue (records and flush requests)
//!
//! Flushes run inline, so at most one batch is ever on the wire.

use std::ops::ControlFlow;
use std::sync::Arc;

use bytes::BytesMut;
use contracts::Metric;
use line_protocol::Encoder;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::batch::BatchBuffer;
use crate::error::DispatchError;
use crate::policy::{FlushPolicy, FlushTrigger};
use crate::stats::DispatchStats;
use crate::transport::Transport;

/// Upper bound on the batch allocation made up front
const MAX_PREALLOCATED_RECORDS: usize = 4096;

/// Metric record as carried through the queue
pub type BoxedMetric = Box<dyn Metric>;

/// Callback receiving every transport / encoding failure
///
/// Runs on the worker task: it must not block, and must not await
/// `send`/`flush` on the same client.
pub type ErrorListener = Arc<dyn Fn(&DispatchError) + Send + Sync>;

/// Queue item
pub(crate) enum Command {
    Record(BoxedMetric),
    Flush,
}

/// Immutable state shared by the client facade and its worker
pub(crate) struct WorkerContext<T> {
    pub(crate) policy: FlushPolicy,
    pub(crate) transport: T,
    pub(crate) encoder: Box<dyn Encoder>,
    pub(crate) listener: Option<ErrorListener>,
    pub(crate) token: CancellationToken,
    pub(crate) stats: DispatchStats,
}

impl<T> WorkerContext<T> {
    fn report(&self, error: DispatchError) {
        observability::record_dispatch_error(error.kind());
        warn!(kind = error.kind(), error = %error, "Dispatch failure");
        if let Some(listener) = &self.listener {
            listener(&error);
        }
    }
}

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Cancelled,
    Closed,
}

pub(crate) struct DispatchWorker<T> {
    ctx: Arc<WorkerContext<T>>,
    rx: mpsc::Receiver<Command>,
    batch: BatchBuffer<BoxedMetric>,
    /// Reused across flushes
    payload: BytesMut,
    /// Armed iff the batch is non-empty and a timeout is configured
    deadline: Option<Instant>,
}

impl<T: Transport + Sync + 'static> DispatchWorker<T> {
    pub(crate) fn new(ctx: Arc<WorkerContext<T>>, rx: mpsc::Receiver<Command>) -> Self {
        let capacity = ctx.policy.batch_size().min(MAX_PREALLOCATED_RECORDS);
        let batch = BatchBuffer::with_capacity(capacity);
        Self {
            ctx,
            rx,
            batch,
            payload: BytesMut::new(),
            deadline: None,
        }
    }

    /// Run until cancelled or until every producer handle is gone
    #[instrument(
        name = "dispatch_worker_loop",
        skip(self),
        fields(endpoint = %self.ctx.transport.endpoint())
    )]
    pub(crate) async fn run(mut self) {
        debug!(
            batch_size = self.ctx.policy.batch_size(),
            batch_timeout_ms = self.ctx.policy.batch_timeout().as_millis() as u64,
            "Dispatch worker started"
        );

        let token = self.ctx.token.clone();
        let exit = loop {
            let step = tokio::select! {
                biased;
                () = token.cancelled() => ControlFlow::Break(Exit::Cancelled),
                () = wait_deadline(self.deadline) => self.flush(FlushTrigger::Deadline).await,
                command = self.rx.recv() => self.on_command(command).await,
            };
            if let ControlFlow::Break(exit) = step {
                break exit;
            }
        };

        if exit == Exit::Cancelled {
            self.discard();
        }
        debug!(exit = ?exit, "Dispatch worker stopped");
    }

    async fn on_command(&mut self, command: Option<Command>) -> ControlFlow<Exit> {
        match command {
            Some(Command::Record(metric)) => {
                self.batch.push(metric);
                if self.ctx.policy.should_flush_now(self.batch.len()) {
                    return self.flush(FlushTrigger::Size).await;
                }
                if self.ctx.policy.should_arm_timer(self.deadline.is_some()) {
                    // overflow leaves the timer unarmed (effectively infinite)
                    self.deadline = Instant::now().checked_add(self.ctx.policy.batch_timeout());
                }
                ControlFlow::Continue(())
            }
            Some(Command::Flush) => self.flush(FlushTrigger::Explicit).await,
            None => {
                debug!(pending = self.batch.len(), "Queue closed");
                self.flush(FlushTrigger::Close).await?;
                ControlFlow::Break(Exit::Closed)
            }
        }
    }

    /// Transmit the batch, then reset to empty with the deadline disarmed
    ///
    /// Cancellation interrupts an in-flight transmission.
    async fn flush(&mut self, trigger: FlushTrigger) -> ControlFlow<Exit> {
        let token = self.ctx.token.clone();
        tokio::select! {
            biased;
            () = token.cancelled() => return ControlFlow::Break(Exit::Cancelled),
            () = self.transmit(trigger) => {}
        }
        self.batch.clear();
        self.deadline = None;
        ControlFlow::Continue(())
    }

    #[instrument(
        name = "dispatch_worker_transmit",
        skip(self),
        fields(trigger = trigger.as_str(), records = self.batch.len())
    )]
    async fn transmit(&mut self, trigger: FlushTrigger) {
        // explicit flushes dial even with nothing buffered
        if self.batch.is_empty() && trigger != FlushTrigger::Explicit {
            return;
        }

        let ctx = Arc::clone(&self.ctx);
        let endpoint = ctx.transport.endpoint();
        let records = self.batch.len() as u64;
        ctx.stats.inc_flush_count();

        let mut conn = match ctx.transport.connect().await {
            Ok(conn) => conn,
            Err(source) => {
                ctx.stats.inc_flush_failures();
                ctx.stats.add_records_discarded(records);
                observability::record_records_discarded(records as usize);
                ctx.report(DispatchError::Connect {
                    endpoint: endpoint.to_string(),
                    source,
                });
                return;
            }
        };

        self.payload.clear();
        let mut encoded = 0u64;
        for metric in self.batch.iter() {
            match ctx.encoder.encode_into(&**metric, &mut self.payload) {
                Ok(()) => encoded += 1,
                Err(e) => {
                    ctx.stats.inc_encode_failures();
                    ctx.report(e.into());
                }
            }
        }

        match conn.write_all(&self.payload).await {
            Ok(()) => {
                let bytes = self.payload.len();
                ctx.stats.add_records_sent(encoded);
                ctx.stats.add_bytes_written(bytes as u64);
                observability::record_flush(trigger.as_str(), encoded as usize, bytes);
                debug!(records = encoded, bytes, "Batch written");
            }
            Err(source) => {
                ctx.stats.inc_flush_failures();
                ctx.stats.add_records_discarded(encoded);
                observability::record_records_discarded(encoded as usize);
                ctx.report(DispatchError::Write {
                    endpoint: endpoint.to_string(),
                    source,
                });
            }
        }

        if let Err(source) = conn.shutdown().await {
            ctx.report(DispatchError::Close {
                endpoint: endpoint.to_string(),
                source,
            });
        }
    }

    /// Drop the batch and anything still queued, without sending
    fn discard(&mut self) {
        self.rx.close();
        let mut queued = 0usize;
        while let Ok(command) = self.rx.try_recv() {
            if matches!(command, Command::Record(_)) {
                queued += 1;
            }
        }

        let dropped = self.batch.len() + queued;
        self.batch.clear();
        self.deadline = None;

        self.ctx.stats.add_records_discarded(dropped as u64);
        observability::record_records_discarded(dropped);
        info!(discarded = dropped, "Dispatch worker cancelled");
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
