use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info};
use volley_core::{ConfigError, Failure, OperationError, Outcome, Success};

use crate::cancel::{sleep_unless_cancelled, CancellationGate, NeverCancelled};
use crate::executor::aggregate::Aggregator;
use crate::executor::concurrency::InFlightGauge;
use crate::executor::events::{Event, EventSink, NoOpEventSink};
use crate::item::WorkItem;

/// What one pass over a list of items did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkRun {
    pub chunks: usize,
    pub launched: usize,
    pub cancelled: bool,
}

/// Runs items in consecutive chunks of at most `batch_size`, every chunk
/// fully concurrent, chunks strictly sequential and separated by
/// `inter_chunk_delay`.
#[derive(Clone)]
pub struct ChunkExecutor {
    batch_size: usize,
    inter_chunk_delay: Duration,
    operation_timeout: Option<Duration>,
    gate: Arc<dyn CancellationGate>,
    event_sink: Arc<dyn EventSink>,
    gauge: Arc<InFlightGauge>,
}

impl ChunkExecutor {
    pub fn new(batch_size: usize, inter_chunk_delay: Duration) -> Result<Self, ConfigError> {
        if batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(Self {
            batch_size,
            inter_chunk_delay,
            operation_timeout: None,
            gate: Arc::new(NeverCancelled),
            event_sink: Arc::new(NoOpEventSink),
            gauge: Arc::new(InFlightGauge::new()),
        })
    }

    /// A zero timeout means none.
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn with_cancellation(mut self, gate: Arc<dyn CancellationGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    pub fn with_gauge(mut self, gauge: Arc<InFlightGauge>) -> Self {
        self.gauge = gauge;
        self
    }

    pub fn gauge(&self) -> &Arc<InFlightGauge> {
        &self.gauge
    }

    /// Run `items` as round `round`, appending every settled outcome to `agg`.
    ///
    /// Cancellation is checked before each chunk and again after a chunk
    /// settles, before the pacing sleep. Items of chunks that never start are
    /// left out of `agg` entirely.
    pub async fn run<T: Send + 'static>(
        &self,
        round: u32,
        items: &[WorkItem<T>],
        agg: &mut Aggregator<T>,
    ) -> ChunkRun {
        let mut run = ChunkRun::default();
        let total_chunks = items.len().div_ceil(self.batch_size);

        for (chunk_idx, chunk) in items.chunks(self.batch_size).enumerate() {
            if self.gate.is_cancelled() {
                self.observe_cancel(round, chunk_idx);
                run.cancelled = true;
                return run;
            }

            self.run_chunk(round, chunk_idx, chunk, agg).await;
            run.chunks += 1;
            run.launched += chunk.len();

            if chunk_idx + 1 == total_chunks {
                break;
            }
            if self.gate.is_cancelled() {
                self.observe_cancel(round, chunk_idx + 1);
                run.cancelled = true;
                return run;
            }
            sleep_unless_cancelled(self.gate.as_ref(), self.inter_chunk_delay).await;
        }

        run
    }

    async fn run_chunk<T: Send + 'static>(
        &self,
        round: u32,
        chunk_idx: usize,
        chunk: &[WorkItem<T>],
        agg: &mut Aggregator<T>,
    ) {
        debug!(round, chunk = chunk_idx, size = chunk.len(), "chunk started");
        self.event_sink.emit(&Event::ChunkStarted {
            round,
            chunk: chunk_idx,
            size: chunk.len(),
        });

        let mut pending = FuturesUnordered::new();
        for item in chunk {
            let id = item.id().clone();
            let attempt = agg.begin_attempt(&id);
            let item = item.clone();
            let timeout = self.operation_timeout;
            let guard = self.gauge.enter();
            // The factory runs inside the task so a panic in it is caught too.
            let handle = tokio::spawn(async move {
                let _guard = guard;
                let fut = item.invoke();
                match timeout {
                    Some(limit) => tokio::time::timeout(limit, fut).await.unwrap_or_else(|_| {
                        Err(OperationError::network(format!(
                            "operation timed out after {}ms",
                            limit.as_millis()
                        )))
                    }),
                    None => fut.await,
                }
            });
            pending.push(async move { (id, attempt, handle.await) });
        }

        let (mut succeeded, mut failed) = (0usize, 0usize);
        while let Some((id, attempt, joined)) = pending.next().await {
            let outcome = match joined {
                Ok(Ok(value)) => Outcome::Success(Success { id, value, attempt }),
                Ok(Err(err)) => Outcome::Failure(Failure::from_error(id, &err, attempt)),
                Err(join_err) => {
                    let err = OperationError::other(join_failure_reason(join_err));
                    Outcome::Failure(Failure::from_error(id, &err, attempt))
                }
            };

            let (status, network) = match &outcome {
                Outcome::Success(_) => (None, false),
                Outcome::Failure(f) => (f.status, f.is_network_error),
            };
            if outcome.is_success() {
                succeeded += 1;
            } else {
                failed += 1;
            }
            self.event_sink.emit(&Event::ItemSettled {
                round,
                id: outcome.id().clone(),
                attempt,
                succeeded: outcome.is_success(),
                status,
                network,
            });
            agg.record(outcome);
        }

        debug!(round, chunk = chunk_idx, succeeded, failed, "chunk settled");
        self.event_sink.emit(&Event::ChunkSettled {
            round,
            chunk: chunk_idx,
            succeeded,
            failed,
        });
    }

    fn observe_cancel(&self, round: u32, next_chunk: usize) {
        info!(round, next_chunk, "cancellation observed; no further chunks will start");
        self.event_sink.emit(&Event::Cancelled { round });
    }
}

fn join_failure_reason(err: tokio::task::JoinError) -> String {
    if !err.is_panic() {
        return format!("operation task aborted: {err}");
    }
    match panic_message(err.into_panic()) {
        Some(msg) => format!("operation panicked: {msg}"),
        None => "operation panicked".to_string(),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> Option<String> {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        return Some((*s).to_string());
    }
    payload.downcast_ref::<String>().cloned()
}
