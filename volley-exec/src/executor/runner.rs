use std::collections::HashSet;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, info, info_span, Instrument};
use volley_core::{BatchConfig, BatchError, BatchResult, ItemId};

use crate::cancel::{sleep_unless_cancelled, CancellationGate, NeverCancelled};
use crate::executor::aggregate::Aggregator;
use crate::executor::chunk::ChunkExecutor;
use crate::executor::concurrency::InFlightGauge;
use crate::executor::events::{Event, EventSink, NoOpEventSink};
use crate::item::WorkItem;
use crate::retry::{decide_retry, BackoffSchedule, RetryDecision, RetryPolicy, ThrottlePolicy};

/// Drives a batch: a first pass over every item, then up to three retry
/// rounds over the failures the policy calls retryable.
pub struct BatchRunner {
    config: BatchConfig,
    policy: Arc<dyn RetryPolicy>,
    gate: Arc<dyn CancellationGate>,
    event_sink: Arc<dyn EventSink>,
}

impl BatchRunner {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            policy: Arc::new(ThrottlePolicy),
            gate: Arc::new(NeverCancelled),
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    pub fn with_policy(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn with_cancellation(mut self, gate: impl CancellationGate + 'static) -> Self {
        self.gate = Arc::new(gate);
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Run every item to a settled outcome.
    ///
    /// Operation failures never surface as `Err`; only an invalid config or
    /// duplicate ids do.
    pub async fn run<T: Send + 'static>(
        &self,
        items: &[WorkItem<T>],
    ) -> Result<BatchResult<T>, BatchError> {
        self.config.validate()?;
        ensure_unique_ids(items)?;

        let span = info_span!(
            "batch",
            correlation_id = self.config.correlation_id.as_deref().unwrap_or("-")
        );
        self.run_inner(items).instrument(span).await
    }

    async fn run_inner<T: Send + 'static>(
        &self,
        items: &[WorkItem<T>],
    ) -> Result<BatchResult<T>, BatchError> {
        let started = Instant::now();
        let gauge = Arc::new(InFlightGauge::new());
        let executor = ChunkExecutor::new(self.config.batch_size, self.config.inter_chunk_delay)?
            .with_operation_timeout(self.config.operation_timeout)
            .with_cancellation(self.gate.clone())
            .with_event_sink(self.event_sink.clone())
            .with_gauge(gauge.clone());
        let schedule = BackoffSchedule::from(&self.config.retry);

        info!(items = items.len(), batch_size = self.config.batch_size, "batch run started");
        self.event_sink.emit(&Event::RunStarted {
            correlation_id: self.config.correlation_id.clone(),
            items: items.len(),
            batch_size: self.config.batch_size,
        });

        let mut agg = Aggregator::new();
        let mut rounds = 0u32;
        let mut cancelled = executor.run(0, items, &mut agg).await.cancelled;

        while !cancelled {
            let mut retry_ids: HashSet<ItemId> = HashSet::new();
            let mut next = None;
            for failure in agg.failed() {
                match decide_retry(self.policy.as_ref(), &schedule, failure, rounds) {
                    RetryDecision::RetryAfter { round, delay } => {
                        retry_ids.insert(failure.id.clone());
                        next = Some((round, delay));
                    }
                    RetryDecision::Stop { reason } => {
                        debug!(id = %failure.id, ?reason, "failure is final");
                    }
                }
            }
            let Some((round, delay)) = next else {
                break;
            };

            if self.gate.is_cancelled() {
                cancelled = self.observe_cancel(rounds);
                break;
            }
            info!(round, items = retry_ids.len(), delay_ms = delay.as_millis() as u64, "retry round scheduled");
            self.event_sink.emit(&Event::RetryScheduled {
                round,
                items: retry_ids.len(),
                delay_ms: delay.as_millis() as u64,
            });
            sleep_unless_cancelled(self.gate.as_ref(), delay).await;
            if self.gate.is_cancelled() {
                cancelled = self.observe_cancel(rounds);
                break;
            }

            let subset: Vec<WorkItem<T>> = items
                .iter()
                .filter(|item| retry_ids.contains(item.id()))
                .cloned()
                .collect();
            rounds = round;
            let purged = agg.purge_failed(&retry_ids);
            info!(round, items = subset.len(), purged, "retry round started");
            self.event_sink.emit(&Event::RoundStarted {
                round,
                items: subset.len(),
            });
            cancelled = executor.run(round, &subset, &mut agg).await.cancelled;
        }

        let result = agg.into_result(cancelled, rounds);
        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            succeeded = result.successful.len(),
            failed = result.failed.len(),
            cancelled,
            rounds,
            duration_ms,
            "batch run finished"
        );
        self.event_sink.emit(&Event::RunFinished {
            correlation_id: self.config.correlation_id.clone(),
            succeeded: result.successful.len(),
            failed: result.failed.len(),
            cancelled,
            rounds,
            peak_in_flight: gauge.peak(),
            duration_ms,
        });
        Ok(result)
    }

    fn observe_cancel(&self, round: u32) -> bool {
        info!(round, "cancellation observed; no further retry rounds will start");
        self.event_sink.emit(&Event::Cancelled { round });
        true
    }
}

/// Run `items` with `config`, the default throttle policy and no cancellation.
pub async fn run_batch<T: Send + 'static>(
    items: &[WorkItem<T>],
    config: BatchConfig,
) -> Result<BatchResult<T>, BatchError> {
    BatchRunner::new(config).run(items).await
}

fn ensure_unique_ids<T>(items: &[WorkItem<T>]) -> Result<(), BatchError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id()) {
            return Err(BatchError::DuplicateId(item.id().clone()));
        }
    }
    Ok(())
}
