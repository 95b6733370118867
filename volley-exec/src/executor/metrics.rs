use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::executor::{Event, EventSink};

#[derive(Debug, Clone, Default)]
pub struct RunMetrics {
    pub correlation_id: Option<String>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub total_duration: Option<Duration>,
    pub items_total: usize,
    pub chunks_run: usize,
    pub operations_launched: usize,
    pub items_succeeded: usize,
    pub items_failed: usize,
    pub retry_rounds: u32,
    pub items_retried: usize,
    pub peak_in_flight: usize,
    pub cancelled: bool,
}

impl RunMetrics {
    pub fn new(correlation_id: Option<String>, items_total: usize) -> Self {
        Self {
            correlation_id,
            items_total,
            started_at: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn record_chunk(&mut self, size: usize) {
        self.chunks_run += 1;
        self.operations_launched += size;
    }

    pub fn record_round(&mut self, items: usize) {
        self.retry_rounds += 1;
        self.items_retried += items;
    }

    pub fn record_cancelled(&mut self) {
        self.cancelled = true;
    }

    pub fn finish(&mut self, succeeded: usize, failed: usize, peak_in_flight: usize) {
        self.items_succeeded = succeeded;
        self.items_failed = failed;
        self.peak_in_flight = peak_in_flight;
        self.finished_at = Some(Instant::now());
        if let (Some(started), Some(finished)) = (self.started_at, self.finished_at) {
            self.total_duration = Some(finished.duration_since(started));
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "correlation_id": self.correlation_id,
            "duration_ms": self.total_duration.map(|d| d.as_millis() as u64),
            "items": {
                "total": self.items_total,
                "succeeded": self.items_succeeded,
                "failed": self.items_failed,
                "retried": self.items_retried,
            },
            "chunks_run": self.chunks_run,
            "operations_launched": self.operations_launched,
            "retry_rounds": self.retry_rounds,
            "peak_in_flight": self.peak_in_flight,
            "cancelled": self.cancelled,
        })
    }
}

#[derive(Debug, Default)]
pub struct MetricsCollector {
    metrics: Mutex<RunMetrics>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RunMetrics> {
        // A panic while holding the lock only loses a counter update.
        self.metrics.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn observe(&self, event: &Event) {
        let mut m = self.lock();
        match event {
            Event::RunStarted {
                correlation_id,
                items,
                ..
            } => *m = RunMetrics::new(correlation_id.clone(), *items),
            Event::ChunkStarted { size, .. } => m.record_chunk(*size),
            Event::RoundStarted { items, .. } => m.record_round(*items),
            Event::Cancelled { .. } => m.record_cancelled(),
            Event::RunFinished {
                succeeded,
                failed,
                peak_in_flight,
                ..
            } => m.finish(*succeeded, *failed, *peak_in_flight),
            Event::ItemSettled { .. } | Event::ChunkSettled { .. } | Event::RetryScheduled { .. } => {}
        }
    }

    pub fn get_metrics(&self) -> RunMetrics {
        self.lock().clone()
    }
}

/// Feeds a [`MetricsCollector`], then forwards to `base`.
pub struct MetricsEventSink {
    collector: Arc<MetricsCollector>,
    base: Arc<dyn EventSink>,
}

impl MetricsEventSink {
    pub fn new(collector: Arc<MetricsCollector>, base: Arc<dyn EventSink>) -> Self {
        Self { collector, base }
    }
}

impl EventSink for MetricsEventSink {
    fn emit(&self, event: &Event) {
        self.collector.observe(event);
        self.base.emit(event);
    }
}
