use std::sync::Arc;

use serde::Serialize;
use volley_core::ItemId;

/// Phase transitions of a batch run, delivered synchronously to an [`EventSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    RunStarted {
        correlation_id: Option<String>,
        items: usize,
        batch_size: usize,
    },
    ChunkStarted {
        round: u32,
        chunk: usize,
        size: usize,
    },
    ItemSettled {
        round: u32,
        id: ItemId,
        attempt: u32,
        succeeded: bool,
        status: Option<u16>,
        network: bool,
    },
    ChunkSettled {
        round: u32,
        chunk: usize,
        succeeded: usize,
        failed: usize,
    },
    RetryScheduled {
        round: u32,
        items: usize,
        delay_ms: u64,
    },
    RoundStarted {
        round: u32,
        items: usize,
    },
    Cancelled {
        round: u32,
    },
    RunFinished {
        correlation_id: Option<String>,
        succeeded: usize,
        failed: usize,
        cancelled: bool,
        rounds: u32,
        peak_in_flight: usize,
        duration_ms: u64,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::RunStarted { .. } => "run.started",
            Event::ChunkStarted { .. } => "chunk.started",
            Event::ItemSettled { .. } => "item.settled",
            Event::ChunkSettled { .. } => "chunk.settled",
            Event::RetryScheduled { .. } => "retry.scheduled",
            Event::RoundStarted { .. } => "round.started",
            Event::Cancelled { .. } => "run.cancelled",
            Event::RunFinished { .. } => "run.finished",
        }
    }
}

/// Observer of a run. Called inline by the controller, so implementations
/// should return quickly.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &Event);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: &Event) {
        (**self).emit(event);
    }
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn with(mut self, sink: impl EventSink + 'static) -> Self {
        self.add(Box::new(sink));
        self
    }
}

impl EventSink for CompositeEventSink {
    fn emit(&self, event: &Event) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

/// One JSON object per line on stdout.
pub struct StdoutEventSink;

impl EventSink for StdoutEventSink {
    fn emit(&self, event: &Event) {
        println!("{}", serde_json::to_string(event).unwrap_or_default());
    }
}

/// One JSON object per line on stderr, leaving stdout to the caller.
pub struct StderrEventSink;

impl EventSink for StderrEventSink {
    fn emit(&self, event: &Event) {
        eprintln!("{}", serde_json::to_string(event).unwrap_or_default());
    }
}

pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event: &Event) {}
}
