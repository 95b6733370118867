mod aggregate;
mod chunk;
pub mod concurrency;
pub mod events;
pub mod http;
pub mod metrics;
mod runner;

pub use aggregate::Aggregator;
pub use chunk::{ChunkExecutor, ChunkRun};
pub use concurrency::{InFlightGauge, InFlightGuard};
pub use events::{
    CompositeEventSink, Event, EventSink, NoOpEventSink, StderrEventSink, StdoutEventSink,
};
pub use http::{
    http_work_item, HttpClient, HttpError, HttpRequestParts, HttpResponseParts, ReqwestHttpClient,
    RequestLimits, DEFAULT_HTTP_TIMEOUT, DEFAULT_MAX_RESPONSE_BYTES,
};
pub use metrics::{MetricsCollector, MetricsEventSink, RunMetrics};
pub use runner::{run_batch, BatchRunner};
