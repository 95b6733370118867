#![forbid(unsafe_code)]

//! Runtime engine for volley batch runs.
//!
//! A [`BatchRunner`] drives a list of [`WorkItem`]s in fixed-size chunks with
//! a pause between chunks, re-drives throttled failures on a fixed backoff
//! schedule and returns a plain-data [`volley_core::BatchResult`].

pub mod cancel;
pub mod executor;
pub mod item;
pub mod retry;

pub use crate::cancel::{CancellationGate, CancellationToken, NeverCancelled};
pub use crate::executor::{run_batch, Aggregator, BatchRunner, ChunkExecutor, ChunkRun};
pub use crate::item::{OperationFuture, WorkItem};
pub use crate::retry::{RetryPolicy, StatusRetryPolicy, ThrottlePolicy};
