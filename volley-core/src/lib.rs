#![forbid(unsafe_code)]

//! Plain data model and configuration for volley batch runs.
//!
//! Everything here is runtime-free so results can cross thread, process or
//! serialization boundaries; the engine itself lives in `volley-exec`.

pub mod config;
pub mod error;
pub mod types;

pub use crate::config::{BatchConfig, EnvOverrides, RetryConfig};
pub use crate::error::{BatchError, ConfigError, OperationError};
pub use crate::types::{BatchResult, Failure, ItemId, Outcome, Success};
