mod env;

use std::time::Duration;

use crate::error::ConfigError;

pub use env::{
    parse_millis, EnvOverrides, BATCH_SIZE_VAR, INTER_CHUNK_DELAY_VAR, OPERATION_TIMEOUT_VAR,
    RETRY_BASE_VAR,
};

pub const DEFAULT_BATCH_SIZE: usize = 35;
pub const DEFAULT_INTER_CHUNK_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Unit the fixed backoff multipliers are applied to.
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub batch_size: usize,
    pub inter_chunk_delay: Duration,
    pub retry: RetryConfig,
    /// None leaves operations unbounded. Never `Some(0)`.
    pub operation_timeout: Option<Duration>,
    /// Label attached to every log line and event of a run.
    pub correlation_id: Option<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            inter_chunk_delay: DEFAULT_INTER_CHUNK_DELAY,
            retry: RetryConfig::default(),
            operation_timeout: None,
            correlation_id: None,
        }
    }
}

impl BatchConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        EnvOverrides::from_process().apply(Self::default())
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_inter_chunk_delay(mut self, delay: Duration) -> Self {
        self.inter_chunk_delay = delay;
        self
    }

    pub fn with_retry_base_delay(mut self, base: Duration) -> Self {
        self.retry.base_delay = base;
        self
    }

    /// `Some(Duration::ZERO)` is treated as no timeout.
    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(())
    }
}
