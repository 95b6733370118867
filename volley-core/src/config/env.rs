use std::time::Duration;

use tracing::warn;

use crate::config::BatchConfig;

pub const BATCH_SIZE_VAR: &str = "VOLLEY_BATCH_SIZE";
pub const INTER_CHUNK_DELAY_VAR: &str = "VOLLEY_INTER_CHUNK_DELAY_MS";
pub const RETRY_BASE_VAR: &str = "VOLLEY_RETRY_BASE_MS";
pub const OPERATION_TIMEOUT_VAR: &str = "VOLLEY_OPERATION_TIMEOUT_MS";

/// Raw environment values, read once and applied on top of a config.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub batch_size: Option<String>,
    pub inter_chunk_delay_ms: Option<String>,
    pub retry_base_ms: Option<String>,
    pub operation_timeout_ms: Option<String>,
}

impl EnvOverrides {
    pub fn from_process() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            batch_size: lookup(BATCH_SIZE_VAR),
            inter_chunk_delay_ms: lookup(INTER_CHUNK_DELAY_VAR),
            retry_base_ms: lookup(RETRY_BASE_VAR),
            operation_timeout_ms: lookup(OPERATION_TIMEOUT_VAR),
        }
    }

    /// Unparseable values are ignored and the value already in `cfg` stays.
    pub fn apply(&self, mut cfg: BatchConfig) -> BatchConfig {
        if let Some(raw) = &self.batch_size {
            match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => cfg.batch_size = n,
                _ => warn!(var = BATCH_SIZE_VAR, value = %raw, "ignoring invalid batch size override"),
            }
        }
        if let Some(d) = duration_override(INTER_CHUNK_DELAY_VAR, self.inter_chunk_delay_ms.as_deref()) {
            cfg.inter_chunk_delay = d;
        }
        if let Some(d) = duration_override(RETRY_BASE_VAR, self.retry_base_ms.as_deref()) {
            cfg.retry.base_delay = d;
        }
        if let Some(d) = duration_override(OPERATION_TIMEOUT_VAR, self.operation_timeout_ms.as_deref()) {
            cfg = cfg.with_operation_timeout(Some(d));
        }
        cfg
    }
}

fn duration_override(var: &str, raw: Option<&str>) -> Option<Duration> {
    let raw = raw?;
    let parsed = parse_millis(raw);
    if parsed.is_none() {
        warn!(var, value = %raw, "ignoring override: expected a finite, non-negative number of milliseconds");
    }
    parsed
}

/// Parse a millisecond count. Must be finite and non-negative; fractions are kept.
pub fn parse_millis(raw: &str) -> Option<Duration> {
    let v: f64 = raw.trim().parse().ok()?;
    if !v.is_finite() || v < 0.0 {
        return None;
    }
    let nanos = (v * 1_000_000.0).round();
    if nanos > u64::MAX as f64 {
        return None;
    }
    Some(Duration::from_nanos(nanos as u64))
}
