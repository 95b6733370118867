use serde::Serialize;
use volley_core::config::parse_millis;
use volley_core::{BatchConfig, ConfigError};
use volley_exec::retry::BackoffSchedule;

use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::{BatchArgs, OutputArgs};

fn millis_arg(key: &str, raw: &str) -> Result<std::time::Duration, ConfigError> {
    parse_millis(raw).ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        expected: "a non-negative number of milliseconds",
    })
}

/// Defaults, then `VOLLEY_*` environment values, then flags.
pub fn build_batch_config(args: &BatchArgs) -> Result<BatchConfig, ConfigError> {
    let mut config = BatchConfig::from_env();
    if let Some(n) = args.batch_size {
        config = config.with_batch_size(n);
    }
    if let Some(raw) = &args.inter_chunk_delay_ms {
        config = config.with_inter_chunk_delay(millis_arg("--inter-chunk-delay-ms", raw)?);
    }
    if let Some(raw) = &args.retry_base_ms {
        config = config.with_retry_base_delay(millis_arg("--retry-base-ms", raw)?);
    }
    if let Some(raw) = &args.timeout_ms {
        config = config.with_operation_timeout(Some(millis_arg("--timeout-ms", raw)?));
    }
    if let Some(id) = &args.correlation_id {
        config = config.with_correlation_id(id.clone());
    }
    config.validate()?;
    Ok(config)
}

#[derive(Serialize)]
struct EffectiveConfig {
    batch_size: usize,
    inter_chunk_delay_ms: u64,
    retry_base_ms: u64,
    backoff_ms: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    retry_statuses: Vec<u16>,
}

pub fn config_cmd(batch: BatchArgs, output: OutputArgs) -> i32 {
    let config = match build_batch_config(&batch) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::VALIDATION_FAILED;
        }
    };

    let schedule = BackoffSchedule::from(&config.retry);
    let backoff_ms = (1..=schedule.max_rounds())
        .filter_map(|round| schedule.delay_before_round(round))
        .map(|d| d.as_millis() as u64)
        .collect();
    let retry_statuses = if batch.retry_statuses.is_empty() {
        vec![volley_exec::retry::THROTTLE_STATUS]
    } else {
        batch.retry_statuses.clone()
    };

    let effective = EffectiveConfig {
        batch_size: config.batch_size,
        inter_chunk_delay_ms: config.inter_chunk_delay.as_millis() as u64,
        retry_base_ms: config.retry.base_delay.as_millis() as u64,
        backoff_ms,
        operation_timeout_ms: config.operation_timeout.map(|d| d.as_millis() as u64),
        correlation_id: config.correlation_id,
        retry_statuses,
    };
    print_result(output.format, output.quiet, &effective);
    exit_codes::SUCCESS
}
