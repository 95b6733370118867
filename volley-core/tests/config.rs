use std::collections::BTreeMap;
use std::time::Duration;

use volley_core::config::{parse_millis, EnvOverrides, DEFAULT_INTER_CHUNK_DELAY};
use volley_core::{BatchConfig, ConfigError};

fn overrides(pairs: &[(&str, &str)]) -> EnvOverrides {
    let env: BTreeMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EnvOverrides::from_lookup(|k| env.get(k).cloned())
}

#[test]
fn defaults_match_documented_values() {
    let cfg = BatchConfig::default();
    assert_eq!(cfg.batch_size, 35);
    assert_eq!(cfg.inter_chunk_delay, Duration::from_millis(1000));
    assert_eq!(cfg.retry.base_delay, Duration::from_millis(2000));
    assert!(cfg.operation_timeout.is_none());
    assert!(cfg.correlation_id.is_none());
}

#[test]
fn parse_millis_accepts_finite_non_negative() {
    assert_eq!(parse_millis("0"), Some(Duration::ZERO));
    assert_eq!(parse_millis(" 250 "), Some(Duration::from_millis(250)));
    assert_eq!(parse_millis("1.5"), Some(Duration::from_micros(1500)));
}

#[test]
fn parse_millis_rejects_negative_nan_and_garbage() {
    assert_eq!(parse_millis("-1"), None);
    assert_eq!(parse_millis("NaN"), None);
    assert_eq!(parse_millis("inf"), None);
    assert_eq!(parse_millis("soon"), None);
    assert_eq!(parse_millis(""), None);
}

#[test]
fn env_overrides_replace_defaults() {
    let cfg = overrides(&[
        ("VOLLEY_BATCH_SIZE", "10"),
        ("VOLLEY_INTER_CHUNK_DELAY_MS", "0"),
        ("VOLLEY_RETRY_BASE_MS", "100"),
        ("VOLLEY_OPERATION_TIMEOUT_MS", "5000"),
    ])
    .apply(BatchConfig::default());

    assert_eq!(cfg.batch_size, 10);
    assert_eq!(cfg.inter_chunk_delay, Duration::ZERO);
    assert_eq!(cfg.retry.base_delay, Duration::from_millis(100));
    assert_eq!(cfg.operation_timeout, Some(Duration::from_secs(5)));
}

#[test]
fn invalid_env_values_fall_back() {
    let cfg = overrides(&[
        ("VOLLEY_BATCH_SIZE", "0"),
        ("VOLLEY_INTER_CHUNK_DELAY_MS", "-50"),
        ("VOLLEY_RETRY_BASE_MS", "NaN"),
    ])
    .apply(BatchConfig::default());

    assert_eq!(cfg.batch_size, 35);
    assert_eq!(cfg.inter_chunk_delay, DEFAULT_INTER_CHUNK_DELAY);
    assert_eq!(cfg.retry.base_delay, Duration::from_millis(2000));
}

#[test]
fn validate_rejects_zero_batch_size() {
    let cfg = BatchConfig::default().with_batch_size(0);
    assert_eq!(cfg.validate(), Err(ConfigError::ZeroBatchSize));
    assert!(BatchConfig::default().validate().is_ok());
}

#[test]
fn zero_operation_timeout_disables_the_limit() {
    let cfg = overrides(&[("VOLLEY_OPERATION_TIMEOUT_MS", "0")]).apply(BatchConfig::default());
    assert_eq!(cfg.operation_timeout, None);

    let cfg = BatchConfig::default().with_operation_timeout(Some(Duration::ZERO));
    assert_eq!(cfg.operation_timeout, None);

    let cfg = BatchConfig::default().with_operation_timeout(Some(Duration::from_millis(1)));
    assert_eq!(cfg.operation_timeout, Some(Duration::from_millis(1)));
}
