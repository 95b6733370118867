use std::time::Duration;

use volley_core::{Failure, ItemId, OperationError, RetryConfig};
use volley_exec::retry::{
    classify, decide_retry, BackoffSchedule, FailureClass, RetryDecision, RetryPolicy, RetryReason,
    StatusRetryPolicy, ThrottlePolicy, MAX_ROUNDS,
};

fn failure(err: OperationError) -> Failure {
    Failure::from_error(ItemId::from(1), &err, 1)
}

#[test]
fn only_forbidden_is_a_throttle() {
    assert_eq!(classify(Some(403), false), FailureClass::TransientThrottle);
    for status in [400u16, 401, 404, 422, 429, 500, 502, 503] {
        assert_eq!(classify(Some(status), false), FailureClass::OtherTerminal, "status {status}");
    }
    assert_eq!(classify(None, false), FailureClass::OtherTerminal);
}

#[test]
fn network_flag_wins_over_status() {
    assert_eq!(classify(Some(403), true), FailureClass::NetworkFailure);
    assert_eq!(classify(None, true), FailureClass::NetworkFailure);
    assert!(!FailureClass::NetworkFailure.is_retryable());
}

#[test]
fn classification_is_pure() {
    for (status, network) in [(Some(403), false), (Some(404), false), (None, true)] {
        assert_eq!(classify(status, network), classify(status, network));
    }
    let f = failure(OperationError::status(403, "slow down"));
    assert_eq!(ThrottlePolicy.is_retryable(&f), ThrottlePolicy.is_retryable(&f));
}

#[test]
fn throttle_policy_matches_classification() {
    assert!(ThrottlePolicy.is_retryable(&failure(OperationError::status(403, "throttled"))));
    assert!(!ThrottlePolicy.is_retryable(&failure(OperationError::status(404, "missing"))));
    assert!(!ThrottlePolicy.is_retryable(&failure(OperationError::network("reset"))));
    assert!(!ThrottlePolicy.is_retryable(&failure(OperationError::other("weird"))));
}

#[test]
fn status_policy_retries_configured_statuses() {
    let policy = StatusRetryPolicy::new([429, 503]);
    assert!(policy.is_retryable(&failure(OperationError::status(429, "too many"))));
    assert!(policy.is_retryable(&failure(OperationError::status(503, "unavailable"))));
    assert!(!policy.is_retryable(&failure(OperationError::status(403, "forbidden"))));

    let mut net = failure(OperationError::network("timeout"));
    net.status = Some(503);
    assert!(!policy.is_retryable(&net));
}

#[test]
fn closures_are_policies() {
    let always = |_: &Failure| true;
    assert!(always.is_retryable(&failure(OperationError::other("x"))));
}

#[test]
fn backoff_schedule_is_fixed_multiples_of_base() {
    let schedule = BackoffSchedule::new(Duration::from_millis(2000));
    assert_eq!(schedule.delay_before_round(1), Some(Duration::from_millis(5000)));
    assert_eq!(schedule.delay_before_round(2), Some(Duration::from_millis(15000)));
    assert_eq!(schedule.delay_before_round(3), Some(Duration::from_millis(30000)));
    assert_eq!(schedule.delay_before_round(0), None);
    assert_eq!(schedule.delay_before_round(4), None);
    assert_eq!(schedule.max_rounds(), 3);
    assert_eq!(MAX_ROUNDS, 3);
}

#[test]
fn default_schedule_uses_default_base() {
    let schedule = BackoffSchedule::default();
    assert_eq!(schedule.base(), RetryConfig::default().base_delay);
    assert_eq!(schedule.delay_before_round(1), Some(Duration::from_millis(5000)));
}

#[test]
fn decide_retry_schedules_next_round() {
    let schedule = BackoffSchedule::new(Duration::from_millis(100));
    let f = failure(OperationError::status(403, "throttled"));

    assert_eq!(
        decide_retry(&ThrottlePolicy, &schedule, &f, 0),
        RetryDecision::RetryAfter {
            round: 1,
            delay: Duration::from_millis(250)
        }
    );
    assert_eq!(
        decide_retry(&ThrottlePolicy, &schedule, &f, 2),
        RetryDecision::RetryAfter {
            round: 3,
            delay: Duration::from_millis(1500)
        }
    );
}

#[test]
fn decide_retry_stops_after_last_round() {
    let schedule = BackoffSchedule::new(Duration::from_millis(100));
    let f = failure(OperationError::status(403, "throttled"));
    assert_eq!(
        decide_retry(&ThrottlePolicy, &schedule, &f, 3),
        RetryDecision::Stop {
            reason: RetryReason::RoundsExhausted
        }
    );
}

#[test]
fn decide_retry_reports_terminal_reasons() {
    let schedule = BackoffSchedule::default();
    assert_eq!(
        decide_retry(&ThrottlePolicy, &schedule, &failure(OperationError::status(404, "missing")), 0),
        RetryDecision::Stop {
            reason: RetryReason::HttpStatus(404)
        }
    );
    assert_eq!(
        decide_retry(&ThrottlePolicy, &schedule, &failure(OperationError::network("refused")), 0),
        RetryDecision::Stop {
            reason: RetryReason::NetworkFailure
        }
    );
    assert_eq!(
        decide_retry(&ThrottlePolicy, &schedule, &failure(OperationError::other("bad json")), 0),
        RetryDecision::Stop {
            reason: RetryReason::NotRetryable
        }
    );
}
