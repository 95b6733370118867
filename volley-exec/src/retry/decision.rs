use std::time::Duration;

use volley_core::Failure;

use crate::retry::backoff::BackoffSchedule;
use crate::retry::policy::RetryPolicy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter { round: u32, delay: Duration },
    Stop { reason: RetryReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    NetworkFailure,
    HttpStatus(u16),
    NotRetryable,
    RoundsExhausted,
}

/// Decide whether `failure` gets another attempt.
///
/// - `completed_rounds`: retry rounds already run (0 after the first pass).
///
/// The policy is consulted first so a terminal failure is reported as such
/// even after the last round.
pub fn decide_retry(
    policy: &dyn RetryPolicy,
    schedule: &BackoffSchedule,
    failure: &Failure,
    completed_rounds: u32,
) -> RetryDecision {
    if !policy.is_retryable(failure) {
        let reason = if failure.is_network_error {
            RetryReason::NetworkFailure
        } else {
            failure
                .status
                .map(RetryReason::HttpStatus)
                .unwrap_or(RetryReason::NotRetryable)
        };
        return RetryDecision::Stop { reason };
    }

    let round = completed_rounds.saturating_add(1);
    match schedule.delay_before_round(round) {
        Some(delay) => RetryDecision::RetryAfter { round, delay },
        None => RetryDecision::Stop {
            reason: RetryReason::RoundsExhausted,
        },
    }
}
