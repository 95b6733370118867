use std::collections::BTreeSet;

use volley_core::Failure;

/// How the remote endpoint's failures are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// 403 without a network flag: the endpoint is throttling us.
    TransientThrottle,
    /// Connection refused/reset, timeout, DNS. Never retried.
    NetworkFailure,
    OtherTerminal,
}

impl FailureClass {
    pub fn is_retryable(self) -> bool {
        matches!(self, FailureClass::TransientThrottle)
    }
}

pub const THROTTLE_STATUS: u16 = 403;

pub fn classify(status: Option<u16>, is_network_error: bool) -> FailureClass {
    if is_network_error {
        return FailureClass::NetworkFailure;
    }
    match status {
        Some(THROTTLE_STATUS) => FailureClass::TransientThrottle,
        _ => FailureClass::OtherTerminal,
    }
}

/// Decides which failures get another attempt.
pub trait RetryPolicy: Send + Sync {
    fn is_retryable(&self, failure: &Failure) -> bool;
}

impl<F> RetryPolicy for F
where
    F: Fn(&Failure) -> bool + Send + Sync,
{
    fn is_retryable(&self, failure: &Failure) -> bool {
        self(failure)
    }
}

/// Default policy: only 403 is a throttling signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThrottlePolicy;

impl RetryPolicy for ThrottlePolicy {
    fn is_retryable(&self, failure: &Failure) -> bool {
        classify(failure.status, failure.is_network_error).is_retryable()
    }
}

/// Retries any status in a configured set, for endpoints that throttle with
/// 429 / 503 instead of 403. Network failures stay terminal.
#[derive(Debug, Clone)]
pub struct StatusRetryPolicy {
    statuses: BTreeSet<u16>,
}

impl StatusRetryPolicy {
    pub fn new(statuses: impl IntoIterator<Item = u16>) -> Self {
        Self {
            statuses: statuses.into_iter().collect(),
        }
    }

    pub fn statuses(&self) -> &BTreeSet<u16> {
        &self.statuses
    }
}

impl RetryPolicy for StatusRetryPolicy {
    fn is_retryable(&self, failure: &Failure) -> bool {
        if failure.is_network_error {
            return false;
        }
        failure
            .status
            .is_some_and(|s| self.statuses.contains(&s))
    }
}
