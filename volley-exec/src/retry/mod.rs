mod backoff;
mod decision;
mod policy;

pub use backoff::{BackoffSchedule, BACKOFF_TENTHS, MAX_ROUNDS};
pub use decision::{decide_retry, RetryDecision, RetryReason};
pub use policy::{
    classify, FailureClass, RetryPolicy, StatusRetryPolicy, ThrottlePolicy, THROTTLE_STATUS,
};
