use std::time::Duration;

use volley_core::RetryConfig;

/// Multipliers of the base delay before retry rounds 1, 2 and 3, in tenths:
/// 2.5x, 7.5x and 15x.
pub const BACKOFF_TENTHS: [u32; 3] = [25, 75, 150];

pub const MAX_ROUNDS: u32 = BACKOFF_TENTHS.len() as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffSchedule {
    base: Duration,
}

impl BackoffSchedule {
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max_rounds(&self) -> u32 {
        MAX_ROUNDS
    }

    /// Wait before retry round `round` (1-based). None past the last round.
    pub fn delay_before_round(&self, round: u32) -> Option<Duration> {
        let idx = usize::try_from(round.checked_sub(1)?).ok()?;
        BACKOFF_TENTHS
            .get(idx)
            .map(|tenths| self.base.saturating_mul(*tenths) / 10)
    }
}

impl From<&RetryConfig> for BackoffSchedule {
    fn from(cfg: &RetryConfig) -> Self {
        Self::new(cfg.base_delay)
    }
}

impl Default for BackoffSchedule {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}
