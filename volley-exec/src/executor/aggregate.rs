use std::collections::{HashMap, HashSet};

use volley_core::{BatchResult, Failure, ItemId, Outcome, Success};

/// Accumulates outcomes as operations settle.
///
/// Failures of a retry set are purged before that round runs, so an id is
/// never in both lists.
#[derive(Debug)]
pub struct Aggregator<T> {
    successful: Vec<Success<T>>,
    failed: Vec<Failure>,
    attempts: HashMap<ItemId, u32>,
}

impl<T> Default for Aggregator<T> {
    fn default() -> Self {
        Self {
            successful: Vec::new(),
            failed: Vec::new(),
            attempts: HashMap::new(),
        }
    }
}

impl<T> Aggregator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a new attempt of `id`; returns the 1-based attempt number.
    pub fn begin_attempt(&mut self, id: &ItemId) -> u32 {
        let n = self.attempts.entry(id.clone()).or_insert(0);
        *n += 1;
        *n
    }

    /// Drop the provisional failures of every id in `ids`.
    pub fn purge_failed(&mut self, ids: &HashSet<ItemId>) -> usize {
        let before = self.failed.len();
        self.failed.retain(|f| !ids.contains(&f.id));
        before - self.failed.len()
    }

    pub fn record(&mut self, outcome: Outcome<T>) {
        match outcome {
            Outcome::Success(s) => self.successful.push(s),
            Outcome::Failure(f) => self.failed.push(f),
        }
    }

    pub fn successful(&self) -> &[Success<T>] {
        &self.successful
    }

    pub fn failed(&self) -> &[Failure] {
        &self.failed
    }

    pub fn attempts(&self, id: &ItemId) -> u32 {
        self.attempts.get(id).copied().unwrap_or(0)
    }

    pub fn into_result(self, cancelled: bool, rounds: u32) -> BatchResult<T> {
        BatchResult {
            successful: self.successful,
            failed: self.failed,
            cancelled,
            rounds,
        }
    }
}
