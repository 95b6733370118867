use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts operations currently in flight and the highest count seen.
#[derive(Debug, Default)]
pub struct InFlightGauge {
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(self: &Arc<Self>) -> InFlightGuard {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard {
            gauge: Arc::clone(self),
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// Held by a running operation; leaving the gauge happens on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    gauge: Arc<InFlightGauge>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.active.fetch_sub(1, Ordering::SeqCst);
    }
}
