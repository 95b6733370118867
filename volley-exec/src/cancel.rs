//! Cooperative cancellation.
//!
//! The engine only ever polls a [`CancellationGate`]; it is checked at chunk
//! and round boundaries and never interrupts an operation already in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::{self, BoxFuture, FutureExt};
use tokio::sync::Notify;

pub trait CancellationGate: Send + Sync {
    fn is_cancelled(&self) -> bool;

    /// Resolves once cancellation is requested, for gates that can signal it.
    ///
    /// Used only to cut pacing and backoff sleeps short; the default never
    /// resolves and the gate is still polled when the sleep ends.
    fn wait_for_cancel(&self) -> BoxFuture<'_, ()> {
        future::pending().boxed()
    }
}

impl<F> CancellationGate for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Gate that never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl CancellationGate for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Caller-owned cancellation flag. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenState>,
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Waiters are woken exactly once.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            self.inner.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

impl CancellationGate for CancellationToken {
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }

    fn wait_for_cancel(&self) -> BoxFuture<'_, ()> {
        CancellationToken::cancelled(self).boxed()
    }
}

/// Sleep for `delay`, returning early if `gate` signals cancellation.
pub(crate) async fn sleep_unless_cancelled(gate: &dyn CancellationGate, delay: Duration) {
    if delay.is_zero() {
        return;
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = gate.wait_for_cancel() => {}
    }
}
