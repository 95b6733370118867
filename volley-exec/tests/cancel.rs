use std::time::Duration;

use volley_exec::{CancellationGate, CancellationToken, NeverCancelled};

#[test]
fn token_starts_live_and_clones_share_state() {
    let token = CancellationToken::new();
    let clone = token.clone();
    assert!(!token.is_cancelled());

    clone.cancel();
    assert!(token.is_cancelled());
    assert!(CancellationGate::is_cancelled(&token));

    // Idempotent.
    token.cancel();
    assert!(clone.is_cancelled());
}

#[test]
fn never_cancelled_never_fires() {
    assert!(!NeverCancelled.is_cancelled());
}

#[test]
fn closures_are_gates() {
    let gate = || true;
    assert!(gate.is_cancelled());
}

#[tokio::test]
async fn cancelled_future_resolves_after_cancel() {
    let token = CancellationToken::new();
    let waiter = {
        let token = token.clone();
        tokio::spawn(async move { token.cancelled().await })
    };
    tokio::task::yield_now().await;
    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("waiter should wake")
        .unwrap();
}

#[tokio::test]
async fn cancelled_future_returns_immediately_when_already_cancelled() {
    let token = CancellationToken::new();
    token.cancel();
    tokio::time::timeout(Duration::from_millis(100), token.cancelled())
        .await
        .expect("already cancelled");
}

#[tokio::test]
async fn token_gate_signals_cancellation() {
    let token = CancellationToken::new();
    let gate: &dyn CancellationGate = &token;
    token.cancel();
    tokio::time::timeout(Duration::from_millis(100), gate.wait_for_cancel())
        .await
        .expect("token gate resolves once cancelled");
}

#[tokio::test(start_paused = true)]
async fn predicate_gate_never_signals() {
    let gate = || true;
    let waited = tokio::time::timeout(Duration::from_secs(5), gate.wait_for_cancel()).await;
    assert!(waited.is_err());
}
