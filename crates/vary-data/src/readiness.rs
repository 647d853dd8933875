//! One-shot readiness signal
//!
//! The gate starts `Pending` and flips to `Ready` exactly once, after the
//! first load pass over all tracked entities settles. Waiting never fails:
//! the gate owns its sender, so the channel cannot close under a waiter.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// Gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessState {
    /// Initial load still running
    Pending,
    /// Initial load settled
    Ready,
}

/// Cloneable handle to a shared readiness signal
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    tx: Arc<watch::Sender<ReadinessState>>,
}

impl ReadinessGate {
    /// New pending gate
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ReadinessState::Pending);
        Self { tx: Arc::new(tx) }
    }

    /// Current state
    #[inline]
    #[must_use]
    pub fn state(&self) -> ReadinessState {
        *self.tx.borrow()
    }

    /// Whether the gate has opened
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state() == ReadinessState::Ready
    }

    /// Open the gate; returns `true` only for the call that opened it
    pub fn mark_ready(&self) -> bool {
        let opened = self.tx.send_if_modified(|state| {
            if *state == ReadinessState::Ready {
                false
            } else {
                *state = ReadinessState::Ready;
                true
            }
        });
        if opened {
            tracing::info!("readiness gate opened");
        }
        opened
    }

    /// Resolve once the gate is open
    pub async fn when_ready(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|state| *state == ReadinessState::Ready).await;
    }
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}
