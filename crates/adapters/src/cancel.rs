// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Level-triggered cancellation token.
//!
//! One token is propagated top-down (scheduler → executor → adapter
//! runner); any clone can trigger it and late observers still see the
//! cancelled state. No operation in the engine is permitted to block
//! indefinitely without selecting on [`CancelToken::cancelled`].

use std::sync::Arc;
use tokio::sync::watch;

/// Clonable cancellation handle.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Trigger cancellation. Idempotent; observable by all clones.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is observed. Completes immediately when
    /// the token is already cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        // wait_for returns Err only when every sender is gone; treat a
        // vanished origin as cancellation so waiters never hang.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Trigger this token when the process receives SIGINT or SIGTERM.
    pub fn cancel_on_signals(&self) {
        let token = self.clone();
        tokio::spawn(async move {
            let ctrl_c = tokio::signal::ctrl_c();
            #[cfg(unix)]
            {
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(mut terminate) => {
                        tokio::select! {
                            _ = ctrl_c => {}
                            _ = terminate.recv() => {}
                        }
                    }
                    Err(_) => {
                        let _ = ctrl_c.await;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                let _ = ctrl_c.await;
            }
            tracing::info!("interrupt received, cancelling run");
            token.cancel();
        });
    }

    /// Derive a token that cancels when either the parent cancels or the
    /// child is cancelled directly. Lets a scheduler abort its own run
    /// without disturbing the caller's handle.
    pub fn child(&self) -> CancelToken {
        let child = CancelToken::new();
        let parent = self.clone();
        let forward = child.clone();
        tokio::spawn(async move {
            parent.cancelled().await;
            forward.cancel();
        });
        child
    }
}

#[cfg(test)]
#[path = "cancel_tests.rs"]
mod tests;
