// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream-activity throttling decorator.
//!
//! Tool-activity bursts from an adapter can exceed 100 Hz; unthrottled
//! they flood every sink, and out-of-order coalescing would corrupt
//! step transitions. Only `stream_activity` events are throttled — all
//! other states pass through immediately, flushing any pending activity
//! first so causal order is preserved.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wave_core::{Clock, EmitError, ProgressEmitter, ProgressEvent, SystemClock};

/// Default throttle window.
const DEFAULT_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct ThrottleState {
    window_start: Option<Instant>,
    pending: Option<ProgressEvent>,
}

/// Decorator enforcing the stream-activity throttle policy:
///
/// 1. The first `stream_activity` after start or window expiry passes
///    through and opens a window.
/// 2. Further `stream_activity` within the window is retained as
///    pending, last write wins.
/// 3. Any non-`stream_activity` event flushes the pending activity
///    first, then passes through.
/// 4. A `stream_activity` arriving after window expiry passes through,
///    opens a fresh window, and clears the pending slot.
///
/// One `pending + window-start` pair under a mutex; no tasks or timers
/// are spawned per event.
pub struct ThrottledEmitter<C: Clock = SystemClock> {
    inner: Arc<dyn ProgressEmitter>,
    window: Duration,
    clock: C,
    state: Mutex<ThrottleState>,
}

impl ThrottledEmitter<SystemClock> {
    pub fn new(inner: Arc<dyn ProgressEmitter>) -> Self {
        Self::with_clock(inner, DEFAULT_WINDOW, SystemClock)
    }
}

impl<C: Clock> ThrottledEmitter<C> {
    pub fn with_clock(inner: Arc<dyn ProgressEmitter>, window: Duration, clock: C) -> Self {
        Self {
            inner,
            window,
            clock,
            state: Mutex::new(ThrottleState::default()),
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }
}

impl<C: Clock> ProgressEmitter for ThrottledEmitter<C> {
    fn emit(&self, event: &ProgressEvent) -> Result<(), EmitError> {
        if event.is_stream_activity() {
            let now = self.clock.now();
            let mut state = self.state.lock();
            let in_window = state
                .window_start
                .is_some_and(|start| now.duration_since(start) < self.window);
            if in_window {
                // Last write wins; the newest activity is what matters
                state.pending = Some(event.clone());
                return Ok(());
            }
            state.window_start = Some(now);
            state.pending = None;
            drop(state);
            return self.inner.emit(event);
        }

        // Flush pending activity ahead of the new event to keep causal order
        let pending = self.state.lock().pending.take();
        if let Some(pending) = pending {
            self.inner.emit(&pending)?;
        }
        self.inner.emit(event)
    }

    fn flush(&self) -> Result<(), EmitError> {
        let pending = self.state.lock().pending.take();
        if let Some(pending) = pending {
            self.inner.emit(&pending)?;
        }
        self.inner.flush()
    }
}

#[cfg(test)]
#[path = "throttle_tests.rs"]
mod tests;
