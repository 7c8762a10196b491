// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test helpers shared across crates (behind the `test-support` feature).

use crate::emitter::{EmitError, ProgressEmitter};
use crate::event::{ProgressEvent, StepState};
use parking_lot::Mutex;
use std::sync::Arc;

/// Emitter that records every event for later assertions.
#[derive(Debug, Clone, Default)]
pub struct CaptureEmitter {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
    flushes: Arc<Mutex<usize>>,
}

impl CaptureEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in delivery order.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    /// Events delivered for one step id, in delivery order.
    pub fn events_for(&self, step_id: &str) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.step_id.as_ref().is_some_and(|s| s == step_id))
            .cloned()
            .collect()
    }

    /// State tags delivered for one step id, in delivery order.
    pub fn states_for(&self, step_id: &str) -> Vec<StepState> {
        self.events_for(step_id).iter().map(|e| e.state).collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn flush_count(&self) -> usize {
        *self.flushes.lock()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl ProgressEmitter for CaptureEmitter {
    fn emit(&self, event: &ProgressEvent) -> Result<(), EmitError> {
        self.events.lock().push(event.clone());
        Ok(())
    }

    fn flush(&self) -> Result<(), EmitError> {
        *self.flushes.lock() += 1;
        Ok(())
    }
}

/// Emitter whose `emit` always fails; exercises fan-out isolation.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingEmitter;

impl ProgressEmitter for FailingEmitter {
    fn emit(&self, _event: &ProgressEvent) -> Result<(), EmitError> {
        Err(EmitError::Sink("failing emitter".to_string()))
    }
}
