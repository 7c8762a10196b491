// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-writer fan-out to multiple sinks.

use std::sync::Arc;
use wave_core::{EmitError, ProgressEmitter, ProgressEvent};

/// Delivers every event to every sink in registration order.
///
/// Each sink observes the same stream in the same order the producer
/// emitted it. A failing sink is logged and skipped; it never blocks
/// delivery to the others.
#[derive(Clone, Default)]
pub struct FanoutEmitter {
    sinks: Vec<Arc<dyn ProgressEmitter>>,
}

impl FanoutEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressEmitter>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl ProgressEmitter for FanoutEmitter {
    fn emit(&self, event: &ProgressEvent) -> Result<(), EmitError> {
        for sink in &self.sinks {
            if let Err(e) = sink.emit(event) {
                tracing::warn!(error = %e, event = %event.log_summary(), "sink rejected event");
            }
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), EmitError> {
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                tracing::warn!(error = %e, "sink flush failed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fanout_tests.rs"]
mod tests;
