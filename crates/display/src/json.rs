// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Newline-delimited JSON event stream.

use parking_lot::Mutex;
use std::io::Write;
use wave_core::{EmitError, ProgressEmitter, ProgressEvent};

/// Writes one JSON object per event. The pipeline-level terminal event
/// carries the full outcome summary in its `outcome` field.
pub struct JsonEmitter<W: Write + Send> {
    out: Mutex<W>,
}

impl JsonEmitter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> JsonEmitter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<W: Write + Send> ProgressEmitter for JsonEmitter<W> {
    fn emit(&self, event: &ProgressEvent) -> Result<(), EmitError> {
        let line = serde_json::to_string(event)
            .map_err(|e| EmitError::Sink(format!("serialize event: {e}")))?;
        let mut out = self.out.lock();
        writeln!(out, "{line}")?;
        // Terminal events must reach the consumer even if the process
        // dies right after
        if event.state.is_terminal() {
            out.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), EmitError> {
        self.out.lock().flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "json_tests.rs"]
mod tests;
