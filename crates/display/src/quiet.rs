// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Quiet emitter: pipeline-level terminal lines only.

use parking_lot::Mutex;
use std::io::Write;
use wave_core::{EmitError, ProgressEmitter, ProgressEvent, StepState};

/// Prints exactly one line for the pipeline-level `completed` or
/// `failed` event and swallows everything else.
pub struct QuietEmitter<W: Write + Send> {
    out: Mutex<W>,
}

impl QuietEmitter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> QuietEmitter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl<W: Write + Send> ProgressEmitter for QuietEmitter<W> {
    fn emit(&self, event: &ProgressEvent) -> Result<(), EmitError> {
        if !event.is_pipeline_level()
            || !matches!(event.state, StepState::Completed | StepState::Failed)
        {
            return Ok(());
        }
        let mut out = self.out.lock();
        match &event.message {
            Some(message) => writeln!(out, "{}: {message}", event.state.name())?,
            None => writeln!(out, "{}", event.state.name())?,
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "quiet_tests.rs"]
mod tests;
