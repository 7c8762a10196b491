// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One human-readable line per lifecycle event.

use parking_lot::Mutex;
use std::io::Write;
use wave_core::{time_fmt, EmitError, ProgressEmitter, ProgressEvent};

/// Timestamped plain-text emitter for non-TTY runs.
pub struct BasicEmitter<W: Write + Send> {
    out: Mutex<W>,
}

impl BasicEmitter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> BasicEmitter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

/// `HH:MM:SS` (UTC) from an epoch-milliseconds stamp.
fn clock_time(timestamp_ms: u64) -> String {
    let secs_of_day = (timestamp_ms / 1000) % 86_400;
    format!(
        "{:02}:{:02}:{:02}",
        secs_of_day / 3600,
        (secs_of_day % 3600) / 60,
        secs_of_day % 60
    )
}

fn format_line(event: &ProgressEvent) -> String {
    let mut line = format!("{} {:<21}", clock_time(event.timestamp_ms), event.state.name());
    if let Some(step_id) = &event.step_id {
        line.push_str(&format!(" [{step_id}]"));
    }
    if let Some(tool) = &event.tool {
        line.push_str(&format!(" {tool}"));
    }
    if let Some(progress) = event.progress {
        line.push_str(&format!(" {progress}%"));
    }
    if let Some(message) = &event.message {
        line.push_str(&format!(" {message}"));
    }
    if let Some(duration_ms) = event.duration_ms {
        line.push_str(&format!(" ({})", time_fmt::format_duration_ms(duration_ms)));
    }
    line
}

impl<W: Write + Send> ProgressEmitter for BasicEmitter<W> {
    fn emit(&self, event: &ProgressEvent) -> Result<(), EmitError> {
        let mut out = self.out.lock();
        writeln!(out, "{}", format_line(event))?;
        Ok(())
    }

    fn flush(&self) -> Result<(), EmitError> {
        self.out.lock().flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "basic_tests.rs"]
mod tests;
