// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running-step spinner.

const UNICODE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const ASCII_FRAMES: &[&str] = &["|", "/", "-", "\\"];

/// Milliseconds per spinner frame.
const FRAME_MS: u64 = 80;

/// Frame selection is a pure function of wall-clock time; the spinner
/// itself only tracks whether it is running. `start`/`stop` are
/// idempotent: start → stop → start leaves exactly one running spinner.
#[derive(Debug, Clone)]
pub struct Spinner {
    frames: &'static [&'static str],
    running: bool,
}

impl Spinner {
    pub fn new(unicode: bool) -> Self {
        Self {
            frames: if unicode { UNICODE_FRAMES } else { ASCII_FRAMES },
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current frame, or a space when stopped.
    pub fn frame(&self, now_ms: u64) -> &'static str {
        if !self.running {
            return " ";
        }
        let index = (now_ms / FRAME_MS) as usize % self.frames.len();
        self.frames[index]
    }
}

#[cfg(test)]
#[path = "spinner_tests.rs"]
mod tests;
