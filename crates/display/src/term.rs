// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal capability probe.
//!
//! One immutable record detected at startup and passed by value to
//! everything that renders; tests construct the record directly instead
//! of faking globals.

use std::io::IsTerminal;

/// How much color the terminal understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// No escape sequences at all.
    Mono,
    /// 256-color palette.
    Ansi256,
    /// 24-bit RGB.
    TrueColor,
}

/// Immutable terminal capability record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermCaps {
    pub is_tty: bool,
    pub depth: ColorDepth,
    pub unicode: bool,
    pub width: u16,
    pub height: u16,
}

impl TermCaps {
    /// Probe the real terminal and environment.
    ///
    /// TTY via isatty (`WAVE_FORCE_TTY=1` overrides for CI); ANSI off
    /// when `TERM=dumb` or `NO_COLOR` is set; 24-bit when `COLORTERM`
    /// is `truecolor`/`24bit`; Unicode when `LC_ALL`/`LANG` mention
    /// UTF-8.
    pub fn detect() -> Self {
        let force_tty = std::env::var("WAVE_FORCE_TTY").is_ok_and(|v| v == "1");
        let is_tty = force_tty || std::io::stdout().is_terminal();
        let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));
        Self::from_env(is_tty, width, height, |name| std::env::var(name).ok())
    }

    /// Capability detection from explicit environment values.
    pub fn from_env(
        is_tty: bool,
        width: u16,
        height: u16,
        var: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let term = var("TERM").unwrap_or_default();
        let ansi = is_tty && term != "dumb" && var("NO_COLOR").is_none();
        let depth = if !ansi {
            ColorDepth::Mono
        } else if var("COLORTERM")
            .is_some_and(|v| v == "truecolor" || v == "24bit")
        {
            ColorDepth::TrueColor
        } else {
            ColorDepth::Ansi256
        };
        let unicode = [var("LC_ALL"), var("LANG")]
            .into_iter()
            .flatten()
            .any(|v| v.to_uppercase().contains("UTF-8") || v.to_uppercase().contains("UTF8"));
        Self {
            is_tty,
            depth,
            unicode,
            width,
            height,
        }
    }

    /// Fixed capabilities for tests and snapshot rendering.
    pub fn fixed(depth: ColorDepth, unicode: bool) -> Self {
        Self {
            is_tty: true,
            depth,
            unicode,
            width: 80,
            height: 24,
        }
    }

    pub fn ansi(&self) -> bool {
        self.depth != ColorDepth::Mono
    }

    /// Refresh width/height after a window size change.
    pub fn resized(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

#[cfg(test)]
#[path = "term_tests.rs"]
mod tests;
