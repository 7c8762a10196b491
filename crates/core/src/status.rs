// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-step display status state machine.

use crate::id::StepId;
use serde::{Deserialize, Serialize};

/// State of a step as tracked by a display sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayState {
    NotStarted,
    Running,
    Completed,
    Failed,
    Skipped,
    Cancelled,
}

impl DisplayState {
    /// Terminal states are absorbing: once reached, no further
    /// transitions are accepted.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DisplayState::Completed
                | DisplayState::Failed
                | DisplayState::Skipped
                | DisplayState::Cancelled
        )
    }
}

/// Mutable per-step status owned by a display sink.
///
/// Created on the first event mentioning the step; destroyed with its
/// owning display.
#[derive(Debug, Clone)]
pub struct StepStatus {
    pub step_id: StepId,
    pub name: String,
    pub persona: Option<String>,
    pub state: DisplayState,
    pub started_at_ms: Option<u64>,
    pub finished_at_ms: Option<u64>,
    pub duration_ms: u64,
    pub tokens: u64,
    pub message: Option<String>,
    pub progress: u8,
}

impl StepStatus {
    pub fn new(step_id: StepId, name: impl Into<String>) -> Self {
        Self {
            step_id,
            name: name.into(),
            persona: None,
            state: DisplayState::NotStarted,
            started_at_ms: None,
            finished_at_ms: None,
            duration_ms: 0,
            tokens: 0,
            message: None,
            progress: 0,
        }
    }

    /// Attempt a state transition. Returns `false` (and leaves the status
    /// untouched) when the current state is terminal, so a duplicated
    /// terminal event can never double-count durations or completions.
    pub fn transition(&mut self, next: DisplayState, now_ms: u64) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        if next == DisplayState::Running && self.started_at_ms.is_none() {
            self.started_at_ms = Some(now_ms);
        }
        if next.is_terminal() {
            self.finished_at_ms = Some(now_ms);
            if self.duration_ms == 0 {
                if let Some(start) = self.started_at_ms {
                    self.duration_ms = now_ms.saturating_sub(start);
                }
            }
            if next == DisplayState::Completed {
                self.progress = 100;
            }
        }
        self.state = next;
        true
    }

    /// Update partial progress; ignored once the step is terminal.
    pub fn set_progress(&mut self, progress: u8) {
        if !self.state.is_terminal() {
            self.progress = progress.min(100);
        }
    }

    /// Elapsed milliseconds: frozen duration once terminal, live
    /// wall-clock distance while running.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        if self.state.is_terminal() {
            self.duration_ms
        } else {
            self.started_at_ms
                .map(|start| now_ms.saturating_sub(start))
                .unwrap_or(0)
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
