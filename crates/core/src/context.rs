// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Value-type snapshot consumed by the render model.

use crate::event::ToolActivity;
use crate::handover::HandoverInfo;
use crate::id::{RunId, StepId};
use crate::status::{DisplayState, StepStatus};
use indexmap::IndexMap;
use std::path::PathBuf;

/// Exact bundle of state the render model consumes.
///
/// Produced by the dashboard assembler from its mutable state under lock
/// and handed out by value; snapshots are never shared by reference
/// across tasks.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    pub run_id: RunId,
    pub pipeline_name: String,
    pub manifest_path: Option<PathBuf>,
    pub workspace_root: Option<PathBuf>,
    pub total_steps: usize,
    /// 1-based position of the primary running step, 0 before any start.
    pub current_step: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Overall progress 0–100; monotonic across a run's lifetime.
    pub progress: f64,
    /// Keyed by step id; iteration uses [`Self::step_order`].
    pub steps: IndexMap<StepId, StepStatus>,
    /// Declared step order — the only authority for display ordering.
    pub step_order: Vec<StepId>,
    /// Most recent tool activity per running step.
    pub tool_activity: IndexMap<StepId, ToolActivity>,
    pub handover: IndexMap<StepId, HandoverInfo>,
    pub current_action: Option<String>,
    pub last_tool: Option<ToolActivity>,
    pub tokens: u64,
    pub elapsed_ms: u64,
    pub verbose: bool,
}

impl PipelineContext {
    /// First Running step in declared order. The primary step drives the
    /// single-step elapsed readout when several steps run concurrently.
    pub fn primary_running_step(&self) -> Option<&StepId> {
        self.step_order
            .iter()
            .find(|id| self.state_of(id) == Some(DisplayState::Running))
    }

    pub fn state_of(&self, id: &StepId) -> Option<DisplayState> {
        self.steps.get(id.as_str()).map(|s| s.state)
    }

    /// Weighted overall progress: completed steps contribute full weight,
    /// running steps their partial progress, clamped to `[0,100]`.
    pub fn weighted_progress(&self) -> f64 {
        if self.total_steps == 0 {
            return 0.0;
        }
        let mut units = 0.0f64;
        for id in &self.step_order {
            let Some(status) = self.steps.get(id.as_str()) else {
                continue;
            };
            match status.state {
                DisplayState::Completed | DisplayState::Skipped => units += 1.0,
                DisplayState::Running => units += f64::from(status.progress) / 100.0,
                _ => {}
            }
        }
        (units / self.total_steps as f64 * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
