// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress event record for the Wave pipeline
//!
//! One immutable record describes one lifecycle transition or observation:
//! a step state change, a tool-activity sighting, a contract outcome, or a
//! pipeline-level terminal event. Events are produced by the executor and
//! adapter runner, flow through the emitter chain, and are never mutated
//! after publication.

use crate::id::{RunId, StepId};
use crate::outcome::PipelineOutcome;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Closed set of lifecycle states an event can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    Started,
    Running,
    StreamActivity,
    StepProgress,
    Validating,
    ContractPassed,
    ContractFailed,
    ContractSoftFailure,
    Retrying,
    Completed,
    Failed,
    Skipped,
    Cancelled,
    Warning,
}

impl StepState {
    pub fn name(&self) -> &'static str {
        match self {
            StepState::Started => "started",
            StepState::Running => "running",
            StepState::StreamActivity => "stream_activity",
            StepState::StepProgress => "step_progress",
            StepState::Validating => "validating",
            StepState::ContractPassed => "contract_passed",
            StepState::ContractFailed => "contract_failed",
            StepState::ContractSoftFailure => "contract_soft_failure",
            StepState::Retrying => "retrying",
            StepState::Completed => "completed",
            StepState::Failed => "failed",
            StepState::Skipped => "skipped",
            StepState::Cancelled => "cancelled",
            StepState::Warning => "warning",
        }
    }

    /// True for states that end a step's lifecycle.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepState::Completed | StepState::Failed | StepState::Skipped | StepState::Cancelled
        )
    }
}

/// A tool invocation observed in the adapter's output stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolActivity {
    pub tool: String,
    pub target: String,
}

impl ToolActivity {
    pub fn new(tool: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            target: target.into(),
        }
    }
}

impl std::fmt::Display for ToolActivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} → {}", self.tool, self.target)
    }
}

/// Immutable record of one lifecycle transition or observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Milliseconds since the Unix epoch at publication time.
    pub timestamp_ms: u64,
    pub run_id: RunId,
    /// Absent for pipeline-level events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<StepId>,
    pub state: StepState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Step progress 0–100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolActivity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<PathBuf>,
    /// Outcome summary carried by the pipeline-level terminal event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<PipelineOutcome>,
}

impl ProgressEvent {
    /// Event for a specific step.
    pub fn step(run_id: RunId, step_id: StepId, state: StepState, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            run_id,
            step_id: Some(step_id),
            state,
            persona: None,
            message: None,
            progress: None,
            duration_ms: None,
            tokens: None,
            tool: None,
            artifacts: Vec::new(),
            outcome: None,
        }
    }

    /// Pipeline-level event (no step id).
    pub fn pipeline(run_id: RunId, state: StepState, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            run_id,
            step_id: None,
            state,
            persona: None,
            message: None,
            progress: None,
            duration_ms: None,
            tokens: None,
            tool: None,
            artifacts: Vec::new(),
            outcome: None,
        }
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Clamps to 100.
    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress.min(100));
        self
    }

    pub fn with_duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_tool(mut self, tool: ToolActivity) -> Self {
        self.tool = Some(tool);
        self
    }

    pub fn with_artifacts(mut self, artifacts: Vec<PathBuf>) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn with_outcome(mut self, outcome: PipelineOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn is_stream_activity(&self) -> bool {
        self.state == StepState::StreamActivity
    }

    /// Pipeline-level event, i.e. no step id attached.
    pub fn is_pipeline_level(&self) -> bool {
        self.step_id.is_none()
    }

    /// One-line summary for structured logs.
    pub fn log_summary(&self) -> String {
        let t = self.state.name();
        match (&self.step_id, &self.tool) {
            (Some(step), Some(tool)) => format!("{t} step={step} tool={tool}"),
            (Some(step), None) => format!("{t} step={step}"),
            (None, _) => format!("{t} run={}", self.run_id),
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
