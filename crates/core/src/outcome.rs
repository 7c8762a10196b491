// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Final run outcome and recovery hints.

use crate::deliverable::Deliverable;
use crate::id::{RunId, StepId};
use serde::{Deserialize, Serialize};

/// Branch produced by the run (first branch deliverable wins).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchInfo {
    pub name: String,
    pub pushed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_error: Option<String>,
}

/// Typed link extracted from the tracker (PR, issue, deployment).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub step_id: StepId,
    pub label: String,
    pub url: String,
}

/// A contract that rejected its step's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedContract {
    pub step_id: StepId,
    pub schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// What a recovery hint does when run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintKind {
    Resume,
    Force,
    Workspace,
    Debug,
}

/// One actionable follow-up attached to a terminal failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryHint {
    pub kind: HintKind,
    pub label: String,
    pub command: String,
}

impl RecoveryHint {
    pub fn new(kind: HintKind, label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            command: command.into(),
        }
    }
}

/// Immutable summary produced once by the aggregator after the scheduler
/// returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub run_id: RunId,
    pub pipeline_name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<BranchInfo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prs: Vec<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deployments: Vec<Link>,
    /// Unique artifact files across all steps (path-deduplicated).
    pub artifact_count: usize,
    pub contract_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_contracts: Vec<FailedContract>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<RecoveryHint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deliverables: Vec<Deliverable>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_steps: Vec<StepId>,
}

impl PipelineOutcome {
    /// Process exit code: `0` on success, a single non-zero otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.success {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
