// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Handover metadata passed from a completed step to its successor.

use crate::id::StepId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Contract outcome recorded in a handover.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// No contract declared or not yet validated.
    #[default]
    Empty,
    Passed,
    Failed,
    SoftFailure,
}

impl ContractStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ContractStatus::Empty => "",
            ContractStatus::Passed => "passed",
            ContractStatus::Failed => "failed",
            ContractStatus::SoftFailure => "soft_failure",
        }
    }
}

/// Created on the first contract event for a step, finalized on step
/// completion, read by the outcome aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandoverInfo {
    pub artifacts: Vec<PathBuf>,
    pub contract_status: ContractStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_step: Option<StepId>,
}
