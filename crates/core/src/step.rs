// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolved step definitions.
//!
//! The manifest layer (out of scope here) resolves the dependency graph to
//! a linear order with optional concurrency groups; these types are the
//! interface it hands to the scheduler.

use crate::id::StepId;
use serde::{Deserialize, Serialize};

/// How a step's workspace is allocated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceMode {
    /// Fresh directory under `<workspace-root>/<runID>/<stepID>/`.
    Isolated,
    /// Attach to a worktree shared by every step naming the same group.
    Shared(String),
}

/// Declared validator for a step's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDecl {
    /// Schema label resolved by the validator registry (e.g. `"review-v1"`).
    pub schema: String,
    /// Extract an embedded JSON object from the response as a structured
    /// artifact before validation.
    pub expect_json: bool,
    /// A failing optional contract records the failure without aborting
    /// the step.
    pub optional: bool,
    /// File names the contract expects the step to produce; mirrored to
    /// `.wave/artifacts/<stepID>/` when present.
    pub artifacts: Vec<String>,
}

impl ContractDecl {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            expect_json: false,
            optional: false,
            artifacts: Vec::new(),
        }
    }

    pub fn expect_json(mut self) -> Self {
        self.expect_json = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_artifact(mut self, name: impl Into<String>) -> Self {
        self.artifacts.push(name.into());
        self
    }
}

/// Retry behavior for transient runtime failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first (1 = no retry).
    pub max_attempts: u32,
    /// Backoff before attempt N+1 is `base_delay_ms * 2^(N-1)`.
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub fn attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Delay before the given retry (attempt numbers start at 1).
    pub fn backoff_ms(&self, completed_attempts: u32) -> u64 {
        self.base_delay_ms
            .saturating_mul(1u64 << completed_attempts.saturating_sub(1).min(16))
    }
}

/// One node of the resolved pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: StepId,
    /// Human-readable name shown by displays.
    pub name: String,
    /// Persona label; resolved to a system prompt by the run context.
    pub persona: Option<String>,
    pub prompt_template: String,
    pub contract: Option<ContractDecl>,
    pub retry: RetryPolicy,
    /// A failed optional step is logged but does not abort the pipeline.
    pub optional: bool,
    /// Consecutive steps sharing a group name run concurrently.
    pub concurrency_group: Option<String>,
    pub workspace: WorkspaceMode,
    /// Step-level environment; wins over run-level vars on collision.
    pub env: Vec<(String, String)>,
}

impl StepDefinition {
    pub fn new(id: impl Into<StepId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            persona: None,
            prompt_template: String::new(),
            contract: None,
            retry: RetryPolicy::default(),
            optional: false,
            concurrency_group: None,
            workspace: WorkspaceMode::Isolated,
            env: Vec::new(),
        }
    }

    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = Some(persona.into());
        self
    }

    pub fn with_prompt(mut self, template: impl Into<String>) -> Self {
        self.prompt_template = template.into();
        self
    }

    pub fn with_contract(mut self, contract: ContractDecl) -> Self {
        self.contract = Some(contract);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.concurrency_group = Some(group.into());
        self
    }

    pub fn shared_workspace(mut self, group: impl Into<String>) -> Self {
        self.workspace = WorkspaceMode::Shared(group.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
