// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent adapter abstraction
//!
//! A step's actual work is done by an external CLI agent launched as a
//! child process. The `AgentAdapter` trait encapsulates the launch,
//! stdout stream parsing, and termination handling; the executor stays
//! ignorant of how the agent runs.

mod activity;
mod process;

pub use activity::{parse_activity, AgentActivity};
pub use process::ProcessAgentAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod scripted;
#[cfg(any(test, feature = "test-support"))]
pub use scripted::{AgentCall, ScriptedAgentAdapter, ScriptedFailure, ScriptedRun};

use crate::cancel::CancelToken;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from running an agent process.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("failed to spawn adapter: {0}")]
    Spawn(String),
    #[error("adapter exited with status {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },
    #[error("adapter killed by signal {signal}")]
    Signal { signal: i32, stderr: String },
    #[error("adapter timed out after {0:?}")]
    Timeout(Duration),
    #[error("adapter cancelled")]
    Cancelled,
    #[error("adapter io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Adapter executable plus its fixed arguments.
///
/// The composed prompt is appended as one additional argv entry at
/// launch; it is never shell-split. That is a load-bearing contract with
/// the adapter: the full prompt must arrive as a single argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl AgentCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Split a configured command string on whitespace into program and
    /// fixed arguments. Only the configured portion is split; the prompt
    /// is appended verbatim later.
    pub fn parse(command: &str) -> Result<Self, AgentError> {
        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| AgentError::Spawn("empty adapter command".to_string()))?;
        Ok(Self {
            program: program.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }
}

/// One adapter launch request.
#[derive(Debug, Clone)]
pub struct AgentInvocation {
    pub command: AgentCommand,
    /// Composed prompt, passed as a single argv entry.
    pub prompt: String,
    /// Working directory (the step workspace).
    pub cwd: PathBuf,
    /// Environment applied in order; later entries win on collision.
    pub env: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

/// What a finished agent produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResponse {
    /// Full stdout body, stream-activity markers included.
    pub response: String,
    /// Last token total the agent reported, 0 when it reported none.
    pub tokens: u64,
}

/// Runs external agents for the step executor.
#[async_trait]
pub trait AgentAdapter: Clone + Send + Sync + 'static {
    /// Launch the agent and wait for it to finish.
    ///
    /// Recognized stream-activity markers parsed from stdout are sent on
    /// `activity_tx` as they appear. On cancellation the child receives a
    /// terminate signal, then a kill after a bounded grace period; the
    /// call returns [`AgentError::Cancelled`]. A timeout behaves the same
    /// with [`AgentError::Timeout`].
    async fn run(
        &self,
        invocation: AgentInvocation,
        activity_tx: mpsc::Sender<AgentActivity>,
        cancel: CancelToken,
    ) -> Result<AgentResponse, AgentError>;
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
