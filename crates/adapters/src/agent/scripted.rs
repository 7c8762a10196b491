// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted agent adapter for deterministic testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{AgentActivity, AgentAdapter, AgentError, AgentInvocation, AgentResponse};
use crate::cancel::CancelToken;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Cloneable failure description for scripted runs.
#[derive(Debug, Clone)]
pub enum ScriptedFailure {
    NonZeroExit { code: i32, stderr: String },
    Spawn(String),
    Timeout(Duration),
}

impl ScriptedFailure {
    fn to_error(&self) -> AgentError {
        match self {
            ScriptedFailure::NonZeroExit { code, stderr } => AgentError::NonZeroExit {
                code: *code,
                stderr: stderr.clone(),
            },
            ScriptedFailure::Spawn(message) => AgentError::Spawn(message.clone()),
            ScriptedFailure::Timeout(duration) => AgentError::Timeout(*duration),
        }
    }
}

/// One scripted adapter invocation: activities to stream, then a result.
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    activities: Vec<AgentActivity>,
    response: String,
    tokens: u64,
    delay: Option<Duration>,
    failure: Option<ScriptedFailure>,
    files: Vec<(String, String)>,
}

impl ScriptedRun {
    /// Successful run producing `response` on stdout.
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            activities: Vec::new(),
            response: response.into(),
            tokens: 0,
            delay: None,
            failure: None,
            files: Vec::new(),
        }
    }

    /// Run that fails with the given error after streaming activities.
    pub fn fail(failure: ScriptedFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::ok("")
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>, target: impl Into<String>) -> Self {
        self.activities.push(AgentActivity::Tool {
            tool: tool.into(),
            target: target.into(),
        });
        self
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.activities.push(AgentActivity::Progress(progress));
        self
    }

    pub fn with_tokens(mut self, tokens: u64) -> Self {
        self.tokens = tokens;
        self.activities.push(AgentActivity::Tokens(tokens));
        self
    }

    /// Simulated runtime before the result is produced.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Write a file (relative to the invocation cwd) during the run,
    /// the way a real agent would produce workspace artifacts.
    pub fn with_file(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.push((name.into(), contents.into()));
        self
    }
}

/// Recorded call to the scripted adapter.
#[derive(Debug, Clone)]
pub struct AgentCall {
    pub step_id: String,
    pub prompt: String,
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
}

#[derive(Default)]
struct ScriptedState {
    scripts: HashMap<String, VecDeque<ScriptedRun>>,
    calls: Vec<AgentCall>,
}

/// Fake adapter keyed by the `WAVE_STEP_ID` the executor injects.
///
/// Scripts queue per step id: each invocation consumes the next entry,
/// and the final entry is reused for any further attempts. Steps with no
/// script succeed with an empty response.
#[derive(Clone, Default)]
pub struct ScriptedAgentAdapter {
    inner: Arc<Mutex<ScriptedState>>,
}

impl ScriptedAgentAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a scripted run for a step. Call repeatedly to script
    /// successive retry attempts.
    pub fn script(&self, step_id: impl Into<String>, run: ScriptedRun) -> &Self {
        self.inner
            .lock()
            .scripts
            .entry(step_id.into())
            .or_default()
            .push_back(run);
        self
    }

    /// All recorded invocations, in call order.
    pub fn calls(&self) -> Vec<AgentCall> {
        self.inner.lock().calls.clone()
    }

    /// Number of invocations recorded for one step.
    pub fn run_count(&self, step_id: &str) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|c| c.step_id == step_id)
            .count()
    }

    fn next_run(&self, step_id: &str, invocation: &AgentInvocation) -> ScriptedRun {
        let mut inner = self.inner.lock();
        inner.calls.push(AgentCall {
            step_id: step_id.to_string(),
            prompt: invocation.prompt.clone(),
            cwd: invocation.cwd.clone(),
            env: invocation.env.clone(),
        });
        match inner.scripts.get_mut(step_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or_else(|| ScriptedRun::ok("")),
            Some(queue) => queue.front().cloned().unwrap_or_else(|| ScriptedRun::ok("")),
            None => ScriptedRun::ok(""),
        }
    }
}

fn step_id_of(invocation: &AgentInvocation) -> String {
    invocation
        .env
        .iter()
        .rev()
        .find(|(key, _)| key == "WAVE_STEP_ID")
        .map(|(_, value)| value.clone())
        .unwrap_or_default()
}

#[async_trait]
impl AgentAdapter for ScriptedAgentAdapter {
    async fn run(
        &self,
        invocation: AgentInvocation,
        activity_tx: mpsc::Sender<AgentActivity>,
        cancel: CancelToken,
    ) -> Result<AgentResponse, AgentError> {
        let step_id = step_id_of(&invocation);
        let run = self.next_run(&step_id, &invocation);

        if cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        for (name, contents) in &run.files {
            let path = invocation.cwd.join(name);
            if let Some(parent) = path.parent() {
                let _ = tokio::fs::create_dir_all(parent).await;
            }
            let _ = tokio::fs::write(&path, contents).await;
        }

        for activity in &run.activities {
            let _ = activity_tx.send(activity.clone()).await;
        }

        if let Some(delay) = run.delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(AgentError::Cancelled),
            }
        }

        match run.failure {
            Some(failure) => Err(failure.to_error()),
            None => Ok(AgentResponse {
                response: run.response,
                tokens: run.tokens,
            }),
        }
    }
}

#[cfg(test)]
#[path = "scripted_tests.rs"]
mod tests;
