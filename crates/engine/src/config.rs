// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-run configuration assembled by the caller.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use wave_core::{RunId, StepId};
use wave_adapters::AgentCommand;

/// Default workspace root relative to the invocation directory.
const DEFAULT_WORKSPACE_ROOT: &str = ".wave/workspaces";

/// Everything one pipeline run needs, passed by value — no globals.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub run_id: RunId,
    pub pipeline_name: String,
    /// Manifest path echoed into displays and recovery commands.
    pub manifest_path: Option<PathBuf>,
    pub workspace_root: PathBuf,
    /// The run's original input, embedded (shell-escaped) in resume hints.
    pub input: String,
    /// Degree of parallelism for concurrency groups.
    pub concurrency: usize,
    pub resume_from: Option<StepId>,
    /// Keep step workspaces on disk for inspection after the run.
    pub preserve_workspaces: bool,
    pub step_timeout: Option<Duration>,
    pub adapter_command: AgentCommand,
    /// Persona label → system prompt, resolved by the manifest layer.
    pub personas: HashMap<String, String>,
}

impl RunConfig {
    pub fn new(
        run_id: impl Into<RunId>,
        pipeline_name: impl Into<String>,
        adapter_command: AgentCommand,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            pipeline_name: pipeline_name.into(),
            manifest_path: None,
            workspace_root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
            input: String::new(),
            concurrency: 4,
            resume_from: None,
            preserve_workspaces: false,
            step_timeout: None,
            adapter_command,
            personas: HashMap::new(),
        }
    }

    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_path = Some(path.into());
        self
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_concurrency(mut self, degree: usize) -> Self {
        self.concurrency = degree.max(1);
        self
    }

    pub fn resume_from(mut self, step_id: impl Into<StepId>) -> Self {
        self.resume_from = Some(step_id.into());
        self
    }

    pub fn preserve_workspaces(mut self) -> Self {
        self.preserve_workspaces = true;
        self
    }

    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = Some(timeout);
        self
    }

    pub fn with_persona(
        mut self,
        label: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        self.personas.insert(label.into(), system_prompt.into());
        self
    }

    /// Manifest path as it should appear in recovery commands.
    pub fn manifest_label(&self) -> String {
        self.manifest_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("{}.yaml", self.pipeline_name))
    }
}
