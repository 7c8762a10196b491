// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for scenario tests: scripted adapter + scripted
//! validator + capture emitter + live dashboard, wired the way a real
//! run wires them.

use std::sync::Arc;
use tempfile::TempDir;
use wave_adapters::{AgentCommand, ScriptedAgentAdapter};
use wave_core::test_support::CaptureEmitter;
use wave_core::{ProgressEmitter, StepDefinition, SystemClock};
use wave_display::{Dashboard, DisplayConfig, FanoutEmitter};
use wave_engine::{PipelineScheduler, RunConfig, ScriptedValidator};

pub struct Harness {
    pub adapter: ScriptedAgentAdapter,
    pub validator: ScriptedValidator,
    pub capture: CaptureEmitter,
    pub dashboard: Arc<Dashboard>,
    pub scheduler: PipelineScheduler<ScriptedAgentAdapter, SystemClock>,
    pub tmp: TempDir,
}

impl Harness {
    /// Workspace root used by the harness config (`<tmp>/.wave/workspaces`).
    pub fn workspace_root(&self) -> std::path::PathBuf {
        self.tmp.path().join(".wave/workspaces")
    }
}

pub fn harness(
    steps: &[StepDefinition],
    configure: impl FnOnce(RunConfig) -> RunConfig,
) -> Harness {
    let tmp = tempfile::tempdir().expect("tempdir");
    let config = configure(
        RunConfig::new("run-1", "review-pipeline", AgentCommand::new("scripted"))
            .with_manifest("pipelines/review.yaml")
            .with_workspace_root(tmp.path().join(".wave/workspaces"))
            .with_input("hello"),
    );

    let adapter = ScriptedAgentAdapter::new();
    let validator = ScriptedValidator::new();
    let capture = CaptureEmitter::new();
    let dashboard = Arc::new(Dashboard::new(
        DisplayConfig {
            run_id: config.run_id.clone(),
            pipeline_name: config.pipeline_name.clone(),
            manifest_path: config.manifest_path.clone(),
            workspace_root: Some(config.workspace_root.clone()),
            verbose: false,
        },
        steps,
    ));
    let emitter: Arc<dyn ProgressEmitter> = Arc::new(
        FanoutEmitter::new()
            .with_sink(Arc::new(capture.clone()))
            .with_sink(dashboard.clone()),
    );

    let scheduler = PipelineScheduler::new(
        config,
        adapter.clone(),
        Arc::new(validator.clone()),
        emitter,
        SystemClock,
    );

    Harness {
        adapter,
        validator,
        capture,
        dashboard,
        scheduler,
        tmp,
    }
}

/// The three-step manifest most scenarios use.
pub fn three_step_manifest() -> Vec<StepDefinition> {
    vec![
        StepDefinition::new("analyst", "Analyst"),
        StepDefinition::new("implementer", "Implementer"),
        StepDefinition::new("reviewer", "Reviewer"),
    ]
}
