// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! TUI sink state and snapshot assembly.
//!
//! The dashboard owns the mutable pipeline view: incoming events become
//! state mutations under one structure-local mutex, and the render loop
//! consumes value-copied [`PipelineContext`] snapshots — never live
//! shared state.

use parking_lot::Mutex;
use std::path::PathBuf;
use wave_core::{
    Clock, ContractStatus, DisplayState, EmitError, HandoverInfo, PipelineContext,
    ProgressEmitter, ProgressEvent, RunId, StepDefinition, StepId, StepState, StepStatus,
    SystemClock, ToolActivity,
};

/// Static display facts for one run.
#[derive(Debug, Clone, Default)]
pub struct DisplayConfig {
    pub run_id: RunId,
    pub pipeline_name: String,
    pub manifest_path: Option<PathBuf>,
    pub workspace_root: Option<PathBuf>,
    pub verbose: bool,
}

#[derive(Default)]
struct DashState {
    steps: indexmap::IndexMap<StepId, StepStatus>,
    order: Vec<StepId>,
    tool_activity: indexmap::IndexMap<StepId, ToolActivity>,
    handover: indexmap::IndexMap<StepId, HandoverInfo>,
    current_action: Option<String>,
    last_tool: Option<ToolActivity>,
    started_at_ms: Option<u64>,
    /// Latched maximum so overall progress never regresses.
    max_progress: f64,
}

/// Event sink backing the live dashboard.
pub struct Dashboard<C: Clock = SystemClock> {
    config: DisplayConfig,
    clock: C,
    state: Mutex<DashState>,
}

impl Dashboard<SystemClock> {
    pub fn new(config: DisplayConfig, declared: &[StepDefinition]) -> Self {
        Self::with_clock(config, declared, SystemClock)
    }
}

impl<C: Clock> Dashboard<C> {
    pub fn with_clock(config: DisplayConfig, declared: &[StepDefinition], clock: C) -> Self {
        let mut state = DashState::default();
        for step in declared {
            let mut status = StepStatus::new(step.id.clone(), step.name.clone());
            status.persona = step.persona.clone();
            state.order.push(step.id.clone());
            state.steps.insert(step.id.clone(), status);
        }
        Self {
            config,
            clock,
            state: Mutex::new(state),
        }
    }

    fn apply(&self, event: &ProgressEvent) {
        let mut state = self.state.lock();
        if state.started_at_ms.is_none() {
            state.started_at_ms = Some(event.timestamp_ms);
        }

        let Some(step_id) = &event.step_id else {
            // Pipeline-level event; nothing per-step to track
            if event.state.is_terminal() {
                state.current_action = None;
            }
            return;
        };

        if !state.steps.contains_key(step_id.as_str()) {
            // First event mentioning an undeclared step creates it
            state.order.push(step_id.clone());
            state.steps.insert(
                step_id.clone(),
                StepStatus::new(step_id.clone(), step_id.as_str()),
            );
        }
        let now = event.timestamp_ms;

        match event.state {
            StepState::Started => {
                if let Some(status) = state.steps.get_mut(step_id.as_str()) {
                    status.transition(DisplayState::Running, now);
                    if let Some(persona) = &event.persona {
                        status.persona = Some(persona.clone());
                    }
                }
                state.current_action = Some(format!("running {step_id}"));
            }
            StepState::Running => {
                if let Some(status) = state.steps.get_mut(step_id.as_str()) {
                    if !status.state.is_terminal() {
                        if let Some(tokens) = event.tokens {
                            status.tokens = tokens;
                        }
                    }
                }
            }
            StepState::StreamActivity => {
                // Activity for a step that is not Running is dropped:
                // steps sharing a workspace must never inherit each
                // other's tool lines.
                let running = state
                    .steps
                    .get(step_id.as_str())
                    .is_some_and(|s| s.state == DisplayState::Running);
                if running {
                    if let Some(tool) = &event.tool {
                        state.tool_activity.insert(step_id.clone(), tool.clone());
                        state.last_tool = Some(tool.clone());
                    }
                }
            }
            StepState::StepProgress => {
                if let Some(status) = state.steps.get_mut(step_id.as_str()) {
                    if status.state == DisplayState::Running {
                        status.set_progress(event.progress.unwrap_or(0));
                    }
                }
            }
            StepState::Validating => {
                state.current_action = Some(format!("validating {step_id}"));
            }
            StepState::ContractPassed
            | StepState::ContractFailed
            | StepState::ContractSoftFailure => {
                let contract_status = match event.state {
                    StepState::ContractPassed => ContractStatus::Passed,
                    StepState::ContractFailed => ContractStatus::Failed,
                    _ => ContractStatus::SoftFailure,
                };
                let handover = state.handover.entry(step_id.clone()).or_default();
                handover.contract_status = contract_status;
                if contract_status == ContractStatus::Passed {
                    handover.contract_schema = event.message.clone();
                }
            }
            StepState::Retrying | StepState::Warning => {
                if let Some(status) = state.steps.get_mut(step_id.as_str()) {
                    status.message = event.message.clone();
                }
            }
            StepState::Completed
            | StepState::Failed
            | StepState::Skipped
            | StepState::Cancelled => {
                let next = match event.state {
                    StepState::Completed => DisplayState::Completed,
                    StepState::Failed => DisplayState::Failed,
                    StepState::Skipped => DisplayState::Skipped,
                    _ => DisplayState::Cancelled,
                };
                if let Some(status) = state.steps.get_mut(step_id.as_str()) {
                    if status.transition(next, now) {
                        if let Some(duration_ms) = event.duration_ms {
                            status.duration_ms = duration_ms;
                        }
                        if let Some(tokens) = event.tokens {
                            status.tokens = tokens;
                        }
                        if let Some(message) = &event.message {
                            status.message = Some(message.clone());
                        }
                    }
                }
                // Leaving Running always clears the step's tool line
                state.tool_activity.shift_remove(step_id.as_str());

                if event.state == StepState::Completed {
                    let order = state.order.clone();
                    let handover = state.handover.entry(step_id.clone()).or_default();
                    if !event.artifacts.is_empty() {
                        handover.artifacts = event.artifacts.clone();
                    }
                    handover.next_step = order
                        .iter()
                        .position(|id| id == step_id)
                        .and_then(|i| order.get(i + 1))
                        .cloned();
                }
            }
        }
    }

    /// Assemble a value-copied snapshot for the render model.
    pub fn snapshot(&self) -> PipelineContext {
        let mut state = self.state.lock();
        let now_ms = self.clock.epoch_ms();

        let mut completed = 0;
        let mut failed = 0;
        let mut skipped = 0;
        let mut terminal = 0;
        let mut tokens = 0u64;
        for id in &state.order {
            let Some(status) = state.steps.get(id.as_str()) else {
                continue;
            };
            tokens += status.tokens;
            match status.state {
                DisplayState::Completed => completed += 1,
                DisplayState::Failed => failed += 1,
                DisplayState::Skipped => skipped += 1,
                _ => {}
            }
            if status.state.is_terminal() {
                terminal += 1;
            }
        }

        let mut ctx = PipelineContext {
            run_id: self.config.run_id.clone(),
            pipeline_name: self.config.pipeline_name.clone(),
            manifest_path: self.config.manifest_path.clone(),
            workspace_root: self.config.workspace_root.clone(),
            total_steps: state.order.len(),
            current_step: 0,
            completed,
            failed,
            skipped,
            progress: 0.0,
            steps: state.steps.clone(),
            step_order: state.order.clone(),
            tool_activity: state.tool_activity.clone(),
            handover: state.handover.clone(),
            current_action: state.current_action.clone(),
            last_tool: state.last_tool.clone(),
            tokens,
            elapsed_ms: state
                .started_at_ms
                .map(|start| now_ms.saturating_sub(start))
                .unwrap_or(0),
            verbose: self.config.verbose,
        };

        ctx.current_step = ctx
            .primary_running_step()
            .and_then(|id| ctx.step_order.iter().position(|s| s == id))
            .map(|i| i + 1)
            .unwrap_or(terminal);

        // Monotonic latch: overall progress may jump but never regresses
        let progress = ctx.weighted_progress();
        if progress > state.max_progress {
            state.max_progress = progress;
        }
        ctx.progress = state.max_progress;
        ctx
    }
}

impl<C: Clock> ProgressEmitter for Dashboard<C> {
    fn emit(&self, event: &ProgressEvent) -> Result<(), EmitError> {
        self.apply(event);
        Ok(())
    }
}

#[cfg(test)]
#[path = "dashboard_tests.rs"]
mod tests;
