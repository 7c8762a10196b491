// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step executor: one step end-to-end.
//!
//! Lifecycle: workspace acquisition → prompt composition → adapter run
//! (with retry on transient failures) → artifact collection → contract
//! validation → handover finalization. Events are emitted in causal
//! order for the step: `started` → activity/progress/validating/
//! contract → exactly one terminal state.

use crate::config::RunConfig;
use crate::contract::{extract_json, ContractValidator, ValidationRequest};
use crate::error::step_error_from_agent;
use crate::workspace::{StepWorkspace, WorkspaceManager};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::Instrument;
use wave_adapters::{AgentActivity, AgentAdapter, AgentInvocation, CancelToken};
use wave_core::{
    Clock, ContractStatus, DeliverableTracker, HandoverInfo, ProgressEmitter, ProgressEvent,
    StepDefinition, StepError, StepId, StepState, ToolActivity,
};

/// How a step ended.
#[derive(Debug)]
pub enum StepDisposition {
    Completed,
    Failed(StepError),
    Skipped,
    Cancelled,
}

impl StepDisposition {
    pub fn is_completed(&self) -> bool {
        matches!(self, StepDisposition::Completed)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StepDisposition::Failed(_))
    }
}

/// Outcome of one step execution.
#[derive(Debug)]
pub struct StepReport {
    pub step_id: StepId,
    pub optional: bool,
    pub disposition: StepDisposition,
    /// Absolute paths of artifacts collected from the workspace.
    pub artifacts: Vec<PathBuf>,
    pub contract: ContractStatus,
    pub handover: HandoverInfo,
    pub duration_ms: u64,
    pub tokens: u64,
}

impl StepReport {
    fn new(step: &StepDefinition, disposition: StepDisposition) -> Self {
        Self {
            step_id: step.id.clone(),
            optional: step.optional,
            disposition,
            artifacts: Vec::new(),
            contract: ContractStatus::Empty,
            handover: HandoverInfo::default(),
            duration_ms: 0,
            tokens: 0,
        }
    }

    /// Report materialized for a step completed in a previous run
    /// (resume). No timing or artifacts are known.
    pub fn synthetic_completed(step: &StepDefinition) -> Self {
        Self::new(step, StepDisposition::Completed)
    }

    pub fn skipped(step: &StepDefinition) -> Self {
        Self::new(step, StepDisposition::Skipped)
    }

    pub fn error(&self) -> Option<&StepError> {
        match &self.disposition {
            StepDisposition::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// A failure that must abort the pipeline.
    pub fn is_required_failure(&self) -> bool {
        !self.optional && self.disposition.is_failure()
    }
}

/// Executes single steps against the configured adapter and validator.
#[derive(Clone)]
pub struct StepExecutor<A: AgentAdapter, C: Clock> {
    adapter: A,
    validator: Arc<dyn ContractValidator>,
    tracker: Arc<DeliverableTracker>,
    emitter: Arc<dyn ProgressEmitter>,
    workspaces: Arc<WorkspaceManager>,
    config: Arc<RunConfig>,
    clock: C,
}

impl<A: AgentAdapter, C: Clock> StepExecutor<A, C> {
    pub fn new(
        adapter: A,
        validator: Arc<dyn ContractValidator>,
        tracker: Arc<DeliverableTracker>,
        emitter: Arc<dyn ProgressEmitter>,
        workspaces: Arc<WorkspaceManager>,
        config: Arc<RunConfig>,
        clock: C,
    ) -> Self {
        Self {
            adapter,
            validator,
            tracker,
            emitter,
            workspaces,
            config,
            clock,
        }
    }

    pub fn tracker(&self) -> &Arc<DeliverableTracker> {
        &self.tracker
    }

    /// Process one step end-to-end. Never panics; every exit path emits
    /// exactly one terminal event for the step.
    pub async fn execute(&self, step: &StepDefinition, cancel: &CancelToken) -> StepReport {
        let span = tracing::info_span!(
            "step",
            run_id = %self.config.run_id,
            step_id = %step.id,
        );
        self.execute_inner(step, cancel).instrument(span).await
    }

    async fn execute_inner(&self, step: &StepDefinition, cancel: &CancelToken) -> StepReport {
        let started = self.clock.now();

        if cancel.is_cancelled() {
            self.emit(self.event(step, StepState::Cancelled));
            return StepReport::new(step, StepDisposition::Cancelled);
        }

        let mut event = self.event(step, StepState::Started);
        if let Some(persona) = &step.persona {
            event = event.with_persona(persona.clone());
        }
        self.emit(event);

        // 1. Workspace acquisition
        let workspace = match self.workspaces.acquire(&self.config.run_id, step) {
            Ok(workspace) => workspace,
            Err(e) => {
                let err = StepError::runtime(format!("workspace acquisition failed: {e}"));
                return self.finish_failed(step, started, err);
            }
        };
        let baseline = match workspace.snapshot() {
            Ok(baseline) => baseline,
            Err(e) => {
                let err = StepError::runtime(format!("workspace scan failed: {e}"));
                return self.finish_failed(step, started, err);
            }
        };

        // 2. Prompt composition
        let persona_prompt = step
            .persona
            .as_deref()
            .and_then(|label| self.config.personas.get(label))
            .map(String::as_str);
        let prompt =
            crate::prompt::compose_prompt(persona_prompt, &step.prompt_template, &self.config.input);

        // 3–4. Adapter run with retry policy
        let (response, tokens) = match self.run_attempts(step, &workspace, &prompt, cancel).await {
            Ok(ok) => ok,
            Err(StepError::Cancelled) => {
                let mut report = StepReport::new(step, StepDisposition::Cancelled);
                report.duration_ms = self.elapsed_ms(started);
                self.emit(
                    self.event(step, StepState::Cancelled)
                        .with_duration_ms(report.duration_ms),
                );
                return report;
            }
            // The workspace of a failed step stays on disk so the
            // recovery hints can point at it.
            Err(err) => return self.finish_failed(step, started, err),
        };

        // 5. Artifact collection
        let artifacts = match self.collect_artifacts(step, &workspace, &baseline, &response) {
            Ok(artifacts) => artifacts,
            Err(err) => return self.finish_failed(step, started, err),
        };

        let mut handover = HandoverInfo {
            artifacts: artifacts.clone(),
            ..HandoverInfo::default()
        };

        // 6. Contract validation
        let contract_status = match self
            .validate_contract(step, &workspace, &response, &artifacts)
            .await
        {
            Ok(status) => status,
            Err(err) => {
                handover.contract_status = ContractStatus::Failed;
                handover.contract_schema = step.contract.as_ref().map(|c| c.schema.clone());
                let mut report = self.finish_failed(step, started, err);
                report.artifacts = artifacts;
                report.tokens = tokens;
                report.handover = handover;
                report.contract = ContractStatus::Failed;
                return report;
            }
        };
        handover.contract_status = contract_status;
        handover.contract_schema = step.contract.as_ref().map(|c| c.schema.clone());

        // 8. Completed
        let duration_ms = self.elapsed_ms(started);
        self.emit(
            self.event(step, StepState::Completed)
                .with_duration_ms(duration_ms)
                .with_tokens(tokens)
                .with_artifacts(artifacts.clone()),
        );
        tracing::info!(duration_ms, tokens, artifacts = artifacts.len(), "step completed");

        // 9. Release workspace
        self.release(&workspace);

        let mut report = StepReport::new(step, StepDisposition::Completed);
        report.artifacts = artifacts;
        report.contract = contract_status;
        report.handover = handover;
        report.duration_ms = duration_ms;
        report.tokens = tokens;
        report
    }

    /// Run the adapter, retrying transient failures per the step's
    /// policy with exponential backoff.
    async fn run_attempts(
        &self,
        step: &StepDefinition,
        workspace: &StepWorkspace,
        prompt: &str,
        cancel: &CancelToken,
    ) -> Result<(String, u64), StepError> {
        let max_attempts = step.retry.max_attempts.max(1);
        let mut attempt = 1u32;
        loop {
            match self.run_adapter(step, workspace, prompt, cancel).await {
                Ok(ok) => return Ok(ok),
                Err(err @ StepError::Cancelled) => return Err(err),
                Err(err) => {
                    if !err.is_transient() || attempt >= max_attempts {
                        return Err(err);
                    }
                    let backoff = step.retry.backoff_ms(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        backoff_ms = backoff,
                        error = %err,
                        "transient step failure, retrying"
                    );
                    self.emit(self.event(step, StepState::Retrying).with_message(format!(
                        "attempt {attempt} of {max_attempts} failed: {err}"
                    )));
                    tokio::select! {
                        _ = tokio::time::sleep(std::time::Duration::from_millis(backoff)) => {}
                        _ = cancel.cancelled() => return Err(StepError::Cancelled),
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// One adapter invocation, with stream activity forwarded to the
    /// emitter as it is parsed.
    async fn run_adapter(
        &self,
        step: &StepDefinition,
        workspace: &StepWorkspace,
        prompt: &str,
        cancel: &CancelToken,
    ) -> Result<(String, u64), StepError> {
        let (activity_tx, mut activity_rx) = mpsc::channel::<AgentActivity>(256);

        let emitter = self.emitter.clone();
        let clock = self.clock.clone();
        let run_id = self.config.run_id.clone();
        let step_id = step.id.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(activity) = activity_rx.recv().await {
                let event = match activity {
                    AgentActivity::Tool { tool, target } => ProgressEvent::step(
                        run_id.clone(),
                        step_id.clone(),
                        StepState::StreamActivity,
                        clock.epoch_ms(),
                    )
                    .with_tool(ToolActivity::new(tool, target)),
                    AgentActivity::Progress(progress) => ProgressEvent::step(
                        run_id.clone(),
                        step_id.clone(),
                        StepState::StepProgress,
                        clock.epoch_ms(),
                    )
                    .with_progress(progress),
                    AgentActivity::Tokens(tokens) => ProgressEvent::step(
                        run_id.clone(),
                        step_id.clone(),
                        StepState::Running,
                        clock.epoch_ms(),
                    )
                    .with_tokens(tokens),
                };
                if let Err(e) = emitter.emit(&event) {
                    tracing::warn!(error = %e, "emitter rejected stream activity");
                }
            }
        });

        let mut env = vec![
            ("WAVE_RUN_ID".to_string(), self.config.run_id.to_string()),
            ("WAVE_STEP_ID".to_string(), step.id.to_string()),
            (
                "WAVE_WORKSPACE".to_string(),
                workspace.path.display().to_string(),
            ),
        ];
        env.extend(step.env.iter().cloned());

        let invocation = AgentInvocation {
            command: self.config.adapter_command.clone(),
            prompt: prompt.to_string(),
            cwd: workspace.path.clone(),
            env,
            timeout: self.config.step_timeout,
        };

        let result = self.adapter.run(invocation, activity_tx, cancel.clone()).await;
        // All senders are gone once the adapter returns; draining the
        // forwarder keeps stream events ahead of whatever comes next.
        let _ = forwarder.await;

        let response = result.map_err(step_error_from_agent)?;
        Ok((response.response, response.tokens))
    }

    /// Scan the workspace for new files, extract an embedded JSON
    /// response when the contract expects one, mirror declared
    /// artifacts, and record everything in the tracker.
    fn collect_artifacts(
        &self,
        step: &StepDefinition,
        workspace: &StepWorkspace,
        baseline: &std::collections::BTreeSet<PathBuf>,
        response: &str,
    ) -> Result<Vec<PathBuf>, StepError> {
        let mut relative = match workspace.new_files_since(baseline) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(error = %e, "artifact scan failed");
                self.emit(
                    self.event(step, StepState::Warning)
                        .with_message(format!("artifact scan failed: {e}")),
                );
                Vec::new()
            }
        };

        // Auto-extract an embedded JSON response as a structured artifact
        if step.contract.as_ref().is_some_and(|c| c.expect_json) {
            let response_file = PathBuf::from("response.json");
            if !relative.contains(&response_file) {
                if let Some(json) = extract_json(response) {
                    match std::fs::write(workspace.path.join(&response_file), json) {
                        Ok(()) => relative.push(response_file),
                        Err(e) => self.emit(
                            self.event(step, StepState::Warning)
                                .with_message(format!("failed to write response.json: {e}")),
                        ),
                    }
                }
            }
        }

        let artifacts: Vec<PathBuf> = relative
            .iter()
            .map(|rel| workspace.path.join(rel))
            .collect();
        for path in &artifacts {
            self.tracker.add_file(
                step.id.clone(),
                path.display().to_string(),
                self.clock.epoch_ms(),
            );
        }

        // Mirror contract-declared artifacts; a mirror failure degrades
        // to a warning, never a step failure. Escapes do not.
        if let Some(contract) = &step.contract {
            for name in &contract.artifacts {
                let source = workspace.resolve_artifact(name)?;
                if !source.is_file() {
                    continue;
                }
                if let Err(e) = self.workspaces.mirror_artifact(step.id.as_str(), &source) {
                    self.emit(
                        self.event(step, StepState::Warning)
                            .with_message(format!("failed to mirror artifact {name}: {e}")),
                    );
                }
            }
        }

        Ok(artifacts)
    }

    /// Emit `validating` and run the contract validator, mapping the
    /// verdict to a contract status or a typed failure.
    async fn validate_contract(
        &self,
        step: &StepDefinition,
        workspace: &StepWorkspace,
        response: &str,
        artifacts: &[PathBuf],
    ) -> Result<ContractStatus, StepError> {
        let Some(contract) = &step.contract else {
            return Ok(ContractStatus::Empty);
        };

        self.emit(
            self.event(step, StepState::Validating)
                .with_message(contract.schema.clone()),
        );

        let request = ValidationRequest {
            step_id: &step.id,
            schema: &contract.schema,
            response,
            artifacts,
            workspace: &workspace.path,
        };
        let verdict = match self.validator.validate(request).await {
            Ok(verdict) => verdict,
            Err(e) => return Err(StepError::runtime(e.to_string())),
        };

        if verdict.passed {
            self.emit(
                self.event(step, StepState::ContractPassed)
                    .with_message(contract.schema.clone()),
            );
            self.tracker.add_contract(
                step.id.clone(),
                contract.schema.clone(),
                true,
                None,
                self.clock.epoch_ms(),
            );
            return Ok(ContractStatus::Passed);
        }

        let message = verdict
            .message
            .unwrap_or_else(|| "contract rejected output".to_string());
        self.tracker.add_contract(
            step.id.clone(),
            contract.schema.clone(),
            false,
            Some(&message),
            self.clock.epoch_ms(),
        );

        if contract.optional {
            // Soft failure: recorded, does not abort the step
            self.emit(
                self.event(step, StepState::ContractSoftFailure)
                    .with_message(message),
            );
            return Ok(ContractStatus::SoftFailure);
        }

        self.emit(
            self.event(step, StepState::ContractFailed)
                .with_message(message.clone()),
        );
        Err(StepError::ContractValidation {
            schema: Some(contract.schema.clone()),
            message,
        })
    }

    fn finish_failed(&self, step: &StepDefinition, started: Instant, err: StepError) -> StepReport {
        let duration_ms = self.elapsed_ms(started);
        tracing::error!(error = %err, duration_ms, "step failed");
        self.emit(
            self.event(step, StepState::Failed)
                .with_message(err.to_string())
                .with_duration_ms(duration_ms),
        );
        let mut report = StepReport::new(step, StepDisposition::Failed(err));
        report.duration_ms = duration_ms;
        report
    }

    fn release(&self, workspace: &StepWorkspace) {
        if let Err(e) = self.workspaces.release(workspace) {
            tracing::warn!(path = %workspace.path.display(), error = %e, "workspace release failed");
        }
    }

    fn elapsed_ms(&self, started: Instant) -> u64 {
        self.clock.now().duration_since(started).as_millis() as u64
    }

    fn event(&self, step: &StepDefinition, state: StepState) -> ProgressEvent {
        ProgressEvent::step(
            self.config.run_id.clone(),
            step.id.clone(),
            state,
            self.clock.epoch_ms(),
        )
    }

    pub(crate) fn emit(&self, event: ProgressEvent) {
        if let Err(e) = self.emitter.emit(&event) {
            tracing::warn!(error = %e, event = %event.log_summary(), "emit failed");
        }
    }
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
