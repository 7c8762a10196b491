// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pipeline scheduler: ordered dispatch, concurrency groups, resume,
//! and failure semantics.

use crate::config::RunConfig;
use crate::contract::ContractValidator;
use crate::error::EngineError;
use crate::executor::{StepDisposition, StepExecutor, StepReport};
use crate::outcome::aggregate;
use crate::workspace::WorkspaceManager;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use wave_adapters::{AgentAdapter, CancelToken};
use wave_core::{
    Clock, DeliverableTracker, PipelineOutcome, ProgressEmitter, ProgressEvent, StepDefinition,
    StepError, StepId, StepState,
};

/// Everything the scheduler knows after the last step settles.
#[derive(Debug)]
pub struct PipelineReport {
    /// One report per declared step, in declared order.
    pub reports: Vec<StepReport>,
    /// True when the caller's cancellation handle fired mid-run.
    pub cancelled: bool,
    pub duration_ms: u64,
    pub tokens: u64,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.first_required_failure().is_none()
    }

    /// The failure that aborted the pipeline, if any, in declared order.
    pub fn first_required_failure(&self) -> Option<(&StepId, &StepError)> {
        self.reports.iter().find_map(|r| {
            if r.is_required_failure() {
                r.error().map(|e| (&r.step_id, e))
            } else {
                None
            }
        })
    }

    pub fn failed_step_ids(&self) -> Vec<StepId> {
        self.reports
            .iter()
            .filter(|r| r.disposition.is_failure())
            .map(|r| r.step_id.clone())
            .collect()
    }
}

/// Drives a resolved pipeline through the step executor.
pub struct PipelineScheduler<A: AgentAdapter, C: Clock> {
    executor: StepExecutor<A, C>,
    emitter: Arc<dyn ProgressEmitter>,
    tracker: Arc<DeliverableTracker>,
    workspaces: Arc<WorkspaceManager>,
    config: Arc<RunConfig>,
    clock: C,
}

impl<A: AgentAdapter, C: Clock> PipelineScheduler<A, C> {
    pub fn new(
        config: RunConfig,
        adapter: A,
        validator: Arc<dyn ContractValidator>,
        emitter: Arc<dyn ProgressEmitter>,
        clock: C,
    ) -> Self {
        let config = Arc::new(config);
        let tracker = Arc::new(DeliverableTracker::new());
        let workspaces = Arc::new(
            WorkspaceManager::new(config.workspace_root.clone())
                .preserve(config.preserve_workspaces),
        );
        let executor = StepExecutor::new(
            adapter,
            validator,
            tracker.clone(),
            emitter.clone(),
            workspaces.clone(),
            config.clone(),
            clock.clone(),
        );
        Self {
            executor,
            emitter,
            tracker,
            workspaces,
            config,
            clock,
        }
    }

    pub fn tracker(&self) -> &Arc<DeliverableTracker> {
        &self.tracker
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run every step and return the raw per-step reports.
    ///
    /// Control flow is deterministic for a fixed pipeline: steps run in
    /// declared order, concurrency groups fan out up to the configured
    /// degree, a failed required step cancels running peers and skips
    /// the rest, and resume synthesizes completions for earlier steps.
    pub async fn run(
        &self,
        steps: &[StepDefinition],
        cancel: &CancelToken,
    ) -> Result<PipelineReport, EngineError> {
        let started = self.clock.now();
        validate_unique_ids(steps)?;

        let start_index = match &self.config.resume_from {
            Some(resume_id) => steps
                .iter()
                .position(|s| &s.id == resume_id)
                .ok_or_else(|| EngineError::ResumeStepNotFound(resume_id.clone()))?,
            None => 0,
        };

        let mut reports: Vec<StepReport> = Vec::with_capacity(steps.len());

        // Resume: materialize prior completions so displays and the
        // tracker agree on state before the first real step starts.
        for step in &steps[..start_index] {
            self.emit(
                self.step_event(step, StepState::Completed)
                    .with_duration_ms(0),
            );
            reports.push(StepReport::synthetic_completed(step));
        }

        // The run token aborts in-flight peers on a required failure
        // without cancelling the caller's handle.
        let run_token = cancel.child();
        let mut aborted = false;

        for batch in batches(&steps[start_index..]) {
            if cancel.is_cancelled() {
                aborted = true;
            }
            if aborted {
                for step in batch {
                    self.emit(self.step_event(step, StepState::Skipped));
                    reports.push(StepReport::skipped(step));
                }
                continue;
            }

            let batch_reports = if batch.len() == 1 {
                vec![self.executor.execute(batch[0], &run_token).await]
            } else {
                self.run_concurrent(&batch, &run_token).await
            };

            for report in batch_reports {
                if report.is_required_failure() {
                    tracing::error!(step_id = %report.step_id, "required step failed, aborting pipeline");
                    aborted = true;
                    run_token.cancel();
                } else if report.disposition.is_failure() {
                    tracing::warn!(step_id = %report.step_id, "optional step failed, continuing");
                }
                reports.push(report);
            }
        }

        finalize_handovers(&mut reports, steps);

        let tokens = reports.iter().map(|r| r.tokens).sum();
        Ok(PipelineReport {
            reports,
            cancelled: cancel.is_cancelled(),
            duration_ms: self.clock.now().duration_since(started).as_millis() as u64,
            tokens,
        })
    }

    /// Run the pipeline, aggregate the outcome, emit the final
    /// pipeline-level event, flush emitters, and reclaim workspaces.
    pub async fn execute_pipeline(
        &self,
        steps: &[StepDefinition],
        cancel: &CancelToken,
    ) -> Result<PipelineOutcome, EngineError> {
        let report = self.run(steps, cancel).await?;
        let outcome = aggregate(&self.config, &self.tracker, &self.workspaces, &report);

        let state = if outcome.success {
            StepState::Completed
        } else {
            StepState::Failed
        };
        let mut event = ProgressEvent::pipeline(
            self.config.run_id.clone(),
            state,
            self.clock.epoch_ms(),
        )
        .with_duration_ms(outcome.duration_ms)
        .with_tokens(outcome.tokens)
        .with_outcome(outcome.clone());
        if let Some((_, err)) = report.first_required_failure() {
            event = event.with_message(err.to_string());
        }
        self.emit(event);

        if let Err(e) = self.emitter.flush() {
            tracing::warn!(error = %e, "emitter flush failed");
        }
        if !self.config.preserve_workspaces && outcome.success {
            if let Err(e) = self.workspaces.cleanup_run(&self.config.run_id) {
                tracing::warn!(error = %e, "workspace cleanup failed");
            }
        }
        Ok(outcome)
    }

    /// Fan a concurrency group out up to the configured degree, then
    /// restore declared order for reporting.
    async fn run_concurrent(
        &self,
        batch: &[&StepDefinition],
        run_token: &CancelToken,
    ) -> Vec<StepReport> {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut join_set: JoinSet<(usize, StepReport)> = JoinSet::new();

        for (index, step) in batch.iter().enumerate() {
            let executor = self.executor.clone();
            let step = (*step).clone();
            let token = run_token.clone();
            let semaphore = semaphore.clone();
            join_set.spawn(async move {
                // A closed semaphore cannot happen; treat it as an open slot.
                let _permit = semaphore.acquire_owned().await.ok();
                let report = executor.execute(&step, &token).await;
                (index, report)
            });
        }

        let mut slots: Vec<Option<StepReport>> = (0..batch.len()).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, report)) => {
                    // A required failure cancels peers still in flight
                    if report.is_required_failure() {
                        run_token.cancel();
                    }
                    slots[index] = Some(report);
                }
                Err(e) => tracing::error!(error = %e, "concurrent step task failed"),
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| {
                    let mut report = StepReport::skipped(batch[index]);
                    report.disposition = StepDisposition::Failed(StepError::Unknown);
                    report
                })
            })
            .collect()
    }

    fn step_event(&self, step: &StepDefinition, state: StepState) -> ProgressEvent {
        ProgressEvent::step(
            self.config.run_id.clone(),
            step.id.clone(),
            state,
            self.clock.epoch_ms(),
        )
    }

    fn emit(&self, event: ProgressEvent) {
        if let Err(e) = self.emitter.emit(&event) {
            tracing::warn!(error = %e, event = %event.log_summary(), "emit failed");
        }
    }
}

/// Partition steps into dispatch batches: consecutive steps naming the
/// same concurrency group run together, everything else runs alone.
fn batches(steps: &[StepDefinition]) -> Vec<Vec<&StepDefinition>> {
    let mut batches: Vec<Vec<&StepDefinition>> = Vec::new();
    for step in steps {
        if let (Some(group), Some(last)) = (&step.concurrency_group, batches.last_mut()) {
            if last
                .first()
                .and_then(|s| s.concurrency_group.as_ref())
                .is_some_and(|g| g == group)
            {
                last.push(step);
                continue;
            }
        }
        batches.push(vec![step]);
    }
    batches
}

fn validate_unique_ids(steps: &[StepDefinition]) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for step in steps {
        if !seen.insert(&step.id) {
            return Err(EngineError::DuplicateStepId(step.id.clone()));
        }
    }
    Ok(())
}

/// Point every completed step's handover at its successor in declared
/// order.
fn finalize_handovers(reports: &mut [StepReport], steps: &[StepDefinition]) {
    let order: Vec<&StepId> = steps.iter().map(|s| &s.id).collect();
    for report in reports.iter_mut() {
        if !report.disposition.is_completed() {
            continue;
        }
        let next = order
            .iter()
            .position(|id| **id == report.step_id)
            .and_then(|i| order.get(i + 1))
            .map(|id| (*id).clone());
        report.handover.next_step = next;
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
