// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outcome aggregation, failure classification, and recovery hints.

use crate::config::RunConfig;
use crate::scheduler::PipelineReport;
use crate::workspace::WorkspaceManager;
use std::collections::HashSet;
use wave_core::shell;
use wave_core::{
    BranchInfo, DeliverableKind, DeliverableTracker, FailedContract, FailureClass, HintKind, Link,
    PipelineOutcome, RecoveryHint, StepId,
};

/// Hints render as two lines each; the recovery block stays under
/// eight lines.
const MAX_HINTS: usize = 4;

/// Reduce the tracker and per-step reports to the final typed outcome.
pub fn aggregate(
    config: &RunConfig,
    tracker: &DeliverableTracker,
    workspaces: &WorkspaceManager,
    report: &PipelineReport,
) -> PipelineOutcome {
    let deliverables = tracker.all();

    // First branch wins
    let branch = deliverables
        .iter()
        .find(|d| d.kind == DeliverableKind::Branch)
        .map(|d| BranchInfo {
            name: d.name.clone(),
            pushed: d.metadata.get("pushed").is_some_and(|v| v == "true"),
            remote_ref: d.metadata.get("remote_ref").cloned(),
            push_error: d.metadata.get("push_error").cloned(),
        });

    let links = |kind: DeliverableKind| -> Vec<Link> {
        deliverables
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| Link {
                step_id: d.step_id.clone(),
                label: d.name.clone(),
                url: d.path.clone(),
            })
            .collect()
    };

    // A shared worktree can record the same file under several steps;
    // count each path once.
    let artifact_count = deliverables
        .iter()
        .filter(|d| matches!(d.kind, DeliverableKind::File | DeliverableKind::Artifact))
        .map(|d| d.path.as_str())
        .collect::<HashSet<_>>()
        .len();

    let contracts: Vec<_> = deliverables
        .iter()
        .filter(|d| d.kind == DeliverableKind::Contract)
        .collect();
    let failed_contracts: Vec<FailedContract> = contracts
        .iter()
        .filter(|d| d.metadata.get("status").is_some_and(|s| s == "failed"))
        .map(|d| FailedContract {
            step_id: d.step_id.clone(),
            schema: d.name.clone(),
            message: d.metadata.get("message").cloned(),
        })
        .collect();

    let success = report.is_success();
    let failure = report.first_required_failure();
    let class = match failure {
        Some((_, err)) => Some(err.class()),
        None if report.cancelled => Some(FailureClass::Cancelled),
        None => None,
    };

    let hints = match (success, class) {
        (false, Some(class)) => {
            let anchor_step = failure
                .map(|(id, _)| id.clone())
                .or_else(|| first_unfinished_step(report));
            build_hints(config, workspaces, class, anchor_step.as_ref())
        }
        _ => Vec::new(),
    };

    PipelineOutcome {
        run_id: config.run_id.clone(),
        pipeline_name: config.pipeline_name.clone(),
        success,
        duration_ms: report.duration_ms,
        tokens: report.tokens,
        branch,
        prs: links(DeliverableKind::Pr),
        issues: links(DeliverableKind::Issue),
        deployments: links(DeliverableKind::Deployment),
        artifact_count,
        contract_count: contracts.len(),
        failed_contracts,
        hints,
        deliverables,
        failed_steps: report.failed_step_ids(),
    }
}

/// Where a cancelled run should resume: the first step that never
/// completed, in declared order.
fn first_unfinished_step(report: &PipelineReport) -> Option<StepId> {
    report
        .reports
        .iter()
        .find(|r| !r.disposition.is_completed())
        .map(|r| r.step_id.clone())
}

/// Ordered recovery hints: resume → force → workspace → debug.
///
/// The resume hint is always present; force appears only for contract
/// validation failures, the workspace hint only when the step workspace
/// still exists on disk, and the debug hint only for unknown failures.
fn build_hints(
    config: &RunConfig,
    workspaces: &WorkspaceManager,
    class: FailureClass,
    anchor_step: Option<&StepId>,
) -> Vec<RecoveryHint> {
    let manifest = config.manifest_label();
    let input = shell::quote(&config.input);
    let mut hints = Vec::new();

    if let Some(step) = anchor_step {
        hints.push(RecoveryHint::new(
            HintKind::Resume,
            "Resume from the failed step",
            format!("wave run {manifest} --from {step} --input {input}"),
        ));
        if class == FailureClass::ContractValidation {
            hints.push(RecoveryHint::new(
                HintKind::Force,
                "Force past the failed contract",
                format!("wave run {manifest} --from {step} --force --input {input}"),
            ));
        }
        let workspace = workspaces
            .run_dir(&config.run_id)
            .join(step.as_str());
        if workspace.is_dir() {
            hints.push(RecoveryHint::new(
                HintKind::Workspace,
                "Inspect the step workspace",
                format!("ls -la {}", shell::quote(&workspace.display().to_string())),
            ));
        }
    }
    if class == FailureClass::Unknown {
        hints.push(RecoveryHint::new(
            HintKind::Debug,
            "Re-run with debug logging",
            format!("wave run {manifest} --log-level debug --input {input}"),
        ));
    }
    if hints.is_empty() {
        // The recovery block is always present on failure
        hints.push(RecoveryHint::new(
            HintKind::Debug,
            "Re-run with debug logging",
            format!("wave run {manifest} --log-level debug --input {input}"),
        ));
    }
    hints.truncate(MAX_HINTS);
    hints
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
