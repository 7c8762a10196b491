// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::aggregate;
use crate::config::RunConfig;
use crate::executor::{StepDisposition, StepReport};
use crate::scheduler::PipelineReport;
use crate::workspace::WorkspaceManager;
use std::fs;
use wave_adapters::AgentCommand;
use wave_core::{
    ContractStatus, Deliverable, DeliverableKind, DeliverableTracker, HandoverInfo, HintKind,
    StepDefinition, StepError, StepId,
};

fn config(tmp: &tempfile::TempDir) -> RunConfig {
    RunConfig::new("run-1", "review", AgentCommand::new("scripted"))
        .with_manifest("pipelines/review.yaml")
        .with_workspace_root(tmp.path().join(".wave/workspaces"))
        .with_input("hello world")
}

fn manager(config: &RunConfig) -> WorkspaceManager {
    WorkspaceManager::new(config.workspace_root.clone())
}

fn completed(id: &str) -> StepReport {
    StepReport::synthetic_completed(&StepDefinition::new(id, id))
}

fn failed(id: &str, err: StepError) -> StepReport {
    StepReport {
        step_id: StepId::new(id),
        optional: false,
        disposition: StepDisposition::Failed(err),
        artifacts: Vec::new(),
        contract: ContractStatus::Empty,
        handover: HandoverInfo::default(),
        duration_ms: 0,
        tokens: 0,
    }
}

fn report(reports: Vec<StepReport>) -> PipelineReport {
    PipelineReport {
        reports,
        cancelled: false,
        duration_ms: 2_000,
        tokens: 100,
    }
}

#[test]
fn success_aggregates_tracker_into_typed_lists() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(&tmp);
    let tracker = DeliverableTracker::new();

    tracker.add(
        Deliverable::new(DeliverableKind::Branch, StepId::new("impl"), "wave/fix", "wave/fix", 1)
            .with_metadata("pushed", "true")
            .with_metadata("remote_ref", "origin/wave/fix"),
    );
    // Second branch is ignored: first branch wins
    tracker.add(Deliverable::new(
        DeliverableKind::Branch,
        StepId::new("review"),
        "wave/other",
        "wave/other",
        2,
    ));
    tracker.add(Deliverable::new(
        DeliverableKind::Pr,
        StepId::new("impl"),
        "PR #12",
        "https://example.test/pr/12",
        3,
    ));
    // Same artifact path recorded under two steps (shared worktree)
    tracker.add_file(StepId::new("a"), "/ws/out.txt", 4);
    tracker.add_file(StepId::new("b"), "/ws/out.txt", 5);
    tracker.add_file(StepId::new("b"), "/ws/other.txt", 6);
    tracker.add_contract(StepId::new("impl"), "impl-v1", true, None, 7);

    let outcome = aggregate(
        &cfg,
        &tracker,
        &manager(&cfg),
        &report(vec![completed("a"), completed("b"), completed("impl")]),
    );

    assert!(outcome.success);
    let branch = outcome.branch.as_ref().expect("branch");
    assert_eq!(branch.name, "wave/fix");
    assert!(branch.pushed);
    assert_eq!(branch.remote_ref.as_deref(), Some("origin/wave/fix"));

    assert_eq!(outcome.prs.len(), 1);
    assert_eq!(outcome.prs[0].url, "https://example.test/pr/12");
    // Path-level dedup: two files, not three
    assert_eq!(outcome.artifact_count, 2);
    assert_eq!(outcome.contract_count, 1);
    assert!(outcome.failed_contracts.is_empty());
    assert!(outcome.hints.is_empty());
    assert_eq!(outcome.exit_code(), 0);
}

#[test]
fn contract_failure_yields_resume_force_workspace_hints() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(&tmp);
    let manager = manager(&cfg);
    // Failed step workspace still on disk
    fs::create_dir_all(manager.run_dir(&cfg.run_id).join("implementer")).unwrap();

    let tracker = DeliverableTracker::new();
    tracker.add_contract(
        StepId::new("implementer"),
        "impl-v1",
        false,
        Some("malformed json"),
        1,
    );

    let outcome = aggregate(
        &cfg,
        &tracker,
        &manager,
        &report(vec![
            completed("analyst"),
            failed(
                "implementer",
                StepError::ContractValidation {
                    schema: Some("impl-v1".to_string()),
                    message: "malformed json".to_string(),
                },
            ),
        ]),
    );

    assert!(!outcome.success);
    assert_eq!(outcome.failed_steps, vec![StepId::new("implementer")]);
    assert_eq!(outcome.failed_contracts.len(), 1);

    let kinds: Vec<HintKind> = outcome.hints.iter().map(|h| h.kind).collect();
    assert_eq!(kinds, vec![HintKind::Resume, HintKind::Force, HintKind::Workspace]);

    // Original input is embedded shell-escaped
    assert!(outcome.hints[0]
        .command
        .contains("--from implementer --input 'hello world'"));
    assert!(outcome.hints[0].command.starts_with("wave run pipelines/review.yaml"));
    assert!(outcome.hints[1].command.contains("--force"));
    assert!(outcome.hints[2].command.starts_with("ls -la "));
}

#[test]
fn unknown_failure_yields_resume_and_debug() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(&tmp);
    let tracker = DeliverableTracker::new();

    let outcome = aggregate(
        &cfg,
        &tracker,
        &manager(&cfg),
        &report(vec![failed("step1", StepError::runtime(""))]),
    );

    let kinds: Vec<HintKind> = outcome.hints.iter().map(|h| h.kind).collect();
    assert_eq!(kinds, vec![HintKind::Resume, HintKind::Debug]);
    assert!(outcome.hints[1].command.contains("--log-level debug"));
    // No force hint for non-contract classes
    assert!(!outcome.hints.iter().any(|h| h.kind == HintKind::Force));
}

#[test]
fn quoted_input_survives_awkward_characters() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(&tmp).with_input("it's tricky");
    let tracker = DeliverableTracker::new();

    let outcome = aggregate(
        &cfg,
        &tracker,
        &manager(&cfg),
        &report(vec![failed("s", StepError::runtime("boom"))]),
    );
    assert!(outcome.hints[0].command.ends_with(r"--input 'it'\''s tricky'"));
}

#[test]
fn cancelled_run_resumes_from_first_unfinished_step() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(&tmp);
    let tracker = DeliverableTracker::new();

    let mut cancelled_report = report(vec![
        completed("analyst"),
        StepReport {
            step_id: StepId::new("implementer"),
            optional: false,
            disposition: StepDisposition::Cancelled,
            artifacts: Vec::new(),
            contract: ContractStatus::Empty,
            handover: HandoverInfo::default(),
            duration_ms: 10,
            tokens: 0,
        },
    ]);
    cancelled_report.cancelled = true;

    let outcome = aggregate(&cfg, &tracker, &manager(&cfg), &cancelled_report);

    assert!(!outcome.success);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(outcome.hints[0].kind, HintKind::Resume);
    assert!(outcome.hints[0].command.contains("--from implementer"));
}

#[test]
fn recovery_block_never_exceeds_four_hints() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = config(&tmp);
    let tracker = DeliverableTracker::new();

    let outcome = aggregate(
        &cfg,
        &tracker,
        &manager(&cfg),
        &report(vec![failed("s", StepError::runtime(""))]),
    );
    assert!(!outcome.hints.is_empty());
    assert!(outcome.hints.len() <= 4);
}
