// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: contract failure on the middle step.

use super::prelude::harness;
use similar_asserts::assert_eq as assert_states_eq;
use wave_adapters::{CancelToken, ScriptedRun};
use wave_core::{ContractDecl, HintKind, StepDefinition, StepState};
use wave_engine::ContractVerdict;

#[tokio::test]
async fn middle_step_contract_failure_skips_the_rest() {
    let steps = vec![
        StepDefinition::new("analyst", "Analyst"),
        StepDefinition::new("implementer", "Implementer")
            .with_contract(ContractDecl::new("impl-v1").expect_json()),
        StepDefinition::new("reviewer", "Reviewer"),
    ];
    let h = harness(&steps, |c| c);
    h.adapter
        .script("implementer", ScriptedRun::ok("this is { not valid json"));
    h.validator.verdict(
        "implementer",
        ContractVerdict::fail("response is not valid JSON"),
    );

    let outcome = h
        .scheduler
        .execute_pipeline(&steps, &CancelToken::new())
        .await
        .expect("pipeline");

    assert!(!outcome.success);
    assert_ne!(outcome.exit_code(), 0);

    // Event shapes per step
    assert_eq!(
        h.capture.states_for("analyst"),
        vec![StepState::Started, StepState::Completed]
    );
    assert_states_eq!(
        h.capture.states_for("implementer"),
        vec![
            StepState::Started,
            StepState::Validating,
            StepState::ContractFailed,
            StepState::Failed,
        ]
    );
    assert_eq!(h.capture.states_for("reviewer"), vec![StepState::Skipped]);

    // Recovery block: resume, force (contract class), workspace — in order
    let kinds: Vec<HintKind> = outcome.hints.iter().map(|h| h.kind).collect();
    assert_eq!(kinds, vec![HintKind::Resume, HintKind::Force, HintKind::Workspace]);
    assert!(outcome.hints[0]
        .command
        .contains("--from implementer --input 'hello'"));

    // The workspace hint points at the failed step's workspace
    let expected = h.workspace_root().join("run-1/implementer");
    assert!(outcome.hints[2].command.contains(&expected.display().to_string()));
    assert!(expected.is_dir(), "failed workspace kept for inspection");

    assert_eq!(outcome.failed_contracts.len(), 1);
    assert_eq!(outcome.failed_contracts[0].schema, "impl-v1");
}
