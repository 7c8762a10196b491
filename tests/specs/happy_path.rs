// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: three sequential steps, all succeed.

use super::prelude::{harness, three_step_manifest};
use wave_adapters::{CancelToken, ScriptedRun};
use wave_core::StepState;

#[tokio::test]
async fn three_sequential_steps_complete_with_artifacts() {
    let steps = three_step_manifest();
    let h = harness(&steps, |c| c);
    for id in ["analyst", "implementer", "reviewer"] {
        h.adapter.script(
            id,
            ScriptedRun::ok(format!("{id} done"))
                .with_tokens(100)
                .with_file(format!("out-{id}.txt"), "artifact"),
        );
    }

    let outcome = h
        .scheduler
        .execute_pipeline(&steps, &CancelToken::new())
        .await
        .expect("pipeline");

    assert!(outcome.success);
    assert_eq!(outcome.exit_code(), 0);
    // Three unique artifacts, no recovery hints
    assert_eq!(outcome.artifact_count, 3);
    assert!(outcome.hints.is_empty());
    assert_eq!(outcome.tokens, 300);
    assert!(outcome.failed_steps.is_empty());

    // Every step ran the full lifecycle in order
    for id in ["analyst", "implementer", "reviewer"] {
        assert_eq!(
            h.capture.states_for(id),
            vec![
                StepState::Started,
                StepState::Running,
                StepState::Completed
            ],
            "lifecycle for {id}"
        );
    }

    // Overall progress reached 100 on the dashboard
    let ctx = h.dashboard.snapshot();
    assert!((ctx.progress - 100.0).abs() < f64::EPSILON);
    assert_eq!(ctx.completed, 3);

    // Final pipeline-level event carries the outcome
    let events = h.capture.events();
    let last = events.last().expect("events");
    assert!(last.is_pipeline_level());
    assert_eq!(last.state, StepState::Completed);
    assert_eq!(last.outcome.as_ref().map(|o| o.artifact_count), Some(3));
}
