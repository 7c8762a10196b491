// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: cancellation mid-run (Ctrl-C while step 2 is running).

use super::prelude::{harness, three_step_manifest};
use std::time::Duration;
use wave_adapters::{CancelToken, ScriptedRun};
use wave_core::StepState;

#[tokio::test]
async fn cancelling_a_running_step_emits_cancelled_not_failed() {
    let steps = three_step_manifest();
    let h = harness(&steps, |c| c);
    h.adapter.script(
        "implementer",
        ScriptedRun::ok("never").with_delay(Duration::from_secs(30)),
    );

    let cancel = CancelToken::new();
    let canceller = {
        let cancel = cancel.clone();
        let capture = h.capture.clone();
        async move {
            // Wait until step 2 is observably running, then interrupt
            for _ in 0..200 {
                if capture
                    .states_for("implementer")
                    .contains(&StepState::Started)
                {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            cancel.cancel();
        }
    };

    let (outcome, ()) = tokio::join!(
        h.scheduler.execute_pipeline(&steps, &cancel),
        canceller
    );
    let outcome = outcome.expect("pipeline");

    assert!(!outcome.success);
    assert_eq!(
        h.capture.states_for("analyst"),
        vec![StepState::Started, StepState::Completed]
    );
    assert_eq!(
        h.capture.states_for("implementer"),
        vec![StepState::Started, StepState::Cancelled]
    );
    assert_eq!(h.capture.states_for("reviewer"), vec![StepState::Skipped]);

    // The final pipeline event reports failure, never a hang
    let events = h.capture.events();
    let last = events.last().expect("final event");
    assert!(last.is_pipeline_level());
    assert_eq!(last.state, StepState::Failed);
}
