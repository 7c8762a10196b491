// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: resume at step 3 of 5.

use super::prelude::harness;
use std::time::Duration;
use wave_adapters::{CancelToken, ScriptedRun};
use wave_core::{StepDefinition, StepState};

fn five_steps() -> Vec<StepDefinition> {
    ["one", "two", "three", "four", "five"]
        .into_iter()
        .map(|id| StepDefinition::new(id, id))
        .collect()
}

#[tokio::test]
async fn resume_materializes_prior_steps_before_the_first_real_one() {
    let steps = five_steps();
    let h = harness(&steps, |c| c.resume_from("three"));
    // Slow first live step so the dashboard can be observed mid-run
    h.adapter.script(
        "three",
        ScriptedRun::ok("ok").with_delay(Duration::from_millis(200)),
    );

    let cancel_token = CancelToken::new();
    let run = h.scheduler.execute_pipeline(&steps, &cancel_token);
    let observer = async {
        let mut progress_at_resume = None;
        for _ in 0..200 {
            let ctx = h.dashboard.snapshot();
            if ctx.completed == 2 && progress_at_resume.is_none() {
                progress_at_resume = Some(ctx.progress);
            }
            if ctx.completed >= 5 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        progress_at_resume
    };

    let (outcome, progress_at_resume) = tokio::join!(run, observer);
    let outcome = outcome.expect("pipeline");

    assert!(outcome.success);

    // Steps one and two never invoked the adapter
    assert_eq!(h.adapter.run_count("one"), 0);
    assert_eq!(h.adapter.run_count("two"), 0);
    assert_eq!(h.adapter.run_count("three"), 1);

    // Synthetic completions: a single completed event with zero duration
    for id in ["one", "two"] {
        let events = h.capture.events_for(id);
        assert_eq!(events.len(), 1, "synthetic event count for {id}");
        assert_eq!(events[0].state, StepState::Completed);
        assert_eq!(events[0].duration_ms, Some(0));
    }

    // Overall progress began at 40% (2 of 5 steps done)
    let progress = progress_at_resume.expect("observed resume state");
    assert!(
        (progress - 40.0).abs() < 1.0,
        "expected ~40%, got {progress}"
    );

    // Synthetic completions precede the first live step's start
    let events = h.capture.events();
    let two_done = events
        .iter()
        .position(|e| e.step_id.as_ref().is_some_and(|s| s == "two"))
        .expect("synthetic two");
    let three_started = events
        .iter()
        .position(|e| {
            e.step_id.as_ref().is_some_and(|s| s == "three") && e.state == StepState::Started
        })
        .expect("three started");
    assert!(two_done < three_started);
}
