// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: concurrent steps sharing one worktree; tool activity is
//! never attributed across steps.

use super::prelude::harness;
use std::time::Duration;
use wave_adapters::{CancelToken, ScriptedRun};
use wave_core::{StepDefinition, StepId, StepState};

#[tokio::test]
async fn tool_activity_stays_with_its_own_step() {
    let steps = vec![
        StepDefinition::new("writer-a", "Writer A")
            .in_group("shared")
            .shared_workspace("repo"),
        StepDefinition::new("writer-b", "Writer B")
            .in_group("shared")
            .shared_workspace("repo"),
    ];
    let h = harness(&steps, |c| c.with_concurrency(2));
    h.adapter.script(
        "writer-a",
        ScriptedRun::ok("a done")
            .with_tool("Read", "shared.md")
            .with_delay(Duration::from_millis(150))
            .with_file("from-a.txt", "a"),
    );
    h.adapter.script(
        "writer-b",
        ScriptedRun::ok("b done")
            .with_tool("Write", "shared.md")
            .with_delay(Duration::from_millis(600))
            .with_file("from-b.txt", "b"),
    );

    let cancel_token = CancelToken::new();
    let run = h.scheduler.execute_pipeline(&steps, &cancel_token);
    let observer = async {
        // While both run, each step shows its own tool line
        let mut saw_both = false;
        let mut saw_a_cleared = false;
        for _ in 0..400 {
            let ctx = h.dashboard.snapshot();
            let a = ctx.tool_activity.get("writer-a").map(|t| t.tool.clone());
            let b = ctx.tool_activity.get("writer-b").map(|t| t.tool.clone());
            if a.as_deref() == Some("Read") && b.as_deref() == Some("Write") {
                saw_both = true;
            }
            // After A completes its activity entry disappears while B's stays
            if ctx.state_of(&StepId::new("writer-a")) == Some(wave_core::DisplayState::Completed)
                && a.is_none()
                && b.as_deref() == Some("Write")
            {
                saw_a_cleared = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        (saw_both, saw_a_cleared)
    };

    let (outcome, (saw_both, saw_a_cleared)) = tokio::join!(run, observer);
    let outcome = outcome.expect("pipeline");

    assert!(saw_both, "both running steps showed their own tool activity");
    assert!(saw_a_cleared, "A's activity cleared on completion, B's kept");
    assert!(outcome.success);

    // Every stream_activity event names the step that produced it
    for event in h.capture.events() {
        if event.state == StepState::StreamActivity {
            let step = event.step_id.as_ref().expect("step id").as_str();
            let tool = event.tool.as_ref().expect("tool").tool.as_str();
            match (step, tool) {
                ("writer-a", "Read") | ("writer-b", "Write") => {}
                other => panic!("activity attributed across steps: {other:?}"),
            }
        }
    }

    // Shared worktree: both artifacts counted once each
    assert_eq!(outcome.artifact_count, 2);
}
