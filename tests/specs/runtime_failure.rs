// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: adapter dies silently; failure class is Unknown.

use super::prelude::{harness, three_step_manifest};
use wave_adapters::{CancelToken, ScriptedFailure, ScriptedRun};
use wave_core::HintKind;

#[tokio::test]
async fn silent_nonzero_exit_yields_debug_hint() {
    let steps = three_step_manifest();
    let h = harness(&steps, |c| c);
    // Non-zero exit with empty stderr: no usable information
    h.adapter.script(
        "analyst",
        ScriptedRun::fail(ScriptedFailure::NonZeroExit {
            code: 1,
            stderr: String::new(),
        }),
    );

    let outcome = h
        .scheduler
        .execute_pipeline(&steps, &CancelToken::new())
        .await
        .expect("pipeline");

    assert!(!outcome.success);
    assert_eq!(outcome.failed_steps.len(), 1);

    let kinds: Vec<HintKind> = outcome.hints.iter().map(|h| h.kind).collect();
    // Resume always; debug because the class is Unknown; never force
    assert!(kinds.contains(&HintKind::Resume));
    assert!(kinds.contains(&HintKind::Debug));
    assert!(!kinds.contains(&HintKind::Force));
    assert_eq!(kinds.first(), Some(&HintKind::Resume));
    assert_eq!(kinds.last(), Some(&HintKind::Debug));

    let debug = outcome
        .hints
        .iter()
        .find(|h| h.kind == HintKind::Debug)
        .expect("debug hint");
    assert!(debug.command.contains("--log-level debug"));
    assert!(debug.command.starts_with("wave run "));
}
