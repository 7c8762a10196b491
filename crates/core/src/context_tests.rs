// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::PipelineContext;
use crate::id::StepId;
use crate::status::{DisplayState, StepStatus};

fn context(states: &[(&str, DisplayState, u8)]) -> PipelineContext {
    let mut ctx = PipelineContext {
        total_steps: states.len(),
        ..Default::default()
    };
    for (id, state, progress) in states {
        let step_id = StepId::new(*id);
        let mut status = StepStatus::new(step_id.clone(), *id);
        if *state != DisplayState::NotStarted {
            status.transition(DisplayState::Running, 0);
            status.set_progress(*progress);
            if state.is_terminal() {
                status.transition(*state, 1);
            }
        }
        ctx.step_order.push(step_id.clone());
        ctx.steps.insert(step_id, status);
    }
    ctx
}

#[test]
fn weighted_progress_mixes_completed_and_running() {
    let ctx = context(&[
        ("a", DisplayState::Completed, 100),
        ("b", DisplayState::Running, 50),
        ("c", DisplayState::NotStarted, 0),
        ("d", DisplayState::NotStarted, 0),
    ]);
    // (1 + 0.5) / 4 = 37.5
    assert!((ctx.weighted_progress() - 37.5).abs() < f64::EPSILON);
}

#[test]
fn skipped_steps_count_as_done_weight() {
    let ctx = context(&[
        ("a", DisplayState::Completed, 100),
        ("b", DisplayState::Skipped, 0),
    ]);
    assert!((ctx.weighted_progress() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn empty_pipeline_has_zero_progress() {
    assert_eq!(PipelineContext::default().weighted_progress(), 0.0);
}

#[test]
fn primary_running_step_follows_declared_order() {
    let ctx = context(&[
        ("a", DisplayState::Completed, 100),
        ("b", DisplayState::Running, 10),
        ("c", DisplayState::Running, 90),
    ]);
    // "c" is further along, but "b" comes first in declared order
    assert_eq!(ctx.primary_running_step(), Some(&StepId::new("b")));

    let idle = context(&[("a", DisplayState::Completed, 100)]);
    assert_eq!(idle.primary_running_step(), None);
}
