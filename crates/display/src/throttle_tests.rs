// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::ThrottledEmitter;
use std::sync::Arc;
use std::time::Duration;
use wave_core::test_support::CaptureEmitter;
use wave_core::{FakeClock, ProgressEmitter, ProgressEvent, RunId, StepId, StepState, ToolActivity};

fn activity(n: u64) -> ProgressEvent {
    ProgressEvent::step(
        RunId::new("run-1"),
        StepId::new("s1"),
        StepState::StreamActivity,
        n,
    )
    .with_tool(ToolActivity::new("Read", format!("file-{n}.rs")))
}

fn completed() -> ProgressEvent {
    ProgressEvent::step(RunId::new("run-1"), StepId::new("s1"), StepState::Completed, 999)
}

fn throttled(window_ms: u64) -> (ThrottledEmitter<FakeClock>, CaptureEmitter, FakeClock) {
    let capture = CaptureEmitter::new();
    let clock = FakeClock::new();
    let emitter = ThrottledEmitter::with_clock(
        Arc::new(capture.clone()),
        Duration::from_millis(window_ms),
        clock.clone(),
    );
    (emitter, capture, clock)
}

#[test]
fn burst_in_one_window_delivers_exactly_one_event() {
    let (emitter, capture, _clock) = throttled(100);

    for n in 0..50 {
        emitter.emit(&activity(n)).unwrap();
    }

    // Only the window-opening event went through
    assert_eq!(capture.len(), 1);
    assert_eq!(capture.events()[0].timestamp_ms, 0);
}

#[test]
fn non_stream_event_flushes_pending_first() {
    let (emitter, capture, _clock) = throttled(100);

    for n in 0..50 {
        emitter.emit(&activity(n)).unwrap();
    }
    emitter.emit(&completed()).unwrap();

    let states: Vec<StepState> = capture.events().iter().map(|e| e.state).collect();
    assert_eq!(
        states,
        vec![StepState::StreamActivity, StepState::StreamActivity, StepState::Completed]
    );
    // The flushed pending is the most recent activity (last write wins)
    assert_eq!(capture.events()[1].timestamp_ms, 49);
}

#[test]
fn window_expiry_reopens_passthrough() {
    let (emitter, capture, clock) = throttled(100);

    emitter.emit(&activity(1)).unwrap();
    emitter.emit(&activity(2)).unwrap();
    clock.advance(Duration::from_millis(150));
    emitter.emit(&activity(3)).unwrap();

    // Event 3 opens a fresh window and supersedes the stale pending 2
    let stamps: Vec<u64> = capture.events().iter().map(|e| e.timestamp_ms).collect();
    assert_eq!(stamps, vec![1, 3]);

    // The cleared pending never resurfaces
    emitter.emit(&completed()).unwrap();
    let states: Vec<StepState> = capture.events().iter().map(|e| e.state).collect();
    assert_eq!(
        states,
        vec![StepState::StreamActivity, StepState::StreamActivity, StepState::Completed]
    );
}

#[test]
fn other_states_pass_through_unthrottled() {
    let (emitter, capture, _clock) = throttled(100);

    for state in [
        StepState::Started,
        StepState::StepProgress,
        StepState::Validating,
        StepState::Completed,
    ] {
        let event = ProgressEvent::step(RunId::new("r"), StepId::new("s"), state, 0);
        emitter.emit(&event).unwrap();
    }
    assert_eq!(capture.len(), 4);
}

#[test]
fn flush_drains_pending_activity() {
    let (emitter, capture, _clock) = throttled(100);

    emitter.emit(&activity(1)).unwrap();
    emitter.emit(&activity(2)).unwrap();
    assert_eq!(capture.len(), 1);

    emitter.flush().unwrap();
    assert_eq!(capture.len(), 2);
    assert_eq!(capture.events()[1].timestamp_ms, 2);
    assert!(capture.flush_count() >= 1);
}
