// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario: JSON output mode produces a parseable NDJSON stream whose
//! final event nests the outcome.

use super::prelude::three_step_manifest;
use std::io::Write;
use std::sync::Arc;
use tempfile::tempdir;
use wave_adapters::{AgentCommand, CancelToken, ScriptedAgentAdapter, ScriptedRun};
use wave_core::{ProgressEmitter, SystemClock};
use wave_display::JsonEmitter;
use wave_engine::{AcceptAllValidator, PipelineScheduler, RunConfig};

#[derive(Clone, Default)]
struct SharedBuf(Arc<std::sync::Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("lock")).to_string()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().expect("lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn json_mode_streams_events_and_nests_the_final_outcome() {
    let tmp = tempdir().expect("tempdir");
    let steps = three_step_manifest();
    let config = RunConfig::new("run-json", "review-pipeline", AgentCommand::new("scripted"))
        .with_workspace_root(tmp.path().join(".wave/workspaces"))
        .with_input("hello");

    let adapter = ScriptedAgentAdapter::new();
    adapter.script(
        "analyst",
        ScriptedRun::ok("done").with_file("out-analyst.txt", "x"),
    );

    let buf = SharedBuf::default();
    let emitter: Arc<dyn ProgressEmitter> = Arc::new(JsonEmitter::new(buf.clone()));
    let scheduler = PipelineScheduler::new(
        config,
        adapter,
        Arc::new(AcceptAllValidator),
        emitter,
        SystemClock,
    );

    let outcome = scheduler
        .execute_pipeline(&steps, &CancelToken::new())
        .await
        .expect("pipeline");
    assert!(outcome.success);

    let output = buf.contents();
    let values: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line is one JSON object"))
        .collect();
    assert!(values.len() >= 7, "expected full event stream, got {}", values.len());

    // Every event names the run and a snake_case state
    for value in &values {
        assert_eq!(value["run_id"], "run-json");
        assert!(value["state"].is_string());
    }

    let last = values.last().expect("final event");
    assert_eq!(last["state"], "completed");
    assert_eq!(last["outcome"]["success"], true);
    assert_eq!(last["outcome"]["artifact_count"], 1);
    assert_eq!(last["outcome"]["pipeline_name"], "review-pipeline");
}
