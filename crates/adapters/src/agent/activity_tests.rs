// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::{parse_activity, AgentActivity};

#[yare::parameterized(
    read_unicode = { "Read → src/main.rs", "Read", "src/main.rs" },
    write_ascii  = { "Write -> tests/out.txt", "Write", "tests/out.txt" },
    bash_command = { "Bash → cargo test --workspace", "Bash", "cargo test --workspace" },
    glob         = { "Glob → **/*.rs", "Glob", "**/*.rs" },
    leading_ws   = { "  Edit → lib.rs", "Edit", "lib.rs" },
    multi_word   = { "MultiEdit → a.rs b.rs", "MultiEdit", "a.rs b.rs" },
)]
fn parses_tool_markers(line: &str, tool: &str, target: &str) {
    assert_eq!(
        parse_activity(line),
        Some(AgentActivity::Tool {
            tool: tool.to_string(),
            target: target.to_string(),
        })
    );
}

#[yare::parameterized(
    plain_prose    = { "working on the task" },
    lowercase_tool = { "read → src/main.rs" },
    no_target      = { "Read → " },
    no_separator   = { "Read src/main.rs" },
    spaced_name    = { "My Tool → target" },
    punctuated     = { "e.g. → something" },
    tight_arrow    = { "Read→src/main.rs" },
    empty          = { "" },
)]
fn rejects_non_markers(line: &str) {
    assert_eq!(parse_activity(line), None);
}

#[test]
fn token_usage_parses_as_count() {
    assert_eq!(parse_activity("TokenUsage → 1234"), Some(AgentActivity::Tokens(1234)));
    // Non-numeric token usage is not a marker
    assert_eq!(parse_activity("TokenUsage → lots"), None);
}

#[test]
fn progress_parses_and_clamps() {
    assert_eq!(parse_activity("Progress → 40"), Some(AgentActivity::Progress(40)));
    assert_eq!(parse_activity("Progress → 250"), Some(AgentActivity::Progress(100)));
    assert_eq!(parse_activity("Progress → -3"), None);
}
