// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stream-activity marker parsing.
//!
//! Adapters announce tool invocations on stdout as lines of the shape
//! `<ToolName> → <target>` (an ASCII `->` separator is accepted as
//! well). Two markers in the same grammar carry numbers instead of
//! targets: `TokenUsage → <n>` reports the running token total and
//! `Progress → <n>` reports step progress 0–100. Marker lines remain
//! part of the response body; parsing is purely observational.

/// Typed record scanned out of one stdout line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentActivity {
    /// Tool invocation, e.g. `Read → src/main.rs`.
    Tool { tool: String, target: String },
    /// Running token total reported by the agent.
    Tokens(u64),
    /// Step progress report, clamped to 100.
    Progress(u8),
}

/// Parse one line; `None` when the line is not a recognized marker.
pub fn parse_activity(line: &str) -> Option<AgentActivity> {
    let line = line.trim();
    let (name, target) = split_marker(line)?;
    if !is_tool_name(name) {
        return None;
    }
    let target = target.trim();
    if target.is_empty() {
        return None;
    }
    match name {
        "TokenUsage" => target.parse().ok().map(AgentActivity::Tokens),
        "Progress" => target
            .parse::<u64>()
            .ok()
            .map(|n| AgentActivity::Progress(n.min(100) as u8)),
        _ => Some(AgentActivity::Tool {
            tool: name.to_string(),
            target: target.to_string(),
        }),
    }
}

fn split_marker(line: &str) -> Option<(&str, &str)> {
    for sep in [" → ", " -> "] {
        if let Some((name, target)) = line.split_once(sep) {
            return Some((name.trim(), target));
        }
    }
    None
}

/// Tool names are single capitalized identifiers (`Read`, `Bash`,
/// `MultiEdit`); anything else is ordinary prose that happens to
/// contain an arrow.
fn is_tool_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }
    name.len() <= 32 && chars.all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
