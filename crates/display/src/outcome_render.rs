// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-readable outcome block and recovery hints.

use crate::color::Palette;
use std::fmt::Write as _;
use wave_core::{time_fmt, PipelineOutcome};

/// Render the final outcome block: summary, links, contract results,
/// the specific error message on failure, and the ordered recovery
/// hints formatted as `<label>` over an indented `<command>`.
pub fn render_outcome(
    outcome: &PipelineOutcome,
    error_message: Option<&str>,
    palette: &Palette,
) -> String {
    let mut out = String::new();

    let verdict = if outcome.success {
        palette.ok("completed")
    } else {
        palette.err("failed")
    };
    let _ = writeln!(
        out,
        "{} {} in {}",
        palette.primary_bold(&outcome.pipeline_name),
        verdict,
        time_fmt::format_duration_ms(outcome.duration_ms)
    );
    if outcome.tokens > 0 {
        let _ = writeln!(out, "  {}", palette.muted(&format!("tokens: {}", outcome.tokens)));
    }

    if let Some(branch) = &outcome.branch {
        let push = match (&branch.pushed, &branch.remote_ref, &branch.push_error) {
            (true, Some(remote), _) => format!("pushed → {remote}"),
            (true, None, _) => "pushed".to_string(),
            (false, _, Some(err)) => format!("push failed: {err}"),
            (false, _, None) => "not pushed".to_string(),
        };
        let _ = writeln!(out, "  branch: {} ({push})", branch.name);
    }
    for pr in &outcome.prs {
        let _ = writeln!(out, "  PR: {}", pr.url);
    }
    for issue in &outcome.issues {
        let _ = writeln!(out, "  issue: {}", issue.url);
    }
    for deployment in &outcome.deployments {
        let _ = writeln!(out, "  deployment: {}", deployment.url);
    }

    let mut counts = format!("artifacts: {}", outcome.artifact_count);
    if outcome.contract_count > 0 {
        let _ = write!(counts, " · contracts: {}", outcome.contract_count);
        if !outcome.failed_contracts.is_empty() {
            let _ = write!(counts, " ({} failed)", outcome.failed_contracts.len());
        }
    }
    let _ = writeln!(out, "  {}", palette.muted(&counts));

    for contract in &outcome.failed_contracts {
        let detail = contract.message.as_deref().unwrap_or("rejected");
        let _ = writeln!(
            out,
            "  {}",
            palette.err(&format!("contract {} ({}): {detail}", contract.schema, contract.step_id))
        );
    }
    if !outcome.failed_steps.is_empty() {
        let ids: Vec<&str> = outcome.failed_steps.iter().map(|s| s.as_str()).collect();
        let _ = writeln!(
            out,
            "  {}",
            palette.err(&format!("failed steps: {}", ids.join(", ")))
        );
    }

    if let Some(message) = error_message {
        out.push('\n');
        let _ = writeln!(out, "{}", palette.err(message));
    }

    if !outcome.hints.is_empty() {
        out.push('\n');
        let _ = writeln!(out, "{}", palette.primary("Recovery:"));
        for hint in &outcome.hints {
            let _ = writeln!(out, "{}", hint.label);
            let _ = writeln!(out, "  {}", palette.context(&hint.command));
        }
    }

    out
}

#[cfg(test)]
#[path = "outcome_render_tests.rs"]
mod tests;
