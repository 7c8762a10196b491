// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pure render model: `render(snapshot, caps, now) → frame`.
//!
//! Given an identical snapshot and wall-clock reading the output is
//! byte-identical; there is no per-frame state beyond the snapshot and
//! the clock.

use crate::color::Palette;
use crate::spinner::Spinner;
use crate::term::TermCaps;
use std::fmt::Write as _;
use wave_core::{time_fmt, ContractStatus, DisplayState, PipelineContext, StepStatus};

/// Cells in the progress bar.
const BAR_WIDTH: usize = 25;
/// Breathing-pulse cycle for the empty portion of the bar.
const PULSE_CYCLE_MS: u64 = 1500;

/// Render one frame. `now_ms` is epoch milliseconds and drives the
/// spinner and pulse animation phases only.
pub fn render(ctx: &PipelineContext, caps: &TermCaps, now_ms: u64) -> String {
    let palette = Palette::new(caps);
    let mut out = String::new();

    render_header(&mut out, ctx, caps, &palette);
    render_progress(&mut out, ctx, caps, &palette, now_ms);
    render_steps(&mut out, ctx, caps, &palette, now_ms);

    // Status footer
    let _ = writeln!(out, "{}", palette.muted("Press: q=quit"));
    out
}

fn render_header(out: &mut String, ctx: &PipelineContext, caps: &TermCaps, palette: &Palette) {
    let banner = if caps.unicode { "≈≈≈ wave ≈≈≈" } else { "~~~ wave ~~~" };
    let _ = writeln!(
        out,
        "{} {}",
        palette.primary(banner),
        palette.primary_bold(&ctx.pipeline_name)
    );

    let mut meta = String::new();
    if let Some(manifest) = &ctx.manifest_path {
        let _ = write!(meta, "{}  ", manifest.display());
    }
    let _ = write!(
        meta,
        "elapsed {}",
        time_fmt::format_elapsed(ctx.elapsed_ms / 1000)
    );
    let _ = writeln!(out, "{}", palette.muted(&meta));
    out.push('\n');
}

fn render_progress(
    out: &mut String,
    ctx: &PipelineContext,
    caps: &TermCaps,
    palette: &Palette,
    now_ms: u64,
) {
    let clamped = ctx.progress.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * BAR_WIDTH as f64).floor() as usize;
    let (fill_cell, empty_cell) = if caps.unicode { ("█", "░") } else { ("#", "-") };

    let mut bar = String::new();
    for _ in 0..filled {
        bar.push_str(&palette.primary(fill_cell));
    }
    // Breathing gradient sweeps the empty portion, phase from the clock
    let phase = (now_ms % PULSE_CYCLE_MS) as f64 / PULSE_CYCLE_MS as f64;
    for cell in filled..BAR_WIDTH {
        let offset = cell as f64 / BAR_WIDTH as f64;
        let level = 0.5 + 0.5 * (std::f64::consts::TAU * (phase - offset)).sin();
        bar.push_str(&palette.pulse(level, empty_cell));
    }

    let _ = writeln!(
        out,
        "  [{bar}] {:>3}%  {}/{} steps",
        clamped.round() as u32,
        ctx.completed,
        ctx.total_steps
    );
    out.push('\n');
}

fn render_steps(
    out: &mut String,
    ctx: &PipelineContext,
    caps: &TermCaps,
    palette: &Palette,
    now_ms: u64,
) {
    let mut spinner = Spinner::new(caps.unicode);
    spinner.start();

    // Declared order is the only display order; the map is never
    // iterated directly.
    for step_id in &ctx.step_order {
        let Some(status) = ctx.steps.get(step_id.as_str()) else {
            continue;
        };
        match status.state {
            DisplayState::Completed => {
                let glyph = if caps.unicode { "✓" } else { "+" };
                let _ = writeln!(
                    out,
                    "  {} {} {}",
                    palette.primary_bold(glyph),
                    palette.primary_bold(&status.name),
                    palette.muted(&format!("({})", time_fmt::format_duration_ms(status.duration_ms)))
                );
                if ctx.verbose {
                    render_handover(out, ctx, caps, palette, status);
                }
            }
            DisplayState::Running => {
                let elapsed = status.elapsed_ms(now_ms) / 1000;
                let _ = writeln!(
                    out,
                    "  {} {} {}",
                    palette.warn(spinner.frame(now_ms)),
                    palette.warn(&status.name),
                    palette.muted(&format!("({})", time_fmt::format_elapsed(elapsed)))
                );
                if let Some(tool) = ctx.tool_activity.get(step_id.as_str()) {
                    let arrow = if caps.unicode { "↳" } else { "->" };
                    let sep = if caps.unicode { "→" } else { "->" };
                    let _ = writeln!(
                        out,
                        "      {}",
                        palette.context(&format!("{arrow} {} {sep} {}", tool.tool, tool.target))
                    );
                }
            }
            DisplayState::Failed => {
                let glyph = if caps.unicode { "✗" } else { "x" };
                let duration = format!("({})", time_fmt::format_duration_ms(status.duration_ms));
                let _ = writeln!(
                    out,
                    "  {} {} {}",
                    palette.err(glyph),
                    palette.err(&status.name),
                    palette.muted(&duration)
                );
                if let Some(message) = &status.message {
                    let _ = writeln!(out, "      {}", palette.err(message));
                }
            }
            DisplayState::Skipped => {
                let glyph = if caps.unicode { "—" } else { "-" };
                let _ = writeln!(
                    out,
                    "  {}",
                    palette.muted(&format!("{glyph} {} (skipped)", status.name))
                );
            }
            DisplayState::Cancelled => {
                let glyph = if caps.unicode { "⊛" } else { "!" };
                let _ = writeln!(
                    out,
                    "  {}",
                    palette.warn(&format!("{glyph} {} (cancelled)", status.name))
                );
            }
            DisplayState::NotStarted => {
                let glyph = if caps.unicode { "○" } else { "." };
                let _ = writeln!(out, "  {}", palette.muted(&format!("{glyph} {}", status.name)));
            }
        }
    }
    out.push('\n');
}

/// Tree-style metadata lines under a completed step (verbose mode).
fn render_handover(
    out: &mut String,
    ctx: &PipelineContext,
    caps: &TermCaps,
    palette: &Palette,
    status: &StepStatus,
) {
    let Some(handover) = ctx.handover.get(status.step_id.as_str()) else {
        return;
    };
    let (tee, corner) = if caps.unicode { ("├─", "└─") } else { ("|-", "`-") };

    let mut lines: Vec<String> = Vec::new();
    for artifact in &handover.artifacts {
        let name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| artifact.display().to_string());
        lines.push(name);
    }
    if handover.contract_status != ContractStatus::Empty {
        let schema = handover.contract_schema.as_deref().unwrap_or("contract");
        lines.push(format!("{schema}: {}", handover.contract_status.label()));
    }
    if let Some(next) = &handover.next_step {
        lines.push(format!("next: {next}"));
    }

    let count = lines.len();
    for (i, line) in lines.into_iter().enumerate() {
        let branch = if i + 1 == count { corner } else { tee };
        let _ = writeln!(out, "      {}", palette.muted(&format!("{branch} {line}")));
    }
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
