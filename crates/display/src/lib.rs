// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wave-display: progress emitters and the live terminal dashboard

mod basic;
mod color;
mod dashboard;
mod fanout;
mod json;
mod outcome_render;
mod quiet;
mod render;
mod spinner;
mod term;
mod throttle;
mod tui;

pub use basic::BasicEmitter;
pub use color::Palette;
pub use dashboard::{Dashboard, DisplayConfig};
pub use fanout::FanoutEmitter;
pub use json::JsonEmitter;
pub use outcome_render::render_outcome;
pub use quiet::QuietEmitter;
pub use render::render;
pub use spinner::Spinner;
pub use term::{ColorDepth, TermCaps};
pub use throttle::ThrottledEmitter;
pub use tui::{Tui, TuiOptions};
