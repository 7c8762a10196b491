// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wave-adapters: external agent process integration for Wave

pub mod agent;
pub mod cancel;

pub use agent::{
    AgentActivity, AgentAdapter, AgentCommand, AgentError, AgentInvocation, AgentResponse,
    ProcessAgentAdapter,
};
pub use cancel::CancelToken;

#[cfg(any(test, feature = "test-support"))]
pub use agent::{AgentCall, ScriptedAgentAdapter, ScriptedFailure, ScriptedRun};
