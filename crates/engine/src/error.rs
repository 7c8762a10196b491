// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine errors and adapter-error mapping

use thiserror::Error;
use wave_adapters::AgentError;
use wave_core::{StepError, StepId};

/// Errors raised by the scheduler before any step runs.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("resume step not found in pipeline: {0}")]
    ResumeStepNotFound(StepId),
    #[error("duplicate step id in pipeline: {0}")]
    DuplicateStepId(StepId),
}

/// Map an adapter failure into the step failure taxonomy.
///
/// A non-zero exit surfaces the captured stderr as the runtime message;
/// an adapter that dies silently (empty stderr) therefore classifies as
/// `Unknown` downstream.
pub(crate) fn step_error_from_agent(err: AgentError) -> StepError {
    match err {
        AgentError::Spawn(message) => {
            StepError::runtime(format!("failed to spawn adapter: {message}"))
        }
        AgentError::NonZeroExit { code, stderr } => StepError::Runtime {
            message: stderr,
            exit_code: Some(code),
        },
        AgentError::Signal { signal, .. } => {
            StepError::runtime(format!("adapter killed by signal {signal}"))
        }
        AgentError::Timeout(duration) => StepError::Timeout(duration.as_millis() as u64),
        AgentError::Cancelled => StepError::Cancelled,
        AgentError::Io(e) => StepError::runtime(format!("adapter io error: {e}")),
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
