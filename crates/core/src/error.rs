// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step failure taxonomy and classification.
//!
//! The executor propagates these typed failures upward untranslated; the
//! outcome aggregator classifies them by variant. Nothing in the system
//! matches on error message text.

use thiserror::Error;

/// Typed failure of one step.
#[derive(Debug, Error)]
pub enum StepError {
    /// The declared contract rejected the step's output.
    #[error("contract validation failed: {message}")]
    ContractValidation {
        schema: Option<String>,
        message: String,
    },

    /// The adapter escaped its workspace or violated policy.
    #[error("security violation: {0}")]
    SecurityViolation(String),

    /// Adapter runtime failure (non-zero exit, signal death, spawn error).
    #[error("{message}")]
    Runtime {
        message: String,
        exit_code: Option<i32>,
    },

    /// The adapter exceeded the configured timeout.
    #[error("step timed out after {0}ms")]
    Timeout(u64),

    /// Cancellation was observed before the step finished.
    #[error("step cancelled")]
    Cancelled,

    /// Failure with no usable information attached.
    #[error("unknown failure")]
    Unknown,

    /// A failure wrapped with additional context. Classification unwraps
    /// through this transparently.
    #[error("{context}: {source}")]
    Wrapped {
        context: String,
        #[source]
        source: Box<StepError>,
    },
}

impl StepError {
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
            exit_code: None,
        }
    }

    /// Wrap with context while keeping the inner variant classifiable.
    pub fn wrap(self, context: impl Into<String>) -> Self {
        Self::Wrapped {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Innermost non-`Wrapped` error.
    pub fn root(&self) -> &StepError {
        match self {
            StepError::Wrapped { source, .. } => source.root(),
            other => other,
        }
    }

    /// Classify by variant. A runtime failure with an empty message
    /// carries no usable information and classifies as [`FailureClass::Unknown`].
    pub fn class(&self) -> FailureClass {
        match self.root() {
            StepError::ContractValidation { .. } => FailureClass::ContractValidation,
            StepError::SecurityViolation(_) => FailureClass::SecurityViolation,
            StepError::Runtime { message, .. } => {
                if message.trim().is_empty() {
                    FailureClass::Unknown
                } else {
                    FailureClass::Runtime
                }
            }
            StepError::Timeout(_) => FailureClass::Timeout,
            StepError::Cancelled => FailureClass::Cancelled,
            StepError::Unknown => FailureClass::Unknown,
            StepError::Wrapped { .. } => FailureClass::Unknown,
        }
    }

    /// Transient failures are eligible for the step retry policy;
    /// contract and security failures are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.class(),
            FailureClass::Runtime | FailureClass::Timeout | FailureClass::Unknown
        )
    }
}

/// Failure class used for recovery-hint selection and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    ContractValidation,
    SecurityViolation,
    Runtime,
    Timeout,
    Cancelled,
    Unknown,
}

impl FailureClass {
    pub fn label(&self) -> &'static str {
        match self {
            FailureClass::ContractValidation => "contract validation",
            FailureClass::SecurityViolation => "security violation",
            FailureClass::Runtime => "runtime error",
            FailureClass::Timeout => "timeout",
            FailureClass::Cancelled => "cancelled",
            FailureClass::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
