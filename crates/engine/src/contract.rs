// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Contract validator seam.
//!
//! Validator plugins (JSON-schema checkers, test-suite runners) live
//! outside the engine; the executor only knows this trait. The engine
//! ships [`AcceptAllValidator`] for contract-less runs and a scripted
//! validator for tests.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wave_core::StepId;

/// Everything a validator may inspect for one step.
#[derive(Debug, Clone, Copy)]
pub struct ValidationRequest<'a> {
    pub step_id: &'a StepId,
    /// Schema label from the contract declaration.
    pub schema: &'a str,
    /// Full adapter response body.
    pub response: &'a str,
    /// Artifacts collected from the workspace, absolute paths.
    pub artifacts: &'a [PathBuf],
    pub workspace: &'a Path,
}

/// Validator decision for one step's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractVerdict {
    pub passed: bool,
    pub message: Option<String>,
}

impl ContractVerdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            message: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: Some(message.into()),
        }
    }
}

/// Validator infrastructure failure (not a contract rejection).
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("validator failure: {0}")]
    Internal(String),
}

/// Validates a step's output against its declared contract.
#[async_trait]
pub trait ContractValidator: Send + Sync + 'static {
    async fn validate(
        &self,
        request: ValidationRequest<'_>,
    ) -> Result<ContractVerdict, ValidateError>;
}

/// Validator that passes everything; used when no plugin is registered.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllValidator;

#[async_trait]
impl ContractValidator for AcceptAllValidator {
    async fn validate(
        &self,
        _request: ValidationRequest<'_>,
    ) -> Result<ContractVerdict, ValidateError> {
        Ok(ContractVerdict::pass())
    }
}

/// Extract the outermost embedded JSON object from an adapter response.
///
/// Prefers a fenced ```json block; otherwise scans for the first
/// balanced top-level `{...}`, respecting strings and escapes. Returns
/// `None` when no complete object is present.
pub fn extract_json(response: &str) -> Option<&str> {
    if let Some(fenced) = extract_fenced(response) {
        if balanced_object(fenced).is_some() {
            return Some(fenced);
        }
    }
    let start = response.find('{')?;
    balanced_object(&response[start..]).map(|len| &response[start..start + len])
}

fn extract_fenced(response: &str) -> Option<&str> {
    let open = response.find("```json")?;
    let body = &response[open + "```json".len()..];
    let body = body.strip_prefix('\n').unwrap_or(body);
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// Byte length of the balanced object starting at `s[0] == '{'`.
fn balanced_object(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use scripted::ScriptedValidator;

#[cfg(any(test, feature = "test-support"))]
mod scripted {
    use super::{ContractValidator, ContractVerdict, ValidateError, ValidationRequest};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Scripted validator keyed by step id; unscripted steps pass.
    #[derive(Clone, Default)]
    pub struct ScriptedValidator {
        inner: Arc<Mutex<ScriptedState>>,
    }

    #[derive(Default)]
    struct ScriptedState {
        verdicts: HashMap<String, ContractVerdict>,
        errors: HashMap<String, String>,
        seen: Vec<String>,
    }

    impl ScriptedValidator {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn verdict(&self, step_id: impl Into<String>, verdict: ContractVerdict) -> &Self {
            self.inner.lock().verdicts.insert(step_id.into(), verdict);
            self
        }

        /// Make validation itself error for a step (plugin crash).
        pub fn internal_error(&self, step_id: impl Into<String>, message: impl Into<String>) -> &Self {
            self.inner.lock().errors.insert(step_id.into(), message.into());
            self
        }

        /// Step ids validated, in call order.
        pub fn validated(&self) -> Vec<String> {
            self.inner.lock().seen.clone()
        }
    }

    #[async_trait]
    impl ContractValidator for ScriptedValidator {
        async fn validate(
            &self,
            request: ValidationRequest<'_>,
        ) -> Result<ContractVerdict, ValidateError> {
            let mut inner = self.inner.lock();
            inner.seen.push(request.step_id.to_string());
            if let Some(message) = inner.errors.get(request.step_id.as_str()) {
                return Err(ValidateError::Internal(message.clone()));
            }
            Ok(inner
                .verdicts
                .get(request.step_id.as_str())
                .cloned()
                .unwrap_or_else(ContractVerdict::pass))
        }
    }
}

#[cfg(test)]
#[path = "contract_tests.rs"]
mod tests;
