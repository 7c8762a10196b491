// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deliverable records and the thread-safe per-run tracker.

use crate::id::StepId;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What kind of thing a step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverableKind {
    File,
    Pr,
    Issue,
    Branch,
    Deployment,
    Url,
    Artifact,
    Contract,
    Log,
}

impl DeliverableKind {
    /// Kinds that surface in the top-level outcome summary; everything
    /// else appears only in verbose mode.
    pub fn outcome_worthy(&self) -> bool {
        matches!(
            self,
            DeliverableKind::Pr
                | DeliverableKind::Issue
                | DeliverableKind::Branch
                | DeliverableKind::Deployment
        )
    }
}

/// Immutable record of one artifact, link, branch, or contract result.
///
/// Identity is the `(step_id, kind, path)` triple; the tracker collapses
/// duplicates under the same triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deliverable {
    pub kind: DeliverableKind,
    pub step_id: StepId,
    pub name: String,
    /// Filesystem path or URL.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at_ms: u64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Deliverable {
    pub fn new(
        kind: DeliverableKind,
        step_id: StepId,
        name: impl Into<String>,
        path: impl Into<String>,
        created_at_ms: u64,
    ) -> Self {
        Self {
            kind,
            step_id,
            name: name.into(),
            path: path.into(),
            description: None,
            created_at_ms,
            metadata: HashMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Thread-safe registry of everything a run produced.
///
/// The tracker exclusively owns its deliverable set; all access goes
/// through these methods under a single structure-local mutex.
#[derive(Debug, Default)]
pub struct DeliverableTracker {
    inner: Mutex<Vec<Deliverable>>,
}

impl DeliverableTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deliverable. Returns `false` when an entry with the same
    /// `(step_id, kind, path)` identity already exists.
    pub fn add(&self, deliverable: Deliverable) -> bool {
        let mut inner = self.inner.lock();
        let duplicate = inner.iter().any(|d| {
            d.step_id == deliverable.step_id
                && d.kind == deliverable.kind
                && d.path == deliverable.path
        });
        if duplicate {
            return false;
        }
        inner.push(deliverable);
        true
    }

    /// Record a file artifact produced in a step workspace.
    pub fn add_file(&self, step_id: StepId, path: impl Into<String>, created_at_ms: u64) -> bool {
        let path = path.into();
        let name = path
            .rsplit('/')
            .next()
            .unwrap_or(path.as_str())
            .to_string();
        self.add(Deliverable::new(
            DeliverableKind::File,
            step_id,
            name,
            path,
            created_at_ms,
        ))
    }

    /// Record a contract validation result.
    pub fn add_contract(
        &self,
        step_id: StepId,
        schema: impl Into<String>,
        passed: bool,
        message: Option<&str>,
        created_at_ms: u64,
    ) -> bool {
        let schema = schema.into();
        let mut d = Deliverable::new(
            DeliverableKind::Contract,
            step_id,
            schema.clone(),
            schema,
            created_at_ms,
        )
        .with_metadata("status", if passed { "passed" } else { "failed" });
        if let Some(message) = message {
            d = d.with_metadata("message", message);
        }
        self.add(d)
    }

    /// All deliverables of one kind, in insertion order.
    pub fn of_kind(&self, kind: DeliverableKind) -> Vec<Deliverable> {
        self.inner
            .lock()
            .iter()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect()
    }

    /// All deliverables recorded for one step, in insertion order.
    pub fn for_step(&self, step_id: &StepId) -> Vec<Deliverable> {
        self.inner
            .lock()
            .iter()
            .filter(|d| &d.step_id == step_id)
            .cloned()
            .collect()
    }

    /// Snapshot of every deliverable, in insertion order.
    pub fn all(&self) -> Vec<Deliverable> {
        self.inner.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "deliverable_tests.rs"]
mod tests;
