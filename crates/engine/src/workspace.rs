// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-step workspace allocation and artifact collection.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use wave_core::{RunId, StepDefinition, StepError, WorkspaceMode};

/// Allocates and reclaims step workspaces under a run-scoped root.
///
/// Layout: `<root>/<runID>/<stepID>/` for isolated steps,
/// `<root>/<runID>/shared-<group>/` for shared worktrees. Contract-declared
/// artifacts are mirrored next to the workspaces root under
/// `artifacts/<stepID>/`.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
    preserve: bool,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            preserve: false,
        }
    }

    /// Keep workspaces on disk after release (for inspection).
    pub fn preserve(mut self, preserve: bool) -> Self {
        self.preserve = preserve;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_dir(&self, run_id: &RunId) -> PathBuf {
        self.root.join(run_id.as_str())
    }

    /// Directory a step's workspace lives in, whether or not it exists yet.
    pub fn step_dir(&self, run_id: &RunId, step: &StepDefinition) -> PathBuf {
        let run_dir = self.run_dir(run_id);
        match &step.workspace {
            WorkspaceMode::Isolated => run_dir.join(step.id.as_str()),
            WorkspaceMode::Shared(group) => run_dir.join(format!("shared-{group}")),
        }
    }

    /// Allocate (or attach to) the workspace for a step.
    pub fn acquire(&self, run_id: &RunId, step: &StepDefinition) -> io::Result<StepWorkspace> {
        let path = self.step_dir(run_id, step);
        fs::create_dir_all(&path)?;
        Ok(StepWorkspace {
            path,
            shared: matches!(step.workspace, WorkspaceMode::Shared(_)),
        })
    }

    /// Release an isolated workspace. Shared worktrees stay until
    /// [`Self::cleanup_run`]; preserved managers never delete.
    pub fn release(&self, workspace: &StepWorkspace) -> io::Result<()> {
        if self.preserve || workspace.shared {
            return Ok(());
        }
        remove_dir_if_present(&workspace.path)
    }

    /// Remove everything the run allocated, shared worktrees included.
    pub fn cleanup_run(&self, run_id: &RunId) -> io::Result<()> {
        if self.preserve {
            return Ok(());
        }
        remove_dir_if_present(&self.run_dir(run_id))
    }

    /// Mirror directory for a step's contract-declared artifacts:
    /// `artifacts/<stepID>/` next to the workspaces root.
    pub fn mirror_dir(&self, step_id: &str) -> PathBuf {
        let base = self
            .root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        base.join("artifacts").join(step_id)
    }

    /// Copy a declared artifact into the mirror directory.
    pub fn mirror_artifact(&self, step_id: &str, source: &Path) -> io::Result<PathBuf> {
        let dir = self.mirror_dir(step_id);
        fs::create_dir_all(&dir)?;
        let name = source
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "artifact has no name"))?;
        let dest = dir.join(name);
        fs::copy(source, &dest)?;
        Ok(dest)
    }
}

fn remove_dir_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// One acquired workspace.
#[derive(Debug, Clone)]
pub struct StepWorkspace {
    pub path: PathBuf,
    pub shared: bool,
}

impl StepWorkspace {
    /// Relative paths of every file currently in the workspace
    /// (sorted; `.wave` bookkeeping excluded).
    pub fn snapshot(&self) -> io::Result<BTreeSet<PathBuf>> {
        let mut files = BTreeSet::new();
        walk_files(&self.path, Path::new(""), &mut files)?;
        Ok(files)
    }

    /// Files present now that were absent from `baseline`, sorted.
    pub fn new_files_since(&self, baseline: &BTreeSet<PathBuf>) -> io::Result<Vec<PathBuf>> {
        Ok(self
            .snapshot()?
            .into_iter()
            .filter(|f| !baseline.contains(f))
            .collect())
    }

    /// Resolve a contract-declared artifact name inside the workspace.
    ///
    /// Rejects absolute paths and any traversal that would escape the
    /// workspace — that is a policy violation by the adapter.
    pub fn resolve_artifact(&self, name: &str) -> Result<PathBuf, StepError> {
        let relative = Path::new(name);
        if relative.is_absolute() {
            return Err(StepError::SecurityViolation(format!(
                "artifact path is absolute: {name}"
            )));
        }
        let mut resolved = PathBuf::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => {
                    return Err(StepError::SecurityViolation(format!(
                        "artifact path escapes workspace: {name}"
                    )))
                }
            }
        }
        if resolved.as_os_str().is_empty() {
            return Err(StepError::SecurityViolation(format!(
                "artifact path is empty: {name}"
            )));
        }
        Ok(self.path.join(resolved))
    }
}

fn walk_files(base: &Path, relative: &Path, out: &mut BTreeSet<PathBuf>) -> io::Result<()> {
    let dir = base.join(relative);
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if name == ".wave" {
            continue;
        }
        let rel = relative.join(&name);
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk_files(base, &rel, out)?;
        } else if file_type.is_file() {
            out.insert(rel);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
