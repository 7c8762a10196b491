// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-backed agent adapter.

use super::{parse_activity, AgentActivity, AgentAdapter, AgentError, AgentInvocation, AgentResponse};
use crate::cancel::CancelToken;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// Grace period between the terminate signal and the hard kill.
const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// Launches the configured adapter command as a child process.
///
/// Stdout is scanned line by line for stream-activity markers; stderr is
/// buffered whole and attached to failure errors. Stdin is closed — the
/// prompt travels as the final argv entry.
#[derive(Debug, Clone)]
pub struct ProcessAgentAdapter {
    grace: Duration,
}

impl Default for ProcessAgentAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessAgentAdapter {
    pub fn new() -> Self {
        Self {
            grace: DEFAULT_GRACE,
        }
    }

    /// Override the terminate-to-kill grace period.
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Ask the child to terminate, escalating to a kill after the grace
    /// period. Always reaps the child before returning.
    async fn terminate(&self, child: &mut Child) {
        #[cfg(unix)]
        if let Some(pid) = child.id() {
            let terminated = Command::new("kill")
                .arg("-TERM")
                .arg(pid.to_string())
                .output()
                .await
                .map(|out| out.status.success())
                .unwrap_or(false);
            if terminated
                && tokio::time::timeout(self.grace, child.wait())
                    .await
                    .is_ok()
            {
                return;
            }
        }
        // kill() sends SIGKILL and reaps
        let _ = child.kill().await;
    }
}

async fn sleep_until_deadline(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[async_trait]
impl AgentAdapter for ProcessAgentAdapter {
    async fn run(
        &self,
        invocation: AgentInvocation,
        activity_tx: mpsc::Sender<AgentActivity>,
        cancel: CancelToken,
    ) -> Result<AgentResponse, AgentError> {
        let mut cmd = Command::new(&invocation.command.program);
        cmd.args(&invocation.command.args)
            // The full prompt is one argv entry, never shell-split.
            .arg(&invocation.prompt)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| AgentError::Spawn(format!("{}: {e}", invocation.command.program)))?;

        tracing::debug!(
            program = %invocation.command.program,
            cwd = %invocation.cwd.display(),
            pid = child.id(),
            "adapter spawned"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::Spawn("stdout not captured".to_string()))?;
        let mut stderr_pipe = child
            .stderr
            .take()
            .ok_or_else(|| AgentError::Spawn("stderr not captured".to_string()))?;
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr_pipe.read_to_string(&mut buf).await;
            buf
        });

        let deadline = invocation
            .timeout
            .map(|t| tokio::time::Instant::now() + t);
        let mut lines = BufReader::new(stdout).lines();
        let mut response = String::new();
        let mut tokens = 0u64;

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if let Some(activity) = parse_activity(&line) {
                            if let AgentActivity::Tokens(n) = activity {
                                tokens = n;
                            }
                            // Advisory stream; a full channel drops the
                            // marker rather than stalling the read loop.
                            let _ = activity_tx.try_send(activity);
                        }
                        response.push_str(&line);
                        response.push('\n');
                    }
                    Ok(None) => break,
                    Err(e) => return Err(AgentError::Io(e)),
                },
                _ = cancel.cancelled() => {
                    tracing::debug!(pid = child.id(), "cancelling adapter");
                    self.terminate(&mut child).await;
                    return Err(AgentError::Cancelled);
                }
                _ = sleep_until_deadline(deadline) => {
                    tracing::warn!(pid = child.id(), timeout = ?invocation.timeout, "adapter timed out");
                    self.terminate(&mut child).await;
                    return Err(AgentError::Timeout(invocation.timeout.unwrap_or_default()));
                }
            }
        }

        // Stdout reached EOF; wait for exit under the same deadline.
        let status = tokio::select! {
            status = child.wait() => status?,
            _ = cancel.cancelled() => {
                self.terminate(&mut child).await;
                return Err(AgentError::Cancelled);
            }
            _ = sleep_until_deadline(deadline) => {
                self.terminate(&mut child).await;
                return Err(AgentError::Timeout(invocation.timeout.unwrap_or_default()));
            }
        };

        let stderr = stderr_task.await.unwrap_or_default();

        if status.success() {
            return Ok(AgentResponse { response, tokens });
        }

        match status.code() {
            Some(code) => Err(AgentError::NonZeroExit {
                code,
                stderr: stderr.trim().to_string(),
            }),
            None => {
                #[cfg(unix)]
                let signal = {
                    use std::os::unix::process::ExitStatusExt;
                    status.signal().unwrap_or(0)
                };
                #[cfg(not(unix))]
                let signal = 0;
                Err(AgentError::Signal {
                    signal,
                    stderr: stderr.trim().to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
