// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress emitter seam.
//!
//! The single capability every producer calls. Implementations must be
//! safe under concurrent use and must accept events synchronously — an
//! emitter may buffer or coalesce, but it never blocks a producer on
//! rendering or I/O completion.

use crate::event::ProgressEvent;
use thiserror::Error;

/// Failure to deliver an event to a sink.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("emit io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sink error: {0}")]
    Sink(String),
}

/// Single-writer progress capability consumed by producers.
pub trait ProgressEmitter: Send + Sync {
    /// Publish one event. Must return promptly; sinks that render or
    /// write do so from their own buffers, not inside the caller.
    fn emit(&self, event: &ProgressEvent) -> Result<(), EmitError>;

    /// Drain any buffered or pending state. Called during shutdown.
    fn flush(&self) -> Result<(), EmitError> {
        Ok(())
    }
}

/// Emitter that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEmitter;

impl ProgressEmitter for NullEmitter {
    fn emit(&self, _event: &ProgressEvent) -> Result<(), EmitError> {
        Ok(())
    }
}
