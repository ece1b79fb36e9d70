//! Reconciliation error types.

use thiserror::Error;

use stackmon_core::event::EventError;
use stackmon_core::{MonitorError, SourceError};
use stackmon_diff::DiffError;
use stackmon_tfstate::ParseError;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("invalid event: {0}")]
    Event(#[from] EventError),

    #[error("state source error: {0}")]
    Source(#[from] SourceError),

    #[error("state parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("diff error: {0}")]
    Diff(#[from] DiffError),

    #[error("monitoring vendor error: {0}")]
    Monitor(#[from] MonitorError),
}

pub type ReconcileResult<T> = Result<T, ReconcileError>;
