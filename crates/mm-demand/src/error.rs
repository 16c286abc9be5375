//! Demand-subsystem error type.

use thiserror::Error;

/// Errors produced while loading or generating demand.
#[derive(Debug, Error)]
pub enum DemandError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("row {row}: mixes node and coordinate endpoints")]
    MixedEndpoints { row: usize },

    #[error("road node {0:?} not found")]
    UnknownNode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DemandResult<T> = Result<T, DemandError>;
