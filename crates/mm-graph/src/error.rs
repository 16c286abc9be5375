//! Graph-assembly error type.
//!
//! Every variant is a construction-time failure: the input data is malformed
//! and setup must abort.  Nothing here is recoverable at simulation time.

use thiserror::Error;

/// Errors produced while assembling the road descriptor or the composite
/// multi-layer graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("id {0:?} already exists")]
    DuplicateId(String),

    #[error("node {0:?} not found")]
    UnknownNode(String),

    #[error("link {0:?} not found")]
    UnknownLink(String),

    #[error("layer {0:?} not found")]
    UnknownLayer(String),

    #[error("zone {0:?} not found")]
    UnknownZone(String),

    #[error("link {label:?}: {detail}")]
    DanglingReference { label: String, detail: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GraphResult<T> = Result<T, GraphError>;
