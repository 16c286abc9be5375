//! Routing-subsystem error type.

use thiserror::Error;

use mm_core::{LinkId, NodeId};

/// Errors produced by the shortest-path engine.
///
/// `Unreachable` is a per-query outcome the caller decides how to handle
/// (a stuck traveler is not a fatal condition); `InvalidCost` indicates
/// malformed link data and should abort setup.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no path from {from} to {to} under the given layer restriction")]
    Unreachable { from: NodeId, to: NodeId },

    #[error("link {link}: cost {name:?} is missing or negative")]
    InvalidCost { link: LinkId, name: String },
}

pub type RoutingResult<T> = Result<T, RoutingError>;
