//! `mm-routing` — shortest-path search over restricted graph views.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                       |
//! |------------|----------------------------------------------------------------|
//! | [`path`]   | `Path`, `PathLeg` — computed routes and their decomposition    |
//! | [`search`] | Dijkstra, A*, multi-destination, bidirectional searches        |
//! | [`error`]  | `RoutingError`, `RoutingResult<T>`                             |
//!
//! # Contract
//!
//! All searches run over a [`SubgraphView`][mm_graph::SubgraphView] and never
//! traverse a link outside the view's layer restriction.  Costs are strictly
//! non-negative named values; a negative or missing cost on a traversed link
//! is a configuration error ([`RoutingError::InvalidCost`]), except on OD
//! access links where missing names default to 0.
//!
//! Tie-break is deterministic everywhere: adjacency is iterated in ascending
//! link id, relaxation is strict, and heap ties pop the smaller node id —
//! among equal-cost paths the first-discovered one is kept.

pub mod error;
pub mod path;
pub mod search;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{RoutingError, RoutingResult};
pub use path::{LegKind, Path, PathLeg};
pub use search::{
    bidirectional_shortest_path, shortest_path, shortest_path_astar, shortest_paths_to_set,
};
