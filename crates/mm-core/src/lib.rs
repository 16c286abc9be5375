//! `mm-core` — foundational types for the `multimodal-sim` workspace.
//!
//! This crate is a dependency of every other `mm-*` crate.  It intentionally
//! has no `mm-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`ids`]     | `RoadNodeId`, `RoadLinkId`, `ZoneId`, `LayerId`, `NodeId`, `LinkId`, `UserId`, `VehicleId` |
//! | [`geo`]     | `Point`, planar Euclidean distance                            |
//! | [`time`]    | `Tick`, `SimClock`, `SimConfig`                               |
//! | [`rng`]     | `SimRng` (seeded, with deterministic sub-streams)             |
//! | [`mode`]    | `Mode` enum                                                   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod geo;
pub mod ids;
pub mod mode;
pub mod rng;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::Point;
pub use ids::{LayerId, LinkId, NodeId, RoadLinkId, RoadNodeId, UserId, VehicleId, ZoneId};
pub use mode::Mode;
pub use rng::SimRng;
pub use time::{SimClock, SimConfig, Tick};
