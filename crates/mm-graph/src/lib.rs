//! `mm-graph` — road descriptor, mobility layers, and the composite graph.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                        |
//! |----------------|-----------------------------------------------------------------|
//! | [`roads`]      | `RoadNetwork` (nodes, links, zones), `RoadSpatialIndex`         |
//! | [`costs`]      | `Costs` — named per-link cost table                             |
//! | [`composite`]  | `MultiLayerGraph`, `MobilityLayer`, transfer + OD access links  |
//! | [`view`]       | `LayerSet`, `SubgraphView` — restricted traversal views         |
//! | [`generation`] | Grid road-network generator, road-mirroring layer helper        |
//! | [`persist`]    | JSON save/load of roads + layers + transfers                    |
//! | [`error`]      | `GraphError`, `GraphResult<T>`                                  |
//!
//! # Construction vs. query
//!
//! The graph is assembled once at setup time (roads → layers → transfers →
//! OD access links) and is read-only for the rest of the run.  All
//! construction-time errors are fatal by design: they indicate malformed
//! input data.  Queries go through [`SubgraphView`], which restricts
//! traversal to a caller-supplied set of layers without copying anything.

pub mod composite;
pub mod costs;
pub mod error;
pub mod generation;
pub mod persist;
pub mod roads;
pub mod view;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use composite::{GraphLink, GraphNode, LinkKind, MobilityLayer, MultiLayerGraph, TransferDirection};
pub use costs::{Costs, COST_LENGTH, COST_TIME};
pub use error::{GraphError, GraphResult};
pub use roads::{RoadLink, RoadNetwork, RoadNode, RoadSpatialIndex, Zone};
pub use view::{LayerSet, SubgraphView};
