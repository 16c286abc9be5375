//! Physical road network: nodes, directed links, and zones (reservoirs).
//!
//! # Data layout
//!
//! Entities are stored in id-indexed `Vec`s; string labels from the input
//! data are kept alongside, with `label → id` lookup maps for resolution at
//! load time.  Ids are dense and assigned in insertion order.
//!
//! The road descriptor is pure geometry + topology.  It has no behavior
//! beyond membership queries; speeds and accumulation live in the flow
//! motor, layer costs live in the composite graph.
//!
//! # Spatial index
//!
//! [`RoadSpatialIndex`] is a bulk-loaded R-tree (via `rstar`) over node
//! positions.  It is built on demand — once the network is assembled — and
//! owns its data, so it can outlive later mutable borrows of the network.
//! Used to snap demand coordinates to nodes and to wire origin/destination
//! access links.

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use rustc_hash::FxHashMap;

use mm_core::{Point, RoadLinkId, RoadNodeId, ZoneId};

use crate::error::{GraphError, GraphResult};

// ── Entities ──────────────────────────────────────────────────────────────────

/// A physical road node.
#[derive(Debug, Clone)]
pub struct RoadNode {
    pub id: RoadNodeId,
    pub label: String,
    pub pos: Point,
}

/// A directed physical road link.  Immutable after construction except for
/// the zone tag.
#[derive(Debug, Clone)]
pub struct RoadLink {
    pub id: RoadLinkId,
    pub label: String,
    pub upstream: RoadNodeId,
    pub downstream: RoadNodeId,
    /// Physical length in metres.
    pub length: f64,
    /// The zone this link belongs to, if any.  At most one.
    pub zone: Option<ZoneId>,
}

/// A zone (reservoir): a set of road links over which macroscopic speed is
/// computed from vehicle accumulation.
#[derive(Debug, Clone)]
pub struct Zone {
    pub id: ZoneId,
    pub label: String,
    /// Member links, in assignment order.
    pub links: Vec<RoadLinkId>,
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// The road descriptor: all physical nodes, links, and zones.
#[derive(Debug, Default)]
pub struct RoadNetwork {
    nodes: Vec<RoadNode>,
    links: Vec<RoadLink>,
    zones: Vec<Zone>,
    node_ids: FxHashMap<String, RoadNodeId>,
    link_ids: FxHashMap<String, RoadLinkId>,
    zone_ids: FxHashMap<String, ZoneId>,
}

impl RoadNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Construction ──────────────────────────────────────────────────────

    /// Add a road node.  Fails with [`GraphError::DuplicateId`] if `label`
    /// is already taken.
    pub fn add_node(&mut self, label: &str, pos: Point) -> GraphResult<RoadNodeId> {
        if self.node_ids.contains_key(label) {
            return Err(GraphError::DuplicateId(label.to_owned()));
        }
        let id = RoadNodeId(self.nodes.len() as u32);
        self.nodes.push(RoadNode {
            id,
            label: label.to_owned(),
            pos,
        });
        self.node_ids.insert(label.to_owned(), id);
        Ok(id)
    }

    /// Add a directed road link of physical `length` metres.
    ///
    /// Fails with [`GraphError::DuplicateId`] on a reused label and
    /// [`GraphError::UnknownNode`] when an endpoint does not exist.  No
    /// geometry validation happens beyond endpoint existence; coordinate
    /// correctness is the data producer's responsibility.
    pub fn add_link(
        &mut self,
        label: &str,
        upstream: RoadNodeId,
        downstream: RoadNodeId,
        length: f64,
    ) -> GraphResult<RoadLinkId> {
        if self.link_ids.contains_key(label) {
            return Err(GraphError::DuplicateId(label.to_owned()));
        }
        self.check_node(upstream)?;
        self.check_node(downstream)?;

        let id = RoadLinkId(self.links.len() as u32);
        self.links.push(RoadLink {
            id,
            label: label.to_owned(),
            upstream,
            downstream,
            length,
            zone: None,
        });
        self.link_ids.insert(label.to_owned(), id);
        Ok(id)
    }

    /// Register a new (empty) zone.
    pub fn add_zone(&mut self, label: &str) -> GraphResult<ZoneId> {
        if self.zone_ids.contains_key(label) {
            return Err(GraphError::DuplicateId(label.to_owned()));
        }
        let id = ZoneId(self.zones.len() as u16);
        self.zones.push(Zone {
            id,
            label: label.to_owned(),
            links: Vec::new(),
        });
        self.zone_ids.insert(label.to_owned(), id);
        Ok(id)
    }

    /// Assign `link` to `zone`.
    ///
    /// A link belongs to at most one zone: if it was previously assigned
    /// elsewhere, it is moved (removed from the old zone's member set).
    pub fn assign_zone(&mut self, link: RoadLinkId, zone: ZoneId) -> GraphResult<()> {
        self.check_link(link)?;
        self.check_zone(zone)?;

        if let Some(old) = self.links[link.index()].zone {
            if old == zone {
                return Ok(());
            }
            self.zones[old.index()].links.retain(|&l| l != link);
        }
        self.links[link.index()].zone = Some(zone);
        self.zones[zone.index()].links.push(link);
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// All road nodes touched by `zone`'s member links (endpoints, sorted
    /// ascending, deduplicated).
    pub fn nodes_in_zone(&self, zone: ZoneId) -> GraphResult<Vec<RoadNodeId>> {
        self.check_zone(zone)?;
        let mut nodes: Vec<RoadNodeId> = self.zones[zone.index()]
            .links
            .iter()
            .flat_map(|&l| {
                let link = &self.links[l.index()];
                [link.upstream, link.downstream]
            })
            .collect();
        nodes.sort_unstable();
        nodes.dedup();
        Ok(nodes)
    }

    #[inline]
    pub fn node(&self, id: RoadNodeId) -> &RoadNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn link(&self, id: RoadLinkId) -> &RoadLink {
        &self.links[id.index()]
    }

    #[inline]
    pub fn zone(&self, id: ZoneId) -> &Zone {
        &self.zones[id.index()]
    }

    pub fn node_id(&self, label: &str) -> Option<RoadNodeId> {
        self.node_ids.get(label).copied()
    }

    pub fn link_id(&self, label: &str) -> Option<RoadLinkId> {
        self.link_ids.get(label).copied()
    }

    pub fn zone_id(&self, label: &str) -> Option<ZoneId> {
        self.zone_ids.get(label).copied()
    }

    pub fn nodes(&self) -> &[RoadNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[RoadLink] {
        &self.links
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Build an owned R-tree over all node positions.
    ///
    /// O(N log N) bulk load; build once after assembly and reuse.
    pub fn spatial_index(&self) -> RoadSpatialIndex {
        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .map(|n| NodeEntry {
                point: [n.pos.x, n.pos.y],
                id: n.id,
            })
            .collect();
        RoadSpatialIndex {
            tree: RTree::bulk_load(entries),
        }
    }

    // ── Validity checks ───────────────────────────────────────────────────

    fn check_node(&self, id: RoadNodeId) -> GraphResult<()> {
        if id.index() >= self.nodes.len() {
            return Err(GraphError::UnknownNode(id.to_string()));
        }
        Ok(())
    }

    fn check_link(&self, id: RoadLinkId) -> GraphResult<()> {
        if id.index() >= self.links.len() {
            return Err(GraphError::UnknownLink(id.to_string()));
        }
        Ok(())
    }

    fn check_zone(&self, id: ZoneId) -> GraphResult<()> {
        if id.index() >= self.zones.len() {
            return Err(GraphError::UnknownZone(id.to_string()));
        }
        Ok(())
    }
}

// ── Spatial index ─────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a 2-D point with the associated node id.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id: RoadNodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

/// Owned R-tree over road-node positions.
pub struct RoadSpatialIndex {
    tree: RTree<NodeEntry>,
}

impl RoadSpatialIndex {
    /// The nearest node to `pos` and its distance, or `None` on an empty
    /// network.
    pub fn nearest(&self, pos: Point) -> Option<(RoadNodeId, f64)> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[pos.x, pos.y])
            .next()
            .map(|(e, d2)| (e.id, d2.sqrt()))
    }

    /// All nodes within `radius` metres of `pos`, sorted by ascending
    /// distance.
    pub fn within_radius(&self, pos: Point, radius: f64) -> Vec<(RoadNodeId, f64)> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[pos.x, pos.y])
            .take_while(|&(_, d2)| d2 <= radius * radius)
            .map(|(e, d2)| (e.id, d2.sqrt()))
            .collect()
    }
}
