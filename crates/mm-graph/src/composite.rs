//! The composite multi-layer graph.
//!
//! # Model
//!
//! One routable topology per transport mode (a **mobility layer**), all
//! flattened into a single node/link id space, plus **transfer links**
//! connecting two layers at the same physical location, plus an
//! **origin/destination access layer** whose nodes map 1:1 to demand
//! endpoints.
//!
//! Layer nodes reference the physical road node they sit on; layer links
//! reference the ordered chain of road links they run over.  Both are
//! back-references (relation + lookup table), never shared ownership: the
//! road descriptor stays the single owner of physical geometry.
//!
//! Node labels are namespaced by their layer (`"car:A"`), which makes
//! composite identifiers globally unique across layers.  Link labels are
//! caller-supplied and checked for global uniqueness.
//!
//! # Adjacency
//!
//! Per-node out/in adjacency lists hold link ids in insertion order, which
//! equals ascending `LinkId` order.  The routing engine relies on this for
//! its deterministic tie-break, so adjacency lists are append-only.

use rustc_hash::FxHashMap;

use mm_core::{LayerId, LinkId, Mode, NodeId, Point, RoadLinkId, RoadNodeId};

use crate::costs::{Costs, COST_LENGTH, COST_TIME};
use crate::error::{GraphError, GraphResult};
use crate::roads::{RoadNetwork, RoadSpatialIndex};
use crate::view::{LayerSet, SubgraphView};

// ── Entities ──────────────────────────────────────────────────────────────────

/// What a composite link is, and which layers it involves.  Drives subgraph
/// filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// A mode link belonging to one mobility layer.
    Mode(LayerId),
    /// A transfer between two layers at the same physical location.
    Transfer { from: LayerId, to: LayerId },
    /// An origin/destination access link.  Always traversable.
    Access,
}

/// A node in the composite graph: either a layer node sitting on a road
/// node, or an origin/destination access node at a free position.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub id: NodeId,
    /// Globally unique label (`"car:A"` for layer nodes, the endpoint label
    /// for OD nodes).
    pub label: String,
    /// Owning layer; `None` for OD access nodes.
    pub layer: Option<LayerId>,
    /// Underlying physical road node; `None` for OD access nodes.
    pub road_node: Option<RoadNodeId>,
    pub pos: Point,
}

/// A directed link in the composite graph.
#[derive(Debug, Clone)]
pub struct GraphLink {
    pub id: LinkId,
    pub label: String,
    pub kind: LinkKind,
    pub upstream: NodeId,
    pub downstream: NodeId,
    pub costs: Costs,
    /// Ordered chain of physical road links this link runs over.  Empty for
    /// transfer and access links, and for mode links with no physical
    /// backing (pure walking connections).
    pub road_refs: Vec<RoadLinkId>,
    /// Physical length in metres (0 for transfers).
    pub length: f64,
}

/// Metadata for one mobility layer.
#[derive(Debug, Clone)]
pub struct MobilityLayer {
    pub id: LayerId,
    pub label: String,
    pub mode: Mode,
    /// Free-flow speed (m/s) used by the flow motor when no zone override
    /// applies to a vehicle's current position.
    pub default_speed: f64,
    /// Composite ids of this layer's nodes, in insertion order.
    pub nodes: Vec<NodeId>,
    /// Composite ids of this layer's mode links, in insertion order.
    pub links: Vec<LinkId>,
    /// Layer-local label → composite node id.
    node_ids: FxHashMap<String, NodeId>,
}

/// Whether `connect_layers` inserts one transfer link or a reverse pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    OneWay,
    Bidirectional,
}

// ── MultiLayerGraph ───────────────────────────────────────────────────────────

/// The queryable surface over all layers, transfers, and OD access links.
pub struct MultiLayerGraph {
    pub roads: RoadNetwork,

    layers: Vec<MobilityLayer>,
    layer_ids: FxHashMap<String, LayerId>,

    nodes: Vec<GraphNode>,
    links: Vec<GraphLink>,
    node_ids: FxHashMap<String, NodeId>,
    link_ids: FxHashMap<String, LinkId>,

    out: Vec<Vec<LinkId>>,
    inc: Vec<Vec<LinkId>>,

    /// Back-reference: road node → layer nodes sitting on it.
    road_node_refs: FxHashMap<RoadNodeId, Vec<NodeId>>,
    /// Back-reference: road link → layer links running over it.
    road_link_refs: FxHashMap<RoadLinkId, Vec<LinkId>>,

    /// Maximum distance (metres) between a demand endpoint and the layer
    /// nodes its access links may attach to.
    pub access_radius: f64,
    /// Walking speed (m/s) used for the deterministic default `time` cost on
    /// access links.
    pub od_walk_speed: f64,
}

impl MultiLayerGraph {
    pub fn new(roads: RoadNetwork) -> Self {
        Self {
            roads,
            layers: Vec::new(),
            layer_ids: FxHashMap::default(),
            nodes: Vec::new(),
            links: Vec::new(),
            node_ids: FxHashMap::default(),
            link_ids: FxHashMap::default(),
            out: Vec::new(),
            inc: Vec::new(),
            road_node_refs: FxHashMap::default(),
            road_link_refs: FxHashMap::default(),
            access_radius: 500.0,
            od_walk_speed: 1.42,
        }
    }

    // ── Layer construction ────────────────────────────────────────────────

    /// Register a new mobility layer.
    pub fn add_layer(&mut self, label: &str, mode: Mode, default_speed: f64) -> GraphResult<LayerId> {
        if self.layer_ids.contains_key(label) {
            return Err(GraphError::DuplicateId(label.to_owned()));
        }
        let id = LayerId(self.layers.len() as u16);
        self.layers.push(MobilityLayer {
            id,
            label: label.to_owned(),
            mode,
            default_speed,
            nodes: Vec::new(),
            links: Vec::new(),
            node_ids: FxHashMap::default(),
        });
        self.layer_ids.insert(label.to_owned(), id);
        Ok(id)
    }

    /// Add a node to `layer`, sitting on physical `road_node`.
    pub fn add_layer_node(
        &mut self,
        layer: LayerId,
        label: &str,
        road_node: RoadNodeId,
    ) -> GraphResult<NodeId> {
        self.check_layer(layer)?;
        if road_node.index() >= self.roads.node_count() {
            return Err(GraphError::UnknownNode(road_node.to_string()));
        }
        let namespaced = format!("{}:{}", self.layers[layer.index()].label, label);
        if self.node_ids.contains_key(&namespaced) {
            return Err(GraphError::DuplicateId(namespaced));
        }

        let id = NodeId(self.nodes.len() as u32);
        let pos = self.roads.node(road_node).pos;
        self.nodes.push(GraphNode {
            id,
            label: namespaced.clone(),
            layer: Some(layer),
            road_node: Some(road_node),
            pos,
        });
        self.node_ids.insert(namespaced, id);
        self.out.push(Vec::new());
        self.inc.push(Vec::new());

        let meta = &mut self.layers[layer.index()];
        meta.nodes.push(id);
        meta.node_ids.insert(label.to_owned(), id);
        self.road_node_refs.entry(road_node).or_default().push(id);
        Ok(id)
    }

    /// Add a mode link to `layer` between two of its nodes.
    ///
    /// `road_refs` must form a contiguous chain in the road graph from the
    /// upstream node's underlying road node to the downstream node's; the
    /// link's physical length is the chain's summed length.  An empty chain
    /// is allowed for links with no physical backing (walking connections),
    /// in which case a `length` cost must be supplied explicitly.
    pub fn add_layer_link(
        &mut self,
        layer: LayerId,
        label: &str,
        upstream: NodeId,
        downstream: NodeId,
        mut costs: Costs,
        road_refs: &[RoadLinkId],
    ) -> GraphResult<LinkId> {
        self.check_layer(layer)?;
        if self.link_ids.contains_key(label) {
            return Err(GraphError::DuplicateId(label.to_owned()));
        }
        self.check_node(upstream)?;
        self.check_node(downstream)?;
        for &node in &[upstream, downstream] {
            if self.nodes[node.index()].layer != Some(layer) {
                return Err(GraphError::DanglingReference {
                    label: label.to_owned(),
                    detail: format!("endpoint {} does not belong to the link's layer", node),
                });
            }
        }

        let length = self.checked_chain_length(label, upstream, downstream, road_refs, &costs)?;
        costs.or_insert(COST_LENGTH, length);

        let id = LinkId(self.links.len() as u32);
        self.links.push(GraphLink {
            id,
            label: label.to_owned(),
            kind: LinkKind::Mode(layer),
            upstream,
            downstream,
            costs,
            road_refs: road_refs.to_vec(),
            length,
        });
        self.link_ids.insert(label.to_owned(), id);
        self.out[upstream.index()].push(id);
        self.inc[downstream.index()].push(id);
        self.layers[layer.index()].links.push(id);
        for &road_link in road_refs {
            self.road_link_refs.entry(road_link).or_default().push(id);
        }
        Ok(id)
    }

    /// Back-fill cost `name` with `value` on every link of `layer` that
    /// lacks it.
    pub fn set_default_cost(&mut self, layer: LayerId, name: &str, value: f64) -> GraphResult<()> {
        self.check_layer(layer)?;
        let link_ids: Vec<LinkId> = self.layers[layer.index()].links.clone();
        for id in link_ids {
            self.links[id.index()].costs.or_insert(name, value);
        }
        Ok(())
    }

    // ── Transfers ─────────────────────────────────────────────────────────

    /// Insert a transfer link between two layer nodes.
    ///
    /// Both endpoints must be layer nodes of *different* layers.  Transfer
    /// links have zero physical length; any caller-supplied costs (e.g. a
    /// fixed transfer `time`) are kept.  `Bidirectional` inserts a second
    /// link in the reverse direction labelled `"<label>:rev"`.
    pub fn connect_layers(
        &mut self,
        label: &str,
        from: NodeId,
        to: NodeId,
        costs: Costs,
        direction: TransferDirection,
    ) -> GraphResult<LinkId> {
        self.check_node(from)?;
        self.check_node(to)?;
        let (from_layer, to_layer) = match (self.nodes[from.index()].layer, self.nodes[to.index()].layer)
        {
            (Some(a), Some(b)) if a != b => (a, b),
            (Some(_), Some(_)) => {
                return Err(GraphError::DanglingReference {
                    label: label.to_owned(),
                    detail: "transfer endpoints belong to the same layer".to_owned(),
                })
            }
            _ => {
                return Err(GraphError::DanglingReference {
                    label: label.to_owned(),
                    detail: "transfer endpoints must be layer nodes".to_owned(),
                })
            }
        };

        let id = self.insert_transfer(label, from, to, from_layer, to_layer, costs.clone())?;
        if direction == TransferDirection::Bidirectional {
            let rev = format!("{label}:rev");
            self.insert_transfer(&rev, to, from, to_layer, from_layer, costs)?;
        }
        Ok(id)
    }

    fn insert_transfer(
        &mut self,
        label: &str,
        from: NodeId,
        to: NodeId,
        from_layer: LayerId,
        to_layer: LayerId,
        mut costs: Costs,
    ) -> GraphResult<LinkId> {
        if self.link_ids.contains_key(label) {
            return Err(GraphError::DuplicateId(label.to_owned()));
        }
        costs.set(COST_LENGTH, 0.0);

        let id = LinkId(self.links.len() as u32);
        self.links.push(GraphLink {
            id,
            label: label.to_owned(),
            kind: LinkKind::Transfer {
                from: from_layer,
                to: to_layer,
            },
            upstream: from,
            downstream: to,
            costs,
            road_refs: Vec::new(),
            length: 0.0,
        });
        self.link_ids.insert(label.to_owned(), id);
        self.out[from.index()].push(id);
        self.inc[to.index()].push(id);
        Ok(id)
    }

    // ── Origin/destination access layer ───────────────────────────────────

    /// Create an origin access node at `pos` and connect it to the nearest
    /// node of every layer within [`access_radius`](Self::access_radius).
    ///
    /// Access links carry deterministic default costs:
    /// `length = distance`, `time = distance / od_walk_speed`.  A demand
    /// endpoint that reaches no layer at all is left unconnected (logged) —
    /// it will surface as an unreachable route for that traveler, which is a
    /// per-user failure, not a setup error.
    pub fn add_origin(
        &mut self,
        index: &RoadSpatialIndex,
        label: &str,
        pos: Point,
    ) -> GraphResult<NodeId> {
        let od = self.add_od_node(label, pos)?;
        let attach = self.access_targets(index, pos);
        if attach.is_empty() {
            log::warn!("origin {label:?} has no layer node within {} m", self.access_radius);
        }
        for (layer_node, dist) in attach {
            let link_label = format!("{}>{}", label, self.nodes[layer_node.index()].label);
            self.insert_access(&link_label, od, layer_node, dist)?;
        }
        Ok(od)
    }

    /// Create a destination access node at `pos`; the mirror image of
    /// [`add_origin`] (links run from the layer nodes to the OD node).
    pub fn add_destination(
        &mut self,
        index: &RoadSpatialIndex,
        label: &str,
        pos: Point,
    ) -> GraphResult<NodeId> {
        let od = self.add_od_node(label, pos)?;
        let attach = self.access_targets(index, pos);
        if attach.is_empty() {
            log::warn!(
                "destination {label:?} has no layer node within {} m",
                self.access_radius
            );
        }
        for (layer_node, dist) in attach {
            let link_label = format!("{}>{}", self.nodes[layer_node.index()].label, label);
            self.insert_access(&link_label, layer_node, od, dist)?;
        }
        Ok(od)
    }

    fn add_od_node(&mut self, label: &str, pos: Point) -> GraphResult<NodeId> {
        if self.node_ids.contains_key(label) {
            return Err(GraphError::DuplicateId(label.to_owned()));
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(GraphNode {
            id,
            label: label.to_owned(),
            layer: None,
            road_node: None,
            pos,
        });
        self.node_ids.insert(label.to_owned(), id);
        self.out.push(Vec::new());
        self.inc.push(Vec::new());
        Ok(id)
    }

    /// For each layer, the nearest layer node within `access_radius` of
    /// `pos` (by underlying road-node position), with its distance.
    fn access_targets(&self, index: &RoadSpatialIndex, pos: Point) -> Vec<(NodeId, f64)> {
        let mut nearest: Vec<Option<(NodeId, f64)>> = vec![None; self.layers.len()];
        // Road nodes come back sorted by ascending distance, so the first
        // layer node seen per layer is that layer's nearest.
        for (road_node, dist) in index.within_radius(pos, self.access_radius) {
            let Some(layer_nodes) = self.road_node_refs.get(&road_node) else {
                continue;
            };
            for &node in layer_nodes {
                let layer = self.nodes[node.index()].layer.expect("layer node");
                if nearest[layer.index()].is_none() {
                    nearest[layer.index()] = Some((node, dist));
                }
            }
        }
        nearest.into_iter().flatten().collect()
    }

    fn insert_access(&mut self, label: &str, from: NodeId, to: NodeId, dist: f64) -> GraphResult<LinkId> {
        if self.link_ids.contains_key(label) {
            return Err(GraphError::DuplicateId(label.to_owned()));
        }
        let mut costs = Costs::new();
        costs.set(COST_LENGTH, dist);
        costs.set(COST_TIME, dist / self.od_walk_speed);

        let id = LinkId(self.links.len() as u32);
        self.links.push(GraphLink {
            id,
            label: label.to_owned(),
            kind: LinkKind::Access,
            upstream: from,
            downstream: to,
            costs,
            road_refs: Vec::new(),
            length: dist,
        });
        self.link_ids.insert(label.to_owned(), id);
        self.out[from.index()].push(id);
        self.inc[to.index()].push(id);
        Ok(id)
    }

    // ── Views ─────────────────────────────────────────────────────────────

    /// A traversal view restricted to `layers`: mode links of those layers,
    /// transfer links between them, and all OD access links.  Borrows; no
    /// copying or mutation.
    pub fn available_subgraph(&self, layers: LayerSet) -> SubgraphView<'_> {
        SubgraphView::new(self, layers)
    }

    /// The set of every registered layer.
    pub fn all_layers(&self) -> LayerSet {
        self.layers.iter().map(|l| l.id).collect()
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn node(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn link(&self, id: LinkId) -> &GraphLink {
        &self.links[id.index()]
    }

    #[inline]
    pub fn layer(&self, id: LayerId) -> &MobilityLayer {
        &self.layers[id.index()]
    }

    pub fn layers(&self) -> &[MobilityLayer] {
        &self.layers
    }

    /// All composite nodes, in id order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// All composite links, in id order.
    pub fn links(&self) -> &[GraphLink] {
        &self.links
    }

    pub fn layer_id(&self, label: &str) -> Option<LayerId> {
        self.layer_ids.get(label).copied()
    }

    /// Resolve a layer-local node label (`"A"` in layer `"car"` → `"car:A"`).
    pub fn layer_node(&self, layer: LayerId, label: &str) -> Option<NodeId> {
        self.layers.get(layer.index())?.node_ids.get(label).copied()
    }

    /// Resolve a globally namespaced node label (layer nodes: `"car:A"`;
    /// OD nodes: their endpoint label).
    pub fn node_id(&self, label: &str) -> Option<NodeId> {
        self.node_ids.get(label).copied()
    }

    pub fn link_id(&self, label: &str) -> Option<LinkId> {
        self.link_ids.get(label).copied()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Outgoing link ids of `node`, in ascending id order.
    #[inline]
    pub fn out_links(&self, node: NodeId) -> &[LinkId] {
        &self.out[node.index()]
    }

    /// Incoming link ids of `node`, in ascending id order.
    #[inline]
    pub fn in_links(&self, node: NodeId) -> &[LinkId] {
        &self.inc[node.index()]
    }

    /// Layer links running over `road_link` (the reverse of `road_refs`).
    pub fn layer_links_on(&self, road_link: RoadLinkId) -> &[LinkId] {
        self.road_link_refs
            .get(&road_link)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // ── Validity checks ───────────────────────────────────────────────────

    fn check_layer(&self, id: LayerId) -> GraphResult<()> {
        if id.index() >= self.layers.len() {
            return Err(GraphError::UnknownLayer(id.to_string()));
        }
        Ok(())
    }

    fn check_node(&self, id: NodeId) -> GraphResult<()> {
        if id.index() >= self.nodes.len() {
            return Err(GraphError::UnknownNode(id.to_string()));
        }
        Ok(())
    }

    /// Validate the road-reference chain of a mode link and return its
    /// physical length.
    fn checked_chain_length(
        &self,
        label: &str,
        upstream: NodeId,
        downstream: NodeId,
        road_refs: &[RoadLinkId],
        costs: &Costs,
    ) -> GraphResult<f64> {
        let dangling = |detail: String| GraphError::DanglingReference {
            label: label.to_owned(),
            detail,
        };

        if road_refs.is_empty() {
            // No physical backing: the declared length cost is authoritative.
            return costs
                .get(COST_LENGTH)
                .ok_or_else(|| dangling("no road references and no length cost".to_owned()));
        }

        for &r in road_refs {
            if r.index() >= self.roads.link_count() {
                return Err(dangling(format!("road reference {r} does not exist")));
            }
        }
        for pair in road_refs.windows(2) {
            let a = self.roads.link(pair[0]);
            let b = self.roads.link(pair[1]);
            if a.downstream != b.upstream {
                return Err(dangling(format!(
                    "road chain breaks between {} and {}",
                    a.label, b.label
                )));
            }
        }

        let chain_start = self.roads.link(road_refs[0]).upstream;
        let chain_end = self.roads.link(*road_refs.last().expect("non-empty")).downstream;
        if self.nodes[upstream.index()].road_node != Some(chain_start) {
            return Err(dangling("road chain does not start at the upstream node".to_owned()));
        }
        if self.nodes[downstream.index()].road_node != Some(chain_end) {
            return Err(dangling("road chain does not end at the downstream node".to_owned()));
        }

        let length: f64 = road_refs.iter().map(|&r| self.roads.link(r).length).sum();
        if let Some(declared) = costs.get(COST_LENGTH) {
            if (declared - length).abs() > 1e-6 {
                return Err(dangling(format!(
                    "declared length {declared} does not match road chain length {length}"
                )));
            }
        }
        Ok(length)
    }
}
