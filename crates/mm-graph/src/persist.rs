//! JSON persistence for the road descriptor and the layered graph.
//!
//! # Format
//!
//! One JSON document holding road nodes/links/zones, layer metadata, layer
//! nodes, and mode/transfer links.  Composite nodes and links are stored in
//! id order and loading replays the public construction API in that order,
//! so a round trip reproduces identical ids and re-validates every
//! construction invariant (duplicate ids, endpoint existence, road-chain
//! contiguity).
//!
//! The origin/destination access layer is demand-dependent and is **not**
//! persisted: save before wiring OD endpoints, and reconnect them after
//! loading.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use mm_core::Mode;

use crate::composite::{LinkKind, MultiLayerGraph, TransferDirection};
use crate::costs::Costs;
use crate::error::{GraphError, GraphResult};
use crate::roads::RoadNetwork;

// ── Document types ────────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize)]
pub struct GraphDocument {
    pub road_nodes: Vec<RoadNodeDoc>,
    pub road_links: Vec<RoadLinkDoc>,
    pub zones: Vec<ZoneDoc>,
    pub layers: Vec<LayerDoc>,
    pub nodes: Vec<NodeDoc>,
    pub links: Vec<LinkDoc>,
}

#[derive(Serialize, Deserialize)]
pub struct RoadNodeDoc {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize)]
pub struct RoadLinkDoc {
    pub label: String,
    pub upstream: String,
    pub downstream: String,
    pub length: f64,
}

#[derive(Serialize, Deserialize)]
pub struct ZoneDoc {
    pub label: String,
    pub links: Vec<String>,
}

#[derive(Serialize, Deserialize)]
pub struct LayerDoc {
    pub label: String,
    pub mode: String,
    pub default_speed: f64,
}

/// A layer node, stored with its layer-local label.
#[derive(Serialize, Deserialize)]
pub struct NodeDoc {
    pub layer: String,
    pub label: String,
    pub road_node: String,
}

#[derive(Serialize, Deserialize)]
pub struct LinkDoc {
    pub label: String,
    /// `Some(layer_label)` for mode links, `None` for transfers.
    pub layer: Option<String>,
    /// Namespaced endpoint labels (`"car:A"`).
    pub upstream: String,
    pub downstream: String,
    /// BTreeMap keeps the JSON output deterministic.
    pub costs: BTreeMap<String, f64>,
    pub road_refs: Vec<String>,
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Snapshot `graph` into a serializable document.
///
/// Access links and OD nodes are skipped (see module docs).
pub fn to_document(graph: &MultiLayerGraph) -> GraphDocument {
    let roads = &graph.roads;

    let road_nodes = roads
        .nodes()
        .iter()
        .map(|n| RoadNodeDoc {
            label: n.label.clone(),
            x: n.pos.x,
            y: n.pos.y,
        })
        .collect();

    let road_links = roads
        .links()
        .iter()
        .map(|l| RoadLinkDoc {
            label: l.label.clone(),
            upstream: roads.node(l.upstream).label.clone(),
            downstream: roads.node(l.downstream).label.clone(),
            length: l.length,
        })
        .collect();

    let zones = roads
        .zones()
        .iter()
        .map(|z| ZoneDoc {
            label: z.label.clone(),
            links: z.links.iter().map(|&l| roads.link(l).label.clone()).collect(),
        })
        .collect();

    let layers = graph
        .layers()
        .iter()
        .map(|l| LayerDoc {
            label: l.label.clone(),
            mode: l.mode.as_str().to_owned(),
            default_speed: l.default_speed,
        })
        .collect();

    let nodes = graph
        .nodes()
        .iter()
        .filter_map(|n| {
            let layer = n.layer?;
            let layer_label = &graph.layer(layer).label;
            let local = n
                .label
                .strip_prefix(&format!("{layer_label}:"))
                .unwrap_or(&n.label);
            Some(NodeDoc {
                layer: layer_label.clone(),
                label: local.to_owned(),
                road_node: roads.node(n.road_node?).label.clone(),
            })
        })
        .collect();

    let links = graph
        .links()
        .iter()
        .filter_map(|l| {
            let layer = match l.kind {
                LinkKind::Mode(layer) => Some(graph.layer(layer).label.clone()),
                LinkKind::Transfer { .. } => None,
                LinkKind::Access => return None,
            };
            Some(LinkDoc {
                label: l.label.clone(),
                layer,
                upstream: graph.node(l.upstream).label.clone(),
                downstream: graph.node(l.downstream).label.clone(),
                costs: l.costs.iter().map(|(k, v)| (k.to_owned(), v)).collect(),
                road_refs: l.road_refs.iter().map(|&r| roads.link(r).label.clone()).collect(),
            })
        })
        .collect();

    GraphDocument {
        road_nodes,
        road_links,
        zones,
        layers,
        nodes,
        links,
    }
}

/// Save `graph` as pretty-printed JSON at `path`.
pub fn save_graph(graph: &MultiLayerGraph, path: &Path) -> GraphResult<()> {
    let doc = to_document(graph);
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &doc)?;
    Ok(())
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Rebuild a graph from a document by replaying the construction API, which
/// re-validates every assembly invariant.
pub fn from_document(doc: &GraphDocument) -> GraphResult<MultiLayerGraph> {
    let mut roads = RoadNetwork::new();
    for n in &doc.road_nodes {
        roads.add_node(&n.label, mm_core::Point::new(n.x, n.y))?;
    }
    for l in &doc.road_links {
        let up = resolve(roads.node_id(&l.upstream), &l.upstream)?;
        let down = resolve(roads.node_id(&l.downstream), &l.downstream)?;
        roads.add_link(&l.label, up, down, l.length)?;
    }
    for z in &doc.zones {
        let zone = roads.add_zone(&z.label)?;
        for label in &z.links {
            let link = roads
                .link_id(label)
                .ok_or_else(|| GraphError::UnknownLink(label.clone()))?;
            roads.assign_zone(link, zone)?;
        }
    }

    let mut graph = MultiLayerGraph::new(roads);
    for l in &doc.layers {
        let mode = Mode::parse(&l.mode)
            .ok_or_else(|| GraphError::UnknownLayer(format!("unknown mode {:?}", l.mode)))?;
        graph.add_layer(&l.label, mode, l.default_speed)?;
    }
    for n in &doc.nodes {
        let layer = graph
            .layer_id(&n.layer)
            .ok_or_else(|| GraphError::UnknownLayer(n.layer.clone()))?;
        let road_node = resolve(graph.roads.node_id(&n.road_node), &n.road_node)?;
        graph.add_layer_node(layer, &n.label, road_node)?;
    }
    for l in &doc.links {
        let up = resolve(graph.node_id(&l.upstream), &l.upstream)?;
        let down = resolve(graph.node_id(&l.downstream), &l.downstream)?;
        let costs: Costs = l.costs.iter().map(|(k, &v)| (k.clone(), v)).collect();
        match &l.layer {
            Some(layer_label) => {
                let layer = graph
                    .layer_id(layer_label)
                    .ok_or_else(|| GraphError::UnknownLayer(layer_label.clone()))?;
                let road_refs = l
                    .road_refs
                    .iter()
                    .map(|label| {
                        graph
                            .roads
                            .link_id(label)
                            .ok_or_else(|| GraphError::UnknownLink(label.clone()))
                    })
                    .collect::<GraphResult<Vec<_>>>()?;
                graph.add_layer_link(layer, &l.label, up, down, costs, &road_refs)?;
            }
            None => {
                // Transfers were saved individually; bidirectional pairs
                // round-trip as two one-way documents.
                graph.connect_layers(&l.label, up, down, costs, TransferDirection::OneWay)?;
            }
        }
    }
    Ok(graph)
}

/// Load a graph from a JSON file written by [`save_graph`].
pub fn load_graph(path: &Path) -> GraphResult<MultiLayerGraph> {
    let file = std::fs::File::open(path)?;
    let doc: GraphDocument = serde_json::from_reader(file)?;
    from_document(&doc)
}

fn resolve<T>(id: Option<T>, label: &str) -> GraphResult<T> {
    id.ok_or_else(|| GraphError::UnknownNode(label.to_owned()))
}
