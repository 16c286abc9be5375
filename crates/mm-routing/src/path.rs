//! Computed routes.

use mm_core::{LayerId, LinkId, NodeId};
use mm_graph::{LinkKind, MultiLayerGraph};

/// The result of a routing query: an ordered link sequence plus its total
/// cost under the cost function it was computed with.  Immutable once
/// computed; bound to a traveler by the supervisor.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    /// Links to traverse in order, from origin to destination.
    pub links: Vec<LinkId>,
    /// Total cost under the cost name used by the search.
    pub cost: f64,
}

impl Path {
    /// `true` if origin and destination were the same node.
    pub fn is_trivial(&self) -> bool {
        self.links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// The node sequence visited, origin first.
    pub fn nodes(&self, graph: &MultiLayerGraph) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(self.links.len() + 1);
        if let Some(&first) = self.links.first() {
            nodes.push(graph.link(first).upstream);
        }
        nodes.extend(self.links.iter().map(|&l| graph.link(l).downstream));
        nodes
    }

    /// Total physical length in metres.
    pub fn length(&self, graph: &MultiLayerGraph) -> f64 {
        self.links.iter().map(|&l| graph.link(l).length).sum()
    }

    /// Decompose into legs: maximal runs of same-layer mode links, with
    /// each transfer and each access run as its own leg.  This is what the
    /// user flow walks through segment by segment.
    pub fn legs(&self, graph: &MultiLayerGraph) -> Vec<PathLeg> {
        let mut legs: Vec<PathLeg> = Vec::new();
        for &link_id in &self.links {
            let link = graph.link(link_id);
            let kind = match link.kind {
                LinkKind::Mode(layer) => LegKind::Ride(layer),
                LinkKind::Transfer { .. } => LegKind::Transfer,
                LinkKind::Access => LegKind::Access,
            };
            match legs.last_mut() {
                // Transfers never merge; rides merge per layer, access runs merge.
                Some(leg) if leg.kind == kind && kind != LegKind::Transfer => {
                    leg.links.push(link_id);
                    leg.length += link.length;
                }
                _ => legs.push(PathLeg {
                    kind,
                    links: vec![link_id],
                    length: link.length,
                }),
            }
        }
        legs
    }
}

/// What a traveler does on one leg of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegKind {
    /// Riding a vehicle of the given layer.
    Ride(LayerId),
    /// Changing layers at one physical location.
    Transfer,
    /// Walking between a demand endpoint and the network.
    Access,
}

/// One leg of a decomposed [`Path`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathLeg {
    pub kind: LegKind,
    pub links: Vec<LinkId>,
    /// Summed physical length of the leg, metres.
    pub length: f64,
}

impl PathLeg {
    /// Summed value of cost `name` over the leg's links (missing names count
    /// as 0 — used for transfer wait times, which are optional).
    pub fn cost_sum(&self, graph: &MultiLayerGraph, name: &str) -> f64 {
        self.links
            .iter()
            .filter_map(|&l| graph.link(l).costs.get(name))
            .sum()
    }
}
