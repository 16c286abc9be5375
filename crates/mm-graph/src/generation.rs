//! Synthetic network generators, used by examples and tests.

use mm_core::{LayerId, Mode, Point};

use crate::composite::MultiLayerGraph;
use crate::costs::{Costs, COST_LENGTH, COST_TIME};
use crate::error::GraphResult;
use crate::roads::RoadNetwork;

/// Build a rectangular grid road network of `cols × rows` nodes spaced
/// `spacing` metres apart, with links in both directions between orthogonal
/// neighbors.
///
/// Node labels are `"{col}_{row}"`; link labels are
/// `"{from_label}_{to_label}"`.
pub fn grid_network(cols: usize, rows: usize, spacing: f64) -> GraphResult<RoadNetwork> {
    let mut roads = RoadNetwork::new();

    let mut ids = Vec::with_capacity(cols * rows);
    for c in 0..cols {
        for r in 0..rows {
            let label = format!("{c}_{r}");
            let pos = Point::new(c as f64 * spacing, r as f64 * spacing);
            ids.push(roads.add_node(&label, pos)?);
        }
    }

    let at = |c: usize, r: usize| ids[c * rows + r];
    let connect = |roads: &mut RoadNetwork, a: (usize, usize), b: (usize, usize)| -> GraphResult<()> {
        let (na, nb) = (at(a.0, a.1), at(b.0, b.1));
        let (la, lb) = (format!("{}_{}", a.0, a.1), format!("{}_{}", b.0, b.1));
        roads.add_link(&format!("{la}_{lb}"), na, nb, spacing)?;
        roads.add_link(&format!("{lb}_{la}"), nb, na, spacing)?;
        Ok(())
    };

    for c in 0..cols {
        for r in 0..rows {
            if c + 1 < cols {
                connect(&mut roads, (c, r), (c + 1, r))?;
            }
            if r + 1 < rows {
                connect(&mut roads, (c, r), (c, r + 1))?;
            }
        }
    }
    Ok(roads)
}

/// Mirror the entire road network into a new mobility layer: one layer node
/// per road node and one layer link per road link, with
/// `{length, time = length / speed}` costs.
///
/// Layer node labels reuse the road labels; link labels are prefixed with
/// the layer label (`"car_0_0_1_0"`).
pub fn layer_from_roads(
    graph: &mut MultiLayerGraph,
    label: &str,
    mode: Mode,
    speed: f64,
) -> GraphResult<LayerId> {
    let layer = graph.add_layer(label, mode, speed)?;

    let road_nodes: Vec<(String, mm_core::RoadNodeId)> = graph
        .roads
        .nodes()
        .iter()
        .map(|n| (n.label.clone(), n.id))
        .collect();
    for (node_label, road_node) in road_nodes {
        graph.add_layer_node(layer, &node_label, road_node)?;
    }

    let road_links: Vec<(String, mm_core::RoadLinkId, mm_core::RoadNodeId, mm_core::RoadNodeId, f64)> =
        graph
            .roads
            .links()
            .iter()
            .map(|l| (l.label.clone(), l.id, l.upstream, l.downstream, l.length))
            .collect();
    for (link_label, road_link, up, down, length) in road_links {
        let up_label = graph.roads.node(up).label.clone();
        let down_label = graph.roads.node(down).label.clone();
        let up_node = graph.layer_node(layer, &up_label).expect("mirrored node");
        let down_node = graph.layer_node(layer, &down_label).expect("mirrored node");
        let costs = Costs::of(&[(COST_LENGTH, length), (COST_TIME, length / speed)]);
        graph.add_layer_link(
            layer,
            &format!("{label}_{link_label}"),
            up_node,
            down_node,
            costs,
            &[road_link],
        )?;
    }
    Ok(layer)
}
