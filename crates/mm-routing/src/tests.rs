//! Unit tests for mm-routing.

use mm_core::{LayerId, Mode, Point};
use mm_graph::{
    generation::{grid_network, layer_from_roads},
    Costs, LayerSet, MultiLayerGraph, TransferDirection, COST_LENGTH, COST_TIME,
};

use crate::error::RoutingError;
use crate::path::LegKind;
use crate::search::{
    bidirectional_shortest_path, shortest_path, shortest_path_astar, shortest_paths_to_set,
};

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// Car layer over road nodes 0/1/2, bus layer over 2/3/4, one-way transfer
/// car→bus at node 2.  Times: C0_C1 4000, C0_C2 120, B2_B3 20, B3_B4 200.
fn two_mode_graph() -> (MultiLayerGraph, LayerId, LayerId) {
    let mut roads = mm_graph::RoadNetwork::new();
    let positions = [
        ("0", 0.0, 0.0),
        ("1", 0.0, 40_000.0),
        ("2", 1_200.0, 0.0),
        ("3", 1_400.0, 0.0),
        ("4", 3_400.0, 0.0),
    ];
    for (label, x, y) in positions {
        roads.add_node(label, Point::new(x, y)).unwrap();
    }
    for (label, up, down, length) in [
        ("0_1", "0", "1", 40_000.0),
        ("0_2", "0", "2", 1_200.0),
        ("2_3", "2", "3", 200.0),
        ("3_4", "3", "4", 2_000.0),
    ] {
        let up = roads.node_id(up).unwrap();
        let down = roads.node_id(down).unwrap();
        roads.add_link(label, up, down, length).unwrap();
    }

    let mut graph = MultiLayerGraph::new(roads);
    let car = graph.add_layer("car", Mode::Car, 10.0).unwrap();
    for (label, road) in [("C0", "0"), ("C1", "1"), ("C2", "2")] {
        let road = graph.roads.node_id(road).unwrap();
        graph.add_layer_node(car, label, road).unwrap();
    }
    let bus = graph.add_layer("bus", Mode::Bus, 10.0).unwrap();
    for (label, road) in [("B2", "2"), ("B3", "3"), ("B4", "4")] {
        let road = graph.roads.node_id(road).unwrap();
        graph.add_layer_node(bus, label, road).unwrap();
    }

    let link = |graph: &mut MultiLayerGraph, layer, label: &str, up: &str, down: &str, time: f64, road: &str| {
        let up = graph.node_id(up).unwrap();
        let down = graph.node_id(down).unwrap();
        let road = graph.roads.link_id(road).unwrap();
        graph
            .add_layer_link(layer, label, up, down, Costs::of(&[(COST_TIME, time)]), &[road])
            .unwrap();
    };
    link(&mut graph, car, "C0_C1", "car:C0", "car:C1", 4_000.0, "0_1");
    link(&mut graph, car, "C0_C2", "car:C0", "car:C2", 120.0, "0_2");
    link(&mut graph, bus, "B2_B3", "bus:B2", "bus:B3", 20.0, "2_3");
    link(&mut graph, bus, "B3_B4", "bus:B3", "bus:B4", 200.0, "3_4");

    let c2 = graph.node_id("car:C2").unwrap();
    let b2 = graph.node_id("bus:B2").unwrap();
    graph
        .connect_layers("CAR_BUS", c2, b2, Costs::of(&[(COST_TIME, 0.0)]), TransferDirection::OneWay)
        .unwrap();

    (graph, car, bus)
}

/// Equal-cost diamond: A→B→D and A→C→D, every link time 1.
fn diamond_graph() -> MultiLayerGraph {
    let mut roads = mm_graph::RoadNetwork::new();
    for (label, x, y) in [("a", 0.0, 0.0), ("b", 1.0, 1.0), ("c", 1.0, -1.0), ("d", 2.0, 0.0)] {
        roads.add_node(label, Point::new(x, y)).unwrap();
    }
    for (label, up, down) in [("a_b", "a", "b"), ("a_c", "a", "c"), ("b_d", "b", "d"), ("c_d", "c", "d")] {
        let up = roads.node_id(up).unwrap();
        let down = roads.node_id(down).unwrap();
        roads.add_link(label, up, down, 10.0).unwrap();
    }

    let mut graph = MultiLayerGraph::new(roads);
    let layer = graph.add_layer("car", Mode::Car, 10.0).unwrap();
    for label in ["A", "B", "C", "D"] {
        let road = graph.roads.node_id(&label.to_lowercase()).unwrap();
        graph.add_layer_node(layer, label, road).unwrap();
    }
    for (label, up, down, road) in [
        ("A_B", "car:A", "car:B", "a_b"),
        ("A_C", "car:A", "car:C", "a_c"),
        ("B_D", "car:B", "car:D", "b_d"),
        ("C_D", "car:C", "car:D", "c_d"),
    ] {
        let up = graph.node_id(up).unwrap();
        let down = graph.node_id(down).unwrap();
        let road = graph.roads.link_id(road).unwrap();
        graph
            .add_layer_link(layer, label, up, down, Costs::of(&[(COST_TIME, 1.0)]), &[road])
            .unwrap();
    }
    graph
}

// ── Single destination ────────────────────────────────────────────────────────

#[test]
fn multimodal_shortest_path_crosses_transfer() {
    let (graph, car, bus) = two_mode_graph();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car).with(bus));
    let from = graph.node_id("car:C0").unwrap();
    let to = graph.node_id("bus:B4").unwrap();

    let path = shortest_path(&view, from, to, COST_TIME).unwrap();
    assert_eq!(path.cost, 120.0 + 0.0 + 20.0 + 200.0);
    let labels: Vec<&str> = path.links.iter().map(|&l| graph.link(l).label.as_str()).collect();
    assert_eq!(labels, vec!["C0_C2", "CAR_BUS", "B2_B3", "B3_B4"]);
}

#[test]
fn restricted_view_is_never_escaped() {
    let (graph, car, bus) = two_mode_graph();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car).with(bus));
    let from = graph.node_id("car:C0").unwrap();
    let to = graph.node_id("bus:B4").unwrap();

    let path = shortest_path(&view, from, to, COST_TIME).unwrap();
    for &link in &path.links {
        assert!(view.includes(graph.link(link)));
    }
}

#[test]
fn layer_restriction_makes_destination_unreachable() {
    let (graph, car, _) = two_mode_graph();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car));
    let from = graph.node_id("car:C0").unwrap();
    let to = graph.node_id("bus:B4").unwrap();

    assert!(matches!(
        shortest_path(&view, from, to, COST_TIME),
        Err(RoutingError::Unreachable { .. })
    ));
}

#[test]
fn trivial_query_returns_empty_path() {
    let (graph, car, _) = two_mode_graph();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car));
    let from = graph.node_id("car:C0").unwrap();
    let path = shortest_path(&view, from, from, COST_TIME).unwrap();
    assert!(path.is_trivial());
    assert_eq!(path.cost, 0.0);
}

#[test]
fn missing_cost_name_is_an_error() {
    let (graph, car, _) = two_mode_graph();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car));
    let from = graph.node_id("car:C0").unwrap();
    let to = graph.node_id("car:C1").unwrap();

    assert!(matches!(
        shortest_path(&view, from, to, "wait"),
        Err(RoutingError::InvalidCost { .. })
    ));
}

#[test]
fn negative_cost_is_an_error() {
    let (mut graph, car, _) = two_mode_graph();
    graph.set_default_cost(car, "toll", -1.0).unwrap();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car));
    let from = graph.node_id("car:C0").unwrap();
    let to = graph.node_id("car:C1").unwrap();

    assert!(matches!(
        shortest_path(&view, from, to, "toll"),
        Err(RoutingError::InvalidCost { .. })
    ));
}

#[test]
fn equal_cost_tie_breaks_on_ascending_link_id() {
    let graph = diamond_graph();
    let view = graph.available_subgraph(graph.all_layers());
    let from = graph.node_id("car:A").unwrap();
    let to = graph.node_id("car:D").unwrap();

    let path = shortest_path(&view, from, to, COST_TIME).unwrap();
    assert_eq!(path.cost, 2.0);
    // A_B (id 0) is discovered before A_C (id 1); strict relaxation keeps it.
    let labels: Vec<&str> = path.links.iter().map(|&l| graph.link(l).label.as_str()).collect();
    assert_eq!(labels, vec!["A_B", "B_D"]);
}

// ── A* ────────────────────────────────────────────────────────────────────────

#[test]
fn astar_with_euclidean_heuristic_matches_dijkstra() {
    let roads = grid_network(6, 6, 500.0).unwrap();
    let mut graph = MultiLayerGraph::new(roads);
    let car = layer_from_roads(&mut graph, "car", Mode::Car, 10.0).unwrap();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car));

    let from = graph.layer_node(car, "0_0").unwrap();
    let to = graph.layer_node(car, "5_5").unwrap();
    let goal = graph.node(to).pos;

    let plain = shortest_path(&view, from, to, COST_LENGTH).unwrap();
    // Straight-line distance is an admissible lower bound on path length.
    let astar = shortest_path_astar(&view, from, to, COST_LENGTH, |n| {
        graph.node(n).pos.distance(goal)
    })
    .unwrap();

    assert!((plain.cost - astar.cost).abs() < 1e-9);
    assert_eq!(plain.cost, 500.0 * 10.0);
}

// ── Multi-destination ─────────────────────────────────────────────────────────

#[test]
fn multi_destination_matches_independent_searches() {
    let (graph, car, bus) = two_mode_graph();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car).with(bus));
    let from = graph.node_id("car:C0").unwrap();
    let targets: Vec<_> = ["car:C1", "car:C2", "bus:B3", "bus:B4"]
        .iter()
        .map(|l| graph.node_id(l).unwrap())
        .collect();

    let batch = shortest_paths_to_set(&view, from, &targets, COST_TIME).unwrap();
    assert_eq!(batch.len(), targets.len());
    for &target in &targets {
        let single = shortest_path(&view, from, target, COST_TIME).unwrap();
        let multi = &batch[&target];
        assert_eq!(multi.cost, single.cost);
        assert_eq!(multi.links, single.links);
    }
}

#[test]
fn multi_destination_omits_unreachable_targets() {
    let (graph, car, _) = two_mode_graph();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car));
    let from = graph.node_id("car:C0").unwrap();
    let reachable = graph.node_id("car:C1").unwrap();
    let unreachable = graph.node_id("bus:B4").unwrap();

    let batch = shortest_paths_to_set(&view, from, &[reachable, unreachable], COST_TIME).unwrap();
    assert!(batch.contains_key(&reachable));
    assert!(!batch.contains_key(&unreachable));
}

// ── Bidirectional ─────────────────────────────────────────────────────────────

#[test]
fn bidirectional_matches_unidirectional_on_two_mode_graph() {
    let (graph, car, bus) = two_mode_graph();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car).with(bus));
    let from = graph.node_id("car:C0").unwrap();
    let to = graph.node_id("bus:B4").unwrap();

    let uni = shortest_path(&view, from, to, COST_TIME).unwrap();
    let bi = bidirectional_shortest_path(&view, from, to, COST_TIME).unwrap();
    assert_eq!(uni.cost, bi.cost);
}

#[test]
fn bidirectional_matches_unidirectional_across_a_grid() {
    let roads = grid_network(5, 4, 750.0).unwrap();
    let mut graph = MultiLayerGraph::new(roads);
    let car = layer_from_roads(&mut graph, "car", Mode::Car, 15.0).unwrap();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car));

    for (from_label, to_label) in [("0_0", "4_3"), ("2_1", "0_3"), ("4_0", "0_0")] {
        let from = graph.layer_node(car, from_label).unwrap();
        let to = graph.layer_node(car, to_label).unwrap();
        let uni = shortest_path(&view, from, to, COST_TIME).unwrap();
        let bi = bidirectional_shortest_path(&view, from, to, COST_TIME).unwrap();
        assert!(
            (uni.cost - bi.cost).abs() < 1e-9,
            "{from_label}→{to_label}: {} vs {}",
            uni.cost,
            bi.cost
        );
    }
}

#[test]
fn bidirectional_reports_unreachable() {
    let (graph, car, _) = two_mode_graph();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car));
    let from = graph.node_id("car:C0").unwrap();
    let to = graph.node_id("bus:B4").unwrap();
    assert!(matches!(
        bidirectional_shortest_path(&view, from, to, COST_TIME),
        Err(RoutingError::Unreachable { .. })
    ));
}

// ── Path decomposition ────────────────────────────────────────────────────────

#[test]
fn legs_split_rides_at_transfers() {
    let (graph, car, bus) = two_mode_graph();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car).with(bus));
    let from = graph.node_id("car:C0").unwrap();
    let to = graph.node_id("bus:B4").unwrap();

    let path = shortest_path(&view, from, to, COST_TIME).unwrap();
    let legs = path.legs(&graph);
    assert_eq!(legs.len(), 3);
    assert_eq!(legs[0].kind, LegKind::Ride(car));
    assert_eq!(legs[0].length, 1_200.0);
    assert_eq!(legs[1].kind, LegKind::Transfer);
    assert_eq!(legs[2].kind, LegKind::Ride(bus));
    assert_eq!(legs[2].links.len(), 2);
    assert_eq!(legs[2].length, 2_200.0);
}

#[test]
fn path_nodes_and_length() {
    let (graph, car, bus) = two_mode_graph();
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car).with(bus));
    let from = graph.node_id("car:C0").unwrap();
    let to = graph.node_id("bus:B4").unwrap();

    let path = shortest_path(&view, from, to, COST_TIME).unwrap();
    let nodes = path.nodes(&graph);
    assert_eq!(nodes.first(), Some(&from));
    assert_eq!(nodes.last(), Some(&to));
    assert_eq!(path.length(&graph), 1_200.0 + 0.0 + 200.0 + 2_000.0);
}
