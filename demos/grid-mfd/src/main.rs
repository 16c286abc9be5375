//! Grid MFD demo: 10×5 grid roads, car and bus layers mirroring the grid,
//! one city-wide reservoir with a linear MFD, random demand over three
//! simulated hours, logit path choice, CSV metrics under `./output`.
//!
//! Run with `RUST_LOG=info cargo run -p grid-mfd`.

use mm_core::{Mode, SimConfig};
use mm_demand::{random_demand, ListDemand};
use mm_decision::LogitDecisionModel;
use mm_flow::{FlowMotor, MobilityService, Reservoir, Services, Speeds};
use mm_graph::{
    generation::{grid_network, layer_from_roads},
    Costs, GraphResult, MultiLayerGraph, TransferDirection,
};
use mm_output::{CsvWriter, MetricsObserver};
use mm_sim::SupervisorBuilder;

const SPACING_M: f64 = 1_000.0;
const SEED: u64 = 42;

fn build_graph() -> GraphResult<MultiLayerGraph> {
    let mut roads = grid_network(10, 5, SPACING_M)?;

    // One city-wide zone over every road link.
    let zone = roads.add_zone("ZONE")?;
    let links: Vec<_> = roads.links().iter().map(|l| l.id).collect();
    for link in links {
        roads.assign_zone(link, zone)?;
    }

    let mut graph = MultiLayerGraph::new(roads);
    let car = layer_from_roads(&mut graph, "car", Mode::Car, 11.5)?;
    let bus = layer_from_roads(&mut graph, "bus", Mode::Bus, 5.75)?;

    // Free transfers between the layers at every grid node.
    let pairs: Vec<_> = graph
        .layer(car)
        .nodes
        .iter()
        .zip(graph.layer(bus).nodes.iter())
        .map(|(&c, &b)| (c, b))
        .collect();
    for (index, (car_node, bus_node)) in pairs.into_iter().enumerate() {
        graph.connect_layers(
            &format!("XFER_{index}"),
            car_node,
            bus_node,
            Costs::of(&[("time", 0.0)]),
            TransferDirection::Bidirectional,
        )?;
    }
    Ok(graph)
}

/// Linear MFD: car speed decays with total accumulation, buses run at half
/// the car speed.  Same shape as the classic single-reservoir demo setups.
fn mfd(accumulations: &mm_flow::Accumulations) -> Speeds {
    let total: usize = accumulations.values().sum();
    let v_car = 11.5 * (1.0 - total as f64 / 80_000.0);
    Speeds::from_iter([(Mode::Car, v_car), (Mode::Bus, v_car / 2.0)])
}

fn main() {
    env_logger::init();

    let graph = build_graph().expect("graph assembly");
    let zone = graph.roads.zone_id("ZONE").expect("zone exists");
    let car = graph.layer_id("car").expect("car layer");
    let bus = graph.layer_id("bus").expect("bus layer");

    let mut flow = FlowMotor::new();
    flow.add_reservoir(Reservoir::new(zone, Box::new(mfd)));

    let mut services = Services::new();
    services.register(MobilityService::personal(car, Mode::Car));
    services.register(MobilityService::public_transit(bus, Mode::Bus, 50));

    let config = SimConfig {
        tick_secs: 60,
        total_ticks: 240, // 4 h: 3 h of departures plus drain time
        seed: SEED,
        num_threads: None,
        output_interval_ticks: 10,
    };

    let clock = config.make_clock();
    let users = random_demand(&graph.roads, &clock, 500, 0, 3 * 3_600, 5_000.0, SEED);
    log::info!("generated {} travelers", users.len());
    let demand = ListDemand::new(users);

    let mut supervisor = SupervisorBuilder::new(
        config,
        graph,
        flow,
        demand,
        LogitDecisionModel::new(0.01, SEED),
    )
    .services(services)
    .build()
    .expect("supervisor assembly");

    let out_dir = std::path::Path::new("output");
    std::fs::create_dir_all(out_dir).expect("output dir");
    let writer = CsvWriter::new(out_dir).expect("csv writer");
    let mut observer = MetricsObserver::new(writer, &supervisor.graph);

    supervisor.run(&mut observer).expect("simulation run");
    if let Some(e) = observer.take_error() {
        log::error!("metrics writer failed: {e}");
    }

    println!(
        "done at {}: {} arrived, {} stuck, {} dropped, {} vehicles used",
        supervisor.clock,
        supervisor.user_flow.arrived().len(),
        supervisor.user_flow.stuck().len(),
        supervisor.dropped().len(),
        supervisor.fleet.len(),
    );
}
