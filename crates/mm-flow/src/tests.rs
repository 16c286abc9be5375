//! Unit tests for mm-flow.

use mm_core::{LayerId, Mode, Point, Tick, UserId, VehicleId};
use mm_demand::{Endpoint, User, UserState};
use mm_graph::{Costs, LayerSet, MultiLayerGraph, RoadNetwork, TransferDirection, COST_TIME};
use mm_routing::shortest_path;

use crate::motor::FlowMotor;
use crate::reservoir::{Reservoir, Speeds, MIN_SPEED};
use crate::service::{MobilityService, Services};
use crate::user_flow::UserFlow;
use crate::vehicle::{flatten_leg, Fleet, VehicleState};

// ── Fixture ───────────────────────────────────────────────────────────────────

/// The two-mode fixture from the layered-graph tests: car over road nodes
/// 0/1/2, bus over 2/3/4, transfer at node 2, zones res1 (0_1, 0_2, 2_3)
/// and res2 (3_4).
fn fixture() -> (MultiLayerGraph, LayerId, LayerId) {
    let mut roads = RoadNetwork::new();
    for (label, x, y) in [
        ("0", 0.0, 0.0),
        ("1", 0.0, 40_000.0),
        ("2", 1_200.0, 0.0),
        ("3", 1_400.0, 0.0),
        ("4", 3_400.0, 0.0),
    ] {
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
    let res1 = roads.add_zone("res1").unwrap();
    let res2 = roads.add_zone("res2").unwrap();
    for label in ["0_1", "0_2", "2_3"] {
        roads.assign_zone(roads.link_id(label).unwrap(), res1).unwrap();
    }
    roads.assign_zone(roads.link_id("3_4").unwrap(), res2).unwrap();

    let mut graph = MultiLayerGraph::new(roads);
    let car = graph.add_layer("car", Mode::Car, 10.0).unwrap();
    for (label, road) in [("C0", "0"), ("C1", "1"), ("C2", "2")] {
        let road = graph.roads.node_id(road).unwrap();
        graph.add_layer_node(car, label, road).unwrap();
    }
    let bus = graph.add_layer("bus", Mode::Bus, 5.0).unwrap();
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
    link(&mut graph, bus, "B2_B3", "bus:B2", "bus:B3", 40.0, "2_3");
    link(&mut graph, bus, "B3_B4", "bus:B3", "bus:B4", 400.0, "3_4");
    let c2 = graph.node_id("car:C2").unwrap();
    let b2 = graph.node_id("bus:B2").unwrap();
    graph
        .connect_layers("CAR_BUS", c2, b2, Costs::of(&[(COST_TIME, 30.0)]), TransferDirection::OneWay)
        .unwrap();

    (graph, car, bus)
}

fn services_for(car: LayerId, bus: LayerId) -> Services {
    let mut services = Services::new();
    services.register(MobilityService::personal(car, Mode::Car));
    services.register(MobilityService::public_transit(bus, Mode::Bus, 40));
    services
}

/// Constant-speed reservoirs: car 10 m/s, bus 5 m/s regardless of load.
fn constant_reservoir(zone: mm_core::ZoneId) -> Reservoir {
    Reservoir::new(
        zone,
        Box::new(|_| Speeds::from_iter([(Mode::Car, 10.0), (Mode::Bus, 5.0)])),
    )
}

fn route_user(graph: &MultiLayerGraph, car: LayerId, bus: LayerId, id: u32, from: &str, to: &str) -> User {
    let view = graph.available_subgraph(LayerSet::EMPTY.with(car).with(bus));
    let path = shortest_path(
        &view,
        graph.node_id(from).unwrap(),
        graph.node_id(to).unwrap(),
        COST_TIME,
    )
    .unwrap();
    let mut user = User::new(
        UserId(id),
        &format!("U{id}"),
        Endpoint::Position(Point::new(0.0, 0.0)),
        Endpoint::Position(Point::new(3_400.0, 0.0)),
        Tick(0),
    );
    user.set_path(path);
    user
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

mod fleet {
    use super::*;

    #[test]
    fn acquire_assign_release_recycles_ids() {
        let mut fleet = Fleet::new();
        let v0 = fleet.acquire(LayerId(0), Mode::Car);
        assert_eq!(v0, VehicleId(0));
        assert_eq!(fleet.vehicle(v0).state, VehicleState::Idle);

        fleet
            .assign(
                v0,
                vec![crate::vehicle::PathEntry {
                    link: mm_core::LinkId(0),
                    road_link: None,
                    length: 100.0,
                }],
            )
            .unwrap();
        assert_eq!(fleet.vehicle(v0).state, VehicleState::EnRoute);
        assert_eq!(fleet.vehicle(v0).remaining, 100.0);

        // A second acquire creates a new vehicle while v0 is busy.
        let v1 = fleet.acquire(LayerId(0), Mode::Car);
        assert_eq!(v1, VehicleId(1));

        // Releasing v1 puts it back in the pool; next acquire reuses it.
        fleet.release(v1);
        let v2 = fleet.acquire(LayerId(1), Mode::Bus);
        assert_eq!(v2, v1);
        assert_eq!(fleet.vehicle(v2).mode, Mode::Bus);
    }

    #[test]
    fn assign_rejects_busy_vehicle() {
        let mut fleet = Fleet::new();
        let v = fleet.acquire(LayerId(0), Mode::Car);
        fleet
            .assign(
                v,
                vec![crate::vehicle::PathEntry {
                    link: mm_core::LinkId(0),
                    road_link: None,
                    length: 1.0,
                }],
            )
            .unwrap();
        assert!(fleet.assign(v, vec![]).is_err());
    }

    #[test]
    fn empty_itinerary_is_immediately_arrived() {
        let mut fleet = Fleet::new();
        let v = fleet.acquire(LayerId(0), Mode::Car);
        fleet.assign(v, vec![]).unwrap();
        assert_eq!(fleet.vehicle(v).state, VehicleState::Arrived);
    }

    #[test]
    fn flatten_expands_composite_links_to_road_links() {
        let (graph, car, bus) = fixture();
        let user = route_user(&graph, car, bus, 0, "car:C0", "bus:B4");
        let legs = user.path.as_ref().unwrap().legs(&graph);

        // Bus leg covers B2_B3 + B3_B4, each backed by one road link.
        let bus_leg = &legs[2];
        let entries = flatten_leg(&graph, bus_leg);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].length, 200.0);
        assert_eq!(entries[1].length, 2_000.0);
        assert_eq!(
            entries[0].road_link,
            Some(graph.roads.link_id("2_3").unwrap())
        );
    }
}

// ── Reservoir ─────────────────────────────────────────────────────────────────

mod reservoir {
    use super::*;

    #[test]
    fn speed_function_output_is_clamped() {
        let mut reservoir = Reservoir::new(
            mm_core::ZoneId(0),
            Box::new(|acc| {
                let n = acc.get(&Mode::Car).copied().unwrap_or(0);
                // Saturates to a negative speed at any accumulation.
                Speeds::from_iter([(Mode::Car, 1.0 - n as f64)])
            }),
        );
        reservoir.add(Mode::Car);
        reservoir.add(Mode::Car);
        reservoir.update_speeds();
        assert_eq!(reservoir.speed(Mode::Car), Some(MIN_SPEED));
        assert_eq!(reservoir.accumulation(Mode::Car), 2);
    }

    #[test]
    fn accumulation_resets_between_updates() {
        let mut reservoir = constant_reservoir(mm_core::ZoneId(0));
        reservoir.add(Mode::Car);
        assert_eq!(reservoir.total_accumulation(), 1);
        reservoir.reset_accumulation();
        assert_eq!(reservoir.total_accumulation(), 0);
    }
}

// ── FlowMotor ─────────────────────────────────────────────────────────────────

mod motor {
    use super::*;

    fn motor_with_reservoirs(graph: &MultiLayerGraph) -> FlowMotor {
        let mut motor = FlowMotor::new();
        motor.add_reservoir(constant_reservoir(graph.roads.zone_id("res1").unwrap()));
        motor.add_reservoir(constant_reservoir(graph.roads.zone_id("res2").unwrap()));
        motor
    }

    #[test]
    fn accumulation_counts_vehicles_by_zone_and_mode() {
        let (graph, car, bus) = fixture();
        let mut motor = motor_with_reservoirs(&graph);
        let mut fleet = Fleet::new();

        // A car on road 0_2 (res1) and a bus on road 3_4 (res2).
        let car_leg = mm_routing::PathLeg {
            kind: mm_routing::LegKind::Ride(car),
            links: vec![graph.link_id("C0_C2").unwrap()],
            length: 1_200.0,
        };
        let bus_leg = mm_routing::PathLeg {
            kind: mm_routing::LegKind::Ride(bus),
            links: vec![graph.link_id("B3_B4").unwrap()],
            length: 2_000.0,
        };
        let v_car = fleet.acquire(car, Mode::Car);
        fleet.assign(v_car, flatten_leg(&graph, &car_leg)).unwrap();
        let v_bus = fleet.acquire(bus, Mode::Bus);
        fleet.assign(v_bus, flatten_leg(&graph, &bus_leg)).unwrap();

        motor.update(1.0, &mut fleet, &graph);

        let res1 = motor.reservoir(graph.roads.zone_id("res1").unwrap()).unwrap();
        let res2 = motor.reservoir(graph.roads.zone_id("res2").unwrap()).unwrap();
        assert_eq!(res1.accumulation(Mode::Car), 1);
        assert_eq!(res1.accumulation(Mode::Bus), 0);
        assert_eq!(res2.accumulation(Mode::Bus), 1);
    }

    #[test]
    fn vehicles_advance_and_carry_overflow() {
        let (graph, _, bus) = fixture();
        let mut motor = motor_with_reservoirs(&graph);
        let mut fleet = Fleet::new();

        // Bus itinerary: 200 m then 2000 m at 5 m/s.
        let leg = mm_routing::PathLeg {
            kind: mm_routing::LegKind::Ride(bus),
            links: vec![graph.link_id("B2_B3").unwrap(), graph.link_id("B3_B4").unwrap()],
            length: 2_200.0,
        };
        let v = fleet.acquire(bus, Mode::Bus);
        fleet.assign(v, flatten_leg(&graph, &leg)).unwrap();

        // 60 s × 5 m/s = 300 m: finishes the 200 m entry and carries 100 m
        // into the next.
        motor.update(60.0, &mut fleet, &graph);
        let vehicle = fleet.vehicle(v);
        assert_eq!(vehicle.state, VehicleState::EnRoute);
        assert_eq!(
            vehicle.current.as_ref().unwrap().road_link,
            Some(graph.roads.link_id("3_4").unwrap())
        );
        assert!((vehicle.remaining - 1_900.0).abs() < 1e-9);

        // 380 more seconds at 5 m/s covers the remaining 1900 m exactly.
        motor.update(380.0, &mut fleet, &graph);
        assert_eq!(fleet.vehicle(v).state, VehicleState::Arrived);
    }

    #[test]
    fn passengerless_vehicle_is_recycled_on_arrival() {
        let (graph, car, _) = fixture();
        let mut motor = motor_with_reservoirs(&graph);
        let mut fleet = Fleet::new();

        let leg = mm_routing::PathLeg {
            kind: mm_routing::LegKind::Ride(car),
            links: vec![graph.link_id("C0_C2").unwrap()],
            length: 1_200.0,
        };
        let v = fleet.acquire(car, Mode::Car);
        fleet.assign(v, flatten_leg(&graph, &leg)).unwrap();

        motor.update(120.0, &mut fleet, &graph); // 120 s × 10 m/s = 1200 m
        assert_eq!(fleet.vehicle(v).state, VehicleState::Idle);
        // The pool hands the same vehicle back.
        assert_eq!(fleet.acquire(car, Mode::Car), v);
    }

    #[test]
    fn update_is_idempotent_on_resolved_vehicles() {
        let (graph, car, _) = fixture();
        let mut motor = motor_with_reservoirs(&graph);
        let mut fleet = Fleet::new();

        let leg = mm_routing::PathLeg {
            kind: mm_routing::LegKind::Ride(car),
            links: vec![graph.link_id("C0_C2").unwrap()],
            length: 1_200.0,
        };
        let v = fleet.acquire(car, Mode::Car);
        fleet.assign(v, flatten_leg(&graph, &leg)).unwrap();
        fleet.board(v, UserId(0)); // keep it out of the recycle path

        motor.update(1_000.0, &mut fleet, &graph);
        assert_eq!(fleet.vehicle(v).state, VehicleState::Arrived);

        // Further updates change nothing about the resolved vehicle.
        motor.update(1_000.0, &mut fleet, &graph);
        assert_eq!(fleet.vehicle(v).state, VehicleState::Arrived);
        assert_eq!(fleet.vehicle(v).remaining, 0.0);
    }

    #[test]
    fn zone_speed_falls_back_to_layer_default() {
        let (graph, car, _) = fixture();
        // No reservoirs registered at all.
        let mut motor = FlowMotor::new();
        let mut fleet = Fleet::new();

        let leg = mm_routing::PathLeg {
            kind: mm_routing::LegKind::Ride(car),
            links: vec![graph.link_id("C0_C2").unwrap()],
            length: 1_200.0,
        };
        let v = fleet.acquire(car, Mode::Car);
        fleet.assign(v, flatten_leg(&graph, &leg)).unwrap();

        // Layer default for car is 10 m/s.
        assert_eq!(motor.speed_for(&graph, fleet.vehicle(v)), 10.0);
        motor.update(60.0, &mut fleet, &graph);
        assert!((fleet.vehicle(v).remaining - 600.0).abs() < 1e-9);
    }
}

// ── UserFlow ──────────────────────────────────────────────────────────────────

mod user_flow {
    use super::*;

    #[test]
    fn ride_leg_requests_a_vehicle() {
        let (graph, car, bus) = fixture();
        let services = services_for(car, bus);
        let mut fleet = Fleet::new();
        let mut flow = UserFlow::new(1.42);

        let user = route_user(&graph, car, bus, 0, "car:C0", "bus:B4");
        flow.step(60.0, vec![user], &graph, &services, &mut fleet, Tick(0));

        let active = flow.get(UserId(0)).unwrap();
        assert!(matches!(active.state, UserState::InVehicle(_)));
        assert_eq!(fleet.len(), 1);
        let vehicle = &fleet.vehicles()[0];
        assert_eq!(vehicle.state, VehicleState::EnRoute);
        assert_eq!(vehicle.passengers, vec![UserId(0)]);
        // Car leg flattens to the single 1200 m road link 0_2.
        assert_eq!(vehicle.remaining, 1_200.0);
        assert_eq!(
            vehicle.current.as_ref().unwrap().road_link,
            Some(graph.roads.link_id("0_2").unwrap())
        );
    }

    #[test]
    fn transfer_wait_counts_down_with_overflow() {
        let (graph, car, bus) = fixture();
        let services = services_for(car, bus);
        let mut fleet = Fleet::new();
        let mut flow = UserFlow::new(1.42);
        let mut motor = FlowMotor::new();

        let user = route_user(&graph, car, bus, 0, "car:C0", "bus:B4");
        flow.step(60.0, vec![user], &graph, &services, &mut fleet, Tick(0));

        // Drive the car leg to completion (1200 m at 10 m/s = 120 s).
        motor.update(120.0, &mut fleet, &graph);

        // Next step: disembark, then sit out the 30 s transfer; the 60 s
        // budget covers it and the overflow boards the bus immediately.
        flow.step(60.0, vec![], &graph, &services, &mut fleet, Tick(1));
        let user = flow.get(UserId(0)).unwrap();
        assert!(matches!(user.state, UserState::InVehicle(_)));
        assert_eq!(user.leg, 2);
        // The car was released back to the pool.
        assert_eq!(fleet.vehicles()[0].state, VehicleState::EnRoute); // recycled as the bus
    }

    #[test]
    fn short_budget_leaves_user_waiting_at_transfer() {
        let (graph, car, bus) = fixture();
        let services = services_for(car, bus);
        let mut fleet = Fleet::new();
        let mut flow = UserFlow::new(1.42);
        let mut motor = FlowMotor::new();

        let user = route_user(&graph, car, bus, 0, "car:C0", "bus:B4");
        flow.step(10.0, vec![user], &graph, &services, &mut fleet, Tick(0));
        motor.update(120.0, &mut fleet, &graph);

        flow.step(10.0, vec![], &graph, &services, &mut fleet, Tick(1));
        let user = flow.get(UserId(0)).unwrap();
        assert_eq!(user.state, UserState::Waiting { remaining_wait: 20.0 });
        assert_eq!(user.leg, 1);
    }

    #[test]
    fn missing_service_marks_user_stuck() {
        let (graph, car, bus) = fixture();
        // Register only the car service; the bus leg cannot be served.
        let mut services = Services::new();
        services.register(MobilityService::personal(car, Mode::Car));
        let mut fleet = Fleet::new();
        let mut flow = UserFlow::new(1.42);
        let mut motor = FlowMotor::new();

        let user = route_user(&graph, car, bus, 0, "car:C0", "bus:B4");
        flow.step(60.0, vec![user], &graph, &services, &mut fleet, Tick(0));
        motor.update(120.0, &mut fleet, &graph);
        // Transfer wait (30 s) then the bus request fails.
        flow.step(60.0, vec![], &graph, &services, &mut fleet, Tick(1));

        assert_eq!(flow.active_count(), 0);
        assert_eq!(flow.stuck().len(), 1);
        assert_eq!(flow.counts().stuck, 1);
    }

    #[test]
    fn released_user_without_path_is_stuck() {
        let (graph, car, bus) = fixture();
        let services = services_for(car, bus);
        let mut fleet = Fleet::new();
        let mut flow = UserFlow::new(1.42);

        let user = User::new(
            UserId(0),
            "U0",
            Endpoint::Position(Point::new(0.0, 0.0)),
            Endpoint::Position(Point::new(1.0, 0.0)),
            Tick(0),
        );
        flow.step(60.0, vec![user], &graph, &services, &mut fleet, Tick(0));
        assert_eq!(flow.stuck().len(), 1);
    }

    #[test]
    fn walking_advances_by_speed_times_dt() {
        let (mut graph, car, bus) = fixture();
        graph.access_radius = 150.0;
        let index = graph.roads.spatial_index();
        // Origin 100 m from road node 0 (which hosts car:C0).
        let origin = graph.add_origin(&index, "O", Point::new(-100.0, 0.0)).unwrap();

        let view = graph.available_subgraph(LayerSet::EMPTY.with(car).with(bus));
        let to = graph.node_id("bus:B4").unwrap();
        let path = shortest_path(&view, origin, to, COST_TIME).unwrap();

        let mut user = User::new(
            UserId(0),
            "U0",
            Endpoint::Position(Point::new(-100.0, 0.0)),
            Endpoint::Position(Point::new(3_400.0, 0.0)),
            Tick(0),
        );
        user.set_path(path);

        let services = services_for(car, bus);
        let mut fleet = Fleet::new();
        let mut flow = UserFlow::new(1.42);
        flow.step(60.0, vec![user], &graph, &services, &mut fleet, Tick(0));

        let user = flow.get(UserId(0)).unwrap();
        let UserState::Walking { remaining } = user.state else {
            panic!("expected walking, got {:?}", user.state);
        };
        assert!((remaining - (100.0 - 60.0 * 1.42)).abs() < 1e-9);
    }

    #[test]
    fn trivial_path_arrives_immediately() {
        let (graph, car, bus) = fixture();
        let services = services_for(car, bus);
        let mut fleet = Fleet::new();
        let mut flow = UserFlow::new(1.42);

        let mut user = User::new(
            UserId(0),
            "U0",
            Endpoint::Position(Point::new(0.0, 0.0)),
            Endpoint::Position(Point::new(0.0, 0.0)),
            Tick(3),
        );
        user.set_path(mm_routing::Path { links: vec![], cost: 0.0 });
        flow.step(60.0, vec![user], &graph, &services, &mut fleet, Tick(3));

        assert_eq!(flow.arrived().len(), 1);
        assert_eq!(flow.arrived()[0].state, UserState::Arrived(Tick(3)));
    }
}
