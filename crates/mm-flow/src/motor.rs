//! The flow motor: per-tick synchronous update of zone speeds and vehicle
//! positions.

use mm_core::ZoneId;
use mm_graph::MultiLayerGraph;

use crate::reservoir::{Reservoir, MIN_SPEED};
use crate::vehicle::{Fleet, Vehicle, VehicleState};

/// Macroscopic flow state: one reservoir per zone that has one.
///
/// Zones without a reservoir fall through to layer default speeds, as do
/// vehicles on road links outside any zone.
#[derive(Default)]
pub struct FlowMotor {
    /// Indexed by `ZoneId`; `None` for zones without a reservoir.
    reservoirs: Vec<Option<Reservoir>>,
}

impl FlowMotor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_reservoir(&mut self, reservoir: Reservoir) {
        let index = reservoir.zone.index();
        if index >= self.reservoirs.len() {
            self.reservoirs.resize_with(index + 1, || None);
        }
        self.reservoirs[index] = Some(reservoir);
    }

    pub fn reservoir(&self, zone: ZoneId) -> Option<&Reservoir> {
        self.reservoirs.get(zone.index())?.as_ref()
    }

    /// Reservoirs in zone order.
    pub fn reservoirs(&self) -> impl Iterator<Item = &Reservoir> {
        self.reservoirs.iter().flatten()
    }

    /// One synchronous flow update (supervisor step 4).
    ///
    /// 1. Recompute per-zone per-mode accumulation from the positions of all
    ///    en-route vehicles.
    /// 2. Re-derive zone speeds from the accumulations (clamped, see
    ///    [`Reservoir::update_speeds`]).
    /// 3. Advance every vehicle by `dt` seconds against the speeds computed
    ///    in step 2, carrying overflow distance across itinerary entries.
    ///
    /// Because speeds are fully derived before any vehicle moves, the update
    /// depends only on state observed at the start of the tick — results
    /// never depend on fleet iteration order.  Vehicles with an exhausted
    /// itinerary are left untouched, so the update is idempotent on them.
    pub fn update(&mut self, dt: f64, fleet: &mut Fleet, graph: &MultiLayerGraph) {
        // ── 1. Accumulation ───────────────────────────────────────────────
        for reservoir in self.reservoirs.iter_mut().flatten() {
            reservoir.reset_accumulation();
        }
        for vehicle in fleet.vehicles() {
            if vehicle.state != VehicleState::EnRoute {
                continue;
            }
            if let Some(zone) = current_zone(graph, vehicle) {
                if let Some(Some(reservoir)) = self.reservoirs.get_mut(zone.index()) {
                    reservoir.add(vehicle.mode);
                }
            }
        }

        // ── 2. Speeds ─────────────────────────────────────────────────────
        for reservoir in self.reservoirs.iter_mut().flatten() {
            reservoir.update_speeds();
        }

        // ── 3. Advancement ────────────────────────────────────────────────
        for vehicle in fleet.vehicles_mut() {
            if vehicle.state != VehicleState::EnRoute {
                continue;
            }
            advance_vehicle(vehicle, dt, &self.reservoirs, graph);
        }
        // Vehicles that emptied their itinerary without passengers go
        // straight back to the pool.
        let finished: Vec<_> = fleet
            .vehicles()
            .iter()
            .filter(|v| v.state == VehicleState::Arrived && v.passengers.is_empty())
            .map(|v| v.id)
            .collect();
        for id in finished {
            fleet.release(id);
        }
    }

    /// Speed for `vehicle` at its current position, under start-of-tick zone
    /// speeds; layer default where no zone speed applies.
    pub fn speed_for(&self, graph: &MultiLayerGraph, vehicle: &Vehicle) -> f64 {
        speed_for(&self.reservoirs, graph, vehicle)
    }
}

/// The zone of the vehicle's current road link, if any.
fn current_zone(graph: &MultiLayerGraph, vehicle: &Vehicle) -> Option<ZoneId> {
    let road_link = vehicle.current.as_ref()?.road_link?;
    graph.roads.link(road_link).zone
}

fn speed_for(reservoirs: &[Option<Reservoir>], graph: &MultiLayerGraph, vehicle: &Vehicle) -> f64 {
    let zone_speed = current_zone(graph, vehicle)
        .and_then(|zone| reservoirs.get(zone.index())?.as_ref())
        .and_then(|reservoir| reservoir.speed(vehicle.mode));
    let speed = zone_speed.unwrap_or_else(|| graph.layer(vehicle.layer).default_speed);
    speed.max(MIN_SPEED)
}

/// Advance one vehicle by `dt` seconds, popping itinerary entries and
/// carrying the overflow into each next entry.  The speed is re-evaluated
/// per entry (a vehicle crossing into another zone mid-tick moves at that
/// zone's start-of-tick speed for the rest of the tick).
fn advance_vehicle(
    vehicle: &mut Vehicle,
    dt: f64,
    reservoirs: &[Option<Reservoir>],
    graph: &MultiLayerGraph,
) {
    let mut budget = dt;
    while budget > 0.0 {
        let speed = speed_for(reservoirs, graph, vehicle);
        let distance = speed * budget;
        if distance < vehicle.remaining {
            vehicle.remaining -= distance;
            return;
        }
        budget -= vehicle.remaining / speed;
        if !vehicle.pop_entry() {
            vehicle.state = VehicleState::Arrived;
            return;
        }
    }
}
