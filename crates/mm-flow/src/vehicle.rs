//! Vehicles and the pooled fleet.
//!
//! # Itinerary granularity
//!
//! A vehicle's itinerary is flattened to *road-link* granularity at
//! assignment time ([`flatten_leg`]): one [`PathEntry`] per physical road
//! link under each composite link.  The zone a vehicle is in is therefore
//! always the zone of its current road link, even when a single layer link
//! spans several zones.  Composite links with no physical backing flatten to
//! one entry with no road reference; the flow motor falls back to the
//! layer's default speed for those.

use std::collections::VecDeque;

use mm_core::{LayerId, LinkId, Mode, RoadLinkId, UserId, VehicleId};
use mm_graph::MultiLayerGraph;
use mm_routing::PathLeg;

use crate::error::{FlowError, FlowResult};

// ── Vehicle ───────────────────────────────────────────────────────────────────

/// Vehicle lifecycle: `Idle → EnRoute → (Idle | Arrived)`.
///
/// `EnRoute` on path assignment; `Arrived` when the path is exhausted with
/// passengers still aboard (they disembark on the next user-flow step);
/// straight back to `Idle` (and the reuse pool) when it empties out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleState {
    Idle,
    EnRoute,
    Arrived,
}

/// One flattened itinerary step: a physical road link (or an unbacked
/// stretch) under a composite link.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEntry {
    /// The composite link this entry belongs to.
    pub link: LinkId,
    /// The physical road link, if the composite link has road backing.
    pub road_link: Option<RoadLinkId>,
    /// Length of this entry in metres.
    pub length: f64,
}

/// A vehicle owned by one mobility layer's service.
#[derive(Debug)]
pub struct Vehicle {
    pub id: VehicleId,
    pub layer: LayerId,
    pub mode: Mode,
    pub state: VehicleState,
    /// The entry currently being traversed (`None` while idle).
    pub current: Option<PathEntry>,
    /// Distance left on `current`, metres.
    pub remaining: f64,
    /// Upcoming entries, not including `current`.
    pub path: VecDeque<PathEntry>,
    pub passengers: Vec<UserId>,
}

impl Vehicle {
    fn new(id: VehicleId, layer: LayerId, mode: Mode) -> Self {
        Self {
            id,
            layer,
            mode,
            state: VehicleState::Idle,
            current: None,
            remaining: 0.0,
            path: VecDeque::new(),
            passengers: Vec::new(),
        }
    }

    fn reset(&mut self, layer: LayerId, mode: Mode) {
        self.layer = layer;
        self.mode = mode;
        self.state = VehicleState::Idle;
        self.current = None;
        self.remaining = 0.0;
        self.path.clear();
        self.passengers.clear();
    }

    /// Advance to the next itinerary entry.  Returns `false` when the path
    /// is exhausted.
    pub(crate) fn pop_entry(&mut self) -> bool {
        match self.path.pop_front() {
            Some(entry) => {
                self.remaining = entry.length;
                self.current = Some(entry);
                true
            }
            None => {
                self.current = None;
                self.remaining = 0.0;
                false
            }
        }
    }
}

// ── Fleet ─────────────────────────────────────────────────────────────────────

/// All vehicles, with a reuse pool.
///
/// Vehicles are created on demand by mobility services and recycled when
/// released; ids are stable for the lifetime of the run.
#[derive(Debug, Default)]
pub struct Fleet {
    vehicles: Vec<Vehicle>,
    pool: Vec<VehicleId>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take an idle vehicle from the pool, or create one.
    pub fn acquire(&mut self, layer: LayerId, mode: Mode) -> VehicleId {
        match self.pool.pop() {
            Some(id) => {
                self.vehicles[id.index()].reset(layer, mode);
                id
            }
            None => {
                let id = VehicleId(self.vehicles.len() as u32);
                self.vehicles.push(Vehicle::new(id, layer, mode));
                id
            }
        }
    }

    /// Assign an itinerary to an idle vehicle, putting it en route.
    pub fn assign(&mut self, id: VehicleId, entries: Vec<PathEntry>) -> FlowResult<()> {
        let vehicle = &mut self.vehicles[id.index()];
        if vehicle.state != VehicleState::Idle {
            return Err(FlowError::NotIdle(id));
        }
        vehicle.path = entries.into();
        vehicle.state = if vehicle.pop_entry() {
            VehicleState::EnRoute
        } else {
            // Empty itinerary: nothing to drive.
            VehicleState::Arrived
        };
        Ok(())
    }

    pub fn board(&mut self, id: VehicleId, user: UserId) {
        self.vehicles[id.index()].passengers.push(user);
    }

    pub fn disembark(&mut self, id: VehicleId, user: UserId) {
        self.vehicles[id.index()].passengers.retain(|&u| u != user);
    }

    /// Return a vehicle to the reuse pool.  Passengers must have
    /// disembarked.
    pub fn release(&mut self, id: VehicleId) {
        let vehicle = &mut self.vehicles[id.index()];
        debug_assert!(vehicle.passengers.is_empty(), "released vehicle still has passengers");
        vehicle.state = VehicleState::Idle;
        vehicle.current = None;
        vehicle.remaining = 0.0;
        vehicle.path.clear();
        self.pool.push(id);
    }

    #[inline]
    pub fn vehicle(&self, id: VehicleId) -> &Vehicle {
        &self.vehicles[id.index()]
    }

    #[inline]
    pub fn vehicle_mut(&mut self, id: VehicleId) -> &mut Vehicle {
        &mut self.vehicles[id.index()]
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn vehicles_mut(&mut self) -> &mut [Vehicle] {
        &mut self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// Number of vehicles currently en route.
    pub fn en_route(&self) -> usize {
        self.vehicles
            .iter()
            .filter(|v| v.state == VehicleState::EnRoute)
            .count()
    }
}

// ── Leg flattening ────────────────────────────────────────────────────────────

/// Flatten a ride leg into road-granular [`PathEntry`]s (see module docs).
pub fn flatten_leg(graph: &MultiLayerGraph, leg: &PathLeg) -> Vec<PathEntry> {
    let mut entries = Vec::new();
    for &link_id in &leg.links {
        let link = graph.link(link_id);
        if link.road_refs.is_empty() {
            entries.push(PathEntry {
                link: link_id,
                road_link: None,
                length: link.length,
            });
        } else {
            for &road_link in &link.road_refs {
                entries.push(PathEntry {
                    link: link_id,
                    road_link: Some(road_link),
                    length: graph.roads.link(road_link).length,
                });
            }
        }
    }
    entries
}
