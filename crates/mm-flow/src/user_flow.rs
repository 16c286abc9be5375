//! The traveler state machine.
//!
//! # Leg execution
//!
//! A traveler's bound path is decomposed into legs (`mm_routing::PathLeg`):
//! access legs are walked, transfer legs are waited out, ride legs bind the
//! traveler to a vehicle requested from the layer's mobility service (walk
//! layers are walked directly — they have no vehicles).
//!
//! Walking and waiting advance here with overflow carry: finishing a leg
//! mid-tick spends the leftover time on the next leg.  In-vehicle travelers
//! advance implicitly through the flow motor; they disembark at the start of
//! the step after their vehicle's itinerary is exhausted.
//!
//! Travelers are processed in ascending id order, so a step is deterministic
//! for a given released batch.

use std::collections::BTreeMap;

use mm_core::{Mode, Tick, UserId};
use mm_demand::{User, UserState};
use mm_graph::{MultiLayerGraph, COST_TIME};
use mm_routing::LegKind;

use crate::service::Services;
use crate::vehicle::{flatten_leg, Fleet, VehicleState};

/// Per-state traveler counts, for metrics sinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserCounts {
    pub waiting: usize,
    pub walking: usize,
    pub in_vehicle: usize,
    pub arrived: usize,
    pub stuck: usize,
}

/// All travelers currently in the simulation, plus the terminal archives.
pub struct UserFlow {
    /// Walking speed (m/s) applied to access and walk legs.
    pub walk_speed: f64,
    users: BTreeMap<UserId, User>,
    arrived: Vec<User>,
    stuck: Vec<User>,
}

impl UserFlow {
    pub fn new(walk_speed: f64) -> Self {
        debug_assert!(walk_speed > 0.0, "walk speed must be positive");
        Self {
            walk_speed,
            users: BTreeMap::new(),
            arrived: Vec::new(),
            stuck: Vec::new(),
        }
    }

    /// One traveler step (supervisor step 3).
    ///
    /// Existing travelers are processed first (vehicle disembarkments, then
    /// walk/wait advancement), then `released` travelers enter and execute
    /// their first leg with the full tick budget.  Both passes run in
    /// ascending user id order.
    pub fn step(
        &mut self,
        dt: f64,
        released: Vec<User>,
        graph: &MultiLayerGraph,
        services: &Services,
        fleet: &mut Fleet,
        now: Tick,
    ) {
        let ids: Vec<UserId> = self.users.keys().copied().collect();
        for id in ids {
            let mut user = self.users.remove(&id).expect("listed id");

            // Disembark travelers whose vehicle finished its itinerary
            // during the previous flow update.
            if let UserState::InVehicle(vehicle) = user.state {
                if fleet.vehicle(vehicle).state == VehicleState::Arrived {
                    fleet.disembark(vehicle, user.id);
                    if fleet.vehicle(vehicle).passengers.is_empty() {
                        let layer = fleet.vehicle(vehicle).layer;
                        match services.get(layer) {
                            Ok(service) => service.release(fleet, vehicle),
                            Err(_) => fleet.release(vehicle),
                        }
                    }
                    user.leg += 1;
                    start_leg(&mut user, graph, services, fleet, now);
                }
            }

            self.progress(&mut user, dt, graph, services, fleet, now);
            self.file(user);
        }

        let mut released = released;
        released.sort_by_key(|u| u.id);
        for mut user in released {
            if user.path.is_none() {
                log::warn!("traveler {} released without a path; marking stuck", user.label);
                user.state = UserState::Stuck;
            } else {
                start_leg(&mut user, graph, services, fleet, now);
                self.progress(&mut user, dt, graph, services, fleet, now);
            }
            self.file(user);
        }
    }

    /// Advance a walking/waiting traveler by up to `budget` seconds,
    /// carrying overflow into subsequent legs.
    fn progress(
        &self,
        user: &mut User,
        mut budget: f64,
        graph: &MultiLayerGraph,
        services: &Services,
        fleet: &mut Fleet,
        now: Tick,
    ) {
        loop {
            match user.state {
                UserState::Walking { remaining } => {
                    let step = self.walk_speed * budget;
                    if step < remaining {
                        user.state = UserState::Walking {
                            remaining: remaining - step,
                        };
                        return;
                    }
                    budget -= remaining / self.walk_speed;
                    user.leg += 1;
                    start_leg(user, graph, services, fleet, now);
                }
                UserState::Waiting { remaining_wait } => {
                    if budget < remaining_wait {
                        user.state = UserState::Waiting {
                            remaining_wait: remaining_wait - budget,
                        };
                        return;
                    }
                    budget -= remaining_wait;
                    user.leg += 1;
                    start_leg(user, graph, services, fleet, now);
                }
                _ => return,
            }
        }
    }

    fn file(&mut self, user: User) {
        match user.state {
            UserState::Arrived(_) => self.arrived.push(user),
            UserState::Stuck => self.stuck.push(user),
            _ => {
                self.users.insert(user.id, user);
            }
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// Active (non-terminal) travelers in ascending id order.
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn get(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn active_count(&self) -> usize {
        self.users.len()
    }

    /// Travelers that reached their destination, in arrival order.
    pub fn arrived(&self) -> &[User] {
        &self.arrived
    }

    /// Travelers that could not be routed or served, in detection order.
    pub fn stuck(&self) -> &[User] {
        &self.stuck
    }

    pub fn counts(&self) -> UserCounts {
        let mut counts = UserCounts {
            arrived: self.arrived.len(),
            stuck: self.stuck.len(),
            ..UserCounts::default()
        };
        for user in self.users.values() {
            match user.state {
                UserState::Waiting { .. } => counts.waiting += 1,
                UserState::Walking { .. } => counts.walking += 1,
                UserState::InVehicle(_) => counts.in_vehicle += 1,
                UserState::Arrived(_) | UserState::Stuck => {}
            }
        }
        counts
    }
}

/// Enter the traveler's current leg, setting the state it requires.
///
/// Ride legs on vehicular layers request a vehicle from the owning service;
/// failure to obtain one is a per-traveler `Stuck`, never fatal.
fn start_leg(
    user: &mut User,
    graph: &MultiLayerGraph,
    services: &Services,
    fleet: &mut Fleet,
    now: Tick,
) {
    let Some(path) = &user.path else {
        user.state = UserState::Stuck;
        return;
    };
    let legs = path.legs(graph);
    if user.leg >= legs.len() {
        user.state = UserState::Arrived(now);
        return;
    }
    let leg = &legs[user.leg];
    match leg.kind {
        LegKind::Access => {
            user.state = UserState::Walking {
                remaining: leg.length,
            };
        }
        LegKind::Transfer => {
            user.state = UserState::Waiting {
                remaining_wait: leg.cost_sum(graph, COST_TIME),
            };
        }
        LegKind::Ride(layer) => {
            if graph.layer(layer).mode == Mode::Walk {
                user.state = UserState::Walking {
                    remaining: leg.length,
                };
                return;
            }
            let entries = flatten_leg(graph, leg);
            let request = services
                .get(layer)
                .and_then(|service| service.request_vehicle(fleet, entries, user.id));
            match request {
                Ok(vehicle) => user.state = UserState::InVehicle(vehicle),
                Err(e) => {
                    log::warn!("traveler {} stuck on leg {}: {e}", user.label, user.leg);
                    user.state = UserState::Stuck;
                }
            }
        }
    }
}
