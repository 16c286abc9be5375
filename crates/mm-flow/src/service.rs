//! Mobility services: the capability surface between travelers and vehicles.
//!
//! Per-mode behavior is a closed set of variants ([`ServiceKind`]) behind
//! one interface, not an open subclass hierarchy.  Walking needs no service:
//! walk legs are advanced directly by the user flow.

use mm_core::{LayerId, Mode, UserId, VehicleId};
use rustc_hash::FxHashMap;

use crate::error::{FlowError, FlowResult};
use crate::vehicle::{Fleet, PathEntry};

/// How a layer's service allocates vehicles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    /// One private vehicle per traveler leg (car).
    PersonalVehicle,
    /// Shared vehicles with a per-vehicle passenger cap (bus, tram, metro).
    PublicTransit { capacity: usize },
}

/// The mobility service owning one layer's vehicles.
#[derive(Debug, Clone)]
pub struct MobilityService {
    pub layer: LayerId,
    pub mode: Mode,
    pub kind: ServiceKind,
}

impl MobilityService {
    pub fn personal(layer: LayerId, mode: Mode) -> Self {
        Self {
            layer,
            mode,
            kind: ServiceKind::PersonalVehicle,
        }
    }

    pub fn public_transit(layer: LayerId, mode: Mode, capacity: usize) -> Self {
        Self {
            layer,
            mode,
            kind: ServiceKind::PublicTransit { capacity },
        }
    }

    /// Allocate a vehicle for `user`'s ride leg and put it en route over
    /// `entries`.
    pub fn request_vehicle(
        &self,
        fleet: &mut Fleet,
        entries: Vec<PathEntry>,
        user: UserId,
    ) -> FlowResult<VehicleId> {
        let id = fleet.acquire(self.layer, self.mode);
        if let ServiceKind::PublicTransit { capacity } = self.kind {
            if capacity == 0 {
                fleet.release(id);
                return Err(FlowError::CapacityExceeded(id));
            }
        }
        fleet.assign(id, entries)?;
        fleet.board(id, user);
        Ok(id)
    }

    /// Return an emptied vehicle to the pool.
    pub fn release(&self, fleet: &mut Fleet, id: VehicleId) {
        fleet.release(id);
    }
}

/// Registry of services keyed by layer.
#[derive(Debug, Default)]
pub struct Services {
    by_layer: FxHashMap<LayerId, MobilityService>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, service: MobilityService) {
        self.by_layer.insert(service.layer, service);
    }

    pub fn get(&self, layer: LayerId) -> FlowResult<&MobilityService> {
        self.by_layer.get(&layer).ok_or(FlowError::NoService(layer))
    }

    pub fn contains(&self, layer: LayerId) -> bool {
        self.by_layer.contains_key(&layer)
    }

    pub fn len(&self) -> usize {
        self.by_layer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_layer.is_empty()
    }
}
