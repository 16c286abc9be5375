//! Flow-subsystem error type.

use thiserror::Error;

use mm_core::{LayerId, VehicleId};

/// Errors produced by the fleet and mobility services.
///
/// All of these are per-traveler conditions during the simulation loop: the
/// affected user becomes `Stuck` and the tick continues.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("no mobility service registered for layer {0}")]
    NoService(LayerId),

    #[error("vehicle {0} is not idle")]
    NotIdle(VehicleId),

    #[error("vehicle {0} is at capacity")]
    CapacityExceeded(VehicleId),
}

pub type FlowResult<T> = Result<T, FlowError>;
