//! `mm-flow` — the macroscopic flow model and the state machines it drives.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`vehicle`]  | `Vehicle`, `VehicleState`, `Fleet` (pooled), `PathEntry`     |
//! | [`service`]  | `MobilityService`, `ServiceKind`, `Services` registry        |
//! | [`reservoir`]| `Reservoir` — per-zone accumulation → speed                  |
//! | [`motor`]    | `FlowMotor::update` — synchronous per-tick flow update       |
//! | [`user_flow`]| `UserFlow::step` — traveler state machine                    |
//! | [`error`]    | `FlowError`, `FlowResult<T>`                                 |
//!
//! # Update model
//!
//! Once per tick, in supervisor order: `UserFlow::step` handles traveler
//! transitions and vehicle requests (step 3), then `FlowMotor::update`
//! recomputes zone accumulations and speeds from the fleet state observed at
//! the start of the tick and advances every vehicle (step 4).  The flow
//! update is synchronous: speeds depend only on start-of-tick positions,
//! never on vehicles already advanced within the same tick.

pub mod error;
pub mod motor;
pub mod reservoir;
pub mod service;
pub mod user_flow;
pub mod vehicle;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{FlowError, FlowResult};
pub use motor::FlowMotor;
pub use reservoir::{Accumulations, Reservoir, SpeedFn, Speeds, MIN_SPEED};
pub use service::{MobilityService, ServiceKind, Services};
pub use user_flow::{UserCounts, UserFlow};
pub use vehicle::{flatten_leg, Fleet, PathEntry, Vehicle, VehicleState};
