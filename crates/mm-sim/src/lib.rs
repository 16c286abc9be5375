//! `mm-sim` — the discrete-time supervisor.
//!
//! # Tick order
//!
//! ```text
//! while tick < end:
//!   ① Release   — demand whose departure falls in [t, t+dt)
//!   ② Route     — one candidate path per traveler mobility option
//!                 (parallel with the `parallel` feature), then the
//!                 decision model binds one, in ascending user id order
//!   ③ UserFlow  — traveler transitions, vehicle requests
//!   ④ FlowMotor — zone accumulations → speeds → vehicle advancement
//!   ⑤ Advance the clock; observer hooks fire
//! ```
//!
//! The composite graph is read-only for the whole loop: every demand
//! endpoint is wired into the OD access layer by the builder, before tick 0.
//! Demand departing after the end time is reported dropped, never released.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                              |
//! |------------|-----------------------------------------------------|
//! | `parallel` | Runs the routing fan-out on Rayon's thread pool.    |

pub mod builder;
pub mod error;
pub mod observer;
pub mod supervisor;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use builder::SupervisorBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use supervisor::Supervisor;
