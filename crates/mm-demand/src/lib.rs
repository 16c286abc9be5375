//! `mm-demand` — travelers and where they come from.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`user`]       | `User`, `UserState`, `Endpoint`                           |
//! | [`manager`]    | `DemandManager` trait, `ListDemand`, `CsvDemandManager`   |
//! | [`generation`] | Seeded random demand generator                            |
//! | [`error`]      | `DemandError`, `DemandResult<T>`                          |
//!
//! The supervisor consumes demand exclusively through the [`DemandManager`]
//! trait, so applications can swap the CSV manager for a programmatic or
//! database-backed source without touching the core.

pub mod error;
pub mod generation;
pub mod manager;
pub mod user;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{DemandError, DemandResult};
pub use generation::random_demand;
pub use manager::{CsvDemandManager, DemandManager, ListDemand};
pub use user::{Endpoint, User, UserState};
