//! `mm-decision` — choosing among candidate paths.
//!
//! # Crate layout
//!
//! | Module      | Contents                                         |
//! |-------------|--------------------------------------------------|
//! | [`model`]   | The `DecisionModel` trait                        |
//! | [`min_cost`]| `MinCostDecision` — deterministic cheapest path  |
//! | [`logit`]   | `LogitDecisionModel` — multinomial logit sampling|
//! | [`error`]   | `DecisionError`, `DecisionResult<T>`             |
//!
//! The supervisor computes one candidate path per traveler mobility option
//! and hands the set to a `DecisionModel`, which picks the one the traveler
//! executes.  Utility calibration is policy and lives in the model
//! implementations, never in the core.

pub mod error;
pub mod logit;
pub mod min_cost;
pub mod model;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{DecisionError, DecisionResult};
pub use logit::LogitDecisionModel;
pub use min_cost::MinCostDecision;
pub use model::DecisionModel;
