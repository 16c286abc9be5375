//! `mm-output` — metrics sinks.
//!
//! # Crate layout
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`row`]      | Flat row types written by every backend               |
//! | [`writer`]   | The `OutputWriter` trait                              |
//! | [`csv`]      | CSV backend (flow, tick summaries, chosen paths)      |
//! | [`observer`] | `MetricsObserver<W>` — bridges `SimObserver` to a writer |
//! | [`error`]    | `OutputError`, `OutputResult<T>`                      |
//!
//! Metrics are fire-and-forget: observer hooks have no return value, so
//! writer errors are buffered and retrieved with
//! [`MetricsObserver::take_error`] after the run.  A failing sink never
//! blocks or aborts the simulation.

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::MetricsObserver;
pub use row::{TickSummaryRow, UserPathRow, ZoneFlowRow};
pub use writer::OutputWriter;
