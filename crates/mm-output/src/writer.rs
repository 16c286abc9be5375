//! The `OutputWriter` trait implemented by all backend writers.

use crate::row::{TickSummaryRow, UserPathRow, ZoneFlowRow};
use crate::OutputResult;

/// A metrics backend.  All methods are invoked by
/// [`MetricsObserver`][crate::MetricsObserver], which buffers the first
/// error instead of propagating it into the simulation loop.
pub trait OutputWriter {
    /// Write a batch of zone flow rows for one snapshot tick.
    fn write_zone_flows(&mut self, rows: &[ZoneFlowRow]) -> OutputResult<()>;

    /// Write one traveler-population summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write one chosen-path row.
    fn write_user_path(&mut self, row: &UserPathRow) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
