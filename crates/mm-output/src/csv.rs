//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `flow.csv` — zone accumulation and speed per mode, per snapshot tick
//! - `tick_summaries.csv` — traveler population counts per snapshot tick
//! - `paths.csv` — one row per chosen path

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::row::{TickSummaryRow, UserPathRow, ZoneFlowRow};
use crate::writer::OutputWriter;
use crate::OutputResult;

/// Writes simulation metrics to three CSV files.
pub struct CsvWriter {
    flow: Writer<File>,
    summaries: Writer<File>,
    paths: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the three CSV files in `dir` and write header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut flow = Writer::from_path(dir.join("flow.csv"))?;
        flow.write_record(["tick", "zone", "mode", "accumulation", "speed"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record([
            "tick",
            "waiting",
            "walking",
            "in_vehicle",
            "arrived",
            "stuck",
            "vehicles_en_route",
        ])?;

        let mut paths = Writer::from_path(dir.join("paths.csv"))?;
        paths.write_record(["user", "departure_tick", "cost", "link_count"])?;

        Ok(Self {
            flow,
            summaries,
            paths,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_zone_flows(&mut self, rows: &[ZoneFlowRow]) -> OutputResult<()> {
        for row in rows {
            self.flow.write_record(&[
                row.tick.to_string(),
                row.zone.clone(),
                row.mode.to_owned(),
                row.accumulation.to_string(),
                row.speed.map(|s| s.to_string()).unwrap_or_default(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.waiting.to_string(),
            row.walking.to_string(),
            row.in_vehicle.to_string(),
            row.arrived.to_string(),
            row.stuck.to_string(),
            row.vehicles_en_route.to_string(),
        ])?;
        Ok(())
    }

    fn write_user_path(&mut self, row: &UserPathRow) -> OutputResult<()> {
        self.paths.write_record(&[
            row.user.clone(),
            row.departure_tick.to_string(),
            row.cost.to_string(),
            row.link_count.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.flow.flush()?;
        self.summaries.flush()?;
        self.paths.flush()?;
        Ok(())
    }
}
