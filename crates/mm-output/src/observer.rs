//! `MetricsObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use mm_core::{Mode, Tick};
use mm_demand::User;
use mm_flow::{Fleet, FlowMotor, UserFlow};
use mm_graph::MultiLayerGraph;
use mm_sim::SimObserver;

use crate::row::{TickSummaryRow, UserPathRow, ZoneFlowRow};
use crate::writer::OutputWriter;
use crate::OutputError;

/// A [`SimObserver`] that writes zone flows, tick summaries, and chosen
/// paths to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because observer hooks have
/// no return value.  After the run, check for errors with
/// [`take_error`](Self::take_error).
pub struct MetricsObserver<W: OutputWriter> {
    writer: W,
    /// Zone labels captured at construction, indexed by `ZoneId`.
    zone_labels: Vec<String>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> MetricsObserver<W> {
    /// Create an observer backed by `writer`, capturing zone labels from
    /// `graph` for readable flow rows.
    pub fn new(writer: W, graph: &MultiLayerGraph) -> Self {
        Self {
            writer,
            zone_labels: graph.roads.zones().iter().map(|z| z.label.clone()).collect(),
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after the run.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: crate::OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for MetricsObserver<W> {
    fn on_path_chosen(&mut self, user: &User) {
        let row = UserPathRow {
            user: user.label.clone(),
            departure_tick: user.departure.0,
            cost: user.path.as_ref().map(|p| p.cost).unwrap_or(f64::NAN),
            link_count: user.path.as_ref().map(|p| p.len() as u64).unwrap_or(0),
        };
        let result = self.writer.write_user_path(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, flow: &FlowMotor, users: &UserFlow, fleet: &Fleet) {
        let mut rows = Vec::new();
        for reservoir in flow.reservoirs() {
            let zone = self
                .zone_labels
                .get(reservoir.zone.index())
                .cloned()
                .unwrap_or_else(|| reservoir.zone.to_string());
            for mode in Mode::ALL {
                let accumulation = reservoir.accumulation(mode);
                let speed = reservoir.speed(mode);
                if accumulation == 0 && speed.is_none() {
                    continue;
                }
                rows.push(ZoneFlowRow {
                    tick: tick.0,
                    zone: zone.clone(),
                    mode: mode.as_str(),
                    accumulation: accumulation as u64,
                    speed,
                });
            }
        }
        if !rows.is_empty() {
            let result = self.writer.write_zone_flows(&rows);
            self.store_err(result);
        }

        let counts = users.counts();
        let summary = TickSummaryRow {
            tick: tick.0,
            waiting: counts.waiting as u64,
            walking: counts.walking as u64,
            in_vehicle: counts.in_vehicle as u64,
            arrived: counts.arrived as u64,
            stuck: counts.stuck as u64,
            vehicles_en_route: fleet.en_route() as u64,
        };
        let result = self.writer.write_tick_summary(&summary);
        self.store_err(result);
    }

    fn on_dropped(&mut self, users: &[User]) {
        // Dropped demand appears in the paths file with no cost, so no run
        // output ever silently loses a traveler.
        for user in users {
            let row = UserPathRow {
                user: user.label.clone(),
                departure_tick: user.departure.0,
                cost: f64::NAN,
                link_count: 0,
            };
            let result = self.writer.write_user_path(&row);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
