//! Demand managers: the supervisor's source of travelers.
//!
//! # CSV format
//!
//! One row per traveler:
//!
//! ```csv
//! id,departure,origin,destination
//! U0,07:00:00,A,B
//! U1,07:12:30,B,C
//! ```
//!
//! `departure` is `HH:MM:SS` simulated time.  `origin`/`destination` are
//! either road-node labels or `"x y"` coordinate pairs; the kind is detected
//! from the first row and must be consistent across the file
//! ([`DemandError::MixedEndpoints`] otherwise).  Node labels are resolved
//! against the road descriptor at load time, so a loaded demand set never
//! references a missing node.

use std::io::Read;
use std::path::Path as FsPath;

use serde::Deserialize;

use mm_core::{Point, SimClock, Tick, UserId};
use mm_graph::RoadNetwork;

use crate::error::{DemandError, DemandResult};
use crate::user::{Endpoint, User};

// ── DemandManager ─────────────────────────────────────────────────────────────

/// Source of travelers for the supervisor.
pub trait DemandManager {
    /// Users whose departure falls in `[window_start, window_end)`, sorted
    /// by departure time ascending.  Windows are expected to be consumed
    /// contiguously; stragglers from earlier, never-requested windows are
    /// included rather than lost.
    fn next_departures(&mut self, window_start: Tick, window_end: Tick) -> Vec<User>;

    /// Every traveler's `(id, origin, destination)`, enumerated once at
    /// setup so the supervisor can materialize the OD access layer before
    /// the tick loop starts.
    fn endpoints(&self) -> Vec<(UserId, Endpoint, Endpoint)>;

    /// Number of travelers not yet released.
    fn pending(&self) -> usize;
}

// ── ListDemand ────────────────────────────────────────────────────────────────

/// In-memory demand: a pre-sorted user list consumed front to back.
pub struct ListDemand {
    users: Vec<User>,
    cursor: usize,
}

impl ListDemand {
    /// Sorts by `(departure, id)` so release order is deterministic.
    pub fn new(mut users: Vec<User>) -> Self {
        users.sort_by_key(|u| (u.departure, u.id));
        Self { users, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }
}

impl DemandManager for ListDemand {
    fn next_departures(&mut self, _window_start: Tick, window_end: Tick) -> Vec<User> {
        let start = self.cursor;
        while self.cursor < self.users.len() && self.users[self.cursor].departure < window_end {
            self.cursor += 1;
        }
        self.users[start..self.cursor].to_vec()
    }

    fn endpoints(&self) -> Vec<(UserId, Endpoint, Endpoint)> {
        self.users
            .iter()
            .map(|u| (u.id, u.origin, u.destination))
            .collect()
    }

    fn pending(&self) -> usize {
        self.users.len() - self.cursor
    }
}

// ── CsvDemandManager ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DemandRecord {
    id: String,
    departure: String,
    origin: String,
    destination: String,
}

/// The endpoint column kind detected from the first row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndpointKind {
    Node,
    Coordinate,
}

/// Demand loaded from a CSV file (see module docs for the format).
pub struct CsvDemandManager {
    inner: ListDemand,
}

impl CsvDemandManager {
    /// Load demand from `path`, resolving node labels against `roads` and
    /// departure times against `clock`.
    pub fn from_path(path: &FsPath, roads: &RoadNetwork, clock: &SimClock) -> DemandResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, roads, clock)
    }

    /// Like [`from_path`](Self::from_path) but accepts any `Read` source —
    /// pass a `std::io::Cursor` in tests.
    pub fn from_reader<R: Read>(reader: R, roads: &RoadNetwork, clock: &SimClock) -> DemandResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut users = Vec::new();
        let mut kind: Option<EndpointKind> = None;

        for (row, result) in csv_reader.deserialize::<DemandRecord>().enumerate() {
            let record = result.map_err(|e| DemandError::Parse(e.to_string()))?;

            let origin_kind = classify(&record.origin);
            let destination_kind = classify(&record.destination);
            if origin_kind != destination_kind {
                return Err(DemandError::MixedEndpoints { row });
            }
            match kind {
                None => kind = Some(origin_kind),
                Some(k) if k != origin_kind => return Err(DemandError::MixedEndpoints { row }),
                Some(_) => {}
            }

            let origin = parse_endpoint(&record.origin, origin_kind, roads)?;
            let destination = parse_endpoint(&record.destination, destination_kind, roads)?;
            let secs = parse_hms(&record.departure)?;
            let departure = clock.tick_at_secs(secs);

            users.push(User::new(
                UserId(row as u32),
                &record.id,
                origin,
                destination,
                departure,
            ));
        }

        log::info!("loaded {} travelers from CSV demand", users.len());
        Ok(Self {
            inner: ListDemand::new(users),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl DemandManager for CsvDemandManager {
    fn next_departures(&mut self, window_start: Tick, window_end: Tick) -> Vec<User> {
        self.inner.next_departures(window_start, window_end)
    }

    fn endpoints(&self) -> Vec<(UserId, Endpoint, Endpoint)> {
        self.inner.endpoints()
    }

    fn pending(&self) -> usize {
        self.inner.pending()
    }
}

// ── Parsing helpers ───────────────────────────────────────────────────────────

fn classify(cell: &str) -> EndpointKind {
    if parse_coordinate(cell).is_some() {
        EndpointKind::Coordinate
    } else {
        EndpointKind::Node
    }
}

fn parse_coordinate(cell: &str) -> Option<Point> {
    let mut parts = cell.split_whitespace();
    let x: f64 = parts.next()?.parse().ok()?;
    let y: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Point::new(x, y))
}

fn parse_endpoint(cell: &str, kind: EndpointKind, roads: &RoadNetwork) -> DemandResult<Endpoint> {
    match kind {
        EndpointKind::Coordinate => {
            let point = parse_coordinate(cell)
                .ok_or_else(|| DemandError::Parse(format!("invalid coordinate {cell:?}")))?;
            Ok(Endpoint::Position(point))
        }
        EndpointKind::Node => roads
            .node_id(cell.trim())
            .map(Endpoint::Node)
            .ok_or_else(|| DemandError::UnknownNode(cell.to_owned())),
    }
}

/// Parse `HH:MM:SS` into simulated seconds.
pub fn parse_hms(s: &str) -> DemandResult<u64> {
    let invalid = || DemandError::Parse(format!("invalid time {s:?}: expected HH:MM:SS"));
    let mut parts = s.trim().split(':');
    let mut take = |max: u64| -> DemandResult<u64> {
        let part = parts.next().ok_or_else(invalid)?;
        let v: u64 = part.parse().map_err(|_| invalid())?;
        if v > max {
            return Err(invalid());
        }
        Ok(v)
    };
    let hours = take(u64::MAX)?;
    let minutes = take(59)?;
    let seconds = take(59)?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(hours * 3_600 + minutes * 60 + seconds)
}
