//! Traveler state.

use mm_core::{Point, RoadNodeId, Tick, UserId, VehicleId};
use mm_graph::{LayerSet, RoadNetwork};
use mm_routing::Path;

// ── Endpoint ──────────────────────────────────────────────────────────────────

/// Where a trip starts or ends: a known road node, or a free coordinate to
/// be snapped to the network through the OD access layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Endpoint {
    Node(RoadNodeId),
    Position(Point),
}

impl Endpoint {
    /// The physical position of the endpoint.
    pub fn pos(&self, roads: &RoadNetwork) -> Point {
        match *self {
            Endpoint::Node(n) => roads.node(n).pos,
            Endpoint::Position(p) => p,
        }
    }
}

// ── UserState ─────────────────────────────────────────────────────────────────

/// Lifecycle state of a traveler.
///
/// `Waiting` covers both pre-departure and inter-mode transfers; `Arrived`
/// and `Stuck` are terminal.  A `Stuck` user is reported and excluded from
/// further processing, never fatal to the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserState {
    /// Waiting to start the next leg (pre-departure, or sitting out a
    /// transfer's fixed wait time).
    Waiting { remaining_wait: f64 },
    /// Walking a leg; `remaining` metres to go.
    Walking { remaining: f64 },
    /// Riding the given vehicle until arrival or a transfer node.
    InVehicle(VehicleId),
    /// Reached the destination at the given tick.
    Arrived(Tick),
    /// No feasible route or vehicle could be obtained.  Terminal, reported.
    Stuck,
}

impl UserState {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, UserState::Arrived(_) | UserState::Stuck)
    }
}

// ── User ──────────────────────────────────────────────────────────────────────

/// One traveler: a demand endpoint pair, a departure time, and — once the
/// decision model has run — a bound path being executed leg by leg.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub label: String,
    pub origin: Endpoint,
    pub destination: Endpoint,
    pub departure: Tick,
    /// Candidate layer subsets this traveler may route over.  One shortest
    /// path is computed per option; empty means "all layers" (a single
    /// option).
    pub options: Vec<LayerSet>,
    /// The chosen path, bound by the supervisor after the decision model
    /// runs.  Immutable once set.
    pub path: Option<Path>,
    /// Index of the path leg currently being executed.
    pub leg: usize,
    pub state: UserState,
}

impl User {
    pub fn new(id: UserId, label: &str, origin: Endpoint, destination: Endpoint, departure: Tick) -> Self {
        Self {
            id,
            label: label.to_owned(),
            origin,
            destination,
            departure,
            options: Vec::new(),
            path: None,
            leg: 0,
            state: UserState::Waiting { remaining_wait: 0.0 },
        }
    }

    /// Restrict this traveler to the given layer options (builder form).
    pub fn with_options(mut self, options: Vec<LayerSet>) -> Self {
        self.options = options;
        self
    }

    /// Bind the chosen path.  Called once by the supervisor.
    pub fn set_path(&mut self, path: Path) {
        self.path = Some(path);
        self.leg = 0;
    }
}
