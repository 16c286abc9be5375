//! Flat row types shared by all output backends.

/// Per-zone per-mode flow state at one snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneFlowRow {
    pub tick: u64,
    pub zone: String,
    pub mode: &'static str,
    pub accumulation: u64,
    /// Speed (m/s) derived at the snapshot tick, if the zone's speed
    /// function produced one for this mode.
    pub speed: Option<f64>,
}

/// Traveler-population summary at one snapshot tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummaryRow {
    pub tick: u64,
    pub waiting: u64,
    pub walking: u64,
    pub in_vehicle: u64,
    pub arrived: u64,
    pub stuck: u64,
    pub vehicles_en_route: u64,
}

/// One chosen path, written when the decision model binds it.
#[derive(Debug, Clone, PartialEq)]
pub struct UserPathRow {
    pub user: String,
    pub departure_tick: u64,
    pub cost: f64,
    pub link_count: u64,
}
