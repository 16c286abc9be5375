//! Per-zone reservoirs: accumulation in, speed out.
//!
//! Speed functions are pure and supplied externally (an MFD is calibration
//! policy, not engine code).  Whatever they return is floored at
//! [`MIN_SPEED`] so travel times stay finite and the tick loop always
//! terminates.

use mm_core::{Mode, ZoneId};
use rustc_hash::FxHashMap;

/// Vehicle count per mode currently inside a zone.
pub type Accumulations = FxHashMap<Mode, usize>;

/// Speed (m/s) per mode inside a zone.
pub type Speeds = FxHashMap<Mode, f64>;

/// A pure accumulation → speed mapping for one zone.
pub type SpeedFn = Box<dyn Fn(&Accumulations) -> Speeds + Send + Sync>;

/// Lower speed bound (m/s).  Keeps divisions finite when a speed function
/// saturates at heavy accumulation.
pub const MIN_SPEED: f64 = 0.001;

/// One zone's flow state: current accumulation and the speeds derived from
/// it at the start of the tick.
pub struct Reservoir {
    pub zone: ZoneId,
    accumulation: Accumulations,
    speed: Speeds,
    speed_fn: SpeedFn,
}

impl Reservoir {
    pub fn new(zone: ZoneId, speed_fn: SpeedFn) -> Self {
        Self {
            zone,
            accumulation: Accumulations::default(),
            speed: Speeds::default(),
            speed_fn,
        }
    }

    pub(crate) fn reset_accumulation(&mut self) {
        self.accumulation.clear();
    }

    pub(crate) fn add(&mut self, mode: Mode) {
        *self.accumulation.entry(mode).or_insert(0) += 1;
    }

    /// Re-derive speeds from the current accumulation, flooring non-positive
    /// or non-finite results at [`MIN_SPEED`] with a warning.
    pub(crate) fn update_speeds(&mut self) {
        let mut speeds = (self.speed_fn)(&self.accumulation);
        for (mode, speed) in speeds.iter_mut() {
            if !speed.is_finite() || *speed < MIN_SPEED {
                log::warn!(
                    "zone {} speed function returned {speed} for {mode}; clamping to {MIN_SPEED}",
                    self.zone
                );
                *speed = MIN_SPEED;
            }
        }
        self.speed = speeds;
    }

    /// Current accumulation for `mode` (0 when absent).
    pub fn accumulation(&self, mode: Mode) -> usize {
        self.accumulation.get(&mode).copied().unwrap_or(0)
    }

    /// Total accumulation across modes.
    pub fn total_accumulation(&self) -> usize {
        self.accumulation.values().sum()
    }

    /// Speed for `mode` as of the last update, if the speed function
    /// produced one.
    pub fn speed(&self, mode: Mode) -> Option<f64> {
        self.speed.get(&mode).copied()
    }
}
