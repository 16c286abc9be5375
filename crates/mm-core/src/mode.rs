//! Transport mode enum shared across all graph, flow, and demand crates.
//!
//! Each mobility layer declares exactly one `Mode`; several layers may share
//! a mode (two competing bus operators are two layers, both `Bus`).
//! Accumulation in the flow motor is tracked per mode.

/// The means by which a traveler moves along a layer.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Private vehicle.
    Car,
    /// Scheduled bus service.
    Bus,
    /// Tramway.
    Tram,
    /// Underground rail.
    Metro,
    /// On foot.
    Walk,
}

impl Mode {
    /// All modes, in a fixed order — used to iterate accumulation tables
    /// deterministically.
    pub const ALL: [Mode; 5] = [Mode::Car, Mode::Bus, Mode::Tram, Mode::Metro, Mode::Walk];

    /// `true` for modes whose travelers occupy a vehicle counted by the
    /// flow motor.  Walking happens outside the vehicle accumulation model.
    #[inline]
    pub fn is_vehicular(self) -> bool {
        !matches!(self, Mode::Walk)
    }

    /// Human-readable label, useful for CSV column values and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Car => "car",
            Mode::Bus => "bus",
            Mode::Tram => "tram",
            Mode::Metro => "metro",
            Mode::Walk => "walk",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); `None` for unknown labels.
    pub fn parse(s: &str) -> Option<Mode> {
        match s {
            "car" => Some(Mode::Car),
            "bus" => Some(Mode::Bus),
            "tram" => Some(Mode::Tram),
            "metro" => Some(Mode::Metro),
            "walk" => Some(Mode::Walk),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
