//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  The inner integer is `pub` to allow
//! direct indexing into `Vec` storage via `id.0 as usize`, but callers should
//! prefer the `.index()` helpers for clarity.
//!
//! Human-readable string labels (e.g. `"CAR_3"`) live in the container that
//! owns the entity, alongside a `label → id` lookup map; ids themselves are
//! dense indices.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID" — the type's maximum value.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of a physical road node in the road descriptor.
    pub struct RoadNodeId(u32);
}

typed_id! {
    /// Index of a directed physical road link in the road descriptor.
    pub struct RoadLinkId(u32);
}

typed_id! {
    /// Index of a zone (reservoir) in the road descriptor.
    /// `u16` keeps per-link zone tags compact (max 65,534 zones).
    pub struct ZoneId(u16);
}

typed_id! {
    /// Index of a mobility layer in the multi-layer graph.
    pub struct LayerId(u16);
}

typed_id! {
    /// Index of a node in the composite multi-layer graph (layer nodes and
    /// origin/destination access nodes share one id space).
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a link in the composite multi-layer graph (mode links,
    /// transfer links, and access links share one id space).
    pub struct LinkId(u32);
}

typed_id! {
    /// Index of a traveler in the demand set.
    pub struct UserId(u32);
}

typed_id! {
    /// Index of a vehicle in the fleet.
    pub struct VehicleId(u32);
}
