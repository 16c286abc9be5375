//! Named per-link cost table.
//!
//! Links carry a small table of named scalar costs (`"length"`, `"time"`,
//! `"wait"`, …).  The routing engine looks costs up by name at query time;
//! which names exist on a link is a data-authoring concern, not a type-level
//! one, so the table is a plain string-keyed map.

use rustc_hash::FxHashMap;

/// Cost name used for physical length in metres.  Populated automatically on
/// every mode link (from its road-reference chain) and on transfer links
/// (always 0).
pub const COST_LENGTH: &str = "length";

/// Cost name used for travel time in seconds by the stock components.
pub const COST_TIME: &str = "time";

/// A named scalar cost table attached to one link.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Costs(FxHashMap<String, f64>);

impl Costs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, value)` pairs — the common literal form in
    /// tests and generators.
    pub fn of(pairs: &[(&str, f64)]) -> Self {
        Self(pairs.iter().map(|&(k, v)| (k.to_owned(), v)).collect())
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Set `name` to `value`, overwriting any previous value.
    pub fn set(&mut self, name: &str, value: f64) {
        self.0.insert(name.to_owned(), value);
    }

    /// Insert `value` under `name` only if the name is absent — the back-fill
    /// primitive behind `set_default_cost`.
    pub fn or_insert(&mut self, name: &str, value: f64) {
        self.0.entry(name.to_owned()).or_insert(value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, f64)> for Costs {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
