//! The `DecisionModel` trait — the mode/path choice extension point.

use mm_demand::User;
use mm_routing::Path;

use crate::error::DecisionResult;

/// Pluggable mode/path choice.
///
/// Given a traveler and the candidate paths computed for their mobility
/// options, return the index of the path the traveler will execute.  The
/// supervisor guarantees candidates are passed in option order, so stochastic
/// models draw reproducibly for a given seed.
///
/// Implementations may be stateful (per-user RNG streams, logging sinks);
/// the supervisor invokes `choose` sequentially in ascending user id order.
pub trait DecisionModel {
    /// Pick one of `candidates` for `user`.
    ///
    /// # Errors
    ///
    /// [`DecisionError::NoFeasibleChoice`][crate::DecisionError::NoFeasibleChoice]
    /// when `candidates` is empty or none is acceptable to the model.
    fn choose(&mut self, user: &User, candidates: &[Path]) -> DecisionResult<usize>;
}
