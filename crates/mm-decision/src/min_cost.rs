//! Deterministic cheapest-path choice.

use mm_demand::User;
use mm_routing::Path;

use crate::error::{DecisionError, DecisionResult};
use crate::model::DecisionModel;

/// Always picks the lowest-cost candidate; ties go to the first one in
/// option order.  The baseline model for tests and deterministic runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct MinCostDecision;

impl DecisionModel for MinCostDecision {
    fn choose(&mut self, user: &User, candidates: &[Path]) -> DecisionResult<usize> {
        candidates
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cost.total_cmp(&b.cost))
            .map(|(index, _)| index)
            .ok_or(DecisionError::NoFeasibleChoice(user.id))
    }
}
