//! Multinomial logit path choice.

use mm_core::SimRng;
use mm_demand::User;
use mm_routing::Path;

use crate::error::{DecisionError, DecisionResult};
use crate::model::DecisionModel;

/// Samples a candidate with probability ∝ `exp(-theta * cost)`.
///
/// `theta` controls how strongly travelers prefer cheaper paths: 0 is a
/// uniform draw, large values approach the deterministic minimum.  Each
/// traveler draws from an independent RNG stream derived from `seed` and
/// their id, so choices are reproducible regardless of release batching.
pub struct LogitDecisionModel {
    theta: f64,
    seed: u64,
}

impl LogitDecisionModel {
    pub fn new(theta: f64, seed: u64) -> Self {
        Self { theta, seed }
    }
}

impl DecisionModel for LogitDecisionModel {
    fn choose(&mut self, user: &User, candidates: &[Path]) -> DecisionResult<usize> {
        if candidates.is_empty() {
            return Err(DecisionError::NoFeasibleChoice(user.id));
        }
        if candidates.len() == 1 {
            return Ok(0);
        }

        // Shift by the minimum cost so the exponentials stay well scaled
        // even for large absolute costs.
        let min_cost = candidates
            .iter()
            .map(|p| p.cost)
            .fold(f64::INFINITY, f64::min);
        let weights: Vec<f64> = candidates
            .iter()
            .map(|p| (-self.theta * (p.cost - min_cost)).exp())
            .collect();
        let total: f64 = weights.iter().sum();

        let mut rng = SimRng::stream(self.seed, user.id.0 as u64);
        let mut draw = rng.gen_range(0.0..total);
        for (index, weight) in weights.iter().enumerate() {
            if draw < *weight {
                return Ok(index);
            }
            draw -= weight;
        }
        // Floating-point slack: the draw landed on the upper boundary.
        Ok(candidates.len() - 1)
    }
}
