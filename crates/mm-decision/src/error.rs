//! Decision-subsystem error type.

use thiserror::Error;

use mm_core::UserId;

/// Errors produced by decision models.  Recovered per traveler: the user is
/// marked stuck and the tick continues.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("no feasible path choice for traveler {0}")]
    NoFeasibleChoice(UserId),
}

pub type DecisionResult<T> = Result<T, DecisionError>;
