use mm_graph::GraphError;
use mm_routing::RoutingError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    #[error("graph assembly error: {0}")]
    Graph(#[from] GraphError),

    /// Only `InvalidCost` surfaces here — unreachable routes are per-user
    /// conditions handled inside the tick.
    #[error("routing configuration error: {0}")]
    Routing(#[from] RoutingError),
}

pub type SimResult<T> = Result<T, SimError>;
