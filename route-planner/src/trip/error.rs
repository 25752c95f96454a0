//! Trip planner error types.

use crate::routing::RoutingError;

/// Errors from a trip plan store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    /// The backing store could not be reached
    #[error("trip store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from trip planner operations.
///
/// Invalid input (unknown ids, a reorder list that is not a permutation,
/// items without locations) is reported as `None` or `false`, not here.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlannerError {
    /// Plan store failure
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Road routing failure
    #[error(transparent)]
    Routing(#[from] RoutingError),
}
