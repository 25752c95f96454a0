//! Routing error types.

use crate::domain::{DomainError, GeoPoint, NodeId};
use crate::network::{NetworkError, TrafficError};

/// Errors from route computation.
///
/// "No alternative found" is not an error; it shows up as an empty
/// alternatives list.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoutingError {
    /// Road network read failed
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Traffic provider read failed
    #[error(transparent)]
    Traffic(#[from] TrafficError),

    /// Assembled route violated a structural invariant
    #[error("invalid route: {0}")]
    Domain(#[from] DomainError),

    /// The goal is unreachable from the start
    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    /// No node close enough to snap a point onto
    #[error("no road node within {max_distance_m} m of {point}")]
    NoNearbyNode { point: GeoPoint, max_distance_m: f64 },

    /// The road network has no nodes at all
    #[error("road network has no nodes")]
    EmptyNetwork,

    /// Too few path nodes could be resolved to coordinates
    #[error("only {resolved} of {total} route nodes could be located")]
    UnresolvedNodes { resolved: usize, total: usize },

    /// Adjacent path nodes are not joined by a segment
    #[error("no segment joins {from} to {to}")]
    BrokenChain { from: NodeId, to: NodeId },
}

impl RoutingError {
    /// Returns true for failures that only mean a candidate path is unusable,
    /// as opposed to an upstream service failing.
    pub fn is_unusable_path(&self) -> bool {
        matches!(
            self,
            RoutingError::UnresolvedNodes { .. } | RoutingError::BrokenChain { .. }
        )
    }
}
