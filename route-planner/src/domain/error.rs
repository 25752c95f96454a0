//! Domain error types.
//!
//! These errors represent structural violations when building routes.
//! They are distinct from upstream I/O failures in the network layer.

use super::NodeId;

/// Domain-level errors for route construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Node list length does not match the segment count
    #[error("route has {nodes} nodes but {segments} segments (expected nodes = segments + 1)")]
    NodeCountMismatch { nodes: usize, segments: usize },

    /// A segment does not join the nodes it sits between
    #[error("segment {index} does not connect {from} to {to}")]
    BrokenChain {
        index: usize,
        from: NodeId,
        to: NodeId,
    },

    /// Nothing to merge
    #[error("cannot merge an empty list of routes")]
    EmptyMerge,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::NodeCountMismatch {
            nodes: 3,
            segments: 1,
        };
        assert_eq!(
            err.to_string(),
            "route has 3 nodes but 1 segments (expected nodes = segments + 1)"
        );

        let err = DomainError::BrokenChain {
            index: 0,
            from: NodeId::from("a"),
            to: NodeId::from("b"),
        };
        assert_eq!(err.to_string(), "segment 0 does not connect a to b");

        let err = DomainError::EmptyMerge;
        assert_eq!(err.to_string(), "cannot merge an empty list of routes");
    }
}
