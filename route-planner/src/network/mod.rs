//! Road graph and traffic collaborators.
//!
//! The routing engine only consumes these read interfaces; the graph is
//! built by a separate indexing service and traffic comes from a live
//! feed. Both traits are asynchronous because real implementations sit
//! behind network or disk I/O.
//!
//! In-memory implementations are provided for tests, demos and small
//! deployments, together with a caching wrapper that keeps repeated
//! neighbour lookups off the backing service.

mod cache;
mod error;
mod memory;
mod traffic;

use std::future::Future;

use crate::domain::{GeoPoint, NodeId, RoadSegment, SegmentId};

pub use cache::{CacheConfig, CachedRoadNetwork};
pub use error::{NetworkError, TrafficError};
pub use memory::InMemoryRoadNetwork;
pub use traffic::InMemoryTrafficProvider;

/// An outgoing edge from a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// Node at the far end of the segment
    pub node_id: NodeId,
    /// The segment leading there
    pub segment: RoadSegment,
}

/// Read interface to the routable road graph.
pub trait RoadNetwork: Send + Sync {
    /// Every node id in the graph.
    fn get_all_node_ids(&self) -> impl Future<Output = Result<Vec<NodeId>, NetworkError>> + Send;

    /// Resolve a node to its position. `None` if the node is unknown.
    fn get_node_by_id(
        &self,
        id: &NodeId,
    ) -> impl Future<Output = Result<Option<GeoPoint>, NetworkError>> + Send;

    /// Outgoing edges of a node. Unknown nodes have no neighbours.
    fn get_neighbors(
        &self,
        id: &NodeId,
    ) -> impl Future<Output = Result<Vec<Neighbor>, NetworkError>> + Send;

    /// The segment running from `from` to `to`, if the nodes are adjacent.
    fn get_segment_between_nodes(
        &self,
        from: &NodeId,
        to: &NodeId,
    ) -> impl Future<Output = Result<Option<RoadSegment>, NetworkError>> + Send;
}

/// Congestion on a single segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrafficLevel {
    /// Open to traffic; 0 means clear, larger is slower.
    Flowing(f64),
    /// Closed to traffic.
    Closed,
}

impl Default for TrafficLevel {
    fn default() -> Self {
        Self::CLEAR
    }
}

impl TrafficLevel {
    /// A clear road.
    pub const CLEAR: TrafficLevel = TrafficLevel::Flowing(0.0);

    /// The congestion level, or `None` for a closed segment.
    pub fn congestion(&self) -> Option<f64> {
        match self {
            TrafficLevel::Flowing(level) => Some(level.max(0.0)),
            TrafficLevel::Closed => None,
        }
    }

    /// Returns true if the segment is closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, TrafficLevel::Closed)
    }
}

/// Aggregate congestion over a sequence of segments.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RouteTrafficInfo {
    /// Mean congestion over open segments; closed segments are excluded.
    pub average_traffic_level: f64,
    /// How many of the queried segments are closed.
    pub closed_segments: usize,
}

impl RouteTrafficInfo {
    /// Aggregates per-segment levels.
    pub fn from_levels(levels: impl IntoIterator<Item = TrafficLevel>) -> Self {
        let mut total = 0.0;
        let mut open = 0usize;
        let mut closed_segments = 0usize;

        for level in levels {
            match level.congestion() {
                Some(c) => {
                    total += c;
                    open += 1;
                }
                None => closed_segments += 1,
            }
        }

        let average_traffic_level = if open == 0 { 0.0 } else { total / open as f64 };

        Self {
            average_traffic_level,
            closed_segments,
        }
    }
}

/// Live congestion data.
pub trait TrafficProvider: Send + Sync {
    /// Congestion on one segment. Segments without data are clear.
    fn get_traffic_level(
        &self,
        segment_id: &SegmentId,
    ) -> impl Future<Output = Result<TrafficLevel, TrafficError>> + Send;

    /// Aggregate congestion along a path.
    fn get_route_traffic_info(
        &self,
        segment_ids: &[SegmentId],
    ) -> impl Future<Output = Result<RouteTrafficInfo, TrafficError>> + Send;

    /// Pull fresh data from the feed.
    fn update_traffic_data(&self) -> impl Future<Output = Result<(), TrafficError>> + Send;
}
