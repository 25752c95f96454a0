//! Road segments: directed edges of the road graph.

use super::{GeoPoint, NodeId, SegmentId};

/// A directed edge between two adjacent nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadSegment {
    /// Segment identifier
    pub id: SegmentId,
    /// Node the segment leaves from
    pub start_node_id: NodeId,
    /// Node the segment arrives at
    pub end_node_id: NodeId,
    /// Physical length in meters
    pub length: f64,
    /// Estimated free-flow traversal time in seconds
    pub estimated_time: f64,
    /// Scenic rating in `[0, 1]`
    pub scenic_value: f64,
    /// Geometry from start to end node
    pub path: Vec<GeoPoint>,
}

impl RoadSegment {
    /// Creates a segment. The scenic value is clamped into `[0, 1]`.
    pub fn new(
        id: impl Into<SegmentId>,
        start_node_id: impl Into<NodeId>,
        end_node_id: impl Into<NodeId>,
        length: f64,
        estimated_time: f64,
        scenic_value: f64,
    ) -> Self {
        Self {
            id: id.into(),
            start_node_id: start_node_id.into(),
            end_node_id: end_node_id.into(),
            length,
            estimated_time,
            scenic_value: scenic_value.clamp(0.0, 1.0),
            path: Vec::new(),
        }
    }

    /// Attaches geometry to the segment.
    pub fn with_path(mut self, path: Vec<GeoPoint>) -> Self {
        self.path = path;
        self
    }

    /// Returns true if this segment runs from `from` to `to`.
    pub fn connects(&self, from: &NodeId, to: &NodeId) -> bool {
        &self.start_node_id == from && &self.end_node_id == to
    }

    /// Returns the same road travelled in the opposite direction.
    pub fn reversed(&self, id: impl Into<SegmentId>) -> Self {
        let mut path = self.path.clone();
        path.reverse();
        Self {
            id: id.into(),
            start_node_id: self.end_node_id.clone(),
            end_node_id: self.start_node_id.clone(),
            length: self.length,
            estimated_time: self.estimated_time,
            scenic_value: self.scenic_value,
            path,
        }
    }
}
