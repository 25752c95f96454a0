//! In-memory road network.
//!
//! Holds the whole graph in hash maps. Useful for tests, demos and
//! small regions; can be loaded from a JSON graph file:
//!
//! ```json
//! {
//!   "nodes": [{ "id": "a", "latitude": 37.5, "longitude": 127.0 }],
//!   "segments": [{
//!     "id": "s1", "start_node_id": "a", "end_node_id": "b",
//!     "length": 120.0, "estimated_time": 9.0,
//!     "scenic_value": 0.3, "bidirectional": true
//!   }]
//! }
//! ```
//!
//! A bidirectional segment also registers its reverse as `<id>:rev`.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{GeoPoint, NodeId, RoadSegment};

use super::{Neighbor, NetworkError, RoadNetwork};

/// Suffix appended to a segment id to name its reverse direction.
const REVERSE_SUFFIX: &str = ":rev";

#[derive(Debug, Deserialize)]
struct NetworkFile {
    nodes: Vec<NodeRecord>,
    #[serde(default)]
    segments: Vec<SegmentRecord>,
}

#[derive(Debug, Deserialize)]
struct NodeRecord {
    id: NodeId,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct SegmentRecord {
    id: String,
    start_node_id: NodeId,
    end_node_id: NodeId,
    length: f64,
    estimated_time: f64,
    #[serde(default)]
    scenic_value: f64,
    #[serde(default)]
    path: Vec<GeoPoint>,
    #[serde(default)]
    bidirectional: bool,
}

/// A road graph held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRoadNetwork {
    /// Node positions.
    nodes: HashMap<NodeId, GeoPoint>,
    /// Node ids in insertion order, so searches are deterministic.
    order: Vec<NodeId>,
    /// Outgoing edges per node.
    adjacency: HashMap<NodeId, Vec<Neighbor>>,
    /// Preferred segment per ordered node pair.
    between: HashMap<(NodeId, NodeId), RoadSegment>,
}

impl InMemoryRoadNetwork {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a network from a JSON graph document.
    pub fn from_json_str(json: &str) -> Result<Self, NetworkError> {
        let file: NetworkFile =
            serde_json::from_str(json).map_err(|e| NetworkError::Parse(e.to_string()))?;

        let mut network = Self::new();
        for node in file.nodes {
            network.add_node(node.id, GeoPoint::new(node.latitude, node.longitude));
        }

        for record in file.segments {
            let bidirectional = record.bidirectional;
            let segment = RoadSegment::new(
                record.id,
                record.start_node_id,
                record.end_node_id,
                record.length,
                record.estimated_time,
                record.scenic_value,
            )
            .with_path(record.path);

            if bidirectional {
                network.add_road(segment)?;
            } else {
                network.add_segment(segment)?;
            }
        }

        Ok(network)
    }

    /// Load a network from a JSON graph file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| NetworkError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    /// Add (or move) a node.
    pub fn add_node(&mut self, id: impl Into<NodeId>, point: GeoPoint) {
        let id = id.into();
        if self.nodes.insert(id.clone(), point).is_none() {
            self.order.push(id);
        }
    }

    /// Add a directed segment. Both endpoints must already exist.
    ///
    /// Segments without geometry get a straight line between their
    /// endpoints. When two segments join the same ordered pair, the
    /// shorter one answers `get_segment_between_nodes`.
    pub fn add_segment(&mut self, mut segment: RoadSegment) -> Result<(), NetworkError> {
        let start = self.point_of(&segment.start_node_id)?;
        let end = self.point_of(&segment.end_node_id)?;
        if segment.path.is_empty() {
            segment.path = vec![start, end];
        }

        let key = (segment.start_node_id.clone(), segment.end_node_id.clone());
        let replace = self
            .between
            .get(&key)
            .is_none_or(|existing| segment.length < existing.length);
        if replace {
            self.between.insert(key, segment.clone());
        }

        self.adjacency
            .entry(segment.start_node_id.clone())
            .or_default()
            .push(Neighbor {
                node_id: segment.end_node_id.clone(),
                segment,
            });

        Ok(())
    }

    /// Add a two-way road: the segment plus its reverse (`<id>:rev`).
    pub fn add_road(&mut self, segment: RoadSegment) -> Result<(), NetworkError> {
        let reverse = segment.reversed(format!("{}{REVERSE_SUFFIX}", segment.id));
        self.add_segment(segment)?;
        self.add_segment(reverse)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed segments.
    pub fn segment_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    fn point_of(&self, id: &NodeId) -> Result<GeoPoint, NetworkError> {
        self.nodes
            .get(id)
            .copied()
            .ok_or_else(|| {
                NetworkError::InvalidData(format!("segment references unknown node {id}"))
            })
    }
}

impl RoadNetwork for InMemoryRoadNetwork {
    async fn get_all_node_ids(&self) -> Result<Vec<NodeId>, NetworkError> {
        Ok(self.order.clone())
    }

    async fn get_node_by_id(&self, id: &NodeId) -> Result<Option<GeoPoint>, NetworkError> {
        Ok(self.nodes.get(id).copied())
    }

    async fn get_neighbors(&self, id: &NodeId) -> Result<Vec<Neighbor>, NetworkError> {
        Ok(self.adjacency.get(id).cloned().unwrap_or_default())
    }

    async fn get_segment_between_nodes(
        &self,
        from: &NodeId,
        to: &NodeId,
    ) -> Result<Option<RoadSegment>, NetworkError> {
        Ok(self.between.get(&(from.clone(), to.clone())).cloned())
    }
}
