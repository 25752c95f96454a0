//! In-memory traffic provider.
//!
//! Holds per-segment congestion in a shared map. When constructed from a
//! snapshot file, `update_traffic_data` re-reads the file; on failure the
//! previous snapshot is kept and the error is returned.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::SegmentId;

use super::{RouteTrafficInfo, TrafficError, TrafficLevel, TrafficProvider};

#[derive(Debug, Deserialize)]
struct Snapshot {
    segments: Vec<SnapshotEntry>,
}

#[derive(Debug, Deserialize)]
struct SnapshotEntry {
    segment_id: SegmentId,
    #[serde(default)]
    level: f64,
    #[serde(default)]
    closed: bool,
}

/// Thread-safe traffic lookup with optional file-backed refresh.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTrafficProvider {
    levels: Arc<RwLock<HashMap<SegmentId, TrafficLevel>>>,
    source: Option<PathBuf>,
}

impl InMemoryTrafficProvider {
    /// Create a provider with no data; every segment reads as clear.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider backed by a JSON snapshot file.
    ///
    /// The file looks like
    /// `{"segments": [{"segment_id": "s1", "level": 0.4}, {"segment_id": "s2", "closed": true}]}`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TrafficError> {
        let path = path.as_ref().to_path_buf();
        let levels = load_snapshot(&path)?;
        Ok(Self {
            levels: Arc::new(RwLock::new(levels)),
            source: Some(path),
        })
    }

    /// Set the level for one segment.
    pub async fn set_level(&self, segment_id: impl Into<SegmentId>, level: TrafficLevel) {
        let mut guard = self.levels.write().await;
        guard.insert(segment_id.into(), level);
    }

    /// Number of segments with data.
    pub async fn len(&self) -> usize {
        self.levels.read().await.len()
    }

    /// Returns true if no segment has data.
    pub async fn is_empty(&self) -> bool {
        self.levels.read().await.is_empty()
    }
}

fn load_snapshot(path: &Path) -> Result<HashMap<SegmentId, TrafficLevel>, TrafficError> {
    let json = std::fs::read_to_string(path).map_err(|e| TrafficError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let snapshot: Snapshot =
        serde_json::from_str(&json).map_err(|e| TrafficError::Parse(e.to_string()))?;

    Ok(snapshot
        .segments
        .into_iter()
        .map(|entry| {
            let level = if entry.closed {
                TrafficLevel::Closed
            } else {
                TrafficLevel::Flowing(entry.level)
            };
            (entry.segment_id, level)
        })
        .collect())
}

impl TrafficProvider for InMemoryTrafficProvider {
    async fn get_traffic_level(
        &self,
        segment_id: &SegmentId,
    ) -> Result<TrafficLevel, TrafficError> {
        let guard = self.levels.read().await;
        Ok(guard.get(segment_id).copied().unwrap_or_default())
    }

    async fn get_route_traffic_info(
        &self,
        segment_ids: &[SegmentId],
    ) -> Result<RouteTrafficInfo, TrafficError> {
        let guard = self.levels.read().await;
        Ok(RouteTrafficInfo::from_levels(
            segment_ids
                .iter()
                .map(|id| guard.get(id).copied().unwrap_or_default()),
        ))
    }

    async fn update_traffic_data(&self) -> Result<(), TrafficError> {
        let Some(path) = &self.source else {
            return Ok(());
        };
        let levels = load_snapshot(path)?;

        let mut guard = self.levels.write().await;
        *guard = levels;
        Ok(())
    }
}
