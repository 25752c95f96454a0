//! Caching layer for road network reads.
//!
//! A shortest-path search issues one neighbour lookup per settled node,
//! and alternative searches revisit the same corridor several times. The
//! graph changes far less often than it is queried, so lookups are cached
//! with a TTL that bounds staleness after the indexing service republishes.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{GeoPoint, NodeId, RoadSegment};

use super::{Neighbor, NetworkError, RoadNetwork};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per lookup kind.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            max_capacity: 100_000,
        }
    }
}

/// Road network with cached reads.
///
/// Wraps any `RoadNetwork`; errors are never cached.
pub struct CachedRoadNetwork<N> {
    inner: N,
    node_ids: MokaCache<(), Arc<Vec<NodeId>>>,
    nodes: MokaCache<NodeId, Option<GeoPoint>>,
    neighbors: MokaCache<NodeId, Arc<Vec<Neighbor>>>,
    segments: MokaCache<(NodeId, NodeId), Option<RoadSegment>>,
}

impl<N: RoadNetwork> CachedRoadNetwork<N> {
    /// Create a new cached network with the given configuration.
    pub fn new(inner: N, config: &CacheConfig) -> Self {
        Self {
            inner,
            node_ids: build_cache(config),
            nodes: build_cache(config),
            neighbors: build_cache(config),
            segments: build_cache(config),
        }
    }

    /// Access the underlying network for reads that bypass cache.
    pub fn inner(&self) -> &N {
        &self.inner
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.node_ids.invalidate_all();
        self.nodes.invalidate_all();
        self.neighbors.invalidate_all();
        self.segments.invalidate_all();
    }
}

fn build_cache<K, V>(config: &CacheConfig) -> MokaCache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    MokaCache::builder()
        .time_to_live(config.ttl)
        .max_capacity(config.max_capacity)
        .build()
}

impl<N: RoadNetwork> RoadNetwork for CachedRoadNetwork<N> {
    async fn get_all_node_ids(&self) -> Result<Vec<NodeId>, NetworkError> {
        if let Some(cached) = self.node_ids.get(&()).await {
            return Ok(cached.as_ref().clone());
        }

        let ids = self.inner.get_all_node_ids().await?;
        self.node_ids.insert((), Arc::new(ids.clone())).await;
        Ok(ids)
    }

    async fn get_node_by_id(&self, id: &NodeId) -> Result<Option<GeoPoint>, NetworkError> {
        if let Some(cached) = self.nodes.get(id).await {
            return Ok(cached);
        }

        let point = self.inner.get_node_by_id(id).await?;
        self.nodes.insert(id.clone(), point).await;
        Ok(point)
    }

    async fn get_neighbors(&self, id: &NodeId) -> Result<Vec<Neighbor>, NetworkError> {
        if let Some(cached) = self.neighbors.get(id).await {
            return Ok(cached.as_ref().clone());
        }

        let neighbors = self.inner.get_neighbors(id).await?;
        self.neighbors
            .insert(id.clone(), Arc::new(neighbors.clone()))
            .await;
        Ok(neighbors)
    }

    async fn get_segment_between_nodes(
        &self,
        from: &NodeId,
        to: &NodeId,
    ) -> Result<Option<RoadSegment>, NetworkError> {
        let key = (from.clone(), to.clone());
        if let Some(cached) = self.segments.get(&key).await {
            return Ok(cached);
        }

        let segment = self.inner.get_segment_between_nodes(from, to).await?;
        self.segments.insert(key, segment.clone()).await;
        Ok(segment)
    }
}
