//! Dijkstra search with priority-specific edge costs.
//!
//! The search runs over the node set reported by the road network, using
//! an index arena (node id → slot) with flat distance, predecessor and
//! visited arrays. Nodes in the avoid set are penalised rather than
//! removed, so a path still exists when no unused corridor does.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::Arc;

use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::domain::{NodeId, RoadSegment, RoutePriority};
use crate::network::{RoadNetwork, TrafficProvider};

use super::config::RoutingConfig;
use super::error::RoutingError;

/// A minimum-cost node sequence found by the search.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    /// Nodes from start to goal, inclusive.
    pub nodes: Vec<NodeId>,
    /// Accumulated edge cost.
    pub cost: f64,
    /// Number of nodes settled before the goal was reached.
    pub settled: usize,
}

/// Single-source shortest-path search over a road network.
///
/// Holds explicit references to its collaborators; cloning is cheap.
pub struct ShortestPathEngine<N, T> {
    network: Arc<N>,
    traffic: Arc<T>,
    config: RoutingConfig,
}

impl<N, T> Clone for ShortestPathEngine<N, T> {
    fn clone(&self) -> Self {
        Self {
            network: Arc::clone(&self.network),
            traffic: Arc::clone(&self.traffic),
            config: self.config.clone(),
        }
    }
}

impl<N: RoadNetwork, T: TrafficProvider> ShortestPathEngine<N, T> {
    /// Create a new engine.
    pub fn new(network: Arc<N>, traffic: Arc<T>, config: RoutingConfig) -> Self {
        Self {
            network,
            traffic,
            config,
        }
    }

    /// The road network searched.
    pub fn network(&self) -> &Arc<N> {
        &self.network
    }

    /// The traffic provider consulted for `LeastTraffic`.
    pub fn traffic(&self) -> &Arc<T> {
        &self.traffic
    }

    /// Routing configuration.
    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Cost of traversing `segment` under `priority`.
    ///
    /// Returns `None` if the segment cannot be used: a closed segment under
    /// `LeastTraffic`, or a cost that is not a finite non-negative number.
    pub async fn edge_cost(
        &self,
        segment: &RoadSegment,
        avoid: &HashSet<NodeId>,
        priority: RoutePriority,
    ) -> Result<Option<f64>, RoutingError> {
        let mut cost = segment.length;

        if avoid.contains(&segment.start_node_id) || avoid.contains(&segment.end_node_id) {
            cost *= self.config.avoid_multiplier();
        }

        match priority {
            RoutePriority::Fastest => {
                if segment.length > 0.0 {
                    cost *= segment.estimated_time / segment.length;
                }
            }
            RoutePriority::Shortest | RoutePriority::Balanced => {}
            RoutePriority::LeastTraffic => {
                let level = self.traffic.get_traffic_level(&segment.id).await?;
                match level.congestion() {
                    Some(congestion) => cost *= 1.0 + congestion,
                    None => return Ok(None),
                }
            }
            RoutePriority::Scenic => cost *= 1.0 - segment.scenic_value,
        }

        if cost.is_finite() && cost >= 0.0 {
            Ok(Some(cost))
        } else {
            Ok(None)
        }
    }

    /// Find the minimum-cost node sequence from `start` to `goal`.
    ///
    /// Returns `Ok(None)` if either endpoint is not in the network or the
    /// goal is unreachable. Upstream failures are propagated.
    pub async fn find_path(
        &self,
        start: &NodeId,
        goal: &NodeId,
        avoid: &HashSet<NodeId>,
        priority: RoutePriority,
    ) -> Result<Option<ShortestPath>, RoutingError> {
        let ids = self.network.get_all_node_ids().await?;
        let index: HashMap<&NodeId, usize> =
            ids.iter().enumerate().map(|(i, id)| (id, i)).collect();

        let (Some(&start_ix), Some(&goal_ix)) = (index.get(start), index.get(goal)) else {
            debug!(%start, %goal, "endpoint not in road network");
            return Ok(None);
        };

        let n = ids.len();
        let mut dist = vec![f64::INFINITY; n];
        let mut prev: Vec<Option<usize>> = vec![None; n];
        let mut visited = vec![false; n];
        let mut heap = BinaryHeap::new();
        let mut settled = 0usize;

        dist[start_ix] = 0.0;
        heap.push(Reverse((OrderedFloat(0.0), start_ix)));

        while let Some(Reverse((OrderedFloat(d), u))) = heap.pop() {
            if visited[u] {
                continue;
            }
            visited[u] = true;
            settled += 1;

            if u == goal_ix {
                break;
            }

            let neighbors = self.network.get_neighbors(&ids[u]).await?;
            trace!(node = %ids[u], cost = d, neighbors = neighbors.len(), "settled node");

            for neighbor in neighbors {
                let Some(&v) = index.get(&neighbor.node_id) else {
                    continue;
                };
                if visited[v] {
                    continue;
                }
                let Some(cost) = self.edge_cost(&neighbor.segment, avoid, priority).await? else {
                    continue;
                };

                let candidate = d + cost;
                if candidate < dist[v] {
                    dist[v] = candidate;
                    prev[v] = Some(u);
                    heap.push(Reverse((OrderedFloat(candidate), v)));
                }
            }
        }

        if !visited[goal_ix] {
            debug!(%start, %goal, settled, %priority, "goal unreachable");
            return Ok(None);
        }

        let mut nodes = vec![ids[goal_ix].clone()];
        let mut cursor = goal_ix;
        while let Some(p) = prev[cursor] {
            nodes.push(ids[p].clone());
            cursor = p;
        }
        nodes.reverse();

        debug!(
            %start,
            %goal,
            settled,
            hops = nodes.len() - 1,
            cost = dist[goal_ix],
            %priority,
            "shortest path found"
        );

        Ok(Some(ShortestPath {
            nodes,
            cost: dist[goal_ix],
            settled,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoPoint;
    use crate::network::{InMemoryRoadNetwork, InMemoryTrafficProvider, TrafficLevel};
    use crate::routing::fixtures::{TestEngine, engine, ids, node};

    /// Diamond: s -> a -> g (short, slow, plain) and s -> b -> g (long, fast, scenic).
    fn diamond() -> InMemoryRoadNetwork {
        let mut net = InMemoryRoadNetwork::new();
        net.add_node("s", GeoPoint::new(37.50, 127.00));
        net.add_node("a", GeoPoint::new(37.51, 127.01));
        net.add_node("b", GeoPoint::new(37.49, 127.01));
        net.add_node("g", GeoPoint::new(37.50, 127.02));
        net.add_segment(RoadSegment::new("sa", "s", "a", 1000.0, 120.0, 0.0)).unwrap();
        net.add_segment(RoadSegment::new("ag", "a", "g", 1000.0, 120.0, 0.0)).unwrap();
        net.add_segment(RoadSegment::new("sb", "s", "b", 1200.0, 60.0, 0.9)).unwrap();
        net.add_segment(RoadSegment::new("bg", "b", "g", 1200.0, 60.0, 0.9)).unwrap();
        net
    }

    async fn path(engine: &TestEngine, priority: RoutePriority) -> Vec<NodeId> {
        engine
            .find_path(&node("s"), &node("g"), &HashSet::new(), priority)
            .await
            .unwrap()
            .unwrap()
            .nodes
    }

    #[tokio::test]
    async fn shortest_takes_short_arm() {
        let engine = engine(diamond(), InMemoryTrafficProvider::new());
        assert_eq!(path(&engine, RoutePriority::Shortest).await, ids(&["s", "a", "g"]));
        assert_eq!(path(&engine, RoutePriority::Balanced).await, ids(&["s", "a", "g"]));
    }

    #[tokio::test]
    async fn fastest_takes_fast_arm() {
        let engine = engine(diamond(), InMemoryTrafficProvider::new());
        assert_eq!(path(&engine, RoutePriority::Fastest).await, ids(&["s", "b", "g"]));
    }

    #[tokio::test]
    async fn scenic_takes_scenic_arm() {
        let engine = engine(diamond(), InMemoryTrafficProvider::new());
        assert_eq!(path(&engine, RoutePriority::Scenic).await, ids(&["s", "b", "g"]));
    }

    #[tokio::test]
    async fn least_traffic_avoids_congestion() {
        let traffic = InMemoryTrafficProvider::new();
        traffic.set_level("sa", TrafficLevel::Flowing(0.3)).await;
        let engine = engine(diamond(), traffic);

        // a arm: 1300 + 1000 = 2300, still under the b arm's 2400
        assert_eq!(path(&engine, RoutePriority::LeastTraffic).await, ids(&["s", "a", "g"]));

        engine
            .traffic()
            .set_level("ag", TrafficLevel::Flowing(0.5))
            .await;
        // a arm: 1300 + 1500 = 2800
        assert_eq!(path(&engine, RoutePriority::LeastTraffic).await, ids(&["s", "b", "g"]));
    }

    #[tokio::test]
    async fn least_traffic_skips_closed_segments() {
        let traffic = InMemoryTrafficProvider::new();
        traffic.set_level("sb", TrafficLevel::Closed).await;
        traffic.set_level("sa", TrafficLevel::Closed).await;
        let engine = engine(diamond(), traffic);

        let result = engine
            .find_path(&node("s"), &node("g"), &HashSet::new(), RoutePriority::LeastTraffic)
            .await
            .unwrap();
        assert!(result.is_none());

        // Closure only matters to the traffic-aware priority
        assert!(
            engine
                .find_path(&node("s"), &node("g"), &HashSet::new(), RoutePriority::Shortest)
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn avoided_node_is_penalised_not_removed() {
        // Only route is s -> m -> g
        let mut net = InMemoryRoadNetwork::new();
        net.add_node("s", GeoPoint::new(0.0, 0.0));
        net.add_node("m", GeoPoint::new(0.0, 0.01));
        net.add_node("g", GeoPoint::new(0.0, 0.02));
        net.add_segment(RoadSegment::new("sm", "s", "m", 1000.0, 60.0, 0.0)).unwrap();
        net.add_segment(RoadSegment::new("mg", "m", "g", 1000.0, 60.0, 0.0)).unwrap();
        let engine = engine(net, InMemoryTrafficProvider::new());

        let avoid: HashSet<NodeId> = ids(&["m"]).into_iter().collect();
        let found = engine
            .find_path(&node("s"), &node("g"), &avoid, RoutePriority::Shortest)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.nodes, ids(&["s", "m", "g"]));
        assert!((found.cost - 2500.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn avoidance_shifts_to_other_arm() {
        let engine = engine(diamond(), InMemoryTrafficProvider::new());
        let avoid: HashSet<NodeId> = ids(&["a"]).into_iter().collect();

        // a arm: 2500 penalised; b arm: 2400
        let found = engine
            .find_path(&node("s"), &node("g"), &avoid, RoutePriority::Shortest)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.nodes, ids(&["s", "b", "g"]));
    }

    #[tokio::test]
    async fn unreachable_goal_is_none() {
        let mut net = diamond();
        net.add_node("island", GeoPoint::new(38.0, 128.0));
        let engine = engine(net, InMemoryTrafficProvider::new());

        let result = engine
            .find_path(&node("s"), &node("island"), &HashSet::new(), RoutePriority::Shortest)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn unknown_endpoint_is_none() {
        let engine = engine(diamond(), InMemoryTrafficProvider::new());
        let result = engine
            .find_path(&node("ghost"), &node("g"), &HashSet::new(), RoutePriority::Shortest)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn start_equals_goal() {
        let engine = engine(diamond(), InMemoryTrafficProvider::new());
        let found = engine
            .find_path(&node("s"), &node("s"), &HashSet::new(), RoutePriority::Shortest)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.nodes, ids(&["s"]));
        assert_eq!(found.cost, 0.0);
        assert_eq!(found.settled, 1);
    }

    #[tokio::test]
    async fn edge_cost_multipliers() {
        let engine = engine(diamond(), InMemoryTrafficProvider::new());
        let segment = RoadSegment::new("x", "p", "q", 1000.0, 50.0, 0.25);
        let none = HashSet::new();
        let avoid: HashSet<NodeId> = ids(&["q"]).into_iter().collect();

        let mut costs = Vec::new();
        for priority in [
            RoutePriority::Shortest,
            RoutePriority::Fastest,
            RoutePriority::Scenic,
            RoutePriority::LeastTraffic,
        ] {
            costs.push(engine.edge_cost(&segment, &none, priority).await.unwrap().unwrap());
        }
        assert_eq!(costs, vec![1000.0, 50.0, 750.0, 1000.0]);

        let penalised = engine
            .edge_cost(&segment, &avoid, RoutePriority::Shortest)
            .await
            .unwrap()
            .unwrap();
        assert!((penalised - 1250.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn zero_length_segment_is_free() {
        let engine = engine(diamond(), InMemoryTrafficProvider::new());
        let segment = RoadSegment::new("x", "p", "q", 0.0, 30.0, 0.0);
        let cost = engine
            .edge_cost(&segment, &HashSet::new(), RoutePriority::Fastest)
            .await
            .unwrap();
        assert_eq!(cost, Some(0.0));
    }

    #[tokio::test]
    async fn network_failure_propagates() {
        use crate::network::{NetworkError, Neighbor};

        struct Down;
        impl RoadNetwork for Down {
            async fn get_all_node_ids(&self) -> Result<Vec<NodeId>, NetworkError> {
                Err(NetworkError::Unavailable("down".into()))
            }
            async fn get_node_by_id(&self, _: &NodeId) -> Result<Option<GeoPoint>, NetworkError> {
                Ok(None)
            }
            async fn get_neighbors(&self, _: &NodeId) -> Result<Vec<Neighbor>, NetworkError> {
                Ok(vec![])
            }
            async fn get_segment_between_nodes(
                &self,
                _: &NodeId,
                _: &NodeId,
            ) -> Result<Option<RoadSegment>, NetworkError> {
                Ok(None)
            }
        }

        let engine = ShortestPathEngine::new(
            Arc::new(Down),
            Arc::new(InMemoryTrafficProvider::new()),
            RoutingConfig::default(),
        );
        let result = engine
            .find_path(&node("s"), &node("g"), &HashSet::new(), RoutePriority::Shortest)
            .await;
        assert!(matches!(result, Err(RoutingError::Network(_))));
    }
}
