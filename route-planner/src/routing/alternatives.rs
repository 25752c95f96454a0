//! Alternative route generation.
//!
//! Alternatives come from re-running the search with the nodes of earlier
//! routes penalised. Each candidate is then screened: it must resolve to a
//! real chain of segments and must not be an excessive detour compared to
//! the straight-line distance between its endpoints.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::{AlternativeRoute, NodeId, Route, RoutePriority, RouteResult, SegmentId};
use crate::geo;
use crate::network::{RoadNetwork, TrafficProvider};

use super::assemble::assemble_route;
use super::error::RoutingError;
use super::shortest_path::ShortestPathEngine;

/// Display name of the route the caller passed in.
pub const MAIN_ROUTE_NAME: &str = "추천 경로";

/// Produces alternates to a base route.
pub struct AlternativeRouteFinder<N, T> {
    engine: ShortestPathEngine<N, T>,
}

impl<N: RoadNetwork, T: TrafficProvider> AlternativeRouteFinder<N, T> {
    /// Create a finder on top of a search engine.
    pub fn new(engine: ShortestPathEngine<N, T>) -> Self {
        Self { engine }
    }

    /// Annotate `base_route` as the main route and find up to
    /// `max_alternatives` alternates between its endpoints.
    ///
    /// The second alternate avoids the nodes of both the base route and the
    /// first accepted alternate. Rejected candidates are logged and dropped;
    /// an empty alternatives list is a normal outcome.
    pub async fn calculate_alternatives(
        &self,
        base_route: &Route,
        priority: RoutePriority,
    ) -> Result<RouteResult, RoutingError> {
        let main_route = AlternativeRoute {
            route: base_route.clone(),
            name: MAIN_ROUTE_NAME.to_string(),
            traffic_level: self.traffic_level(base_route).await?,
            priority,
        };

        let mut alternatives = Vec::new();

        let (Some(start), Some(goal)) = (base_route.origin(), base_route.destination()) else {
            return Ok(RouteResult {
                main_route,
                alternatives,
            });
        };
        if start == goal {
            debug!(route = base_route.id(), "base route is a loop, no alternatives");
            return Ok(RouteResult {
                main_route,
                alternatives,
            });
        }

        let network = self.engine.network();
        let endpoints = (
            network.get_node_by_id(start).await?,
            network.get_node_by_id(goal).await?,
        );
        let (Some(start_point), Some(goal_point)) = endpoints else {
            debug!(route = base_route.id(), "base route endpoints not located");
            return Ok(RouteResult {
                main_route,
                alternatives,
            });
        };
        let direct = geo::distance(start_point, goal_point);

        let mut avoid: HashSet<NodeId> = base_route.nodes().iter().cloned().collect();

        for attempt in 1..=self.engine.config().max_alternatives {
            let id = format!("{}-alt{attempt}", base_route.id());
            let Some(route) = self
                .candidate(&id, start, goal, &avoid, priority, direct)
                .await?
            else {
                // The avoid set is unchanged, so later attempts would repeat this one
                break;
            };

            avoid.extend(route.nodes().iter().cloned());
            let traffic_level = self.traffic_level(&route).await?;
            alternatives.push(AlternativeRoute {
                route,
                name: priority.alternative_name(),
                traffic_level,
                priority,
            });
        }

        debug!(
            route = base_route.id(),
            %priority,
            alternatives = alternatives.len(),
            "alternatives calculated"
        );

        Ok(RouteResult {
            main_route,
            alternatives,
        })
    }

    /// Search and screen one alternate. `Ok(None)` means rejected.
    async fn candidate(
        &self,
        id: &str,
        start: &NodeId,
        goal: &NodeId,
        avoid: &HashSet<NodeId>,
        priority: RoutePriority,
        direct: f64,
    ) -> Result<Option<Route>, RoutingError> {
        let Some(found) = self.engine.find_path(start, goal, avoid, priority).await? else {
            debug!(id, "alternative rejected: no path");
            return Ok(None);
        };

        if found.nodes.len() < 2 {
            debug!(id, "alternative rejected: fewer than two nodes");
            return Ok(None);
        }

        let route = match assemble_route(
            self.engine.network().as_ref(),
            id,
            found.nodes,
            self.engine.config().batch_size,
        )
        .await
        {
            Ok(route) => route,
            Err(err) if err.is_unusable_path() => {
                debug!(id, error = %err, "alternative rejected");
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        if self.engine.config().is_excessive_detour(route.distance(), direct) {
            debug!(
                id,
                distance = route.distance(),
                direct,
                "alternative rejected: excessive detour"
            );
            return Ok(None);
        }

        Ok(Some(route))
    }

    async fn traffic_level(&self, route: &Route) -> Result<f64, RoutingError> {
        let ids: Vec<SegmentId> = route.segments().iter().map(|s| s.id.clone()).collect();
        let info = self.engine.traffic().get_route_traffic_info(&ids).await?;
        Ok(info.average_traffic_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::domain::{GeoPoint, RoadSegment};
    use crate::network::{
        InMemoryRoadNetwork, InMemoryTrafficProvider, Neighbor, NetworkError, TrafficLevel,
    };
    use crate::routing::RoutingConfig;
    use crate::routing::fixtures::{corridor, endpoints, engine, node};

    async fn base(
        finder: &AlternativeRouteFinder<InMemoryRoadNetwork, InMemoryTrafficProvider>,
    ) -> Route {
        let found = finder
            .engine
            .find_path(&node("s"), &node("g"), &HashSet::new(), RoutePriority::Shortest)
            .await
            .unwrap()
            .unwrap();
        assemble_route(finder.engine.network().as_ref(), "base", found.nodes, 8)
            .await
            .unwrap()
    }

    /// Three five-edge corridors between s and g, 900 m apart.
    ///
    /// With the 1.25 penalty on the two end edges only, a fresh corridor
    /// costs 1.1 × its length and a fully avoided one 1.25 ×.
    fn three_corridors() -> InMemoryRoadNetwork {
        let mut net = InMemoryRoadNetwork::new();
        let (s, g) = endpoints(&mut net, 900.0);
        corridor(&mut net, "a", ("s", s), ("g", g), 5, 1000.0, 0.0);
        corridor(&mut net, "b", ("s", s), ("g", g), 5, 1100.0, 150.0);
        corridor(&mut net, "c", ("s", s), ("g", g), 5, 1120.0, -150.0);
        net
    }

    #[tokio::test]
    async fn alternatives_use_distinct_corridors() {
        let finder =
            AlternativeRouteFinder::new(engine(three_corridors(), InMemoryTrafficProvider::new()));
        let base = base(&finder).await;
        assert!(base.nodes().contains(&node("a1")));

        let result = finder
            .calculate_alternatives(&base, RoutePriority::Shortest)
            .await
            .unwrap();

        assert_eq!(result.main_route.name, MAIN_ROUTE_NAME);
        assert_eq!(result.main_route.route, base);
        assert_eq!(result.alternatives.len(), 2);

        let first = &result.alternatives[0].route;
        let second = &result.alternatives[1].route;
        assert!(first.nodes().contains(&node("b1")));
        assert!(second.nodes().contains(&node("c1")));
        assert_eq!(result.alternatives[0].name, "대체 경로 (최단)");
        assert_eq!(first.id(), "base-alt1");
        assert_eq!(second.id(), "base-alt2");

        for alt in &result.alternatives {
            assert_eq!(alt.route.origin(), Some(&node("s")));
            assert_eq!(alt.route.destination(), Some(&node("g")));
        }
    }

    #[tokio::test]
    async fn max_alternatives_is_respected() {
        let engine = ShortestPathEngine::new(
            Arc::new(three_corridors()),
            Arc::new(InMemoryTrafficProvider::new()),
            RoutingConfig {
                max_alternatives: 1,
                ..RoutingConfig::default()
            },
        );
        let finder = AlternativeRouteFinder::new(engine);
        let base = base(&finder).await;

        let result = finder
            .calculate_alternatives(&base, RoutePriority::Shortest)
            .await
            .unwrap();
        assert_eq!(result.alternatives.len(), 1);
    }

    /// Main road 1400 m over a 1000 m gap; the only other way is 1500 m.
    fn detour_network() -> InMemoryRoadNetwork {
        let mut net = InMemoryRoadNetwork::new();
        let (s, g) = endpoints(&mut net, 1000.0);
        corridor(&mut net, "m", ("s", s), ("g", g), 2, 1400.0, 0.0);
        corridor(&mut net, "d", ("s", s), ("g", g), 5, 1500.0, 300.0);
        net
    }

    #[tokio::test]
    async fn long_detour_is_rejected() {
        let finder =
            AlternativeRouteFinder::new(engine(detour_network(), InMemoryTrafficProvider::new()));
        let base = base(&finder).await;
        assert!(base.nodes().contains(&node("m1")));

        let result = finder
            .calculate_alternatives(&base, RoutePriority::Shortest)
            .await
            .unwrap();
        assert!(result.alternatives.is_empty());
    }

    /// Counts neighbour lookups, one per settled node.
    struct CountingNetwork {
        inner: InMemoryRoadNetwork,
        neighbor_calls: Mutex<usize>,
    }

    impl CountingNetwork {
        fn new(inner: InMemoryRoadNetwork) -> Self {
            Self {
                inner,
                neighbor_calls: Mutex::new(0),
            }
        }

        fn neighbor_calls(&self) -> usize {
            *self.neighbor_calls.lock().unwrap()
        }
    }

    impl RoadNetwork for CountingNetwork {
        async fn get_all_node_ids(&self) -> Result<Vec<NodeId>, NetworkError> {
            self.inner.get_all_node_ids().await
        }

        async fn get_node_by_id(&self, id: &NodeId) -> Result<Option<GeoPoint>, NetworkError> {
            self.inner.get_node_by_id(id).await
        }

        async fn get_neighbors(&self, id: &NodeId) -> Result<Vec<Neighbor>, NetworkError> {
            *self.neighbor_calls.lock().unwrap() += 1;
            self.inner.get_neighbors(id).await
        }

        async fn get_segment_between_nodes(
            &self,
            from: &NodeId,
            to: &NodeId,
        ) -> Result<Option<RoadSegment>, NetworkError> {
            self.inner.get_segment_between_nodes(from, to).await
        }
    }

    async fn neighbor_calls_with(max_alternatives: usize, base: &Route) -> usize {
        let network = Arc::new(CountingNetwork::new(detour_network()));
        let finder = AlternativeRouteFinder::new(ShortestPathEngine::new(
            network.clone(),
            Arc::new(InMemoryTrafficProvider::new()),
            RoutingConfig {
                max_alternatives,
                ..RoutingConfig::default()
            },
        ));
        let result = finder
            .calculate_alternatives(base, RoutePriority::Shortest)
            .await
            .unwrap();
        assert!(result.alternatives.is_empty());
        network.neighbor_calls()
    }

    #[tokio::test]
    async fn rejection_stops_the_search() {
        let finder =
            AlternativeRouteFinder::new(engine(detour_network(), InMemoryTrafficProvider::new()));
        let base = base(&finder).await;

        let one = neighbor_calls_with(1, &base).await;
        assert!(one > 0);
        assert_eq!(neighbor_calls_with(3, &base).await, one);
    }

    #[tokio::test]
    async fn short_detour_is_accepted() {
        // Same shape scaled down; 300 m is 1.5× the gap but under 500 m
        let mut net = InMemoryRoadNetwork::new();
        let (s, g) = endpoints(&mut net, 200.0);
        corridor(&mut net, "m", ("s", s), ("g", g), 2, 280.0, 0.0);
        corridor(&mut net, "d", ("s", s), ("g", g), 5, 300.0, 60.0);

        let finder = AlternativeRouteFinder::new(engine(net, InMemoryTrafficProvider::new()));
        let base = base(&finder).await;

        let result = finder
            .calculate_alternatives(&base, RoutePriority::Shortest)
            .await
            .unwrap();
        assert!(!result.alternatives.is_empty());
        let first = &result.alternatives[0].route;
        assert!(first.nodes().contains(&node("d1")));
        assert!((first.distance() - 300.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn traffic_levels_are_annotated() {
        let traffic = InMemoryTrafficProvider::new();
        for i in 0..5 {
            traffic
                .set_level(format!("a-{i}"), TrafficLevel::Flowing(0.5))
                .await;
        }
        let finder = AlternativeRouteFinder::new(engine(three_corridors(), traffic));
        let base = base(&finder).await;

        let result = finder
            .calculate_alternatives(&base, RoutePriority::Shortest)
            .await
            .unwrap();
        assert!((result.main_route.traffic_level - 0.5).abs() < 1e-9);
        assert_eq!(result.alternatives[0].traffic_level, 0.0);
    }

    #[tokio::test]
    async fn single_node_base_has_no_alternatives() {
        let finder =
            AlternativeRouteFinder::new(engine(three_corridors(), InMemoryTrafficProvider::new()));
        let base = assemble_route(finder.engine.network().as_ref(), "here", vec![node("s")], 8)
            .await
            .unwrap();

        let result = finder
            .calculate_alternatives(&base, RoutePriority::Balanced)
            .await
            .unwrap();
        assert!(result.alternatives.is_empty());
        assert_eq!(result.main_route.traffic_level, 0.0);
    }
}
