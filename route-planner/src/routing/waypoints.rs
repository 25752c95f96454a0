//! Routing through a sequence of waypoints.
//!
//! Points are snapped to their nearest road node, each consecutive pair is
//! routed independently, and the legs can then be merged into one
//! continuous route. Waypoint reordering uses a nearest-neighbour
//! heuristic: fast, but not an optimal travelling-salesman solution.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{GeoPoint, NodeId, Route, RoutePriority};
use crate::geo;
use crate::network::{RoadNetwork, TrafficProvider};

use super::assemble::assemble_route;
use super::error::RoutingError;
use super::shortest_path::ShortestPathEngine;

/// Options for waypoint routing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOptions {
    /// Cost model for every leg
    #[serde(default)]
    pub priority: RoutePriority,
    /// Reorder the waypoints with [`optimize_waypoints`] before routing
    #[serde(default)]
    pub optimize_waypoints: bool,
}

impl RouteOptions {
    /// Options with the given priority and no reordering.
    pub fn new(priority: RoutePriority) -> Self {
        Self {
            priority,
            optimize_waypoints: false,
        }
    }

    /// Enable or disable waypoint reordering.
    pub fn with_optimize_waypoints(mut self, optimize: bool) -> Self {
        self.optimize_waypoints = optimize;
        self
    }
}

/// Routes point-to-point and through waypoint lists.
pub struct MultiWaypointRouter<N, T> {
    engine: ShortestPathEngine<N, T>,
}

impl<N: RoadNetwork, T: TrafficProvider> MultiWaypointRouter<N, T> {
    /// Create a router on top of a search engine.
    pub fn new(engine: ShortestPathEngine<N, T>) -> Self {
        Self { engine }
    }

    /// The underlying search engine.
    pub fn engine(&self) -> &ShortestPathEngine<N, T> {
        &self.engine
    }

    /// Closest road node to `point`.
    pub async fn nearest_node(&self, point: GeoPoint) -> Result<NodeId, RoutingError> {
        let positions = self.node_positions().await?;
        self.snap(&positions, point)
    }

    /// Route between two points, snapping each to its nearest node.
    pub async fn calculate_route(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        options: &RouteOptions,
    ) -> Result<Route, RoutingError> {
        let positions = self.node_positions().await?;
        self.leg(&positions, from, to, options.priority).await
    }

    /// Route `origin → waypoints… → destination`, one route per leg.
    ///
    /// With no waypoints the result holds the single direct route. A failed
    /// leg fails the whole call; partial results are never returned.
    pub async fn calculate_multi_waypoint_route(
        &self,
        origin: GeoPoint,
        waypoints: &[GeoPoint],
        destination: GeoPoint,
        options: &RouteOptions,
    ) -> Result<Vec<Route>, RoutingError> {
        let ordered = if options.optimize_waypoints {
            optimize_waypoints(origin, waypoints, destination)
        } else {
            waypoints.to_vec()
        };

        let mut stops = Vec::with_capacity(ordered.len() + 2);
        stops.push(origin);
        stops.extend(ordered);
        stops.push(destination);

        let positions = self.node_positions().await?;
        let mut legs = Vec::with_capacity(stops.len() - 1);
        for pair in stops.windows(2) {
            legs.push(self.leg(&positions, pair[0], pair[1], options.priority).await?);
        }

        debug!(legs = legs.len(), priority = %options.priority, "multi-waypoint route calculated");
        Ok(legs)
    }

    /// Concatenate legs into one continuous route. See [`Route::merge`];
    /// an empty list is an error.
    pub fn merge_routes(&self, routes: &[Route]) -> Result<Route, RoutingError> {
        Ok(Route::merge(routes)?)
    }

    async fn leg(
        &self,
        positions: &[(NodeId, GeoPoint)],
        from: GeoPoint,
        to: GeoPoint,
        priority: RoutePriority,
    ) -> Result<Route, RoutingError> {
        let start = self.snap(positions, from)?;
        let goal = self.snap(positions, to)?;

        let found = self
            .engine
            .find_path(&start, &goal, &Default::default(), priority)
            .await?
            .ok_or_else(|| RoutingError::NoPath {
                from: start.clone(),
                to: goal.clone(),
            })?;

        assemble_route(
            self.engine.network().as_ref(),
            format!("{start}>{goal}"),
            found.nodes,
            self.engine.config().batch_size,
        )
        .await
    }

    async fn node_positions(&self) -> Result<Vec<(NodeId, GeoPoint)>, RoutingError> {
        let network = self.engine.network();
        let ids = network.get_all_node_ids().await?;
        if ids.is_empty() {
            return Err(RoutingError::EmptyNetwork);
        }

        let mut positions = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(self.engine.config().batch_size.max(1)) {
            let results = join_all(chunk.iter().map(|id| network.get_node_by_id(id))).await;
            for (id, result) in chunk.iter().zip(results) {
                if let Some(point) = result? {
                    positions.push((id.clone(), point));
                }
            }
        }
        Ok(positions)
    }

    fn snap(
        &self,
        positions: &[(NodeId, GeoPoint)],
        point: GeoPoint,
    ) -> Result<NodeId, RoutingError> {
        let max_distance_m = self.engine.config().max_snap_distance_m;
        positions
            .iter()
            .map(|(id, p)| (id, geo::distance(point, *p)))
            .filter(|(_, d)| *d <= max_distance_m)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id.clone())
            .ok_or(RoutingError::NoNearbyNode {
                point,
                max_distance_m,
            })
    }
}

/// Reorder `waypoints` with the nearest-neighbour heuristic.
///
/// Starting at `origin`, repeatedly visits the closest remaining waypoint.
/// The result is a permutation of the input, not necessarily the shortest
/// tour. `destination` stays fixed at the end of the trip and takes no part
/// in the ordering.
pub fn optimize_waypoints(
    origin: GeoPoint,
    waypoints: &[GeoPoint],
    _destination: GeoPoint,
) -> Vec<GeoPoint> {
    optimize_waypoint_order(origin, waypoints)
        .into_iter()
        .map(|i| waypoints[i])
        .collect()
}

/// Index form of [`optimize_waypoints`]: the visiting order as positions
/// into `waypoints`, so callers can carry their own ids through.
///
/// Ties go to the earlier waypoint.
pub fn optimize_waypoint_order(origin: GeoPoint, waypoints: &[GeoPoint]) -> Vec<usize> {
    let mut visited = vec![false; waypoints.len()];
    let mut order = Vec::with_capacity(waypoints.len());
    let mut current = origin;

    while order.len() < waypoints.len() {
        let mut best: Option<(usize, f64)> = None;
        for (i, &point) in waypoints.iter().enumerate() {
            if visited[i] {
                continue;
            }
            let d = geo::distance(current, point);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((i, d));
            }
        }

        let Some((next, _)) = best else {
            break;
        };
        visited[next] = true;
        order.push(next);
        current = waypoints[next];
    }

    order
}
