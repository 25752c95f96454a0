//! Turning a node sequence into a validated [`Route`].
//!
//! Node positions and connecting segments are fetched in batches of
//! concurrent reads so a remote network is not queried one hop at a time.

use futures::future::join_all;
use tracing::trace;

use crate::domain::{GeoPoint, NodeId, RoadSegment, Route};
use crate::network::RoadNetwork;

use super::error::RoutingError;

/// Build a route over `nodes`.
///
/// Fails with [`RoutingError::UnresolvedNodes`] if fewer than two nodes
/// (one, for a single-node sequence) have coordinates, and with
/// [`RoutingError::BrokenChain`] if a consecutive pair has no segment.
pub(crate) async fn assemble_route<N: RoadNetwork>(
    network: &N,
    id: impl Into<String>,
    nodes: Vec<NodeId>,
    batch_size: usize,
) -> Result<Route, RoutingError> {
    let batch_size = batch_size.max(1);

    let mut points: Vec<Option<GeoPoint>> = Vec::with_capacity(nodes.len());
    for chunk in nodes.chunks(batch_size) {
        let results = join_all(chunk.iter().map(|id| network.get_node_by_id(id))).await;
        for result in results {
            points.push(result?);
        }
    }

    let resolved = points.iter().flatten().count();
    if resolved < nodes.len().min(2) {
        return Err(RoutingError::UnresolvedNodes {
            resolved,
            total: nodes.len(),
        });
    }

    let pairs: Vec<(&NodeId, &NodeId)> = nodes.windows(2).map(|w| (&w[0], &w[1])).collect();
    let mut segments = Vec::with_capacity(pairs.len());
    for chunk in pairs.chunks(batch_size) {
        let results = join_all(
            chunk
                .iter()
                .map(|(from, to)| network.get_segment_between_nodes(from, to)),
        )
        .await;

        for (&(from, to), result) in chunk.iter().zip(results) {
            match result? {
                Some(segment) => segments.push(segment),
                None => {
                    return Err(RoutingError::BrokenChain {
                        from: from.clone(),
                        to: to.clone(),
                    });
                }
            }
        }
    }

    trace!(nodes = nodes.len(), resolved, "assembled node chain");

    let path = geometry(&points, &segments);
    Ok(Route::new(id, nodes, segments, path)?)
}

/// Concatenate segment geometry, falling back to node positions for
/// segments that carry none. Consecutive duplicate points are collapsed.
fn geometry(points: &[Option<GeoPoint>], segments: &[RoadSegment]) -> Vec<GeoPoint> {
    let mut path: Vec<GeoPoint> = Vec::new();
    if let Some(first) = points.first().copied().flatten() {
        path.push(first);
    }

    for (i, segment) in segments.iter().enumerate() {
        let fallback: Vec<GeoPoint> = [points[i], points[i + 1]].into_iter().flatten().collect();
        let shape = if segment.path.is_empty() {
            &fallback
        } else {
            &segment.path
        };
        for &point in shape {
            if path.last() != Some(&point) {
                path.push(point);
            }
        }
    }

    path
}
