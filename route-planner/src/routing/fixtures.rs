//! Graph builders shared by the routing tests.

use std::sync::Arc;

use crate::domain::{GeoPoint, NodeId, RoadSegment};
use crate::geo;
use crate::network::{InMemoryRoadNetwork, InMemoryTrafficProvider};

use super::{RoutingConfig, ShortestPathEngine};

pub(crate) type TestEngine = ShortestPathEngine<InMemoryRoadNetwork, InMemoryTrafficProvider>;

pub(crate) fn engine(network: InMemoryRoadNetwork, traffic: InMemoryTrafficProvider) -> TestEngine {
    ShortestPathEngine::new(Arc::new(network), Arc::new(traffic), RoutingConfig::default())
}

pub(crate) fn node(id: &str) -> NodeId {
    NodeId::from(id)
}

pub(crate) fn ids(ids: &[&str]) -> Vec<NodeId> {
    ids.iter().map(|id| NodeId::from(*id)).collect()
}

/// Lay a corridor of `edges` equal directed segments from `from` to `to`.
///
/// Interior nodes are named `{name}1`, `{name}2`, ... and are pushed
/// `offset_m` sideways so corridors do not overlap on a map. Segment `i`
/// is named `{name}-{i}`. `length` is the declared total; travel time
/// assumes 10 m/s.
pub(crate) fn corridor(
    network: &mut InMemoryRoadNetwork,
    name: &str,
    from: (&str, GeoPoint),
    to: (&str, GeoPoint),
    edges: usize,
    length: f64,
    offset_m: f64,
) {
    let heading = geo::bearing(from.1, to.1);
    let span = geo::distance(from.1, to.1);

    let mut stops = vec![from.0.to_string()];
    for i in 1..edges {
        let along = geo::destination_point(from.1, heading, span * i as f64 / edges as f64);
        let point = geo::destination_point(along, heading + 90.0, offset_m);
        let id = format!("{name}{i}");
        network.add_node(id.as_str(), point);
        stops.push(id);
    }
    stops.push(to.0.to_string());

    let each = length / edges as f64;
    for (i, pair) in stops.windows(2).enumerate() {
        network
            .add_segment(RoadSegment::new(
                format!("{name}-{i}"),
                pair[0].as_str(),
                pair[1].as_str(),
                each,
                each / 10.0,
                0.0,
            ))
            .unwrap();
    }
}

/// Start and goal nodes `span_m` apart on an east-west line.
pub(crate) fn endpoints(network: &mut InMemoryRoadNetwork, span_m: f64) -> (GeoPoint, GeoPoint) {
    let s = GeoPoint::new(37.50, 127.00);
    let g = geo::destination_point(s, 90.0, span_m);
    network.add_node("s", s);
    network.add_node("g", g);
    (s, g)
}
