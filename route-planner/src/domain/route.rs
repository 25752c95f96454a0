//! Route types.
//!
//! A `Route` is the result of one routing query: a chain of directed
//! segments together with the node sequence they join and the geometry
//! to draw. Alternatives wrap a route with a display name, a traffic
//! annotation and the priority that produced it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DomainError, GeoPoint, NodeId, RoadSegment};

/// Separator used when synthesizing merged route ids.
const MERGED_ID_SEPARATOR: &str = "~";

/// Selects the edge-cost function used by the shortest-path search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutePriority {
    /// Minimise travel time
    Fastest,
    /// Minimise distance
    Shortest,
    /// Avoid congested segments
    LeastTraffic,
    /// Prefer roads with a high scenic rating
    Scenic,
    /// Distance-based cost without a priority-specific weighting
    #[default]
    Balanced,
}

impl RoutePriority {
    /// All priorities, in declaration order.
    pub const ALL: [RoutePriority; 5] = [
        RoutePriority::Fastest,
        RoutePriority::Shortest,
        RoutePriority::LeastTraffic,
        RoutePriority::Scenic,
        RoutePriority::Balanced,
    ];

    /// Short user-facing label for the priority.
    pub fn label(&self) -> &'static str {
        match self {
            RoutePriority::Fastest => "빠른",
            RoutePriority::Shortest => "최단",
            RoutePriority::LeastTraffic => "교통 회피",
            RoutePriority::Scenic => "경치 좋은",
            RoutePriority::Balanced => "균형",
        }
    }

    /// Display name given to an alternate computed under this priority.
    pub fn alternative_name(&self) -> String {
        format!("대체 경로 ({})", self.label())
    }
}

impl fmt::Display for RoutePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoutePriority::Fastest => "FASTEST",
            RoutePriority::Shortest => "SHORTEST",
            RoutePriority::LeastTraffic => "LEAST_TRAFFIC",
            RoutePriority::Scenic => "SCENIC",
            RoutePriority::Balanced => "BALANCED",
        };
        f.write_str(s)
    }
}

/// A validated chain of road segments.
///
/// Invariants, checked by [`Route::new`]:
/// - `nodes.len() == segments.len() + 1`
/// - segment `i` runs from `nodes[i]` to `nodes[i + 1]`
/// - `distance` and `estimated_time` are the sums over `segments`
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    id: String,
    path: Vec<GeoPoint>,
    segments: Vec<RoadSegment>,
    nodes: Vec<NodeId>,
    distance: f64,
    estimated_time: f64,
}

impl Route {
    /// Builds a route, validating that `nodes` and `segments` line up.
    pub fn new(
        id: impl Into<String>,
        nodes: Vec<NodeId>,
        segments: Vec<RoadSegment>,
        path: Vec<GeoPoint>,
    ) -> Result<Self, DomainError> {
        if nodes.len() != segments.len() + 1 {
            return Err(DomainError::NodeCountMismatch {
                nodes: nodes.len(),
                segments: segments.len(),
            });
        }

        for (index, (segment, pair)) in segments.iter().zip(nodes.windows(2)).enumerate() {
            if !segment.connects(&pair[0], &pair[1]) {
                return Err(DomainError::BrokenChain {
                    index,
                    from: pair[0].clone(),
                    to: pair[1].clone(),
                });
            }
        }

        let distance = segments.iter().map(|s| s.length).sum();
        let estimated_time = segments.iter().map(|s| s.estimated_time).sum();

        Ok(Self {
            id: id.into(),
            path,
            segments,
            nodes,
            distance,
            estimated_time,
        })
    }

    /// Concatenates consecutive legs into one continuous route.
    ///
    /// Each leg after the first must start where the previous one ended.
    /// The shared boundary node is kept once, and each later leg's first
    /// path point is dropped so boundary vertices are not duplicated.
    /// The id is synthesized from the first and last leg ids, so merging
    /// is associative: merging `[merge([a, b]), c]` equals `merge([a, b, c])`.
    pub fn merge(routes: &[Route]) -> Result<Self, DomainError> {
        let (first, rest) = routes.split_first().ok_or(DomainError::EmptyMerge)?;
        if rest.is_empty() {
            return Ok(first.clone());
        }

        let mut nodes = first.nodes.clone();
        let mut segments = first.segments.clone();
        let mut path = first.path.clone();

        for leg in rest {
            let skip = usize::from(nodes.last() == leg.nodes.first());
            nodes.extend(leg.nodes.iter().skip(skip).cloned());
            segments.extend(leg.segments.iter().cloned());
            path.extend(leg.path.iter().skip(1).copied());
        }

        let last = rest.last().unwrap_or(first);
        let id = format!(
            "{}{MERGED_ID_SEPARATOR}{}",
            first.first_leg_id(),
            last.last_leg_id()
        );

        Self::new(id, nodes, segments, path)
    }

    /// Route identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Geometry to draw, start to end.
    pub fn path(&self) -> &[GeoPoint] {
        &self.path
    }

    /// Segments in travel order.
    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }

    /// Node sequence; one longer than `segments`.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Total length in meters.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Total estimated time in seconds.
    pub fn estimated_time(&self) -> f64 {
        self.estimated_time
    }

    /// First node of the route.
    pub fn origin(&self) -> Option<&NodeId> {
        self.nodes.first()
    }

    /// Last node of the route.
    pub fn destination(&self) -> Option<&NodeId> {
        self.nodes.last()
    }

    fn first_leg_id(&self) -> &str {
        self.id
            .split(MERGED_ID_SEPARATOR)
            .next()
            .unwrap_or(&self.id)
    }

    fn last_leg_id(&self) -> &str {
        self.id
            .rsplit(MERGED_ID_SEPARATOR)
            .next()
            .unwrap_or(&self.id)
    }
}

/// A route annotated for presentation as one of several choices.
#[derive(Debug, Clone, PartialEq)]
pub struct AlternativeRoute {
    /// The underlying route
    pub route: Route,
    /// Display name
    pub name: String,
    /// Average congestion over the route's segments (0 = clear)
    pub traffic_level: f64,
    /// Priority the route was computed under
    pub priority: RoutePriority,
}

/// A recommended route plus up to two diverse alternates.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// The recommended route
    pub main_route: AlternativeRoute,
    /// Diverse alternates, possibly empty
    pub alternatives: Vec<AlternativeRoute>,
}
