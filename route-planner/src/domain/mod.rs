//! Domain types for the routing and trip-planning engine.
//!
//! Routes enforce their structural invariants at construction time, so
//! code that receives a `Route` can trust that its nodes and segments
//! line up and that its totals are the sums over its segments.

mod error;
mod ids;
mod point;
mod route;
mod segment;
mod trip;

pub use error::DomainError;
pub use ids::{NodeId, SegmentId};
pub use point::GeoPoint;
pub use route::{AlternativeRoute, Route, RoutePriority, RouteResult};
pub use segment::RoadSegment;
pub use trip::{Place, TripItem, TripItemType, TripPlan};
