//! Route computation.
//!
//! [`ShortestPathEngine`] is the core search. [`AlternativeRouteFinder`]
//! reruns it with earlier routes penalised to produce diverse alternates,
//! and [`MultiWaypointRouter`] chains it across waypoint lists. All three
//! are constructed from an explicit road network and traffic provider.

mod alternatives;
mod assemble;
mod config;
mod error;
mod shortest_path;
mod waypoints;

#[cfg(test)]
pub(crate) mod fixtures;

pub use alternatives::{AlternativeRouteFinder, MAIN_ROUTE_NAME};
pub use config::RoutingConfig;
pub use error::RoutingError;
pub use shortest_path::{ShortestPath, ShortestPathEngine};
pub use waypoints::{MultiWaypointRouter, RouteOptions, optimize_waypoint_order, optimize_waypoints};
