//! Routing and trip-planning engine.
//!
//! Computes a recommended route plus diverse alternatives between two
//! points, routes through waypoint lists, and builds day-by-day travel
//! itineraries from a list of places.

pub mod config;
pub mod domain;
pub mod geo;
pub mod network;
pub mod routing;
pub mod trip;
pub mod web;
