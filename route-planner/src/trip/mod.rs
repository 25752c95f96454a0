//! Trip planning.
//!
//! Turns a list of places into a trip plan: stored, reorderable, optimised
//! with the waypoint heuristic, estimated at a fixed average speed and
//! split into timed days.

mod config;
mod error;
mod itinerary;
mod planner;
mod repository;


pub use config::PlannerConfig;
pub use error::{PlannerError, RepositoryError};
pub use itinerary::{DailyItinerary, ItineraryDay, TripEstimate, estimate};
pub use planner::{
    NewTripItem, OptimizationType, TripItemUpdate, TripItineraryPlanner, TripPlanUpdate,
};
pub use repository::{InMemoryTripRepository, TripRepository};
