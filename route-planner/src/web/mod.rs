//! Web layer for the route planner.
//!
//! Exposes routing and trip planning as a JSON API.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, Network, Planner, Traffic};
