//! Application state for the web layer.

use std::sync::Arc;

use crate::network::{CachedRoadNetwork, InMemoryRoadNetwork, InMemoryTrafficProvider};
use crate::routing::{
    AlternativeRouteFinder, MultiWaypointRouter, RoutingConfig, ShortestPathEngine,
};
use crate::trip::{InMemoryTripRepository, PlannerConfig, TripItineraryPlanner};

/// Road network served by the application.
pub type Network = CachedRoadNetwork<InMemoryRoadNetwork>;

/// Traffic source served by the application.
pub type Traffic = InMemoryTrafficProvider;

/// Trip planner served by the application.
pub type Planner = TripItineraryPlanner<InMemoryTripRepository, Network, Traffic>;

/// Shared application state.
///
/// Every service is built over the same network and traffic instances.
#[derive(Clone)]
pub struct AppState {
    /// Cached road network
    pub network: Arc<Network>,

    /// Live traffic levels
    pub traffic: Arc<Traffic>,

    /// Alternative route generation
    pub alternatives: Arc<AlternativeRouteFinder<Network, Traffic>>,

    /// Point-to-point and waypoint routing
    pub router: Arc<MultiWaypointRouter<Network, Traffic>>,

    /// Trip plans
    pub planner: Arc<Planner>,
}

impl AppState {
    /// Create a new app state with an empty trip store.
    pub fn new(
        network: Network,
        traffic: Traffic,
        routing: RoutingConfig,
        planner: PlannerConfig,
    ) -> Self {
        let network = Arc::new(network);
        let traffic = Arc::new(traffic);

        let engine = ShortestPathEngine::new(Arc::clone(&network), Arc::clone(&traffic), routing);
        let router = Arc::new(MultiWaypointRouter::new(engine.clone()));
        let alternatives = Arc::new(AlternativeRouteFinder::new(engine));
        let planner = Arc::new(TripItineraryPlanner::new(
            Arc::new(InMemoryTripRepository::new()),
            Arc::clone(&router),
            planner,
        ));

        Self {
            network,
            traffic,
            alternatives,
            router,
            planner,
        }
    }
}
