use route_planner::config::ServerConfig;
use route_planner::network::{
    CacheConfig, CachedRoadNetwork, InMemoryRoadNetwork, InMemoryTrafficProvider, TrafficProvider,
};
use route_planner::routing::RoutingConfig;
use route_planner::trip::PlannerConfig;
use route_planner::web::{AppState, create_router};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("route_planner=info")),
        )
        .init();

    let config = ServerConfig::from_env().expect("Invalid server configuration");

    // Load the road graph (fail fast if unavailable)
    let network =
        InMemoryRoadNetwork::from_file(&config.network_path).expect("Failed to load road network");
    info!(
        path = %config.network_path.display(),
        nodes = network.node_count(),
        segments = network.segment_count(),
        "loaded road network"
    );
    let network = CachedRoadNetwork::new(network, &CacheConfig::default());

    let traffic = match &config.traffic_path {
        Some(path) => {
            InMemoryTrafficProvider::from_file(path).expect("Failed to load traffic snapshot")
        }
        None => {
            warn!("TRAFFIC_SNAPSHOT_PATH not set, every road reads as clear");
            InMemoryTrafficProvider::new()
        }
    };

    let state = AppState::new(
        network,
        traffic,
        RoutingConfig::default(),
        PlannerConfig::default(),
    );

    // Spawn background task to reload traffic periodically
    let traffic_refresh = state.traffic.clone();
    let refresh_every = config.traffic_refresh;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_every);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            match traffic_refresh.update_traffic_data().await {
                Ok(()) => {
                    let segments = traffic_refresh.len().await;
                    info!(segments, "refreshed traffic");
                }
                Err(e) => warn!(error = %e, "failed to refresh traffic"),
            }
        }
    });

    let app = create_router(state);

    let addr = config.bind_addr;
    info!("Route planner listening on http://{addr}");
    info!("  GET  /health                    - Health check");
    info!("  POST /api/routes/alternatives   - Route with alternatives");
    info!("  POST /api/routes/multi          - Route through waypoints");
    info!("  POST /api/waypoints/optimize    - Reorder waypoints");
    info!("  GET  /api/trips                 - Trip plans");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}
