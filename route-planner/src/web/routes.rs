//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tracing::{debug, error};

use crate::domain::GeoPoint;
use crate::network::{TrafficError, TrafficProvider};
use crate::routing::{RouteOptions, RoutingError, optimize_waypoint_order};
use crate::trip::PlannerError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/routes/alternatives", post(route_alternatives))
        .route("/api/routes/multi", post(multi_waypoint_route))
        .route("/api/waypoints/optimize", post(optimize_waypoints))
        .route("/api/traffic/refresh", post(refresh_traffic))
        .route("/api/trips", get(list_trips).post(create_trip))
        .route(
            "/api/trips/:id",
            get(get_trip).put(update_trip).delete(delete_trip),
        )
        .route("/api/trips/:id/items", post(add_item))
        .route(
            "/api/trips/:id/items/:item_id",
            put(update_item).delete(remove_item),
        )
        .route("/api/trips/:id/items/:item_id/completed", put(set_completed))
        .route("/api/trips/:id/order", put(reorder_items))
        .route("/api/trips/:id/optimize", post(optimize_trip))
        .route("/api/trips/:id/calculate", post(calculate_trip))
        .route("/api/trips/:id/itinerary", get(itinerary))
        .route("/api/trips/:id/schedule", post(schedule_trip))
        .route("/api/trips/:id/traffic", post(update_trip_traffic))
        .route("/api/trips/:id/route", post(route_trip))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

fn check_points(points: &[GeoPoint]) -> Result<(), AppError> {
    match points.iter().find(|p| !p.is_valid()) {
        Some(p) => Err(AppError::BadRequest {
            message: format!("invalid coordinate {p}"),
        }),
        None => Ok(()),
    }
}

fn trip_not_found(id: u64) -> AppError {
    AppError::NotFound {
        message: format!("trip {id} not found"),
    }
}

fn item_not_found(id: u64, item_id: u64) -> AppError {
    AppError::NotFound {
        message: format!("item {item_id} not found in trip {id}"),
    }
}

/// Route between two points plus up to two alternatives.
async fn route_alternatives(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<RouteResultResponse>, AppError> {
    check_points(&[req.origin, req.destination])?;

    let options = RouteOptions::new(req.priority);
    let base = state
        .router
        .calculate_route(req.origin, req.destination, &options)
        .await?;
    let result = state
        .alternatives
        .calculate_alternatives(&base, req.priority)
        .await?;

    Ok(Json(RouteResultResponse::from_result(&result)))
}

/// Route through waypoints, returning each leg and the merged route.
async fn multi_waypoint_route(
    State(state): State<AppState>,
    Json(req): Json<MultiWaypointRequest>,
) -> Result<Json<MultiWaypointResponse>, AppError> {
    check_points(&[req.origin, req.destination])?;
    check_points(&req.waypoints)?;

    let legs = state
        .router
        .calculate_multi_waypoint_route(req.origin, &req.waypoints, req.destination, &req.options)
        .await?;
    let merged = state.router.merge_routes(&legs)?;

    Ok(Json(MultiWaypointResponse {
        legs: legs.iter().map(RouteView::from_route).collect(),
        merged: RouteView::from_route(&merged),
    }))
}

/// Reorder waypoints with the nearest-neighbour heuristic.
async fn optimize_waypoints(
    Json(req): Json<OptimizeWaypointsRequest>,
) -> Result<Json<OptimizeWaypointsResponse>, AppError> {
    check_points(&[req.origin, req.destination])?;
    check_points(&req.waypoints)?;

    let order = optimize_waypoint_order(req.origin, &req.waypoints);
    let waypoints = order.iter().map(|&i| req.waypoints[i]).collect();

    Ok(Json(OptimizeWaypointsResponse { waypoints, order }))
}

/// Reload traffic data.
async fn refresh_traffic(
    State(state): State<AppState>,
) -> Result<Json<TrafficRefreshResponse>, AppError> {
    state.traffic.update_traffic_data().await?;
    Ok(Json(TrafficRefreshResponse {
        segments: state.traffic.len().await,
    }))
}

async fn list_trips(State(state): State<AppState>) -> Result<Json<TripListResponse>, AppError> {
    let trips = state.planner.list_trip_plans().await?;
    Ok(Json(TripListResponse {
        trips: trips.iter().map(TripPlanView::from_plan).collect(),
    }))
}

async fn create_trip(
    State(state): State<AppState>,
    Json(req): Json<CreateTripRequest>,
) -> Result<(StatusCode, Json<TripPlanView>), AppError> {
    let plan = state
        .planner
        .create_trip_plan(req.name, req.start_date, req.end_date)
        .await?
        .ok_or_else(|| AppError::BadRequest {
            message: "end_date is before start_date".to_string(),
        })?;
    Ok((StatusCode::CREATED, Json(TripPlanView::from_plan(&plan))))
}

async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TripPlanView>, AppError> {
    let plan = state
        .planner
        .get_trip_plan(id)
        .await?
        .ok_or_else(|| trip_not_found(id))?;
    Ok(Json(TripPlanView::from_plan(&plan)))
}

async fn update_trip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<UpdateTripRequest>,
) -> Result<Json<TripPlanView>, AppError> {
    if state.planner.get_trip_plan(id).await?.is_none() {
        return Err(trip_not_found(id));
    }
    let plan = state
        .planner
        .update_trip_plan(id, req.into_update())
        .await?
        .ok_or_else(|| AppError::BadRequest {
            message: "end_date is before start_date".to_string(),
        })?;
    Ok(Json(TripPlanView::from_plan(&plan)))
}

async fn delete_trip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    if state.planner.delete_trip_plan(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(trip_not_found(id))
    }
}

async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<TripItemView>), AppError> {
    if let Some(location) = req.place.location {
        check_points(&[location])?;
    }
    let item = state
        .planner
        .add_trip_item(id, req.into_new_item())
        .await?
        .ok_or_else(|| trip_not_found(id))?;
    Ok((StatusCode::CREATED, Json(TripItemView::from_item(&item))))
}

async fn update_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(u64, u64)>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<TripItemView>, AppError> {
    if let Some(location) = req.place.as_ref().and_then(|p| p.location) {
        check_points(&[location])?;
    }
    let item = state
        .planner
        .update_trip_item(id, item_id, req.into_update())
        .await?
        .ok_or_else(|| item_not_found(id, item_id))?;
    Ok(Json(TripItemView::from_item(&item)))
}

async fn remove_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(u64, u64)>,
) -> Result<StatusCode, AppError> {
    if state.planner.remove_trip_item(id, item_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(item_not_found(id, item_id))
    }
}

async fn set_completed(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(u64, u64)>,
    Json(req): Json<CompleteItemRequest>,
) -> Result<StatusCode, AppError> {
    if state
        .planner
        .set_item_completed(id, item_id, req.completed)
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(item_not_found(id, item_id))
    }
}

async fn reorder_items(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<TripPlanView>, AppError> {
    if !state.planner.reorder_trip_items(id, &req.item_ids).await? {
        return match state.planner.get_trip_plan(id).await? {
            Some(_) => Err(AppError::BadRequest {
                message: "item_ids must list every item of the trip exactly once".to_string(),
            }),
            None => Err(trip_not_found(id)),
        };
    }
    get_trip(State(state), Path(id)).await
}

async fn optimize_trip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<OptimizeTripRequest>,
) -> Result<Json<TripPlanView>, AppError> {
    match state
        .planner
        .optimize_trip_plan(id, req.optimization_type)
        .await?
    {
        Some(plan) => Ok(Json(TripPlanView::from_plan(&plan))),
        None => match state.planner.get_trip_plan(id).await? {
            Some(_) => Err(AppError::BadRequest {
                message: "optimisation needs at least three items, all with locations".to_string(),
            }),
            None => Err(trip_not_found(id)),
        },
    }
}

async fn calculate_trip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TripPlanView>, AppError> {
    let plan = state
        .planner
        .calculate_trip_times_and_distances(id)
        .await?
        .ok_or_else(|| trip_not_found(id))?;
    Ok(Json(TripPlanView::from_plan(&plan)))
}

async fn itinerary(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ItineraryResponse>, AppError> {
    match state.planner.generate_daily_itinerary(id).await? {
        Some(itinerary) => Ok(Json(ItineraryResponse::from_itinerary(&itinerary))),
        None => Err(unschedulable(&state, id).await?),
    }
}

async fn schedule_trip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TripPlanView>, AppError> {
    match state.planner.assign_times_to_itinerary(id).await? {
        Some(plan) => Ok(Json(TripPlanView::from_plan(&plan))),
        None => Err(unschedulable(&state, id).await?),
    }
}

async fn unschedulable(state: &AppState, id: u64) -> Result<AppError, AppError> {
    Ok(match state.planner.get_trip_plan(id).await? {
        Some(_) => AppError::BadRequest {
            message: "scheduling needs at least two items".to_string(),
        },
        None => trip_not_found(id),
    })
}

async fn update_trip_traffic(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TripPlanView>, AppError> {
    let plan = state
        .planner
        .update_trip_with_traffic_info(id)
        .await?
        .ok_or_else(|| trip_not_found(id))?;
    Ok(Json(TripPlanView::from_plan(&plan)))
}

async fn route_trip(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<TripRouteRequest>,
) -> Result<Json<TripRouteResponse>, AppError> {
    let options = RouteOptions::new(req.priority);
    match state.planner.route_trip_plan(id, &options).await? {
        Some(legs) => Ok(Json(TripRouteResponse {
            plan_id: id,
            legs: legs.iter().map(RouteView::from_route).collect(),
        })),
        None => match state.planner.get_trip_plan(id).await? {
            Some(_) => Err(AppError::BadRequest {
                message: "routing needs at least two items, all with locations".to_string(),
            }),
            None => Err(trip_not_found(id)),
        },
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    BadGateway { message: String },
    Internal { message: String },
}

impl From<RoutingError> for AppError {
    fn from(e: RoutingError) -> Self {
        let message = e.to_string();
        match e {
            RoutingError::NoNearbyNode { .. } => AppError::BadRequest { message },
            RoutingError::NoPath { .. } => AppError::NotFound { message },
            RoutingError::Network(_) | RoutingError::Traffic(_) => AppError::BadGateway { message },
            RoutingError::Domain(_)
            | RoutingError::EmptyNetwork
            | RoutingError::UnresolvedNodes { .. }
            | RoutingError::BrokenChain { .. } => AppError::Internal { message },
        }
    }
}

impl From<PlannerError> for AppError {
    fn from(e: PlannerError) -> Self {
        match e {
            PlannerError::Routing(e) => e.into(),
            PlannerError::Repository(e) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<TrafficError> for AppError {
    fn from(e: TrafficError) -> Self {
        AppError::BadGateway {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            debug!(%status, %message, "request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::{NodeId, Place, RoutePriority, TripItemType};
    use crate::network::{
        CacheConfig, CachedRoadNetwork, InMemoryRoadNetwork, InMemoryTrafficProvider, RoadNetwork,
    };
    use crate::routing::RoutingConfig;
    use crate::routing::fixtures::{corridor, endpoints};
    use crate::trip::{OptimizationType, PlannerConfig};

    fn state() -> AppState {
        let mut net = InMemoryRoadNetwork::new();
        let (s, g) = endpoints(&mut net, 900.0);
        corridor(&mut net, "a", ("s", s), ("g", g), 5, 1000.0, 0.0);
        corridor(&mut net, "b", ("s", s), ("g", g), 5, 1100.0, 150.0);
        AppState::new(
            CachedRoadNetwork::new(net, &CacheConfig::default()),
            InMemoryTrafficProvider::new(),
            RoutingConfig::default(),
            PlannerConfig::default(),
        )
    }

    fn origin() -> GeoPoint {
        GeoPoint::new(37.50, 127.00)
    }

    fn goal() -> GeoPoint {
        crate::geo::destination_point(origin(), 90.0, 900.0)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    async fn new_trip(state: &AppState) -> u64 {
        let (status, Json(plan)) = create_trip(
            State(state.clone()),
            Json(CreateTripRequest {
                name: "Test".into(),
                start_date: date(1),
                end_date: date(1),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        plan.id
    }

    async fn new_item(
        state: &AppState,
        trip: u64,
        item_type: TripItemType,
        point: GeoPoint,
    ) -> u64 {
        let (_, Json(item)) = add_item(
            State(state.clone()),
            Path(trip),
            Json(AddItemRequest {
                item_type,
                place: Place::new("stop", point),
                duration: None,
                notes: None,
                position: None,
            }),
        )
        .await
        .unwrap();
        item.id
    }

    #[tokio::test]
    async fn health_is_ok() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn alternatives_endpoint() {
        let Json(resp) = route_alternatives(
            State(state()),
            Json(RouteRequest {
                origin: origin(),
                destination: goal(),
                priority: RoutePriority::Shortest,
            }),
        )
        .await
        .unwrap();

        assert_eq!(resp.main_route.name, "추천 경로");
        assert_eq!(resp.main_route.route.nodes.first().map(String::as_str), Some("s"));
        assert!(resp.main_route.route.nodes.contains(&"a1".to_string()));
        assert!(!resp.alternatives.is_empty());
        assert!(resp.alternatives[0].route.nodes.contains(&"b1".to_string()));
    }

    #[tokio::test]
    async fn invalid_coordinate_is_bad_request() {
        let err = route_alternatives(
            State(state()),
            Json(RouteRequest {
                origin: GeoPoint::new(123.0, 0.0),
                destination: goal(),
                priority: RoutePriority::Balanced,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn unsnappable_point_is_bad_request() {
        let err = route_alternatives(
            State(state()),
            Json(RouteRequest {
                origin: GeoPoint::new(35.1, 129.0),
                destination: goal(),
                priority: RoutePriority::Balanced,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
    }

    #[tokio::test]
    async fn multi_waypoint_endpoint() {
        let state = state();
        let waypoint = state
            .network
            .inner()
            .get_node_by_id(&NodeId::from("a2"))
            .await
            .unwrap()
            .unwrap();

        let Json(resp) = multi_waypoint_route(
            State(state),
            Json(MultiWaypointRequest {
                origin: origin(),
                waypoints: vec![waypoint],
                destination: goal(),
                options: RouteOptions::default(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(resp.legs.len(), 2);
        assert_eq!(resp.merged.nodes, vec!["s", "a1", "a2", "a3", "a4", "g"]);
        assert!((resp.merged.distance_m - 1000.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn optimize_waypoints_endpoint() {
        let Json(resp) = optimize_waypoints(Json(OptimizeWaypointsRequest {
            origin: GeoPoint::new(0.0, 0.0),
            waypoints: vec![GeoPoint::new(0.0, 2.0), GeoPoint::new(0.0, 1.0)],
            destination: GeoPoint::new(0.0, 3.0),
        }))
        .await
        .unwrap();
        assert_eq!(resp.order, vec![1, 0]);
        assert_eq!(resp.waypoints[0], GeoPoint::new(0.0, 1.0));
    }

    #[tokio::test]
    async fn trip_lifecycle() {
        let state = state();
        let trip = new_trip(&state).await;
        new_item(&state, trip, TripItemType::Start, origin()).await;
        new_item(&state, trip, TripItemType::Attraction, GeoPoint::new(37.52, 127.00)).await;
        new_item(&state, trip, TripItemType::Destination, goal()).await;

        let Json(plan) = calculate_trip(State(state.clone()), Path(trip)).await.unwrap();
        assert!(plan.estimated_total_distance_m > 0.0);
        assert!(plan.estimated_total_minutes >= 90);

        let Json(plan) = schedule_trip(State(state.clone()), Path(trip)).await.unwrap();
        assert!(plan.items.iter().all(|i| i.start_time.is_some()));

        let Json(itinerary) = itinerary(State(state.clone()), Path(trip)).await.unwrap();
        assert_eq!(itinerary.days.len(), 1);

        let Json(plan) = optimize_trip(
            State(state.clone()),
            Path(trip),
            Json(OptimizeTripRequest {
                optimization_type: OptimizationType::Time,
            }),
        )
        .await
        .unwrap();
        assert_eq!(plan.items.len(), 3);

        let Json(routed) = route_trip(
            State(state.clone()),
            Path(trip),
            Json(TripRouteRequest::default()),
        )
        .await
        .unwrap();
        assert_eq!(routed.legs.len(), 2);

        let Json(listing) = list_trips(State(state.clone())).await.unwrap();
        assert_eq!(listing.trips.len(), 1);

        let status = delete_trip(State(state.clone()), Path(trip)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        let err = get_trip(State(state), Path(trip)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn invalid_trip_requests() {
        let state = state();

        let err = create_trip(
            State(state.clone()),
            Json(CreateTripRequest {
                name: "Backwards".into(),
                start_date: date(3),
                end_date: date(1),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));

        let trip = new_trip(&state).await;
        let item = new_item(&state, trip, TripItemType::Start, origin()).await;

        let err = reorder_items(
            State(state.clone()),
            Path(trip),
            Json(ReorderRequest {
                item_ids: vec![item, item],
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));

        let err = optimize_trip(
            State(state.clone()),
            Path(trip),
            Json(OptimizeTripRequest::default()),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));

        let err = schedule_trip(State(state.clone()), Path(trip)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
        let err = itinerary(State(state.clone()), Path(trip)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest { .. }));
        let err = itinerary(State(state.clone()), Path(999)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        let err = remove_item(State(state.clone()), Path((trip, 999))).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));

        let err = update_trip(State(state), Path(999), Json(UpdateTripRequest::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn item_endpoints() {
        let state = state();
        let trip = new_trip(&state).await;
        let item = new_item(&state, trip, TripItemType::Rest, origin()).await;

        let Json(view) = update_item(
            State(state.clone()),
            Path((trip, item)),
            Json(UpdateItemRequest {
                duration: Some(15),
                ..UpdateItemRequest::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(view.duration, Some(15));

        let status = set_completed(
            State(state.clone()),
            Path((trip, item)),
            Json(CompleteItemRequest { completed: true }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let Json(plan) = get_trip(State(state.clone()), Path(trip)).await.unwrap();
        assert!(plan.items[0].completed);

        let status = remove_item(State(state), Path((trip, item))).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn traffic_refresh_without_source() {
        let Json(resp) = refresh_traffic(State(state())).await.unwrap();
        assert_eq!(resp.segments, 0);
    }

    #[test]
    fn error_status_codes() {
        let cases = [
            (
                AppError::from(RoutingError::NoPath {
                    from: NodeId::from("a"),
                    to: NodeId::from("b"),
                }),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(RoutingError::NoNearbyNode {
                    point: GeoPoint::new(0.0, 0.0),
                    max_distance_m: 1.0,
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(TrafficError::Unavailable("x".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::from(RoutingError::EmptyNetwork),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
