//! Data transfer objects for web requests and responses.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    AlternativeRoute, GeoPoint, Place, Route, RoutePriority, RouteResult, TripItem, TripItemType,
    TripPlan,
};
use crate::routing::RouteOptions;
use crate::trip::{
    DailyItinerary, ItineraryDay, NewTripItem, OptimizationType, TripItemUpdate, TripPlanUpdate,
};

/// Request for a route between two points.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,

    /// Cost model (defaults to BALANCED)
    #[serde(default)]
    pub priority: RoutePriority,
}

/// Request for a route through waypoints.
#[derive(Debug, Deserialize)]
pub struct MultiWaypointRequest {
    pub origin: GeoPoint,

    #[serde(default)]
    pub waypoints: Vec<GeoPoint>,

    pub destination: GeoPoint,

    #[serde(default)]
    pub options: RouteOptions,
}

/// Request to reorder waypoints.
#[derive(Debug, Deserialize)]
pub struct OptimizeWaypointsRequest {
    pub origin: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
    pub destination: GeoPoint,
}

/// A route in a response.
#[derive(Debug, Serialize)]
pub struct RouteView {
    pub id: String,

    /// Node ids from origin to destination
    pub nodes: Vec<String>,

    /// Segment ids in travel order
    pub segments: Vec<String>,

    /// Geometry to draw
    pub path: Vec<GeoPoint>,

    /// Total length (meters)
    pub distance_m: f64,

    /// Total travel time (seconds)
    pub estimated_time_s: f64,
}

impl RouteView {
    /// Convert from a domain route.
    pub fn from_route(route: &Route) -> Self {
        Self {
            id: route.id().to_string(),
            nodes: route.nodes().iter().map(|n| n.to_string()).collect(),
            segments: route.segments().iter().map(|s| s.id.to_string()).collect(),
            path: route.path().to_vec(),
            distance_m: route.distance(),
            estimated_time_s: route.estimated_time(),
        }
    }
}

/// A named, traffic-annotated route.
#[derive(Debug, Serialize)]
pub struct AlternativeView {
    /// Display name, e.g. "대체 경로 (빠른)"
    pub name: String,
    pub priority: RoutePriority,

    /// Mean congestion over open segments (0 = clear)
    pub traffic_level: f64,
    pub route: RouteView,
}

impl AlternativeView {
    /// Convert from a domain alternative.
    pub fn from_alternative(alt: &AlternativeRoute) -> Self {
        Self {
            name: alt.name.clone(),
            priority: alt.priority,
            traffic_level: alt.traffic_level,
            route: RouteView::from_route(&alt.route),
        }
    }
}

/// Response with a main route and its alternatives.
#[derive(Debug, Serialize)]
pub struct RouteResultResponse {
    pub main_route: AlternativeView,
    pub alternatives: Vec<AlternativeView>,
}

impl RouteResultResponse {
    /// Convert from a domain result.
    pub fn from_result(result: &RouteResult) -> Self {
        Self {
            main_route: AlternativeView::from_alternative(&result.main_route),
            alternatives: result
                .alternatives
                .iter()
                .map(AlternativeView::from_alternative)
                .collect(),
        }
    }
}

/// Response for a multi-waypoint route.
#[derive(Debug, Serialize)]
pub struct MultiWaypointResponse {
    /// One route per leg, in travel order
    pub legs: Vec<RouteView>,

    /// All legs joined into one route
    pub merged: RouteView,
}

/// Response for waypoint reordering.
#[derive(Debug, Serialize)]
pub struct OptimizeWaypointsResponse {
    /// Waypoints in visiting order
    pub waypoints: Vec<GeoPoint>,

    /// Visiting order as positions into the request's waypoints
    pub order: Vec<usize>,
}

/// Request to create a trip plan.
#[derive(Debug, Deserialize)]
pub struct CreateTripRequest {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Request to change a trip plan's header.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTripRequest {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl UpdateTripRequest {
    pub fn into_update(self) -> TripPlanUpdate {
        TripPlanUpdate {
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Request to add an item to a trip.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub item_type: TripItemType,
    pub place: Place,

    /// Dwell time (minutes); the type default when absent
    pub duration: Option<i64>,
    pub notes: Option<String>,

    /// Where to insert; appended when absent
    pub position: Option<usize>,
}

impl AddItemRequest {
    pub fn into_new_item(self) -> NewTripItem {
        NewTripItem {
            item_type: self.item_type,
            place: self.place,
            duration: self.duration,
            notes: self.notes,
            position: self.position,
        }
    }
}

/// Request to edit a trip item.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub item_type: Option<TripItemType>,
    pub place: Option<Place>,
    pub duration: Option<i64>,
    pub notes: Option<String>,
    pub completed: Option<bool>,
}

impl UpdateItemRequest {
    pub fn into_update(self) -> TripItemUpdate {
        TripItemUpdate {
            item_type: self.item_type,
            place: self.place,
            duration: self.duration,
            notes: self.notes,
            completed: self.completed,
        }
    }
}

/// Request to mark an item done or not done.
#[derive(Debug, Deserialize)]
pub struct CompleteItemRequest {
    pub completed: bool,
}

/// Request to reorder a trip's items.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    /// Every item id of the plan, in the new order
    pub item_ids: Vec<u64>,
}

/// Request to optimise a trip's stop order.
#[derive(Debug, Default, Deserialize)]
pub struct OptimizeTripRequest {
    #[serde(default)]
    pub optimization_type: OptimizationType,
}

/// Request to route a trip over the road network.
#[derive(Debug, Default, Deserialize)]
pub struct TripRouteRequest {
    #[serde(default)]
    pub priority: RoutePriority,
}

/// A trip item in a response.
#[derive(Debug, Serialize)]
pub struct TripItemView {
    pub id: u64,
    pub item_type: TripItemType,
    pub place: Place,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,

    /// Explicit dwell time (minutes)
    pub duration: Option<i64>,
    pub notes: Option<String>,
    pub completed: bool,
}

impl TripItemView {
    /// Convert from a domain item.
    pub fn from_item(item: &TripItem) -> Self {
        Self {
            id: item.id,
            item_type: item.item_type,
            place: item.place.clone(),
            start_time: item.start_time,
            end_time: item.end_time,
            duration: item.duration,
            notes: item.notes.clone(),
            completed: item.completed,
        }
    }
}

/// A trip plan in a response.
#[derive(Debug, Serialize)]
pub struct TripPlanView {
    pub id: u64,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub items: Vec<TripItemView>,

    /// Great-circle distance over all legs (meters)
    pub estimated_total_distance_m: f64,

    /// Travel plus dwell (minutes)
    pub estimated_total_minutes: i64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl TripPlanView {
    /// Convert from a domain plan.
    pub fn from_plan(plan: &TripPlan) -> Self {
        Self {
            id: plan.id,
            name: plan.name.clone(),
            start_date: plan.start_date,
            end_date: plan.end_date,
            items: plan.items.iter().map(TripItemView::from_item).collect(),
            estimated_total_distance_m: plan.estimated_total_distance,
            estimated_total_minutes: plan.estimated_total_time.num_minutes(),
            created: plan.created,
            updated: plan.updated,
        }
    }
}

/// Response listing trip plans.
#[derive(Debug, Serialize)]
pub struct TripListResponse {
    pub trips: Vec<TripPlanView>,
}

/// One day of an itinerary.
#[derive(Debug, Serialize)]
pub struct ItineraryDayView {
    pub date: NaiveDate,
    pub items: Vec<TripItemView>,
    pub total_minutes: i64,
}

impl ItineraryDayView {
    /// Convert from a domain day.
    pub fn from_day(day: &ItineraryDay) -> Self {
        Self {
            date: day.date,
            items: day.items.iter().map(TripItemView::from_item).collect(),
            total_minutes: day.total_minutes,
        }
    }
}

/// Response with a trip's daily itinerary.
#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    pub plan_id: u64,
    pub minutes_per_day: i64,
    pub days: Vec<ItineraryDayView>,
}

impl ItineraryResponse {
    /// Convert from a domain itinerary.
    pub fn from_itinerary(itinerary: &DailyItinerary) -> Self {
        Self {
            plan_id: itinerary.plan_id,
            minutes_per_day: itinerary.minutes_per_day,
            days: itinerary.days.iter().map(ItineraryDayView::from_day).collect(),
        }
    }
}

/// Response for a trip routed over the road network.
#[derive(Debug, Serialize)]
pub struct TripRouteResponse {
    pub plan_id: u64,
    pub legs: Vec<RouteView>,
}

/// Response for a traffic refresh.
#[derive(Debug, Serialize)]
pub struct TrafficRefreshResponse {
    /// Segments with traffic data after the refresh
    pub segments: usize,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
