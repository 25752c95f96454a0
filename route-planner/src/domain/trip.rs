//! Trip plan types.
//!
//! A `TripPlan` holds an ordered list of `TripItem`s. The order of
//! `items` is the itinerary visit order, not creation order.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// What kind of stop a trip item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripItemType {
    Start,
    Destination,
    Waypoint,
    Attraction,
    Restaurant,
    Accommodation,
    Shopping,
    Rest,
    Custom,
}

/// A named place, optionally geolocated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Place {
    /// Display name
    pub name: String,
    /// Position, if known
    pub location: Option<GeoPoint>,
    /// Postal address
    #[serde(default)]
    pub address: Option<String>,
    /// Free-form attributes supplied by the caller
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Place {
    /// Creates a geolocated place.
    pub fn new(name: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            name: name.into(),
            location: Some(location),
            address: None,
            metadata: HashMap::new(),
        }
    }
}

/// One stop in a trip plan.
#[derive(Debug, Clone, PartialEq)]
pub struct TripItem {
    /// Item identifier, unique within the planner
    pub id: u64,
    /// Kind of stop
    pub item_type: TripItemType,
    /// Where the stop is
    pub place: Place,
    /// Scheduled arrival, once assigned
    pub start_time: Option<NaiveDateTime>,
    /// Scheduled departure, once assigned
    pub end_time: Option<NaiveDateTime>,
    /// Explicit dwell time in minutes; `None` uses the type default
    pub duration: Option<i64>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Whether the traveller has done this stop
    pub completed: bool,
}

impl TripItem {
    /// Creates an unscheduled, uncompleted item.
    pub fn new(id: u64, item_type: TripItemType, place: Place) -> Self {
        Self {
            id,
            item_type,
            place,
            start_time: None,
            end_time: None,
            duration: None,
            notes: None,
            completed: false,
        }
    }

    /// Sets an explicit dwell time in minutes.
    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration = Some(minutes);
        self
    }

    /// The item's location, if known.
    pub fn location(&self) -> Option<GeoPoint> {
        self.place.location
    }
}

/// A multi-day trip: a date range plus an ordered list of stops.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    /// Plan identifier
    pub id: u64,
    /// Display name
    pub name: String,
    /// First day of the trip
    pub start_date: NaiveDate,
    /// Last day of the trip (inclusive)
    pub end_date: NaiveDate,
    /// Stops in visit order
    pub items: Vec<TripItem>,
    /// Sum of great-circle leg distances in meters
    pub estimated_total_distance: f64,
    /// Travel plus dwell time
    pub estimated_total_time: Duration,
    /// When the plan was created
    pub created: DateTime<Utc>,
    /// When the plan was last written
    pub updated: DateTime<Utc>,
}

impl TripPlan {
    /// Creates an empty plan stamped with the current time.
    pub fn new(
        id: u64,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            start_date,
            end_date,
            items: Vec::new(),
            estimated_total_distance: 0.0,
            estimated_total_time: Duration::zero(),
            created: now,
            updated: now,
        }
    }

    /// Number of calendar days covered, counting both ends. Never less than one.
    pub fn day_count(&self) -> i64 {
        (self.end_date - self.start_date).num_days().max(0) + 1
    }

    /// Position of an item within `items`.
    pub fn position_of(&self, item_id: u64) -> Option<usize> {
        self.items.iter().position(|i| i.id == item_id)
    }

    /// Refreshes the `updated` timestamp.
    pub fn touch(&mut self) {
        self.updated = Utc::now().max(self.updated);
    }
}
