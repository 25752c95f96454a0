//! Trip planner configuration.

use chrono::{Duration, NaiveTime};

use crate::domain::TripItemType;

/// Parameters for travel-time estimates and scheduling.
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Assumed average travel speed between stops (km/h).
    pub average_speed_kmh: f64,

    /// Local time each itinerary day starts.
    pub day_start: NaiveTime,

    /// Default dwell at an attraction (minutes).
    pub attraction_minutes: i64,

    /// Default dwell at a restaurant (minutes).
    pub restaurant_minutes: i64,

    /// Default dwell when shopping (minutes).
    pub shopping_minutes: i64,

    /// Default dwell at a rest stop (minutes).
    pub rest_minutes: i64,

    /// Default dwell at accommodation, i.e. overnight (minutes).
    pub accommodation_minutes: i64,

    /// Dwell at the start and destination items (minutes).
    pub endpoint_minutes: i64,

    /// Default dwell for every other item type (minutes).
    pub default_minutes: i64,
}

impl PlannerConfig {
    /// Set the assumed travel speed.
    pub fn with_average_speed_kmh(mut self, kmh: f64) -> Self {
        self.average_speed_kmh = kmh;
        self
    }

    /// Set the start of each itinerary day.
    pub fn with_day_start(mut self, day_start: NaiveTime) -> Self {
        self.day_start = day_start;
        self
    }

    /// Default dwell for an item type.
    pub fn dwell_minutes(&self, item_type: TripItemType) -> i64 {
        match item_type {
            TripItemType::Attraction => self.attraction_minutes,
            TripItemType::Restaurant => self.restaurant_minutes,
            TripItemType::Shopping => self.shopping_minutes,
            TripItemType::Rest => self.rest_minutes,
            TripItemType::Accommodation => self.accommodation_minutes,
            TripItemType::Start | TripItemType::Destination => self.endpoint_minutes,
            TripItemType::Waypoint | TripItemType::Custom => self.default_minutes,
        }
    }

    /// Time to cover `meters` at the average speed, to the nearest second.
    pub fn travel_time(&self, meters: f64) -> Duration {
        if self.average_speed_kmh <= 0.0 || !meters.is_finite() {
            return Duration::zero();
        }
        let meters_per_second = self.average_speed_kmh * 1000.0 / 3600.0;
        Duration::seconds((meters.max(0.0) / meters_per_second).round() as i64)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: 40.0,
            day_start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            attraction_minutes: 90,
            restaurant_minutes: 60,
            shopping_minutes: 60,
            rest_minutes: 30,
            accommodation_minutes: 720,
            endpoint_minutes: 0,
            default_minutes: 30,
        }
    }
}
