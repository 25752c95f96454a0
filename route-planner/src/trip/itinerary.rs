//! Travel estimates and day-by-day itineraries.
//!
//! Everything here is computed from item locations with great-circle
//! distances and a fixed average speed; no road network is consulted.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::domain::{TripItem, TripPlan};
use crate::geo;

use super::config::PlannerConfig;

/// Distance and time totals for a plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TripEstimate {
    /// Sum of great-circle leg distances (meters)
    pub distance: f64,
    /// Time spent travelling between stops
    pub travel: Duration,
    /// Time spent at stops
    pub dwell: Duration,
}

impl TripEstimate {
    /// Travel plus dwell.
    pub fn total(&self) -> Duration {
        self.travel + self.dwell
    }
}

/// One calendar day of an itinerary.
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryDay {
    /// Calendar date
    pub date: NaiveDate,
    /// Items visited that day, in plan order
    pub items: Vec<TripItem>,
    /// Travel into each item plus its dwell (minutes). The first item's
    /// overnight leg from the previous day is not counted.
    pub total_minutes: i64,
}

/// A plan's items partitioned into consecutive days.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyItinerary {
    /// The plan this was built from
    pub plan_id: u64,
    /// Days in date order; only days that received items are listed
    pub days: Vec<ItineraryDay>,
    /// Per-day time budget (minutes)
    pub minutes_per_day: i64,
}

impl DailyItinerary {
    /// Partition `plan`'s items into days.
    ///
    /// The total time needed is spread evenly over the plan's days, then
    /// items are assigned greedily in order: a day closes when the next item
    /// would push it over budget. A day always takes at least one item, so
    /// an item longer than the budget gets a day to itself. Rounding can
    /// leave items beyond `end_date`; they continue on the following days.
    pub fn build(plan: &TripPlan, config: &PlannerConfig) -> Self {
        let costs: Vec<(i64, i64)> = plan
            .items
            .iter()
            .zip(inbound_travel(&plan.items, config))
            .map(|(item, travel)| (ceil_minutes(travel), dwell(item, config).num_minutes()))
            .collect();

        let total: i64 = costs.iter().map(|(travel, dwell)| travel + dwell).sum();
        let day_count = plan.day_count();
        let minutes_per_day = (total + day_count - 1) / day_count;

        let mut days: Vec<ItineraryDay> = Vec::new();
        let mut current = ItineraryDay {
            date: plan.start_date,
            items: Vec::new(),
            total_minutes: 0,
        };

        for (item, (travel, dwell)) in plan.items.iter().zip(costs) {
            let cost = travel + dwell;
            if !current.items.is_empty() && current.total_minutes + cost > minutes_per_day {
                let next_date = current.date.succ_opt().unwrap_or(current.date);
                days.push(std::mem::replace(
                    &mut current,
                    ItineraryDay {
                        date: next_date,
                        items: Vec::new(),
                        total_minutes: 0,
                    },
                ));
            }
            // Each day starts fresh at the first item
            current.total_minutes += if current.items.is_empty() { dwell } else { cost };
            current.items.push(item.clone());
        }

        if !current.items.is_empty() {
            days.push(current);
        }

        Self {
            plan_id: plan.id,
            days,
            minutes_per_day,
        }
    }

    /// Number of items across all days.
    pub fn item_count(&self) -> usize {
        self.days.iter().map(|d| d.items.len()).sum()
    }

    /// Start and end times for every item, keyed by item id.
    ///
    /// Each day starts at the configured day start. Within a day, an item
    /// ends after its dwell and the next item starts after the travel time
    /// between them.
    pub fn schedule(&self, config: &PlannerConfig) -> HashMap<u64, (NaiveDateTime, NaiveDateTime)> {
        let mut times = HashMap::with_capacity(self.item_count());

        for day in &self.days {
            let mut cursor = day.date.and_time(config.day_start);
            for (item, travel) in day.items.iter().zip(inbound_travel(&day.items, config)) {
                let start = cursor + travel;
                let end = start + dwell(item, config);
                times.insert(item.id, (start, end));
                cursor = end;
            }
        }

        times
    }
}

/// Distance and time totals over `items` in order.
pub fn estimate(items: &[TripItem], config: &PlannerConfig) -> TripEstimate {
    let distance: f64 = leg_distances(items).sum();
    let travel = inbound_travel(items, config)
        .into_iter()
        .fold(Duration::zero(), |acc, t| acc + t);
    let dwell = items
        .iter()
        .fold(Duration::zero(), |acc, item| acc + dwell(item, config));

    TripEstimate {
        distance,
        travel,
        dwell,
    }
}

/// Time spent at an item: its explicit duration or the type default.
pub fn dwell(item: &TripItem, config: &PlannerConfig) -> Duration {
    let minutes = item
        .duration
        .unwrap_or_else(|| config.dwell_minutes(item.item_type));
    Duration::minutes(minutes.max(0))
}

/// Distance from each item to the next. A leg touching an item without a
/// location counts as zero.
fn leg_distances(items: &[TripItem]) -> impl Iterator<Item = f64> + '_ {
    items.windows(2).map(|pair| match (pair[0].location(), pair[1].location()) {
        (Some(a), Some(b)) => geo::distance(a, b),
        _ => 0.0,
    })
}

/// Travel time into each item from the one before; zero for the first.
fn inbound_travel(items: &[TripItem], config: &PlannerConfig) -> Vec<Duration> {
    std::iter::once(Duration::zero())
        .chain(leg_distances(items).map(|d| config.travel_time(d)))
        .take(items.len())
        .collect()
}

fn ceil_minutes(duration: Duration) -> i64 {
    (duration.num_seconds() + 59).div_euclid(60)
}
