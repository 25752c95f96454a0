//! Trip itinerary planner.
//!
//! Owns the CRUD surface over trip plans and the operations that turn a
//! list of places into an ordered, timed, day-by-day itinerary. Every
//! mutation reads the whole plan, edits a copy, and writes it back with a
//! fresh `updated` stamp. Invalid input leaves the stored plan untouched.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{GeoPoint, Place, Route, TripItem, TripItemType, TripPlan};
use crate::network::{RoadNetwork, TrafficProvider};
use crate::routing::{MultiWaypointRouter, RouteOptions, optimize_waypoint_order};

use super::config::PlannerConfig;
use super::error::PlannerError;
use super::itinerary::{self, DailyItinerary};
use super::repository::TripRepository;

/// Plans shorter than this cannot be scheduled.
const MIN_SCHEDULED_ITEMS: usize = 2;

/// What waypoint reordering should minimise.
///
/// Travel time is estimated from distance at a constant speed, so both
/// currently produce the same order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OptimizationType {
    #[default]
    Distance,
    Time,
}

/// Changes to a plan's header. `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct TripPlanUpdate {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// An item to add to a plan.
#[derive(Debug, Clone)]
pub struct NewTripItem {
    pub item_type: TripItemType,
    pub place: Place,
    /// Explicit dwell in minutes
    pub duration: Option<i64>,
    pub notes: Option<String>,
    /// Insert position; appended when `None` or past the end
    pub position: Option<usize>,
}

impl NewTripItem {
    /// An item of `item_type` at `place`, appended to the plan.
    pub fn new(item_type: TripItemType, place: Place) -> Self {
        Self {
            item_type,
            place,
            duration: None,
            notes: None,
            position: None,
        }
    }

    /// Set an explicit dwell time in minutes.
    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration = Some(minutes);
        self
    }

    /// Insert at `position` instead of appending.
    pub fn at_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

/// Changes to an existing item. `None` fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct TripItemUpdate {
    pub item_type: Option<TripItemType>,
    pub place: Option<Place>,
    pub duration: Option<i64>,
    pub notes: Option<String>,
    pub completed: Option<bool>,
}

/// Builds and schedules trip plans.
pub struct TripItineraryPlanner<R, N, T> {
    repository: Arc<R>,
    router: Arc<MultiWaypointRouter<N, T>>,
    config: PlannerConfig,
}

impl<R, N, T> TripItineraryPlanner<R, N, T>
where
    R: TripRepository,
    N: RoadNetwork,
    T: TrafficProvider,
{
    /// Create a planner over a plan store and a router.
    pub fn new(
        repository: Arc<R>,
        router: Arc<MultiWaypointRouter<N, T>>,
        config: PlannerConfig,
    ) -> Self {
        Self {
            repository,
            router,
            config,
        }
    }

    /// Planner configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Create an empty plan. Returns `None` if `end_date` precedes `start_date`.
    pub async fn create_trip_plan(
        &self,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<TripPlan>, PlannerError> {
        if end_date < start_date {
            return Ok(None);
        }

        let id = self.repository.next_id().await?;
        let plan = TripPlan::new(id, name, start_date, end_date);
        self.repository.put(plan.clone()).await?;

        debug!(plan = id, "trip plan created");
        Ok(Some(plan))
    }

    pub async fn get_trip_plan(&self, id: u64) -> Result<Option<TripPlan>, PlannerError> {
        Ok(self.repository.get(id).await?)
    }

    /// All plans, ordered by id.
    pub async fn list_trip_plans(&self) -> Result<Vec<TripPlan>, PlannerError> {
        Ok(self.repository.list().await?)
    }

    /// Rename a plan or move its dates. Returns `None` for an unknown plan or
    /// a date range that would end before it starts.
    pub async fn update_trip_plan(
        &self,
        id: u64,
        update: TripPlanUpdate,
    ) -> Result<Option<TripPlan>, PlannerError> {
        self.edit_plan(id, |plan| {
            let start_date = update.start_date.unwrap_or(plan.start_date);
            let end_date = update.end_date.unwrap_or(plan.end_date);
            if end_date < start_date {
                return None;
            }
            if let Some(name) = update.name {
                plan.name = name;
            }
            plan.start_date = start_date;
            plan.end_date = end_date;
            Some(())
        })
        .await
    }

    /// Delete a plan. Returns false if it did not exist.
    pub async fn delete_trip_plan(&self, id: u64) -> Result<bool, PlannerError> {
        let deleted = self.repository.delete(id).await?;
        if deleted {
            debug!(plan = id, "trip plan deleted");
        }
        Ok(deleted)
    }

    /// Add an item to a plan. Returns `None` for an unknown plan.
    pub async fn add_trip_item(
        &self,
        plan_id: u64,
        new: NewTripItem,
    ) -> Result<Option<TripItem>, PlannerError> {
        if self.repository.get(plan_id).await?.is_none() {
            return Ok(None);
        }
        let item_id = self.repository.next_id().await?;

        self.modify(plan_id, move |plan| {
            let mut item = TripItem::new(item_id, new.item_type, new.place);
            item.duration = new.duration;
            item.notes = new.notes;

            let position = new.position.unwrap_or(plan.items.len()).min(plan.items.len());
            plan.items.insert(position, item.clone());
            Some(item)
        })
        .await
        .map(|edited| edited.map(|(_, item)| item))
    }

    /// Edit an item. Returns `None` if the plan or item does not exist.
    pub async fn update_trip_item(
        &self,
        plan_id: u64,
        item_id: u64,
        update: TripItemUpdate,
    ) -> Result<Option<TripItem>, PlannerError> {
        self.modify(plan_id, |plan| {
            let item = plan.items.iter_mut().find(|i| i.id == item_id)?;
            if let Some(item_type) = update.item_type {
                item.item_type = item_type;
            }
            if let Some(place) = update.place {
                item.place = place;
            }
            if let Some(duration) = update.duration {
                item.duration = Some(duration);
            }
            if let Some(notes) = update.notes {
                item.notes = Some(notes);
            }
            if let Some(completed) = update.completed {
                item.completed = completed;
            }
            Some(item.clone())
        })
        .await
        .map(|edited| edited.map(|(_, item)| item))
    }

    /// Remove an item. Returns false if the plan or item does not exist.
    pub async fn remove_trip_item(&self, plan_id: u64, item_id: u64) -> Result<bool, PlannerError> {
        let removed = self
            .modify(plan_id, |plan| {
                let position = plan.position_of(item_id)?;
                plan.items.remove(position);
                Some(())
            })
            .await?;
        Ok(removed.is_some())
    }

    /// Put a plan's items into the order given by `item_ids`.
    ///
    /// `item_ids` must be a permutation of the plan's item ids; anything else
    /// (missing, extra or repeated ids) is rejected and returns false.
    pub async fn reorder_trip_items(
        &self,
        plan_id: u64,
        item_ids: &[u64],
    ) -> Result<bool, PlannerError> {
        let reordered = self
            .modify(plan_id, |plan| {
                if item_ids.len() != plan.items.len() {
                    return None;
                }
                let unique: HashSet<u64> = item_ids.iter().copied().collect();
                if unique.len() != item_ids.len() {
                    return None;
                }

                let mut items = Vec::with_capacity(item_ids.len());
                for id in item_ids {
                    let position = plan.position_of(*id)?;
                    items.push(plan.items[position].clone());
                }
                plan.items = items;
                Some(())
            })
            .await?;

        if reordered.is_none() {
            debug!(
                plan = plan_id,
                "reorder rejected: ids are not a permutation of the plan's items"
            );
        }
        Ok(reordered.is_some())
    }

    /// Mark an item done or not done.
    pub async fn set_item_completed(
        &self,
        plan_id: u64,
        item_id: u64,
        completed: bool,
    ) -> Result<bool, PlannerError> {
        let update = TripItemUpdate {
            completed: Some(completed),
            ..TripItemUpdate::default()
        };
        Ok(self.update_trip_item(plan_id, item_id, update).await?.is_some())
    }

    /// Reorder the items between the first and last with the
    /// nearest-neighbour heuristic.
    ///
    /// The first and last items stay where they are. Needs at least three
    /// items, all with locations; otherwise returns `None` and nothing is
    /// written. The result is a good order, not necessarily the best one.
    pub async fn optimize_trip_plan(
        &self,
        id: u64,
        optimization: OptimizationType,
    ) -> Result<Option<TripPlan>, PlannerError> {
        self.edit_plan(id, |plan| {
            if plan.items.len() < 3 {
                debug!(plan = id, items = plan.items.len(), "too few items to optimize");
                return None;
            }
            let locations: Option<Vec<GeoPoint>> =
                plan.items.iter().map(TripItem::location).collect();
            let Some(locations) = locations else {
                debug!(plan = id, "cannot optimize: item without location");
                return None;
            };

            let last = plan.items.len() - 1;
            let order = optimize_waypoint_order(locations[0], &locations[1..last]);

            let mut items = Vec::with_capacity(plan.items.len());
            items.push(plan.items[0].clone());
            items.extend(order.into_iter().map(|i| plan.items[i + 1].clone()));
            items.push(plan.items[last].clone());
            plan.items = items;

            debug!(plan = id, ?optimization, "trip plan optimized");
            Some(())
        })
        .await
    }

    /// Recompute the plan's total distance and time from its current order.
    pub async fn calculate_trip_times_and_distances(
        &self,
        id: u64,
    ) -> Result<Option<TripPlan>, PlannerError> {
        let config = &self.config;
        self.edit_plan(id, |plan| {
            let estimate = itinerary::estimate(&plan.items, config);
            plan.estimated_total_distance = estimate.distance;
            plan.estimated_total_time = estimate.total();

            debug!(
                plan = id,
                distance_m = estimate.distance,
                travel_min = estimate.travel.num_minutes(),
                dwell_min = estimate.dwell.num_minutes(),
                "trip estimates updated"
            );
            Some(())
        })
        .await
    }

    /// Partition the plan's items into days. Does not modify the plan.
    ///
    /// Returns `None` if the plan is unknown or has fewer than two items.
    pub async fn generate_daily_itinerary(
        &self,
        id: u64,
    ) -> Result<Option<DailyItinerary>, PlannerError> {
        let Some(plan) = self.repository.get(id).await? else {
            return Ok(None);
        };
        if plan.items.len() < MIN_SCHEDULED_ITEMS {
            return Ok(None);
        }
        Ok(Some(DailyItinerary::build(&plan, &self.config)))
    }

    /// Build the daily itinerary and write start and end times into the
    /// plan's items.
    ///
    /// Plans with fewer than two items are left untouched.
    pub async fn assign_times_to_itinerary(
        &self,
        id: u64,
    ) -> Result<Option<TripPlan>, PlannerError> {
        let config = &self.config;
        self.edit_plan(id, |plan| {
            if plan.items.len() < MIN_SCHEDULED_ITEMS {
                return None;
            }
            let itinerary = DailyItinerary::build(plan, config);
            let times = itinerary.schedule(config);
            for item in &mut plan.items {
                if let Some(&(start, end)) = times.get(&item.id) {
                    item.start_time = Some(start);
                    item.end_time = Some(end);
                }
            }

            debug!(plan = id, days = itinerary.days.len(), "itinerary times assigned");
            Some(())
        })
        .await
    }

    /// Refresh traffic data and recompute estimates.
    ///
    /// A traffic refresh failure is logged and the stored plan is returned
    /// unchanged.
    pub async fn update_trip_with_traffic_info(
        &self,
        id: u64,
    ) -> Result<Option<TripPlan>, PlannerError> {
        let Some(plan) = self.repository.get(id).await? else {
            return Ok(None);
        };

        if let Err(err) = self.router.engine().traffic().update_traffic_data().await {
            warn!(plan = id, error = %err, "traffic refresh failed, keeping previous estimates");
            return Ok(Some(plan));
        }

        self.calculate_trip_times_and_distances(id).await
    }

    /// Road route through the plan's items in their current order, one
    /// route per leg.
    ///
    /// Returns `None` if the plan is unknown, has fewer than two items, or
    /// has an item without a location. Routing failures are errors.
    pub async fn route_trip_plan(
        &self,
        id: u64,
        options: &RouteOptions,
    ) -> Result<Option<Vec<Route>>, PlannerError> {
        let Some(plan) = self.repository.get(id).await? else {
            return Ok(None);
        };
        let locations: Option<Vec<GeoPoint>> = plan.items.iter().map(TripItem::location).collect();
        let Some(locations) = locations else {
            return Ok(None);
        };
        let [origin, waypoints @ .., destination] = locations.as_slice() else {
            return Ok(None);
        };

        let legs = self
            .router
            .calculate_multi_waypoint_route(*origin, waypoints, *destination, options)
            .await?;
        Ok(Some(legs))
    }

    /// [`Self::modify`] for edits whose result is the plan itself.
    async fn edit_plan<F>(&self, id: u64, edit: F) -> Result<Option<TripPlan>, PlannerError>
    where
        F: FnOnce(&mut TripPlan) -> Option<()> + Send,
    {
        Ok(self.modify(id, edit).await?.map(|(plan, ())| plan))
    }

    /// Load a plan, apply `edit` to it and store the result.
    ///
    /// Nothing is written when the plan is missing or `edit` returns `None`.
    /// Returns the plan as stored together with the edit's output.
    async fn modify<F, O>(&self, id: u64, edit: F) -> Result<Option<(TripPlan, O)>, PlannerError>
    where
        F: FnOnce(&mut TripPlan) -> Option<O> + Send,
        O: Send,
    {
        let Some(mut plan) = self.repository.get(id).await? else {
            return Ok(None);
        };
        let Some(output) = edit(&mut plan) else {
            return Ok(None);
        };

        plan.touch();
        self.repository.put(plan.clone()).await?;
        Ok(Some((plan, output)))
    }
}
