//! Trip plan storage.
//!
//! The planner reads a whole plan, edits it, and writes it back. There is
//! no optimistic concurrency token: two concurrent edits to the same plan
//! race and the last write wins.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::domain::TripPlan;

use super::error::RepositoryError;

/// Storage for trip plans.
pub trait TripRepository: Send + Sync {
    /// Allocate a fresh id. Ids increase monotonically and are shared by
    /// plans and items.
    fn next_id(&self) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Fetch a plan.
    fn get(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Option<TripPlan>, RepositoryError>> + Send;

    /// Insert or replace a plan.
    fn put(&self, plan: TripPlan) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a plan. Returns true if it existed.
    fn delete(&self, id: u64) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    /// All plans, ordered by id.
    fn list(&self) -> impl Future<Output = Result<Vec<TripPlan>, RepositoryError>> + Send;
}

/// Process-local plan store.
#[derive(Debug)]
pub struct InMemoryTripRepository {
    plans: RwLock<BTreeMap<u64, TripPlan>>,
    next: AtomicU64,
}

impl InMemoryTripRepository {
    /// Create an empty store. The first id handed out is 1.
    pub fn new() -> Self {
        Self {
            plans: RwLock::new(BTreeMap::new()),
            next: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryTripRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TripRepository for InMemoryTripRepository {
    async fn next_id(&self) -> Result<u64, RepositoryError> {
        Ok(self.next.fetch_add(1, Ordering::Relaxed))
    }

    async fn get(&self, id: u64) -> Result<Option<TripPlan>, RepositoryError> {
        Ok(self.plans.read().await.get(&id).cloned())
    }

    async fn put(&self, plan: TripPlan) -> Result<(), RepositoryError> {
        self.plans.write().await.insert(plan.id, plan);
        Ok(())
    }

    async fn delete(&self, id: u64) -> Result<bool, RepositoryError> {
        Ok(self.plans.write().await.remove(&id).is_some())
    }

    async fn list(&self) -> Result<Vec<TripPlan>, RepositoryError> {
        Ok(self.plans.read().await.values().cloned().collect())
    }
}
