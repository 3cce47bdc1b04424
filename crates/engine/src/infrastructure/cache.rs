//! Layout cache.
//!
//! Holds recently loaded container sets keyed by owner so switching the
//! selection back and forth does not hit storage every time. Entries expire
//! after the configured TTL but are only removed by `cleanup_expired()` or
//! an explicit `remove()` (instance cleanup).

use std::collections::HashMap;
use std::time::{Duration, Instant};

use quickslot_domain::{ContainerSet, OwnerId};
use tokio::sync::RwLock;

pub struct LayoutCache {
    entries: RwLock<HashMap<OwnerId, CachedLayout>>,
    ttl: Duration,
}

struct CachedLayout {
    set: ContainerSet,
    inserted_at: Instant,
}

impl LayoutCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Insert a layout, replacing any existing entry and resetting the TTL.
    pub async fn insert(&self, owner: OwnerId, set: ContainerSet) {
        let entry = CachedLayout {
            set,
            inserted_at: Instant::now(),
        };
        self.entries.write().await.insert(owner, entry);
    }

    /// Insert a layout with an explicit timestamp (tests only).
    #[cfg(test)]
    pub async fn insert_at(&self, owner: OwnerId, set: ContainerSet, inserted_at: Instant) {
        let entry = CachedLayout { set, inserted_at };
        self.entries.write().await.insert(owner, entry);
    }

    /// Get a layout if it exists and hasn't expired.
    pub async fn get(&self, owner: &OwnerId) -> Option<ContainerSet> {
        let guard = self.entries.read().await;
        guard
            .get(owner)
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.set.clone())
    }

    /// Remove and return a layout if it exists (regardless of expiration).
    pub async fn remove(&self, owner: &OwnerId) -> Option<ContainerSet> {
        self.entries.write().await.remove(owner).map(|e| e.set)
    }

    pub async fn contains(&self, owner: &OwnerId) -> bool {
        let guard = self.entries.read().await;
        guard
            .get(owner)
            .is_some_and(|entry| entry.inserted_at.elapsed() < self.ttl)
    }

    /// Remove all expired entries and return how many were removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut guard = self.entries.write().await;
        let before_count = guard.len();
        guard.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        before_count - guard.len()
    }

    /// Entry count, including expired entries not yet cleaned.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
