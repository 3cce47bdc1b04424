//! In-memory layout store.
//!
//! Keeps records in their serialized JSON form so every load goes through
//! the same decode and migration path as durable storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use quickslot_domain::OwnerId;
use serde_json::Value;
use tokio::sync::RwLock;

use super::record::PersistedLayout;
use crate::infrastructure::ports::{LayoutStore, RepoError};

#[derive(Default)]
pub struct MemoryLayoutStore {
    records: RwLock<HashMap<OwnerId, Value>>,
    saves: AtomicUsize,
}

impl MemoryLayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw stored value, e.g. a record written by an older release.
    pub async fn insert_raw(&self, owner: OwnerId, value: Value) {
        self.records.write().await.insert(owner, value);
    }

    pub async fn raw(&self, owner: &OwnerId) -> Option<Value> {
        self.records.read().await.get(owner).cloned()
    }

    /// Number of successful saves since creation.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LayoutStore for MemoryLayoutStore {
    async fn load(&self, owner: &OwnerId) -> Result<Option<PersistedLayout>, RepoError> {
        let value = self.records.read().await.get(owner).cloned();
        value.map(PersistedLayout::from_value).transpose()
    }

    async fn save(&self, owner: &OwnerId, record: &PersistedLayout) -> Result<(), RepoError> {
        let value = record.to_value()?;
        self.records.write().await.insert(owner.clone(), value);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, owner: &OwnerId) -> Result<(), RepoError> {
        self.records.write().await.remove(owner);
        Ok(())
    }
}
