//! Common test helpers: item builders and in-memory adapters.
//!
//! Stable ids follow the host's `Actor.<owner>.Item.<key>` shape so that
//! tests read like real data.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{selection, spell, MemoryDirectory};
//!
//! let directory = MemoryDirectory::new();
//! directory.insert(spell("hero", "bolt", "Fire Bolt", 0)).await;
//! session.select(selection("hero")).await?;
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use quickslot_domain::{ActivationKind, InstanceId, ItemAttributes, OwnerId, StableId};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{
    EntityDirectory, Notice, NoticeLevel, Notifier, RepoError, Selection,
};

// =============================================================================
// Ids
// =============================================================================

pub fn owner(name: &str) -> OwnerId {
    OwnerId::new(format!("Actor.{name}")).expect("valid owner id")
}

pub fn stable_id(owner_name: &str, key: &str) -> StableId {
    StableId::new(format!("Actor.{owner_name}.Item.{key}")).expect("valid stable id")
}

pub fn selection(name: &str) -> Selection {
    Selection::new(
        InstanceId::new(format!("Token.{name}")).expect("valid instance id"),
        owner(name),
    )
}

// =============================================================================
// Items
// =============================================================================

/// A passive item of any category.
pub fn item(owner_name: &str, key: &str, name: &str, category: &str) -> ItemAttributes {
    ItemAttributes::new(stable_id(owner_name, key), owner(owner_name), name, category)
}

pub fn weapon(owner_name: &str, key: &str, name: &str) -> ItemAttributes {
    item(owner_name, key, name, "weapon").with_activation(ActivationKind::Action)
}

pub fn spell(owner_name: &str, key: &str, name: &str, tier: u8) -> ItemAttributes {
    item(owner_name, key, name, "spell")
        .with_activation(ActivationKind::Action)
        .with_tier(tier)
}

/// A feature without an activation.
pub fn feat(owner_name: &str, key: &str, name: &str) -> ItemAttributes {
    item(owner_name, key, name, "feat")
}

// =============================================================================
// Adapters
// =============================================================================

/// Entity directory backed by a map.
#[derive(Default)]
pub struct MemoryDirectory {
    items: RwLock<HashMap<StableId, ItemAttributes>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item.
    pub async fn insert(&self, attrs: ItemAttributes) {
        self.items
            .write()
            .await
            .insert(attrs.stable_id.clone(), attrs);
    }

    pub async fn remove(&self, stable_id: &StableId) -> Option<ItemAttributes> {
        self.items.write().await.remove(stable_id)
    }
}

#[async_trait]
impl EntityDirectory for MemoryDirectory {
    async fn resolve(&self, stable_id: &StableId) -> Result<Option<ItemAttributes>, RepoError> {
        Ok(self.items.read().await.get(stable_id).cloned())
    }

    async fn list(&self, owner: &OwnerId) -> Result<Vec<ItemAttributes>, RepoError> {
        let mut items: Vec<ItemAttributes> = self
            .items
            .read()
            .await
            .values()
            .filter(|a| a.is_owned_by(owner))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.stable_id.cmp(&b.stable_id));
        Ok(items)
    }
}

/// Notifier that keeps every notice for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().expect("notice lock").clone()
    }

    pub fn levels(&self) -> Vec<NoticeLevel> {
        self.notices().into_iter().map(|n| n.level).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().expect("notice lock").push(notice);
    }
}
