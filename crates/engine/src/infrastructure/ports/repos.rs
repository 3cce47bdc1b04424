//! Storage and lookup ports.

use async_trait::async_trait;
use quickslot_domain::{ItemAttributes, OwnerId, StableId};

use super::error::RepoError;
use crate::infrastructure::persistence::PersistedLayout;

// =============================================================================
// Layout Storage
// =============================================================================

/// Durable per-owner storage of the persisted layout record.
///
/// Writes are full-record overwrites; the last save wins.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LayoutStore: Send + Sync {
    async fn load(&self, owner: &OwnerId) -> Result<Option<PersistedLayout>, RepoError>;
    async fn save(&self, owner: &OwnerId, record: &PersistedLayout) -> Result<(), RepoError>;
    async fn delete(&self, owner: &OwnerId) -> Result<(), RepoError>;
}

// =============================================================================
// Entity Directory
// =============================================================================

/// Resolves stable ids to live item attributes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityDirectory: Send + Sync {
    /// `None` when the id no longer resolves.
    async fn resolve(&self, stable_id: &StableId) -> Result<Option<ItemAttributes>, RepoError>;

    /// Every item owned by `owner`.
    async fn list(&self, owner: &OwnerId) -> Result<Vec<ItemAttributes>, RepoError>;
}
