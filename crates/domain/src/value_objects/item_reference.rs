//! Item references held by slots

use serde::{Deserialize, Serialize};

use super::{ActivationKind, ItemAttributes};
use crate::ids::StableId;

/// Rendering data copied from the item when it was last resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedDisplay {
    pub name: String,
    pub icon: Option<String>,
    pub category: String,
    pub activation_kind: Option<ActivationKind>,
}

/// Secondary sort keys remembered alongside the display cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortHints {
    pub tier: Option<u8>,
    pub subtype: Option<String>,
}

/// A pointer from a slot to an external item.
///
/// Only `stable_id` matters for correctness; the cached fields are
/// refreshed during reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReference {
    pub stable_id: StableId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<CachedDisplay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_hints: Option<SortHints>,
}

impl ItemReference {
    pub fn new(stable_id: StableId) -> Self {
        Self {
            stable_id,
            cached: None,
            sort_hints: None,
        }
    }

    pub fn from_attributes(attrs: &ItemAttributes) -> Self {
        let mut reference = Self::new(attrs.stable_id.clone());
        reference.refresh(attrs);
        reference
    }

    /// Overwrite cached display fields; returns whether anything changed.
    pub fn refresh(&mut self, attrs: &ItemAttributes) -> bool {
        let cached = Some(CachedDisplay {
            name: attrs.name.clone(),
            icon: attrs.icon.clone(),
            category: attrs.category.clone(),
            activation_kind: attrs.activation,
        });
        let hints = Some(SortHints {
            tier: attrs.tier,
            subtype: attrs.subcategory.clone(),
        });
        let changed = self.cached != cached || self.sort_hints != hints;
        self.cached = cached;
        self.sort_hints = hints;
        changed
    }

    pub fn name(&self) -> Option<&str> {
        self.cached.as_ref().map(|c| c.name.as_str())
    }
}
