//! Sort order for bulk placement
//!
//! Primary key is the rank in a fixed category table. Spells then sort by
//! ascending tier, features by subtype, and everything by name last. Ties
//! fall back to the stable id so the order is total.

use std::cmp::Ordering;

use crate::ids::StableId;
use crate::value_objects::{ItemAttributes, ItemReference};

/// Category ranks, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SortCategory {
    Weapon,
    Feature,
    Equipment,
    Spell,
    Consumable,
    Tool,
    Other,
}

impl SortCategory {
    pub fn from_category(category: &str) -> Self {
        match category {
            "weapon" => Self::Weapon,
            "feat" | "feature" | "class" | "subclass" | "race" | "background" => Self::Feature,
            "equipment" => Self::Equipment,
            "spell" => Self::Spell,
            "consumable" => Self::Consumable,
            "tool" => Self::Tool,
            _ => Self::Other,
        }
    }
}

/// Everything the comparator looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub category: SortCategory,
    pub tier: u8,
    pub subtype: String,
    pub name: String,
    pub stable_id: StableId,
}

impl SortKey {
    pub fn from_attributes(attrs: &ItemAttributes) -> Self {
        Self {
            category: SortCategory::from_category(&attrs.category),
            tier: attrs.tier.unwrap_or(0),
            subtype: attrs.subcategory.clone().unwrap_or_default(),
            name: attrs.name.to_lowercase(),
            stable_id: attrs.stable_id.clone(),
        }
    }

    /// Build from the cached display data of a slot entry.
    ///
    /// References that were never resolved sort last.
    pub fn from_reference(reference: &ItemReference) -> Self {
        let hints = reference.sort_hints.clone().unwrap_or_default();
        let (category, name) = match &reference.cached {
            Some(cached) => (
                SortCategory::from_category(&cached.category),
                cached.name.to_lowercase(),
            ),
            None => (SortCategory::Other, String::new()),
        };
        Self {
            category,
            tier: hints.tier.unwrap_or(0),
            subtype: hints.subtype.unwrap_or_default(),
            name,
            stable_id: reference.stable_id.clone(),
        }
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let secondary = match self.category {
            SortCategory::Spell => self.tier.cmp(&other.tier),
            SortCategory::Feature => self.subtype.cmp(&other.subtype),
            _ => Ordering::Equal,
        };
        self.category
            .cmp(&other.category)
            .then(secondary)
            .then_with(|| self.name.cmp(&other.name))
            .then_with(|| self.stable_id.cmp(&other.stable_id))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub fn sort_attributes(items: &mut [ItemAttributes]) {
    items.sort_by_cached_key(SortKey::from_attributes);
}
