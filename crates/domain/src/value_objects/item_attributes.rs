//! Narrow view of an externally owned item
//!
//! The entity directory resolves a stable id into `ItemAttributes` exactly
//! once; everything downstream (classifier, sort order, reconciliation) reads
//! this view and never the host's raw item data.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{OwnerId, StableId};

/// How an item is activated, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationKind {
    Action,
    BonusAction,
    Reaction,
    Minute,
    Hour,
    Special,
    /// Unknown activation kind for forward compatibility
    #[serde(other)]
    Other,
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Action => write!(f, "action"),
            Self::BonusAction => write!(f, "bonus"),
            Self::Reaction => write!(f, "reaction"),
            Self::Minute => write!(f, "minute"),
            Self::Hour => write!(f, "hour"),
            Self::Special => write!(f, "special"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Casting mode of a preparable item (spells).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreparationMode {
    /// Usable only while prepared
    Prepared,
    Always,
    Innate,
    AtWill,
    Pact,
    Ritual,
}

/// Preparation-like enabled/disabled state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PreparationState {
    pub mode: PreparationMode,
    pub prepared: bool,
}

impl PreparationState {
    pub fn prepared(prepared: bool) -> Self {
        Self {
            mode: PreparationMode::Prepared,
            prepared,
        }
    }

    /// Modes other than `Prepared` never need the prepared flag.
    pub fn is_exempt(&self) -> bool {
        self.mode != PreparationMode::Prepared
    }

    pub fn is_enabled(&self) -> bool {
        self.prepared || self.is_exempt()
    }
}

/// The attributes of one item, as resolved by the entity directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAttributes {
    pub stable_id: StableId,
    pub owner_id: OwnerId,
    pub name: String,
    pub icon: Option<String>,
    /// Host category, lower-case (e.g. "weapon", "spell", "feat")
    pub category: String,
    pub subcategory: Option<String>,
    pub activation: Option<ActivationKind>,
    /// Spell tier, 0 for at-will/cantrip up to 9
    pub tier: Option<u8>,
    pub preparation: Option<PreparationState>,
}

impl ItemAttributes {
    pub fn new(
        stable_id: StableId,
        owner_id: OwnerId,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            stable_id,
            owner_id,
            name: name.into(),
            icon: None,
            category: category.into().trim().to_ascii_lowercase(),
            subcategory: None,
            activation: None,
            tier: None,
            preparation: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into().trim().to_ascii_lowercase());
        self
    }

    pub fn with_activation(mut self, activation: ActivationKind) -> Self {
        self.activation = Some(activation);
        self
    }

    pub fn with_tier(mut self, tier: u8) -> Self {
        self.tier = Some(tier.min(9));
        self
    }

    pub fn with_preparation(mut self, preparation: PreparationState) -> Self {
        self.preparation = Some(preparation);
        self
    }

    pub fn has_activation(&self) -> bool {
        self.activation.is_some()
    }

    /// Whether a preparation-gated item is currently usable.
    ///
    /// Items without a preparation state, and at-will (tier 0) items, always are.
    pub fn is_enabled(&self) -> bool {
        if self.tier == Some(0) {
            return true;
        }
        self.preparation.map_or(true, |p| p.is_enabled())
    }

    /// Bags and backpacks may host a popover grid.
    pub fn is_container(&self) -> bool {
        matches!(self.category.as_str(), "container" | "backpack")
    }

    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        &self.owner_id == owner
    }
}
