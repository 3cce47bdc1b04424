//! Quick slot domain model
//!
//! Pure data and rules for a per-entity quick action panel: slot grids,
//! the container set aggregate that owns them, placement heuristics and
//! mutation outcomes. No I/O happens in this crate.

extern crate self as quickslot_domain;

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod placement;
pub mod value_objects;

pub use aggregates::{ContainerSet, ContainerSetLayout};
pub use entities::{SlotGrid, MAX_GRID_DIMENSION};
pub use error::{DomainError, ValidationError};
pub use events::{BulkPlacement, DroppedEntries, PlaceOutcome, SwapOutcome};
pub use ids::{InstanceId, OwnerId, StableId, SubscriptionId};
pub use placement::{
    classify, sort_attributes, CategoryMatcher, ClassifierConfig,
    SortCategory, SortKey,
};
pub use value_objects::{
    ActivationKind, CachedDisplay, DedupeScope, GridKey, GridRole, HostKey, ItemAttributes,
    ItemReference, PreparationMode, PreparationState, SlotAddress, SlotLocation, SortHints,
};
