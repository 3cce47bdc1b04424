//! Value objects for the slot model.

mod grid_key;
mod item_attributes;
mod item_reference;
mod slot_address;

pub use grid_key::{DedupeScope, GridKey, GridRole, HostKey, SlotLocation};
pub use item_attributes::{ActivationKind, ItemAttributes, PreparationMode, PreparationState};
pub use item_reference::{CachedDisplay, ItemReference, SortHints};
pub use slot_address::SlotAddress;
