//! Layout mutation outcomes

use crate::ids::StableId;
use crate::value_objects::{GridKey, ItemReference, SlotLocation};

/// Result of placing a reference into a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceOutcome {
    pub location: SlotLocation,
    /// Prior occupant, discarded by the placement
    pub displaced: Option<ItemReference>,
}

/// Result of swapping two slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOutcome {
    pub source: SlotLocation,
    pub target: SlotLocation,
    /// Now at `target`
    pub payload: ItemReference,
    /// Former occupant of `target`, now at `source`
    pub displaced: Option<ItemReference>,
}

/// Result of a bulk placement into one grid.
///
/// Candidates beyond the grid's free capacity are dropped, never queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkPlacement {
    pub grid: GridKey,
    /// Candidates handed to the grid, excluding `unresolved`
    pub requested: usize,
    pub placed: Vec<SlotLocation>,
    /// Ids that never became candidates: unknown or owned by someone else
    pub unresolved: Vec<StableId>,
    /// Skipped because the id already occupies a slot in the grid's scope
    pub already_present: Vec<StableId>,
    /// Skipped because the grid ran out of free slots
    pub dropped: Vec<StableId>,
}

impl BulkPlacement {
    pub fn placed_count(&self) -> usize {
        self.placed.len()
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn changed(&self) -> bool {
        !self.placed.is_empty()
    }
}

/// Entries lost to a lossy operation (resize, clear, prune).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DroppedEntries {
    pub entries: Vec<(SlotLocation, ItemReference)>,
}

impl DroppedEntries {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn extend(&mut self, other: DroppedEntries) {
        self.entries.extend(other.entries);
    }
}
