//! Slot grid entity - a bounded 2D collection of item references
//!
//! # Invariants
//!
//! - Every occupied address lies inside `cols` x `rows`.
//! - An address holds at most one reference (enforced by the map).
//! - Unless `allow_duplicate` is set, a stable id occupies at most one
//!   address of this grid. Cross-grid duplicates are the container set's job.
//!
//! Resizing is lossy: entries that fall outside the new bounds are dropped
//! and handed back to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, ValidationError};
use crate::ids::StableId;
use crate::value_objects::{GridKey, GridRole, HostKey, ItemReference, SlotAddress, SlotLocation};

/// Upper bound for either grid dimension.
pub const MAX_GRID_DIMENSION: u32 = 32;

/// One grid of slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGrid {
    key: GridKey,
    cols: u32,
    rows: u32,
    locked: bool,
    allow_duplicate: bool,
    slots: BTreeMap<SlotAddress, ItemReference>,
}

impl SlotGrid {
    pub fn new(key: GridKey, cols: u32, rows: u32) -> Result<Self, DomainError> {
        validate_dimensions(cols, rows)?;
        Ok(Self {
            key,
            cols,
            rows,
            locked: false,
            allow_duplicate: false,
            slots: BTreeMap::new(),
        })
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn with_allow_duplicate(mut self, allow_duplicate: bool) -> Self {
        self.allow_duplicate = allow_duplicate;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn key(&self) -> GridKey {
        self.key
    }

    #[inline]
    pub fn role(&self) -> GridRole {
        self.key.role()
    }

    /// Position among grids of the same role; popovers report their host's.
    pub fn index(&self) -> usize {
        match self.key {
            GridKey::Main(index) | GridKey::WeaponSet(index) => index,
            GridKey::Combat => 0,
            GridKey::Popover {
                host: HostKey::Main(index) | HostKey::WeaponSet(index),
                ..
            } => index,
        }
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[inline]
    pub fn allows_duplicates(&self) -> bool {
        self.allow_duplicate
    }

    pub fn capacity(&self) -> usize {
        (self.cols * self.rows) as usize
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity()
    }

    pub fn get(&self, address: SlotAddress) -> Option<&ItemReference> {
        self.slots.get(&address)
    }

    pub fn get_mut(&mut self, address: SlotAddress) -> Option<&mut ItemReference> {
        self.slots.get_mut(&address)
    }

    pub fn contains(&self, stable_id: &StableId) -> bool {
        self.slots.values().any(|r| &r.stable_id == stable_id)
    }

    /// First address holding `stable_id`, row-major.
    pub fn position_of(&self, stable_id: &StableId) -> Option<SlotAddress> {
        self.slots
            .iter()
            .find(|(_, r)| &r.stable_id == stable_id)
            .map(|(address, _)| *address)
    }

    /// Occupied slots in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotAddress, &ItemReference)> {
        self.slots.iter().map(|(address, r)| (*address, r))
    }

    pub fn location(&self, address: SlotAddress) -> SlotLocation {
        SlotLocation::new(self.key, address)
    }

    /// First empty address scanning row 0 left to right, then row 1, ...
    pub fn find_first_free_address(&self) -> Option<SlotAddress> {
        SlotAddress::row_major(self.cols, self.rows).find(|a| !self.slots.contains_key(a))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Check that `reference` could be placed at `address` without mutating.
    pub fn check_place(
        &self,
        address: SlotAddress,
        reference: &ItemReference,
        override_lock: bool,
    ) -> Result<(), ValidationError> {
        self.check_bounds(address)?;
        if self.locked && !override_lock {
            return Err(ValidationError::Locked { grid: self.key });
        }
        if !self.allow_duplicate {
            if let Some(existing) = self
                .slots
                .iter()
                .find(|(a, r)| **a != address && r.stable_id == reference.stable_id)
                .map(|(a, _)| *a)
            {
                return Err(ValidationError::Duplicate {
                    stable_id: reference.stable_id.clone(),
                    existing: self.location(existing),
                });
            }
        }
        Ok(())
    }

    pub fn check_bounds(&self, address: SlotAddress) -> Result<(), ValidationError> {
        if address.fits(self.cols, self.rows) {
            Ok(())
        } else {
            Err(ValidationError::OutOfBounds {
                grid: self.key,
                address,
                cols: self.cols,
                rows: self.rows,
            })
        }
    }

    /// Place a reference, overwriting any prior occupant of `address`.
    ///
    /// Returns the displaced occupant.
    pub fn place(
        &mut self,
        address: SlotAddress,
        reference: ItemReference,
        override_lock: bool,
    ) -> Result<Option<ItemReference>, DomainError> {
        self.check_place(address, &reference, override_lock)?;
        Ok(self.slots.insert(address, reference))
    }

    /// Clear a slot. Removing an empty slot is a no-op.
    pub fn remove(&mut self, address: SlotAddress) -> Option<ItemReference> {
        self.slots.remove(&address)
    }

    /// Remove every occurrence of `stable_id`, returning the cleared addresses.
    pub fn remove_all(&mut self, stable_id: &StableId) -> Vec<SlotAddress> {
        let cleared: Vec<SlotAddress> = self
            .slots
            .iter()
            .filter(|(_, r)| &r.stable_id == stable_id)
            .map(|(a, _)| *a)
            .collect();
        for address in &cleared {
            self.slots.remove(address);
        }
        cleared
    }

    /// Keep only references for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&ItemReference) -> bool) -> Vec<SlotAddress> {
        let mut removed = Vec::new();
        self.slots.retain(|address, r| {
            let kept = keep(r);
            if !kept {
                removed.push(*address);
            }
            kept
        });
        removed
    }

    pub fn clear(&mut self) -> Vec<(SlotAddress, ItemReference)> {
        std::mem::take(&mut self.slots).into_iter().collect()
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn set_allow_duplicate(&mut self, allow_duplicate: bool) {
        self.allow_duplicate = allow_duplicate;
    }

    /// Change dimensions. Entries outside the new bounds are dropped and returned.
    pub fn resize(
        &mut self,
        rows: Option<u32>,
        cols: Option<u32>,
    ) -> Result<Vec<(SlotAddress, ItemReference)>, DomainError> {
        let rows = rows.unwrap_or(self.rows);
        let cols = cols.unwrap_or(self.cols);
        validate_dimensions(cols, rows)?;

        let (kept, dropped): (BTreeMap<_, _>, BTreeMap<_, _>) = std::mem::take(&mut self.slots)
            .into_iter()
            .partition(|(address, _)| address.fits(cols, rows));
        self.slots = kept;
        self.cols = cols;
        self.rows = rows;
        Ok(dropped.into_iter().collect())
    }

    /// Re-key this grid, used when a popover's host slot moves.
    pub(crate) fn rekey(&mut self, key: GridKey) {
        self.key = key;
    }
}

fn validate_dimensions(cols: u32, rows: u32) -> Result<(), DomainError> {
    if cols == 0 || rows == 0 || cols > MAX_GRID_DIMENSION || rows > MAX_GRID_DIMENSION {
        return Err(ValidationError::InvalidDimensions { cols, rows }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> ItemReference {
        ItemReference::new(StableId::new(id).unwrap())
    }

    fn grid() -> SlotGrid {
        SlotGrid::new(GridKey::Main(0), 5, 3).unwrap()
    }

    #[test]
    fn place_then_read_back() {
        let mut grid = grid();
        let displaced = grid.place(SlotAddress::new(2, 1), item("a"), false).unwrap();
        assert!(displaced.is_none());
        assert_eq!(grid.get(SlotAddress::new(2, 1)), Some(&item("a")));
    }

    #[test]
    fn place_overwrites_prior_occupant() {
        let mut grid = grid();
        grid.place(SlotAddress::new(0, 0), item("a"), false).unwrap();
        let displaced = grid.place(SlotAddress::new(0, 0), item("b"), false).unwrap();
        assert_eq!(displaced, Some(item("a")));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn out_of_bounds_leaves_grid_unchanged() {
        let mut grid = grid();
        grid.place(SlotAddress::new(0, 0), item("a"), false).unwrap();
        let before = grid.clone();

        for address in [SlotAddress::new(5, 0), SlotAddress::new(0, 3), SlotAddress::new(9, 9)] {
            let err = grid.place(address, item("b"), true).unwrap_err();
            assert!(matches!(
                err,
                DomainError::Validation(ValidationError::OutOfBounds { .. })
            ));
        }
        assert_eq!(grid, before);
    }

    #[test]
    fn locked_grid_requires_override() {
        let mut grid = grid().with_locked(true);
        let err = grid.place(SlotAddress::new(0, 0), item("a"), false).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationError::Locked { .. })
        ));
        assert!(grid.place(SlotAddress::new(0, 0), item("a"), true).is_ok());
    }

    #[test]
    fn duplicates_rejected_unless_allowed() {
        let mut grid = grid();
        grid.place(SlotAddress::new(0, 0), item("a"), false).unwrap();
        assert!(grid.place(SlotAddress::new(1, 0), item("a"), false).is_err());
        // Same address is an overwrite, not a duplicate
        assert!(grid.place(SlotAddress::new(0, 0), item("a"), false).is_ok());

        grid.set_allow_duplicate(true);
        assert!(grid.place(SlotAddress::new(1, 0), item("a"), false).is_ok());
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut grid = grid();
        grid.place(SlotAddress::new(1, 1), item("a"), false).unwrap();
        assert_eq!(grid.remove(SlotAddress::new(1, 1)), Some(item("a")));
        assert_eq!(grid.remove(SlotAddress::new(1, 1)), None);
        assert!(grid.is_empty());
    }

    #[test]
    fn first_free_address_is_row_major() {
        let mut grid = grid();
        assert_eq!(grid.find_first_free_address(), Some(SlotAddress::new(0, 0)));
        grid.place(SlotAddress::new(0, 0), item("a"), false).unwrap();
        grid.place(SlotAddress::new(1, 0), item("b"), false).unwrap();
        grid.place(SlotAddress::new(0, 1), item("c"), false).unwrap();
        assert_eq!(grid.find_first_free_address(), Some(SlotAddress::new(2, 0)));
    }

    #[test]
    fn full_grid_has_no_free_address() {
        let mut grid = SlotGrid::new(GridKey::Combat, 2, 1).unwrap();
        grid.place(SlotAddress::new(0, 0), item("a"), false).unwrap();
        grid.place(SlotAddress::new(1, 0), item("b"), false).unwrap();
        assert!(grid.is_full());
        assert_eq!(grid.find_first_free_address(), None);
    }

    #[test]
    fn resize_drops_entries_outside_bounds() {
        let mut grid = grid();
        grid.place(SlotAddress::new(0, 0), item("a"), false).unwrap();
        grid.place(SlotAddress::new(4, 0), item("b"), false).unwrap();
        grid.place(SlotAddress::new(0, 2), item("c"), false).unwrap();

        let dropped = grid.resize(Some(2), Some(4)).unwrap();
        let dropped_ids: Vec<_> = dropped.iter().map(|(_, r)| r.stable_id.as_str()).collect();
        assert_eq!(dropped_ids, vec!["b", "c"]);
        assert_eq!((grid.cols(), grid.rows()), (4, 2));
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert!(SlotGrid::new(GridKey::Main(0), 0, 3).is_err());
        let mut grid = grid();
        assert!(grid.resize(Some(0), None).is_err());
        assert_eq!(grid.rows(), 3);
    }
}
