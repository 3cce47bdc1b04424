//! ContainerSet aggregate - every slot grid owned by one entity
//!
//! # Invariants
//!
//! - Within a dedupe scope a stable id occupies at most one slot, unless the
//!   grid receiving it allows duplicates (see `GridKey::scope`).
//! - All main grids share one row count.
//! - A popover exists only while its host slot is occupied; it moves with the
//!   host item on swap and sort and is dropped when the host slot is cleared.
//! - `active_weapon_set` indexes an existing weapon set.
//!
//! Multi-slot mutations (swap, sort) are computed on a scratch copy and
//! committed only once every write has succeeded.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::entities::SlotGrid;
use crate::error::{DomainError, ValidationError};
use crate::events::{BulkPlacement, DroppedEntries, PlaceOutcome, SwapOutcome};
use crate::ids::{OwnerId, StableId};
use crate::placement::{sort_attributes, SortKey};
use crate::value_objects::{
    DedupeScope, GridKey, HostKey, ItemAttributes, ItemReference, SlotAddress, SlotLocation,
};

/// Dimensions used when a container set is created from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSetLayout {
    pub main_count: usize,
    pub main_cols: u32,
    pub main_rows: u32,
    pub weapon_set_count: usize,
    pub weapon_set_cols: u32,
    pub weapon_set_rows: u32,
    pub combat_cols: u32,
    pub combat_rows: u32,
}

impl Default for ContainerSetLayout {
    fn default() -> Self {
        Self {
            main_count: 3,
            main_cols: 5,
            main_rows: 3,
            weapon_set_count: 3,
            weapon_set_cols: 2,
            weapon_set_rows: 1,
            combat_cols: 3,
            combat_rows: 3,
        }
    }
}

/// All grids for one owning entity plus scalar panel state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSet {
    owner: OwnerId,
    main: Vec<SlotGrid>,
    weapon_sets: Vec<SlotGrid>,
    combat: SlotGrid,
    popovers: BTreeMap<(HostKey, SlotAddress), SlotGrid>,
    active_weapon_set: usize,
    portrait_visible: bool,
}

impl ContainerSet {
    /// Create an empty set with default-sized grids.
    pub fn new(owner: OwnerId, layout: &ContainerSetLayout) -> Result<Self, DomainError> {
        let main = (0..layout.main_count.max(1))
            .map(|i| SlotGrid::new(GridKey::Main(i), layout.main_cols, layout.main_rows))
            .collect::<Result<Vec<_>, _>>()?;
        let weapon_sets = (0..layout.weapon_set_count)
            .map(|i| {
                SlotGrid::new(
                    GridKey::WeaponSet(i),
                    layout.weapon_set_cols,
                    layout.weapon_set_rows,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let combat = SlotGrid::new(GridKey::Combat, layout.combat_cols, layout.combat_rows)?;
        Ok(Self {
            owner,
            main,
            weapon_sets,
            combat,
            popovers: BTreeMap::new(),
            active_weapon_set: 0,
            portrait_visible: true,
        })
    }

    /// Reassemble a set from stored grids.
    ///
    /// Grids must be empty; callers re-insert entries through [`Self::place`]
    /// so every entry passes the same validation as a live placement.
    pub fn from_grids(
        owner: OwnerId,
        main: Vec<SlotGrid>,
        weapon_sets: Vec<SlotGrid>,
        combat: SlotGrid,
    ) -> Result<Self, DomainError> {
        if main.is_empty() {
            return Err(DomainError::not_found("main grid", owner.to_string()));
        }
        let set = Self {
            owner,
            main,
            weapon_sets,
            combat,
            popovers: BTreeMap::new(),
            active_weapon_set: 0,
            portrait_visible: true,
        };
        set.validate()?;
        Ok(set)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    #[inline]
    pub fn main_grids(&self) -> &[SlotGrid] {
        &self.main
    }

    #[inline]
    pub fn weapon_sets(&self) -> &[SlotGrid] {
        &self.weapon_sets
    }

    #[inline]
    pub fn combat(&self) -> &SlotGrid {
        &self.combat
    }

    pub fn popovers(&self) -> impl Iterator<Item = &SlotGrid> {
        self.popovers.values()
    }

    #[inline]
    pub fn active_weapon_set(&self) -> usize {
        self.active_weapon_set
    }

    #[inline]
    pub fn portrait_visible(&self) -> bool {
        self.portrait_visible
    }

    /// Shared row count of the main grids.
    pub fn main_rows(&self) -> u32 {
        self.main.first().map_or(0, SlotGrid::rows)
    }

    /// Every grid, popovers last.
    pub fn grids(&self) -> impl Iterator<Item = &SlotGrid> {
        self.main
            .iter()
            .chain(self.weapon_sets.iter())
            .chain(std::iter::once(&self.combat))
            .chain(self.popovers.values())
    }

    pub fn grid(&self, key: GridKey) -> Result<&SlotGrid, ValidationError> {
        let grid = match key {
            GridKey::Main(i) => self.main.get(i),
            GridKey::WeaponSet(i) => self.weapon_sets.get(i),
            GridKey::Combat => Some(&self.combat),
            GridKey::Popover { host, address } => self.popovers.get(&(host, address)),
        };
        grid.ok_or(ValidationError::UnknownGrid(key))
    }

    fn grid_mut(&mut self, key: GridKey) -> Result<&mut SlotGrid, ValidationError> {
        let grid = match key {
            GridKey::Main(i) => self.main.get_mut(i),
            GridKey::WeaponSet(i) => self.weapon_sets.get_mut(i),
            GridKey::Combat => Some(&mut self.combat),
            GridKey::Popover { host, address } => self.popovers.get_mut(&(host, address)),
        };
        grid.ok_or(ValidationError::UnknownGrid(key))
    }

    fn grids_mut(&mut self) -> impl Iterator<Item = &mut SlotGrid> {
        self.main
            .iter_mut()
            .chain(self.weapon_sets.iter_mut())
            .chain(std::iter::once(&mut self.combat))
            .chain(self.popovers.values_mut())
    }

    pub fn get(&self, location: SlotLocation) -> Option<&ItemReference> {
        self.grid(location.grid).ok()?.get(location.address)
    }

    /// Where `stable_id` sits in `scope`, ignoring `excluding`.
    pub fn find_in_scope(
        &self,
        scope: DedupeScope,
        stable_id: &StableId,
        excluding: Option<SlotLocation>,
    ) -> Option<SlotLocation> {
        self.grids()
            .filter(|g| scope.contains(&g.key()))
            .flat_map(|g| g.iter().map(move |(a, r)| (g.location(a), r)))
            .find(|(loc, r)| &r.stable_id == stable_id && Some(*loc) != excluding)
            .map(|(loc, _)| loc)
    }

    pub fn contains_in_main(&self, stable_id: &StableId) -> bool {
        self.main.iter().any(|g| g.contains(stable_id))
    }

    /// Every slot holding `stable_id`, in any grid.
    pub fn locate_all(&self, stable_id: &StableId) -> Vec<SlotLocation> {
        self.grids()
            .flat_map(|g| {
                g.iter()
                    .filter(|(_, r)| &r.stable_id == stable_id)
                    .map(|(a, _)| g.location(a))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn stable_ids(&self) -> BTreeSet<StableId> {
        self.grids()
            .flat_map(|g| g.iter().map(|(_, r)| r.stable_id.clone()))
            .collect()
    }

    // =========================================================================
    // Single-slot mutations
    // =========================================================================

    /// Validate a placement against the grid and its dedupe scope.
    pub fn check_place(
        &self,
        location: SlotLocation,
        reference: &ItemReference,
        override_lock: bool,
    ) -> Result<(), ValidationError> {
        let grid = self.grid(location.grid)?;
        grid.check_place(location.address, reference, override_lock)?;
        if self.is_host_of(location.grid, &reference.stable_id) {
            return Err(ValidationError::SelfNested(reference.stable_id.clone()));
        }
        if !grid.allows_duplicates() {
            if let Some(existing) =
                self.find_in_scope(location.grid.scope(), &reference.stable_id, Some(location))
            {
                return Err(ValidationError::Duplicate {
                    stable_id: reference.stable_id.clone(),
                    existing,
                });
            }
        }
        Ok(())
    }

    /// Whether `key` is a popover hosted by `stable_id`.
    fn is_host_of(&self, key: GridKey, stable_id: &StableId) -> bool {
        let GridKey::Popover { host, address } = key else {
            return false;
        };
        self.get(SlotLocation::new(host.into(), address))
            .is_some_and(|r| &r.stable_id == stable_id)
    }

    /// Place a reference, discarding whatever occupied the slot.
    pub fn place(
        &mut self,
        location: SlotLocation,
        reference: ItemReference,
        override_lock: bool,
    ) -> Result<PlaceOutcome, DomainError> {
        self.check_place(location, &reference, override_lock)?;
        let new_id = reference.stable_id.clone();
        let displaced = self
            .grid_mut(location.grid)?
            .place(location.address, reference, override_lock)?;
        if displaced.as_ref().is_some_and(|d| d.stable_id != new_id) {
            self.drop_popover_at(location);
        }
        Ok(PlaceOutcome {
            location,
            displaced,
        })
    }

    /// Clear one slot. Clearing an empty slot succeeds with `None`.
    pub fn remove(
        &mut self,
        location: SlotLocation,
        override_lock: bool,
    ) -> Result<Option<ItemReference>, DomainError> {
        let grid = self.grid_mut(location.grid)?;
        grid.check_bounds(location.address)?;
        if grid.is_locked() && !override_lock {
            return Err(ValidationError::Locked {
                grid: location.grid,
            }
            .into());
        }
        let removed = grid.remove(location.address);
        if removed.is_some() {
            self.drop_popover_at(location);
        }
        Ok(removed)
    }

    /// Remove `stable_id` from every main, weapon-set and popover grid.
    ///
    /// Ignores locks: the item no longer exists, so the slot is stale.
    pub fn remove_everywhere(&mut self, stable_id: &StableId) -> Vec<SlotLocation> {
        let mut cleared = Vec::new();
        for grid in self.grids_mut() {
            if grid.key() == GridKey::Combat {
                continue;
            }
            let key = grid.key();
            cleared.extend(
                grid.remove_all(stable_id)
                    .into_iter()
                    .map(|a| SlotLocation::new(key, a)),
            );
        }
        for location in &cleared {
            self.drop_popover_at(*location);
        }
        cleared
    }

    /// Refresh cached display data wherever the item appears.
    pub fn refresh(&mut self, attrs: &ItemAttributes) -> Vec<SlotLocation> {
        let mut changed = Vec::new();
        for grid in self.grids_mut() {
            let key = grid.key();
            let addresses: Vec<SlotAddress> = grid
                .iter()
                .filter(|(_, r)| r.stable_id == attrs.stable_id)
                .map(|(a, _)| a)
                .collect();
            for address in addresses {
                if grid.get_mut(address).is_some_and(|r| r.refresh(attrs)) {
                    changed.push(SlotLocation::new(key, address));
                }
            }
        }
        changed
    }

    /// Drop references for which `is_live` returns false.
    pub fn prune(&mut self, mut is_live: impl FnMut(&StableId) -> bool) -> Vec<SlotLocation> {
        let mut pruned = Vec::new();
        for grid in self.grids_mut() {
            let key = grid.key();
            pruned.extend(
                grid.retain(|r| is_live(&r.stable_id))
                    .into_iter()
                    .map(|a| SlotLocation::new(key, a)),
            );
        }
        for location in &pruned {
            self.drop_popover_at(*location);
        }
        pruned
    }

    // =========================================================================
    // Multi-slot mutations
    // =========================================================================

    /// Exchange the contents of two slots atomically.
    ///
    /// `source` must be occupied; `target` may be empty. Either both writes
    /// land or neither does. Hosted popovers travel with their items.
    pub fn swap(
        &mut self,
        source: SlotLocation,
        target: SlotLocation,
        override_lock: bool,
    ) -> Result<SwapOutcome, DomainError> {
        if source == target {
            return Err(ValidationError::SameSlot(source).into());
        }
        let payload = self
            .get(source)
            .cloned()
            .ok_or(ValidationError::EmptySlot(source))?;

        for location in [source, target] {
            let grid = self.grid(location.grid)?;
            grid.check_bounds(location.address)?;
            if grid.is_locked() && !override_lock {
                return Err(ValidationError::Locked {
                    grid: location.grid,
                }
                .into());
            }
        }

        let mut next = self.clone();
        let source_popover = next.take_popover(source);
        let target_popover = next.take_popover(target);
        next.grid_mut(source.grid)?.remove(source.address);
        let displaced = next.grid_mut(target.grid)?.remove(target.address);

        next.place(target, payload.clone(), override_lock)?;
        if let Some(prior) = displaced.clone() {
            next.place(source, prior, override_lock)?;
        }
        next.restore_popover(source_popover, target);
        next.restore_popover(target_popover, source);

        *self = next;
        Ok(SwapOutcome {
            source,
            target,
            payload,
            displaced,
        })
    }

    /// Sort candidates and place them row-major into the free slots of `key`.
    ///
    /// Candidates already present in the grid's dedupe scope are skipped;
    /// candidates beyond free capacity are dropped and reported.
    pub fn bulk_populate(
        &mut self,
        key: GridKey,
        mut candidates: Vec<ItemAttributes>,
        override_lock: bool,
    ) -> Result<BulkPlacement, DomainError> {
        let grid = self.grid(key)?;
        if grid.is_locked() && !override_lock {
            return Err(ValidationError::Locked { grid: key }.into());
        }

        let requested = candidates.len();
        sort_attributes(&mut candidates);

        let mut outcome = BulkPlacement {
            grid: key,
            requested,
            placed: Vec::new(),
            unresolved: Vec::new(),
            already_present: Vec::new(),
            dropped: Vec::new(),
        };
        let mut seen = HashSet::new();
        for attrs in candidates {
            if !seen.insert(attrs.stable_id.clone())
                || self.is_host_of(key, &attrs.stable_id)
                || self
                    .find_in_scope(key.scope(), &attrs.stable_id, None)
                    .is_some()
            {
                outcome.already_present.push(attrs.stable_id);
                continue;
            }
            let Some(address) = self.grid(key)?.find_first_free_address() else {
                outcome.dropped.push(attrs.stable_id);
                continue;
            };
            let location = SlotLocation::new(key, address);
            self.place(location, ItemReference::from_attributes(&attrs), override_lock)?;
            outcome.placed.push(location);
        }
        Ok(outcome)
    }

    /// Reorder a grid's entries row-major by the sort order.
    pub fn sort_grid(&mut self, key: GridKey, override_lock: bool) -> Result<(), DomainError> {
        let grid = self.grid(key)?;
        if grid.is_locked() && !override_lock {
            return Err(ValidationError::Locked { grid: key }.into());
        }
        let cols = grid.cols();
        let rows = grid.rows();

        let mut next = self.clone();
        let target = next.grid_mut(key)?;
        let mut entries = target.clear();
        entries.sort_by_cached_key(|(_, r)| SortKey::from_reference(r));

        let mut moves = Vec::new();
        for ((old, reference), new) in entries.into_iter().zip(SlotAddress::row_major(cols, rows)) {
            target.place(new, reference, true)?;
            moves.push((old, new));
        }

        if let Some(host) = key.as_host() {
            let popovers: Vec<_> = moves
                .iter()
                .filter_map(|(old, new)| {
                    next.popovers
                        .remove(&(host, *old))
                        .map(|popover| (*new, popover))
                })
                .collect();
            for (new, mut popover) in popovers {
                popover.rekey(GridKey::Popover { host, address: new });
                next.popovers.insert((host, new), popover);
            }
        }

        *self = next;
        Ok(())
    }

    /// Empty one grid.
    pub fn clear_grid(
        &mut self,
        key: GridKey,
        override_lock: bool,
    ) -> Result<DroppedEntries, DomainError> {
        let grid = self.grid_mut(key)?;
        if grid.is_locked() && !override_lock {
            return Err(ValidationError::Locked { grid: key }.into());
        }
        let entries: Vec<_> = grid
            .clear()
            .into_iter()
            .map(|(a, r)| (SlotLocation::new(key, a), r))
            .collect();
        for (location, _) in &entries {
            self.drop_popover_at(*location);
        }
        Ok(DroppedEntries { entries })
    }

    // =========================================================================
    // Grid settings
    // =========================================================================

    pub fn set_locked(&mut self, key: GridKey, locked: bool) -> Result<(), DomainError> {
        self.grid_mut(key)?.set_locked(locked);
        Ok(())
    }

    /// Toggle the duplicate policy of one grid.
    ///
    /// Turning duplicates off drops every entry of this grid whose id also
    /// occupies another grid of the scope, and repeats of an id within the
    /// grid after its first row-major occurrence.
    pub fn set_allow_duplicate(
        &mut self,
        key: GridKey,
        allow: bool,
    ) -> Result<DroppedEntries, DomainError> {
        self.grid_mut(key)?.set_allow_duplicate(allow);
        if allow {
            return Ok(DroppedEntries::default());
        }

        let scope = key.scope();
        let mut seen = HashSet::new();
        let duplicates: Vec<SlotAddress> = self
            .grid(key)?
            .iter()
            .filter(|(_, reference)| {
                let elsewhere = self
                    .grids()
                    .filter(|g| g.key() != key && scope.contains(&g.key()))
                    .any(|g| g.contains(&reference.stable_id));
                elsewhere || !seen.insert(reference.stable_id.clone())
            })
            .map(|(address, _)| address)
            .collect();

        let grid = self.grid_mut(key)?;
        let entries: Vec<_> = duplicates
            .into_iter()
            .filter_map(|a| grid.remove(a).map(|r| (SlotLocation::new(key, a), r)))
            .collect();
        for (location, _) in &entries {
            self.drop_popover_at(*location);
        }
        Ok(DroppedEntries { entries })
    }

    /// Change the shared row count of all main grids.
    pub fn set_main_rows(&mut self, rows: u32) -> Result<DroppedEntries, DomainError> {
        let mut next = self.clone();
        let mut dropped = DroppedEntries::default();
        for grid in next.main.iter_mut() {
            let key = grid.key();
            dropped.entries.extend(
                grid.resize(Some(rows), None)?
                    .into_iter()
                    .map(|(a, r)| (SlotLocation::new(key, a), r)),
            );
        }
        for (location, _) in &dropped.entries {
            next.drop_popover_at(*location);
        }
        *self = next;
        Ok(dropped)
    }

    pub fn add_main_row(&mut self) -> Result<DroppedEntries, DomainError> {
        self.set_main_rows(self.main_rows() + 1)
    }

    pub fn remove_main_row(&mut self) -> Result<DroppedEntries, DomainError> {
        self.set_main_rows(self.main_rows().saturating_sub(1))
    }

    /// Resize any grid. Row changes on a main grid apply to every main grid.
    pub fn resize_grid(
        &mut self,
        key: GridKey,
        rows: Option<u32>,
        cols: Option<u32>,
    ) -> Result<DroppedEntries, DomainError> {
        let mut next = self.clone();
        let mut dropped = DroppedEntries::default();
        let rows = match key {
            GridKey::Main(_) => {
                if let Some(rows) = rows.filter(|r| *r != next.main_rows()) {
                    next.grid(key)?;
                    dropped.extend(next.set_main_rows(rows)?);
                }
                None
            }
            _ => rows,
        };
        let entries: Vec<_> = next
            .grid_mut(key)?
            .resize(rows, cols)?
            .into_iter()
            .map(|(a, r)| (SlotLocation::new(key, a), r))
            .collect();
        for (location, _) in &entries {
            next.drop_popover_at(*location);
        }
        dropped.entries.extend(entries);
        *self = next;
        Ok(dropped)
    }

    pub fn set_active_weapon_set(&mut self, index: usize) -> Result<(), DomainError> {
        if index >= self.weapon_sets.len() {
            return Err(ValidationError::UnknownWeaponSet {
                index,
                count: self.weapon_sets.len(),
            }
            .into());
        }
        self.active_weapon_set = index;
        Ok(())
    }

    pub fn set_portrait_visible(&mut self, visible: bool) {
        self.portrait_visible = visible;
    }

    // =========================================================================
    // Popovers
    // =========================================================================

    /// Create (or return) the popover grid hosted by a container item's slot.
    pub fn open_popover(
        &mut self,
        location: SlotLocation,
        host_item: &ItemAttributes,
        cols: u32,
        rows: u32,
    ) -> Result<GridKey, DomainError> {
        let host = location
            .grid
            .as_host()
            .ok_or(ValidationError::NotAContainer(location))?;
        let occupant = self
            .get(location)
            .ok_or(ValidationError::EmptySlot(location))?;
        if occupant.stable_id != host_item.stable_id || !host_item.is_container() {
            return Err(ValidationError::NotAContainer(location).into());
        }
        let key = GridKey::Popover {
            host,
            address: location.address,
        };
        if !self.popovers.contains_key(&(host, location.address)) {
            self.popovers
                .insert((host, location.address), SlotGrid::new(key, cols, rows)?);
        }
        Ok(key)
    }

    /// Attach a stored popover grid to its (occupied) host slot.
    pub fn attach_popover(&mut self, grid: SlotGrid) -> Result<(), DomainError> {
        let GridKey::Popover { host, address } = grid.key() else {
            return Err(ValidationError::UnknownGrid(grid.key()).into());
        };
        let location = SlotLocation::new(host.into(), address);
        if self.get(location).is_none() {
            return Err(ValidationError::EmptySlot(location).into());
        }
        self.popovers.insert((host, address), grid);
        Ok(())
    }

    /// The popover hosted at `location`, if any.
    pub fn popover_at(&self, location: SlotLocation) -> Option<&SlotGrid> {
        let host = location.grid.as_host()?;
        self.popovers.get(&(host, location.address))
    }

    fn drop_popover_at(&mut self, location: SlotLocation) {
        if let Some(host) = location.grid.as_host() {
            self.popovers.remove(&(host, location.address));
        }
    }

    fn take_popover(&mut self, location: SlotLocation) -> Option<SlotGrid> {
        let host = location.grid.as_host()?;
        self.popovers.remove(&(host, location.address))
    }

    fn restore_popover(&mut self, popover: Option<SlotGrid>, location: SlotLocation) {
        let (Some(mut popover), Some(host)) = (popover, location.grid.as_host()) else {
            return;
        };
        popover.rekey(GridKey::Popover {
            host,
            address: location.address,
        });
        self.popovers.insert((host, location.address), popover);
    }

    // =========================================================================
    // Invariants
    // =========================================================================

    /// Check every set-level invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let rows = self.main_rows();
        if let Some(grid) = self.main.iter().find(|g| g.rows() != rows) {
            return Err(ValidationError::RowMismatch {
                grid: grid.key(),
                expected: rows,
                found: grid.rows(),
            });
        }

        // Grids that allow duplicates may repeat anything; the rest of a
        // scope holds each id at most once.
        let mut seen: BTreeMap<(ScopeKey, &StableId), SlotLocation> = BTreeMap::new();
        for grid in self.grids().filter(|g| !g.allows_duplicates()) {
            let scope = ScopeKey::from(grid.key().scope());
            for (address, reference) in grid.iter() {
                if let Some(existing) = seen.get(&(scope, &reference.stable_id)) {
                    return Err(ValidationError::Duplicate {
                        stable_id: reference.stable_id.clone(),
                        existing: *existing,
                    });
                }
                seen.insert((scope, &reference.stable_id), grid.location(address));
            }
        }

        for ((host, address), popover) in self.popovers.iter() {
            let location = SlotLocation::new((*host).into(), *address);
            let Some(host_item) = self.get(location) else {
                return Err(ValidationError::EmptySlot(location));
            };
            if popover.contains(&host_item.stable_id) {
                return Err(ValidationError::SelfNested(host_item.stable_id.clone()));
            }
        }

        if !self.weapon_sets.is_empty() && self.active_weapon_set >= self.weapon_sets.len() {
            return Err(ValidationError::UnknownWeaponSet {
                index: self.active_weapon_set,
                count: self.weapon_sets.len(),
            });
        }
        Ok(())
    }
}

/// Orderable projection of `DedupeScope` for the validation index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ScopeKey {
    Main,
    WeaponSets,
    Combat,
    Popover(HostKey, SlotAddress),
}

impl From<DedupeScope> for ScopeKey {
    fn from(value: DedupeScope) -> Self {
        match value {
            DedupeScope::Main => Self::Main,
            DedupeScope::WeaponSets => Self::WeaponSets,
            DedupeScope::Combat => Self::Combat,
            DedupeScope::Popover { host, address } => Self::Popover(host, address),
        }
    }
}
