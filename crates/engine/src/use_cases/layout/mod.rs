//! Layout session.
//!
//! Owns the active container set for the current selection and routes every
//! edit through one path: mutate a copy, re-validate, commit to memory, the
//! cache and storage, then notify subscribers. A rejected edit leaves the
//! active set untouched and is surfaced as a notice.
//!
//! Mutations are serialized; a save is awaited before the next mutation
//! starts, so the last save always carries the latest state.

mod error;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use quickslot_domain::{
    classify, BulkPlacement, ContainerSet, DomainError, DroppedEntries, GridKey, ItemAttributes,
    ItemReference, OwnerId, PlaceOutcome, SlotAddress, SlotLocation, StableId, SubscriptionId,
    SwapOutcome,
};
use tokio::sync::{Mutex, RwLock};

use crate::infrastructure::cache::LayoutCache;
use crate::infrastructure::persistence::PersistedLayout;
use crate::infrastructure::ports::{
    ClockPort, EntityDirectory, LayoutStore, Notice, Notifier, Selection,
};
use crate::infrastructure::settings::PanelSettings;
use crate::stores::{EventBus, LayoutEvent};

pub use error::LayoutError;

/// Which layouts a mutation may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ApplyTo {
    /// Only the owner's layout if it is the active one
    ActiveOnly,
    /// The active layout, or the owner's cached / stored layout
    AnyStored,
}

struct ActiveLayout {
    selection: Selection,
    set: ContainerSet,
}

pub struct LayoutSession {
    store: Arc<dyn LayoutStore>,
    directory: Arc<dyn EntityDirectory>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn ClockPort>,
    settings: PanelSettings,
    combat_ids: HashSet<StableId>,
    cache: LayoutCache,
    events: EventBus,
    authority: AtomicBool,
    active: RwLock<Option<ActiveLayout>>,
    serial: Mutex<()>,
}

impl LayoutSession {
    pub fn new(
        store: Arc<dyn LayoutStore>,
        directory: Arc<dyn EntityDirectory>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn ClockPort>,
        settings: PanelSettings,
    ) -> Self {
        Self {
            store,
            directory,
            notifier,
            clock,
            combat_ids: settings.combat_ids(),
            cache: LayoutCache::new(settings.cache_ttl()),
            events: EventBus::new(),
            authority: AtomicBool::new(true),
            active: RwLock::new(None),
            serial: Mutex::new(()),
            settings,
        }
    }

    /// Start without edit authority (a viewer that follows remote changes).
    pub fn with_authority(self, authority: bool) -> Self {
        self.authority.store(authority, Ordering::SeqCst);
        self
    }

    pub fn set_authority(&self, authority: bool) {
        self.authority.store(authority, Ordering::SeqCst);
    }

    pub fn has_authority(&self) -> bool {
        self.authority.load(Ordering::SeqCst)
    }

    pub fn settings(&self) -> &PanelSettings {
        &self.settings
    }

    pub(crate) fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn is_combat_action(&self, stable_id: &StableId) -> bool {
        self.combat_ids.contains(stable_id)
    }

    /// Whether an item may be auto-added to a main grid.
    pub fn qualifies(&self, attrs: &ItemAttributes) -> bool {
        !self.is_combat_action(&attrs.stable_id)
            && (attrs.has_activation() || self.settings.allow_passive)
            && attrs.is_enabled()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Make `selection` active, loading its owner's layout or creating one.
    pub async fn select(&self, selection: Selection) -> Result<(), LayoutError> {
        let _guard = self.serial.lock().await;
        let owner = selection.owner.clone();

        let (set, dirty) = self.load_or_default(&owner).await?;
        if dirty && self.has_authority() {
            self.persist(&owner, &set).await;
        }
        let evicted = self.cache.cleanup_expired().await;
        if evicted > 0 {
            tracing::debug!(evicted, "Evicted expired cached layouts");
        }
        self.cache.insert(owner.clone(), set.clone()).await;

        let previous = self
            .active
            .write()
            .await
            .replace(ActiveLayout { selection, set });
        if let Some(previous) = previous.filter(|p| p.selection.owner != owner) {
            self.events
                .dispatch(LayoutEvent::Unloaded {
                    owner: previous.selection.owner,
                })
                .await;
        }

        tracing::debug!(owner = %owner, "Layout loaded");
        self.events.dispatch(LayoutEvent::Loaded { owner }).await;
        Ok(())
    }

    /// Drop the active layout. The cached copy stays for a quick reselect.
    pub async fn deselect(&self) -> Option<OwnerId> {
        let _guard = self.serial.lock().await;
        let previous = self.active.write().await.take()?;
        let owner = previous.selection.owner;
        self.events
            .dispatch(LayoutEvent::Unloaded {
                owner: owner.clone(),
            })
            .await;
        Some(owner)
    }

    pub async fn selection(&self) -> Option<Selection> {
        self.active.read().await.as_ref().map(|a| a.selection.clone())
    }

    /// Read-only copy of the active layout.
    pub async fn snapshot(&self) -> Option<ContainerSet> {
        self.active.read().await.as_ref().map(|a| a.set.clone())
    }

    pub async fn subscribe(
        &self,
        callback: impl FnMut(LayoutEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(callback).await
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id).await
    }

    /// Drop every subscriber and the active layout.
    pub async fn shutdown(&self) {
        let _guard = self.serial.lock().await;
        self.active.write().await.take();
        self.events.clear().await;
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Place an owned item (or a combat action) into a slot.
    pub async fn place(
        &self,
        location: SlotLocation,
        stable_id: &StableId,
        override_lock: bool,
    ) -> Result<PlaceOutcome, LayoutError> {
        let owner = self.active_owner().await?;
        let reference = self
            .owned_reference(&owner, stable_id)
            .await
            .map_err(|e| self.surface("place", e))?;
        self.command("place", move |set| {
            set.place(location, reference, override_lock)
        })
        .await
    }

    /// Clear one slot. Clearing an empty slot is not an error.
    pub async fn remove(
        &self,
        location: SlotLocation,
        override_lock: bool,
    ) -> Result<Option<ItemReference>, LayoutError> {
        self.command("remove", move |set| set.remove(location, override_lock))
            .await
    }

    /// Move an occupied slot onto another slot, exchanging contents.
    pub async fn swap(
        &self,
        source: SlotLocation,
        target: SlotLocation,
        override_lock: bool,
    ) -> Result<SwapOutcome, LayoutError> {
        self.command("swap", move |set| set.swap(source, target, override_lock))
            .await
    }

    /// Resolve items and place them, sorted, into the free slots of `grid`.
    ///
    /// Unknown or foreign ids are skipped with a warning and reported as
    /// `unresolved`.
    pub async fn bulk_populate(
        &self,
        grid: GridKey,
        stable_ids: &[StableId],
    ) -> Result<BulkPlacement, LayoutError> {
        let owner = self.active_owner().await?;
        let mut candidates = Vec::with_capacity(stable_ids.len());
        let mut unresolved = Vec::new();
        for stable_id in stable_ids {
            match self.owned_attributes(&owner, stable_id).await {
                Ok(attrs) => candidates.push(attrs),
                Err(e) => {
                    tracing::warn!(owner = %owner, stable_id = %stable_id, error = %e, "Skipping bulk candidate");
                    unresolved.push(stable_id.clone());
                }
            }
        }

        let mut outcome = self
            .command("bulk_populate", move |set| {
                set.bulk_populate(grid, candidates, false)
            })
            .await?;
        outcome.unresolved = unresolved;
        if outcome.dropped_count() > 0 {
            self.notifier.notify(Notice::info(format!(
                "{} of {} items did not fit in {}",
                outcome.dropped_count(),
                outcome.requested,
                grid
            )));
        }
        Ok(outcome)
    }

    /// Reorder one grid by the sort order.
    pub async fn sort(&self, grid: GridKey) -> Result<(), LayoutError> {
        self.command("sort", move |set| set.sort_grid(grid, false))
            .await
    }

    /// Main container an item would be auto-placed into.
    pub async fn classify(&self, stable_id: &StableId) -> Result<usize, LayoutError> {
        let owner = self.active_owner().await?;
        let attrs = self
            .owned_attributes(&owner, stable_id)
            .await
            .map_err(|e| self.surface("classify", e))?;
        let set = self.snapshot().await.ok_or(LayoutError::NoActiveLayout)?;
        Ok(classify(
            &attrs,
            &self.settings.classifier,
            set.main_grids(),
        ))
    }

    pub async fn clear_grid(&self, grid: GridKey) -> Result<DroppedEntries, LayoutError> {
        self.command("clear_grid", move |set| set.clear_grid(grid, false))
            .await
    }

    /// Flip a grid's lock. Returns the new state.
    pub async fn toggle_lock(&self, grid: GridKey) -> Result<bool, LayoutError> {
        self.command("toggle_lock", move |set| {
            let locked = !set.grid(grid)?.is_locked();
            set.set_locked(grid, locked)?;
            Ok(locked)
        })
        .await
    }

    pub async fn set_allow_duplicate(
        &self,
        grid: GridKey,
        allow: bool,
    ) -> Result<DroppedEntries, LayoutError> {
        self.command("set_allow_duplicate", move |set| {
            set.set_allow_duplicate(grid, allow)
        })
        .await
    }

    /// Add a row to every main grid.
    pub async fn add_row(&self) -> Result<DroppedEntries, LayoutError> {
        self.command("add_row", |set| set.add_main_row()).await
    }

    /// Remove the last row of every main grid, dropping its entries.
    pub async fn remove_row(&self) -> Result<DroppedEntries, LayoutError> {
        self.command("remove_row", |set| set.remove_main_row()).await
    }

    pub async fn resize_grid(
        &self,
        grid: GridKey,
        rows: Option<u32>,
        cols: Option<u32>,
    ) -> Result<DroppedEntries, LayoutError> {
        self.command("resize_grid", move |set| set.resize_grid(grid, rows, cols))
            .await
    }

    pub async fn set_active_weapon_set(&self, index: usize) -> Result<(), LayoutError> {
        self.command("set_active_weapon_set", move |set| {
            set.set_active_weapon_set(index)
        })
        .await
    }

    pub async fn set_portrait_visible(&self, visible: bool) -> Result<(), LayoutError> {
        self.command("set_portrait_visible", move |set| {
            set.set_portrait_visible(visible);
            Ok(())
        })
        .await
    }

    /// Open (creating if needed) the popover grid of a container slot.
    pub async fn open_popover(&self, location: SlotLocation) -> Result<GridKey, LayoutError> {
        let owner = self.active_owner().await?;
        let host_id = self
            .snapshot()
            .await
            .and_then(|set| set.get(location).map(|r| r.stable_id.clone()))
            .ok_or_else(|| {
                self.surface(
                    "open_popover",
                    quickslot_domain::ValidationError::EmptySlot(location).into(),
                )
            })?;
        let host = self
            .owned_attributes(&owner, &host_id)
            .await
            .map_err(|e| self.surface("open_popover", e))?;
        let (cols, rows) = (self.settings.popover_cols, self.settings.popover_rows);
        self.command("open_popover", move |set| {
            set.open_popover(location, &host, cols, rows)
        })
        .await
    }

    // =========================================================================
    // Remote and lifecycle
    // =========================================================================

    /// Apply a layout written by the authoritative client.
    ///
    /// Returns whether the active layout was replaced. The authoritative
    /// session ignores remote writes; it is their source.
    pub async fn replace_from_remote(
        &self,
        owner: &OwnerId,
        record: PersistedLayout,
    ) -> Result<bool, LayoutError> {
        if self.has_authority() {
            tracing::debug!(owner = %owner, "Ignoring remote layout on authoritative session");
            return Ok(false);
        }
        let _guard = self.serial.lock().await;

        let restored = record.restore(owner.clone(), &self.settings.layout)?;
        for rejected in &restored.rejected {
            tracing::warn!(
                owner = %owner,
                stable_id = %rejected.stable_id,
                location = %rejected.location,
                reason = %rejected.reason,
                "Dropped remote entry"
            );
        }
        let set = restored.set;
        self.cache.insert(owner.clone(), set.clone()).await;

        let replaced = {
            let mut active = self.active.write().await;
            match active.as_mut() {
                Some(current) if &current.selection.owner == owner => {
                    current.set = set;
                    true
                }
                _ => false,
            }
        };
        if replaced {
            self.events
                .dispatch(LayoutEvent::Changed {
                    owner: owner.clone(),
                })
                .await;
        }
        Ok(replaced)
    }

    /// Forget an instance: drop its cached layout and unload it if active.
    pub async fn cleanup_instance(&self, owner: &OwnerId) {
        let _guard = self.serial.lock().await;
        self.cache.remove(owner).await;
        let unloaded = {
            let mut active = self.active.write().await;
            if active
                .as_ref()
                .is_some_and(|a| &a.selection.owner == owner)
            {
                active.take();
                true
            } else {
                false
            }
        };
        if unloaded {
            self.events
                .dispatch(LayoutEvent::Unloaded {
                    owner: owner.clone(),
                })
                .await;
        }
        tracing::debug!(owner = %owner, unloaded, "Instance cleaned up");
    }

    /// Delete the stored layout of `owner` and forget it in memory.
    pub async fn delete_layout(&self, owner: &OwnerId) -> Result<(), LayoutError> {
        if !self.has_authority() {
            return Err(LayoutError::NotAuthoritative);
        }
        self.store.delete(owner).await?;
        self.cleanup_instance(owner).await;
        Ok(())
    }

    /// Evict expired cache entries. Returns how many were removed.
    pub async fn cleanup_expired_cache(&self) -> usize {
        self.cache.cleanup_expired().await
    }

    // =========================================================================
    // Mutation path
    // =========================================================================

    /// Run an edit against an owner's layout and commit it.
    ///
    /// `f` works on a copy; nothing is committed if it fails, if the result
    /// breaks an invariant, or if it changed nothing. Returns `None` when the
    /// owner has no layout to edit.
    pub(crate) async fn apply<T, F>(
        &self,
        owner: &OwnerId,
        to: ApplyTo,
        f: F,
    ) -> Result<Option<T>, LayoutError>
    where
        F: FnOnce(&mut ContainerSet) -> Result<T, DomainError> + Send,
        T: Send,
    {
        if !self.has_authority() {
            return Err(LayoutError::NotAuthoritative);
        }
        let _guard = self.serial.lock().await;

        let active = self.active_set_of(owner).await;
        let is_active = active.is_some();
        let current = match (active, to) {
            (Some(set), _) => set,
            (None, ApplyTo::ActiveOnly) => return Ok(None),
            (None, ApplyTo::AnyStored) => match self.load_stored(owner).await? {
                Some(set) => set,
                None => return Ok(None),
            },
        };

        let mut next = current.clone();
        let value = f(&mut next)?;
        next.validate()?;
        if next == current {
            return Ok(Some(value));
        }

        if is_active {
            if let Some(active) = self.active.write().await.as_mut() {
                if &active.selection.owner == owner {
                    active.set = next.clone();
                }
            }
        }
        self.commit(owner, next).await;
        Ok(Some(value))
    }

    /// Run a user command against the active layout, surfacing failures.
    async fn command<T, F>(&self, op: &'static str, f: F) -> Result<T, LayoutError>
    where
        F: FnOnce(&mut ContainerSet) -> Result<T, DomainError> + Send,
        T: Send,
    {
        let result = match self.active_owner().await {
            Ok(owner) => self
                .apply(&owner, ApplyTo::ActiveOnly, f)
                .await
                .and_then(|value| value.ok_or(LayoutError::NoActiveLayout)),
            Err(e) => Err(e),
        };
        result.map_err(|e| self.surface(op, e))
    }

    fn surface(&self, op: &'static str, err: LayoutError) -> LayoutError {
        tracing::warn!(op, error = %err, "Layout command rejected");
        self.notifier.notify(err.notice());
        err
    }

    async fn commit(&self, owner: &OwnerId, set: ContainerSet) {
        self.persist(owner, &set).await;
        self.cache.insert(owner.clone(), set).await;
        self.events
            .dispatch(LayoutEvent::Changed {
                owner: owner.clone(),
            })
            .await;
    }

    /// Write the full set. Failures are reported, never retried.
    async fn persist(&self, owner: &OwnerId, set: &ContainerSet) -> bool {
        let record = PersistedLayout::capture(set, self.clock.now());
        match self.store.save(owner, &record).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(owner = %owner, error = %e, "Failed to persist layout");
                self.notifier
                    .notify(Notice::error(format!("Quick slots could not be saved: {e}")));
                self.events
                    .dispatch(LayoutEvent::PersistFailed {
                        owner: owner.clone(),
                        message: e.to_string(),
                    })
                    .await;
                false
            }
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    async fn active_owner(&self) -> Result<OwnerId, LayoutError> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|a| a.selection.owner.clone())
            .ok_or(LayoutError::NoActiveLayout)
    }

    async fn active_set_of(&self, owner: &OwnerId) -> Option<ContainerSet> {
        self.active
            .read()
            .await
            .as_ref()
            .filter(|a| &a.selection.owner == owner)
            .map(|a| a.set.clone())
    }

    /// Cached or stored layout of a non-active owner, without reconciling.
    async fn load_stored(&self, owner: &OwnerId) -> Result<Option<ContainerSet>, LayoutError> {
        if let Some(set) = self.cache.get(owner).await {
            return Ok(Some(set));
        }
        let Some(record) = self.store.load(owner).await? else {
            return Ok(None);
        };
        let restored = record.restore(owner.clone(), &self.settings.layout)?;
        for rejected in &restored.rejected {
            tracing::warn!(owner = %owner, stable_id = %rejected.stable_id, reason = %rejected.reason, "Dropped stored entry");
        }
        Ok(Some(restored.set))
    }

    /// Load, prune and refresh an owner's layout, or build a default one.
    ///
    /// The flag says whether the result differs from what is stored.
    async fn load_or_default(&self, owner: &OwnerId) -> Result<(ContainerSet, bool), LayoutError> {
        if let Some(set) = self.cache.get(owner).await {
            return Ok((set, false));
        }

        let record = match self.store.load(owner).await {
            Ok(record) => record,
            Err(e) => {
                // Keep the unreadable record; serve a default without saving it.
                tracing::error!(owner = %owner, error = %e, "Failed to load layout");
                self.notifier
                    .notify(Notice::error(format!("Quick slots could not be loaded: {e}")));
                return Ok((self.default_layout(owner)?, false));
            }
        };

        let Some(record) = record else {
            let mut set = self.default_layout(owner)?;
            if self.settings.auto_populate_new_layouts {
                self.auto_populate(owner, &mut set).await;
            }
            tracing::info!(owner = %owner, "Created default layout");
            return Ok((set, true));
        };

        let restored = match record.restore(owner.clone(), &self.settings.layout) {
            Ok(restored) => restored,
            Err(e) => {
                tracing::error!(owner = %owner, error = %e, "Stored layout is unusable");
                self.notifier
                    .notify(Notice::error(format!("Quick slots could not be restored: {e}")));
                return Ok((self.default_layout(owner)?, false));
            }
        };
        for rejected in &restored.rejected {
            tracing::warn!(
                owner = %owner,
                stable_id = %rejected.stable_id,
                location = %rejected.location,
                reason = %rejected.reason,
                "Dropped stored entry"
            );
        }

        let mut set = restored.set;
        let reconciled = self.reconcile(owner, &mut set).await;
        Ok((set, reconciled || !restored.rejected.is_empty()))
    }

    /// Prune entries that no longer resolve to an owned item and refresh
    /// cached display fields of the rest. Returns whether anything changed.
    async fn reconcile(&self, owner: &OwnerId, set: &mut ContainerSet) -> bool {
        let items = match self.directory.list(owner).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(owner = %owner, error = %e, "Skipping reconciliation, directory unavailable");
                return false;
            }
        };
        let live: HashMap<StableId, ItemAttributes> = items
            .into_iter()
            .filter(|a| a.is_owned_by(owner))
            .map(|a| (a.stable_id.clone(), a))
            .collect();

        let pruned = set.prune(|id| live.contains_key(id) || self.combat_ids.contains(id));
        for location in &pruned {
            tracing::debug!(owner = %owner, location = %location, "Pruned unresolved entry");
        }

        let mut refreshed = 0;
        for attrs in live.values() {
            refreshed += set.refresh(attrs).len();
        }
        !pruned.is_empty() || refreshed > 0
    }

    fn default_layout(&self, owner: &OwnerId) -> Result<ContainerSet, DomainError> {
        let mut set = ContainerSet::new(owner.clone(), &self.settings.layout)?;
        let combat = set.combat();
        let addresses: Vec<SlotAddress> =
            SlotAddress::row_major(combat.cols(), combat.rows()).collect();
        for (action, address) in self.settings.combat_actions.iter().zip(addresses) {
            let location = SlotLocation::new(GridKey::Combat, address);
            if let Err(e) = set.place(location, action.reference(owner), true) {
                tracing::warn!(stable_id = %action.stable_id, error = %e, "Skipping combat action");
            }
        }
        Ok(set)
    }

    async fn auto_populate(&self, owner: &OwnerId, set: &mut ContainerSet) {
        let items = match self.directory.list(owner).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(owner = %owner, error = %e, "Skipping auto-populate, directory unavailable");
                return;
            }
        };

        let mut groups: BTreeMap<usize, Vec<ItemAttributes>> = BTreeMap::new();
        for attrs in items
            .into_iter()
            .filter(|a| a.is_owned_by(owner) && self.qualifies(a))
        {
            let index = classify(&attrs, &self.settings.classifier, set.main_grids());
            groups.entry(index).or_default().push(attrs);
        }

        for (index, candidates) in groups {
            let grid = GridKey::Main(index);
            match set.bulk_populate(grid, candidates, true) {
                Ok(outcome) if outcome.dropped_count() > 0 => {
                    tracing::info!(
                        owner = %owner,
                        grid = %grid,
                        placed = outcome.placed_count(),
                        dropped = outcome.dropped_count(),
                        "Grid full during auto-populate"
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(owner = %owner, grid = %grid, error = %e, "Auto-populate failed"),
            }
        }
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve an item and check that `owner` owns it.
    pub(crate) async fn owned_attributes(
        &self,
        owner: &OwnerId,
        stable_id: &StableId,
    ) -> Result<ItemAttributes, LayoutError> {
        let attrs = self
            .directory
            .resolve(stable_id)
            .await?
            .ok_or_else(|| LayoutError::Resolution(stable_id.clone()))?;
        if !attrs.is_owned_by(owner) {
            return Err(DomainError::ownership(
                stable_id.clone(),
                owner.clone(),
                Some(attrs.owner_id),
            )
            .into());
        }
        Ok(attrs)
    }

    /// Reference for a placement. Combat actions need no resolution.
    async fn owned_reference(
        &self,
        owner: &OwnerId,
        stable_id: &StableId,
    ) -> Result<ItemReference, LayoutError> {
        if let Some(action) = self
            .settings
            .combat_actions
            .iter()
            .find(|a| &a.stable_id == stable_id)
        {
            return Ok(action.reference(owner));
        }
        let attrs = self.owned_attributes(owner, stable_id).await?;
        Ok(ItemReference::from_attributes(&attrs))
    }
}
