//! Item lifecycle reconciliation.
//!
//! Keeps layouts consistent with the owning entity's items: new qualifying
//! items are auto-placed, deleted items are removed everywhere, and changes
//! either toggle presence (preparation state) or refresh cached display
//! fields. An item handed to another owner leaves every grid of the previous
//! owner. Each event saves each affected layout at most once.

use std::collections::BTreeSet;
use std::sync::Arc;

use quickslot_domain::{
    classify, DomainError, GridKey, ItemAttributes, ItemReference, OwnerId, SlotLocation, StableId,
};

use crate::infrastructure::ports::Notice;
use crate::use_cases::layout::{ApplyTo, LayoutError, LayoutSession};

/// Item fields a change notification can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemField {
    Name,
    Icon,
    Category,
    Activation,
    Tier,
    /// Prepared / equipped style enabled state
    Preparation,
    Other,
}

/// Something happened to an item of an owning entity.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEvent {
    Added(ItemAttributes),
    Removed {
        owner: OwnerId,
        stable_id: StableId,
    },
    Changed {
        item: ItemAttributes,
        changed: BTreeSet<ItemField>,
    },
    /// The item now belongs to `item.owner_id`; it keeps its stable id.
    Transferred { from: OwnerId, item: ItemAttributes },
}

impl ItemEvent {
    pub fn owner(&self) -> &OwnerId {
        match self {
            Self::Added(item) | Self::Changed { item, .. } | Self::Transferred { item, .. } => {
                &item.owner_id
            }
            Self::Removed { owner, .. } => owner,
        }
    }
}

/// Why an event caused no mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Only the authoritative client reconciles
    NotAuthoritative,
    /// The owner has no layout yet
    NoLayout,
    /// No activation and passive items are not auto-added, or disabled
    NotQualifying,
    AlreadyPresent,
    CombatAction,
    /// Change to an item that is not on the panel
    NotPresent,
    /// Nothing visible changed
    Unchanged,
    /// A placement rule blocked the edit
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Placed(SlotLocation),
    Removed(Vec<SlotLocation>),
    Refreshed(Vec<SlotLocation>),
    /// The preferred grid had no free slot; nothing changed
    PlacementFailed { stable_id: StableId, grid: GridKey },
    /// Cleared from the previous owner, then reconciled for the new one
    Transferred {
        removed: Vec<SlotLocation>,
        added: Box<SyncOutcome>,
    },
    Skipped(SkipReason),
}

enum AddResult {
    Placed(SlotLocation),
    AlreadyPresent,
    Full(GridKey),
}

pub struct SyncEngine {
    session: Arc<LayoutSession>,
    /// Tell the user when an auto-add finds its grid full
    notify_placement_failures: bool,
}

impl SyncEngine {
    pub fn new(session: Arc<LayoutSession>) -> Self {
        Self {
            session,
            notify_placement_failures: true,
        }
    }

    pub fn with_placement_notices(mut self, enabled: bool) -> Self {
        self.notify_placement_failures = enabled;
        self
    }

    /// Reconcile one item event against the owner's layout.
    ///
    /// Failed preconditions are logged and reported as skipped; only
    /// storage and directory failures come back as errors.
    pub async fn handle(&self, event: ItemEvent) -> Result<SyncOutcome, LayoutError> {
        if !self.session.has_authority() {
            return Ok(SyncOutcome::Skipped(SkipReason::NotAuthoritative));
        }
        let owner = event.owner().clone();
        let result = match event {
            ItemEvent::Added(item) => self.item_added(&item).await,
            ItemEvent::Removed { owner, stable_id } => self.item_removed(&owner, &stable_id).await,
            ItemEvent::Changed { item, changed } => self.item_changed(&item, &changed).await,
            ItemEvent::Transferred { from, item } => self.item_transferred(&from, &item).await,
        };
        rejected_as_skip(&owner, result)
    }

    async fn item_added(&self, item: &ItemAttributes) -> Result<SyncOutcome, LayoutError> {
        if self.session.is_combat_action(&item.stable_id) {
            return Ok(SyncOutcome::Skipped(SkipReason::CombatAction));
        }
        if !self.session.qualifies(item) {
            tracing::debug!(stable_id = %item.stable_id, "Item does not qualify for auto-add");
            return Ok(SyncOutcome::Skipped(SkipReason::NotQualifying));
        }

        let classifier = self.session.settings().classifier.clone();
        let attrs = item.clone();
        let applied = self
            .session
            .apply(&item.owner_id, ApplyTo::AnyStored, move |set| {
                if set.contains_in_main(&attrs.stable_id) {
                    return Ok(AddResult::AlreadyPresent);
                }
                let grid = GridKey::Main(classify(&attrs, &classifier, set.main_grids()));
                let Some(address) = set.grid(grid)?.find_first_free_address() else {
                    return Ok(AddResult::Full(grid));
                };
                let location = SlotLocation::new(grid, address);
                set.place(location, ItemReference::from_attributes(&attrs), false)?;
                Ok(AddResult::Placed(location))
            })
            .await?;

        Ok(match applied {
            None => SyncOutcome::Skipped(SkipReason::NoLayout),
            Some(AddResult::AlreadyPresent) => SyncOutcome::Skipped(SkipReason::AlreadyPresent),
            Some(AddResult::Placed(location)) => {
                tracing::debug!(stable_id = %item.stable_id, location = %location, "Auto-placed item");
                SyncOutcome::Placed(location)
            }
            Some(AddResult::Full(grid)) => {
                tracing::info!(stable_id = %item.stable_id, grid = %grid, "No free slot for new item");
                if self.notify_placement_failures {
                    self.session.notifier().notify(Notice::info(format!(
                        "No free slot in {} for {}",
                        grid, item.name
                    )));
                }
                SyncOutcome::PlacementFailed {
                    stable_id: item.stable_id.clone(),
                    grid,
                }
            }
        })
    }

    async fn item_removed(
        &self,
        owner: &OwnerId,
        stable_id: &StableId,
    ) -> Result<SyncOutcome, LayoutError> {
        if self.session.is_combat_action(stable_id) {
            return Ok(SyncOutcome::Skipped(SkipReason::CombatAction));
        }
        let stable_id = stable_id.clone();
        let cleared = self
            .session
            .apply(owner, ApplyTo::AnyStored, move |set| {
                Ok::<_, DomainError>(set.remove_everywhere(&stable_id))
            })
            .await?;
        Ok(match cleared {
            None => SyncOutcome::Skipped(SkipReason::NoLayout),
            Some(cleared) if cleared.is_empty() => SyncOutcome::Skipped(SkipReason::NotPresent),
            Some(cleared) => SyncOutcome::Removed(cleared),
        })
    }

    async fn item_transferred(
        &self,
        from: &OwnerId,
        item: &ItemAttributes,
    ) -> Result<SyncOutcome, LayoutError> {
        if self.session.is_combat_action(&item.stable_id) {
            return Ok(SyncOutcome::Skipped(SkipReason::CombatAction));
        }
        let removed = match self.item_removed(from, &item.stable_id).await? {
            SyncOutcome::Removed(locations) => locations,
            _ => Vec::new(),
        };
        let added = rejected_as_skip(&item.owner_id, self.item_added(item).await)?;
        tracing::debug!(
            stable_id = %item.stable_id,
            from = %from,
            to = %item.owner_id,
            removed = removed.len(),
            "Item changed owner"
        );
        Ok(SyncOutcome::Transferred {
            removed,
            added: Box::new(added),
        })
    }

    async fn item_changed(
        &self,
        item: &ItemAttributes,
        changed: &BTreeSet<ItemField>,
    ) -> Result<SyncOutcome, LayoutError> {
        if self.session.is_combat_action(&item.stable_id) {
            return Ok(SyncOutcome::Skipped(SkipReason::CombatAction));
        }
        let preparation_changed = changed.contains(&ItemField::Preparation);
        if preparation_changed && !item.is_enabled() {
            return self.item_removed(&item.owner_id, &item.stable_id).await;
        }

        let attrs = item.clone();
        let refreshed = self
            .session
            .apply(&item.owner_id, ApplyTo::AnyStored, move |set| {
                let present = !set.locate_all(&attrs.stable_id).is_empty();
                Ok::<_, DomainError>((set.refresh(&attrs), present))
            })
            .await?;

        match refreshed {
            None => Ok(SyncOutcome::Skipped(SkipReason::NoLayout)),
            Some((locations, _)) if !locations.is_empty() => Ok(SyncOutcome::Refreshed(locations)),
            Some(_) if preparation_changed => self.item_added(item).await,
            Some((_, true)) => Ok(SyncOutcome::Skipped(SkipReason::Unchanged)),
            Some((_, false)) => Ok(SyncOutcome::Skipped(SkipReason::NotPresent)),
        }
    }
}

/// Placement rule failures are logged and reported as a skip.
fn rejected_as_skip(
    owner: &OwnerId,
    result: Result<SyncOutcome, LayoutError>,
) -> Result<SyncOutcome, LayoutError> {
    match result {
        Err(LayoutError::Domain(e)) => {
            tracing::warn!(owner = %owner, error = %e, "Sync precondition failed");
            Ok(SyncOutcome::Skipped(SkipReason::Rejected(e.to_string())))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::persistence::MemoryLayoutStore;
    use crate::infrastructure::settings::PanelSettings;
    use crate::infrastructure::ports::LayoutStore;
    use crate::test_fixtures::{
        feat, item, owner, selection, spell, weapon, MemoryDirectory, RecordingNotifier,
    };
    use chrono::Utc;
    use quickslot_domain::{PreparationState, SlotAddress};

    struct Harness {
        session: Arc<LayoutSession>,
        sync: SyncEngine,
        store: Arc<MemoryLayoutStore>,
        directory: Arc<MemoryDirectory>,
        notifier: Arc<RecordingNotifier>,
    }

    async fn harness() -> Harness {
        let store = Arc::new(MemoryLayoutStore::new());
        let directory = Arc::new(MemoryDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let session = Arc::new(LayoutSession::new(
            store.clone(),
            directory.clone(),
            notifier.clone(),
            Arc::new(FixedClock(Utc::now())),
            PanelSettings {
                auto_populate_new_layouts: false,
                ..PanelSettings::default()
            },
        ));
        session.select(selection("hero")).await.unwrap();
        Harness {
            sync: SyncEngine::new(session.clone()),
            session,
            store,
            directory,
            notifier,
        }
    }

    /// Register `attrs` with the directory and place it by hand.
    async fn put(h: &Harness, location: SlotLocation, attrs: &ItemAttributes) {
        h.directory.insert(attrs.clone()).await;
        h.session
            .place(location, &attrs.stable_id, false)
            .await
            .unwrap();
    }

    fn at(index: usize, col: u32, row: u32) -> SlotLocation {
        SlotLocation::new(GridKey::Main(index), SlotAddress::new(col, row))
    }

    fn changed(fields: &[ItemField]) -> BTreeSet<ItemField> {
        fields.iter().copied().collect()
    }

    #[tokio::test]
    async fn added_item_lands_in_its_classified_grid() {
        let h = harness().await;
        let saves = h.store.save_count();

        let outcome = h
            .sync
            .handle(ItemEvent::Added(weapon("hero", "sword", "Sword")))
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Placed(at(0, 0, 0)));
        assert_eq!(h.store.save_count(), saves + 1);
    }

    #[tokio::test]
    async fn added_item_already_present_is_skipped() {
        let h = harness().await;
        let sword = weapon("hero", "sword", "Sword");
        h.sync.handle(ItemEvent::Added(sword.clone())).await.unwrap();
        let saves = h.store.save_count();

        let outcome = h.sync.handle(ItemEvent::Added(sword)).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::AlreadyPresent));
        assert_eq!(h.store.save_count(), saves);
    }

    #[tokio::test]
    async fn passive_items_need_the_policy() {
        let h = harness().await;
        let passive = feat("hero", "toughness", "Toughness");

        let outcome = h.sync.handle(ItemEvent::Added(passive)).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::NotQualifying));
    }

    #[tokio::test]
    async fn combat_actions_are_never_auto_added() {
        let h = harness().await;
        let mut dodge = weapon("hero", "dodge", "Dodge");
        dodge.stable_id = StableId::new("combat.dodge").unwrap();

        let outcome = h.sync.handle(ItemEvent::Added(dodge)).await.unwrap();

        assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::CombatAction));
    }

    #[tokio::test]
    async fn full_grid_reports_placement_failure_without_saving() {
        let h = harness().await;
        h.session.remove_row().await.unwrap();
        h.session.remove_row().await.unwrap();
        for i in 0..5 {
            h.sync
                .handle(ItemEvent::Added(weapon("hero", &format!("w{i}"), "Blade")))
                .await
                .unwrap();
        }
        let saves = h.store.save_count();

        let outcome = h
            .sync
            .handle(ItemEvent::Added(weapon("hero", "extra", "Extra")))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            SyncOutcome::PlacementFailed {
                grid: GridKey::Main(0),
                ..
            }
        ));
        assert_eq!(h.store.save_count(), saves);
        assert_eq!(h.notifier.notices().len(), 1);
    }

    #[tokio::test]
    async fn removed_item_is_cleared_everywhere() {
        let h = harness().await;
        let sword = weapon("hero", "sword", "Sword");
        h.sync.handle(ItemEvent::Added(sword.clone())).await.unwrap();

        let outcome = h
            .sync
            .handle(ItemEvent::Removed {
                owner: owner("hero"),
                stable_id: sword.stable_id.clone(),
            })
            .await
            .unwrap();

        assert_eq!(outcome, SyncOutcome::Removed(vec![at(0, 0, 0)]));
        let set = h.session.snapshot().await.unwrap();
        assert!(set.locate_all(&sword.stable_id).is_empty());
    }

    #[tokio::test]
    async fn removing_an_absent_item_does_not_save() {
        let h = harness().await;
        let saves = h.store.save_count();
        let outcome = h
            .sync
            .handle(ItemEvent::Removed {
                owner: owner("hero"),
                stable_id: StableId::new("Actor.hero.Item.ghost").unwrap(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::NotPresent));
        assert_eq!(h.store.save_count(), saves);
    }

    #[tokio::test]
    async fn unprepared_spell_is_removed_and_returns_when_prepared() {
        let h = harness().await;
        let shield = spell("hero", "shield", "Shield", 1)
            .with_preparation(PreparationState::prepared(true));
        h.sync.handle(ItemEvent::Added(shield.clone())).await.unwrap();

        let unprepared = shield
            .clone()
            .with_preparation(PreparationState::prepared(false));
        let outcome = h
            .sync
            .handle(ItemEvent::Changed {
                item: unprepared,
                changed: changed(&[ItemField::Preparation]),
            })
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Removed(vec![at(1, 0, 0)]));

        let outcome = h
            .sync
            .handle(ItemEvent::Changed {
                item: shield,
                changed: changed(&[ItemField::Preparation]),
            })
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Placed(at(1, 0, 0)));
    }

    #[tokio::test]
    async fn renames_refresh_present_items_only() {
        let h = harness().await;
        let sword = weapon("hero", "sword", "Sword");
        h.sync.handle(ItemEvent::Added(sword)).await.unwrap();

        let outcome = h
            .sync
            .handle(ItemEvent::Changed {
                item: weapon("hero", "sword", "Longsword"),
                changed: changed(&[ItemField::Name]),
            })
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Refreshed(vec![at(0, 0, 0)]));
        let set = h.session.snapshot().await.unwrap();
        assert_eq!(set.get(at(0, 0, 0)).unwrap().name(), Some("Longsword"));

        let outcome = h
            .sync
            .handle(ItemEvent::Changed {
                item: weapon("hero", "axe", "Axe"),
                changed: changed(&[ItemField::Name]),
            })
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::NotPresent));
    }

    #[tokio::test]
    async fn changes_reach_items_outside_the_main_grids() {
        let h = harness().await;
        let prepared = PreparationState::prepared(true);
        let shield = spell("hero", "shield", "Shield", 1).with_preparation(prepared);
        let bolt = spell("hero", "bolt", "Witch Bolt", 1).with_preparation(prepared);
        let bag = item("hero", "bag", "Bag", "backpack");

        let in_set = SlotLocation::new(GridKey::WeaponSet(0), SlotAddress::new(0, 0));
        put(&h, in_set, &shield).await;
        put(&h, at(2, 0, 0), &bag).await;
        let popover = h.session.open_popover(at(2, 0, 0)).await.unwrap();
        let in_bag = SlotLocation::new(popover, SlotAddress::new(0, 0));
        put(&h, in_bag, &bolt).await;

        for (attrs, location, name) in [(&shield, in_set, "Great Shield"), (&bolt, in_bag, "Bolt")] {
            let mut renamed = attrs.clone();
            renamed.name = name.to_string();
            let outcome = h
                .sync
                .handle(ItemEvent::Changed {
                    item: renamed,
                    changed: changed(&[ItemField::Name]),
                })
                .await
                .unwrap();
            assert_eq!(outcome, SyncOutcome::Refreshed(vec![location]));
            let set = h.session.snapshot().await.unwrap();
            assert_eq!(set.get(location).unwrap().name(), Some(name));
        }

        for (attrs, location) in [(&shield, in_set), (&bolt, in_bag)] {
            let outcome = h
                .sync
                .handle(ItemEvent::Changed {
                    item: attrs
                        .clone()
                        .with_preparation(PreparationState::prepared(false)),
                    changed: changed(&[ItemField::Preparation]),
                })
                .await
                .unwrap();
            assert_eq!(outcome, SyncOutcome::Removed(vec![location]));
        }

        let set = h.session.snapshot().await.unwrap();
        assert!(set.grid(GridKey::WeaponSet(0)).unwrap().is_empty());
        assert!(set.grid(popover).unwrap().is_empty());
        assert_eq!(set.get(at(2, 0, 0)).unwrap().stable_id, bag.stable_id);
    }

    #[tokio::test]
    async fn transferred_item_leaves_every_grid_of_the_previous_owner() {
        let h = harness().await;
        h.session.select(selection("sidekick")).await.unwrap();
        h.session.select(selection("hero")).await.unwrap();

        let sword = weapon("hero", "sword", "Sword");
        let in_set = SlotLocation::new(GridKey::WeaponSet(0), SlotAddress::new(0, 0));
        put(&h, at(0, 0, 0), &sword).await;
        put(&h, in_set, &sword).await;

        let mut given = sword.clone();
        given.owner_id = owner("sidekick");
        h.directory.insert(given.clone()).await;
        let outcome = h
            .sync
            .handle(ItemEvent::Transferred {
                from: owner("hero"),
                item: given,
            })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            SyncOutcome::Transferred {
                removed: vec![at(0, 0, 0), in_set],
                added: Box::new(SyncOutcome::Placed(at(0, 0, 0))),
            }
        );
        let hero = h.session.snapshot().await.unwrap();
        assert!(hero.locate_all(&sword.stable_id).is_empty());
        let sidekick = h.store.load(&owner("sidekick")).await.unwrap().unwrap();
        assert!(sidekick.containers[0]
            .items
            .values()
            .any(|entry| entry.stable_id == sword.stable_id));
    }

    #[tokio::test]
    async fn locked_target_grid_is_a_logged_skip() {
        let h = harness().await;
        h.session.toggle_lock(GridKey::Main(0)).await.unwrap();

        let outcome = h
            .sync
            .handle(ItemEvent::Added(weapon("hero", "sword", "Sword")))
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            SyncOutcome::Skipped(SkipReason::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn events_for_other_owners_update_their_stored_layouts() {
        let h = harness().await;
        h.session.select(selection("sidekick")).await.unwrap();

        let outcome = h
            .sync
            .handle(ItemEvent::Added(weapon("hero", "sword", "Sword")))
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Placed(at(0, 0, 0)));

        let outcome = h
            .sync
            .handle(ItemEvent::Added(weapon("nobody", "axe", "Axe")))
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::NoLayout));

        let sidekick = h.session.snapshot().await.unwrap();
        assert!(sidekick.main_grids()[0].is_empty());
    }

    #[tokio::test]
    async fn viewers_do_not_reconcile() {
        let h = harness().await;
        h.session.set_authority(false);
        let outcome = h
            .sync
            .handle(ItemEvent::Added(weapon("hero", "sword", "Sword")))
            .await
            .unwrap();
        assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::NotAuthoritative));
    }
}
