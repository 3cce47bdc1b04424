//! End-to-end scenarios driven through `App` with in-memory adapters.
//!
//! Each test wires a full application (session, sync engine, drag/drop)
//! against a memory or file store and the map-backed directory.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use quickslot_domain::{GridKey, HostKey, PreparationState, SlotAddress, SlotLocation, StableId};

use crate::app::App;
use crate::infrastructure::clock::FixedClock;
use crate::infrastructure::persistence::{FileLayoutStore, MemoryLayoutStore};
use crate::infrastructure::ports::LayoutStore;
use crate::infrastructure::settings::PanelSettings;
use crate::test_fixtures::{
    item, owner, selection, spell, stable_id, weapon, MemoryDirectory, RecordingNotifier,
};
use crate::use_cases::{DropOutcome, ItemEvent, ItemField, SyncOutcome};

struct World {
    app: App,
    directory: Arc<MemoryDirectory>,
    notifier: Arc<RecordingNotifier>,
}

fn settings() -> PanelSettings {
    PanelSettings {
        auto_populate_new_layouts: false,
        ..PanelSettings::default()
    }
}

fn world_with(store: Arc<dyn LayoutStore>, directory: Arc<MemoryDirectory>) -> World {
    let notifier = Arc::new(RecordingNotifier::new());
    let app = App::new(
        store,
        directory.clone(),
        notifier.clone(),
        Arc::new(FixedClock(
            Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
        )),
        settings(),
    );
    World {
        app,
        directory,
        notifier,
    }
}

async fn world() -> World {
    let w = world_with(
        Arc::new(MemoryLayoutStore::new()),
        Arc::new(MemoryDirectory::new()),
    );
    w.app.session.select(selection("hero")).await.unwrap();
    w
}

fn at(index: usize, col: u32, row: u32) -> SlotLocation {
    SlotLocation::new(GridKey::Main(index), SlotAddress::new(col, row))
}

fn prep(prepared: bool) -> PreparationState {
    PreparationState::prepared(prepared)
}

#[tokio::test]
async fn new_spell_lands_first_in_the_spell_grid() {
    let w = world().await;

    let outcome = w
        .app
        .sync
        .handle(ItemEvent::Added(spell("hero", "bolt", "Fire Bolt", 0)))
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Placed(at(1, 0, 0)));
    let set = w.app.session.snapshot().await.unwrap();
    assert_eq!(set.main_grids()[1].cols(), 5);
    assert_eq!(set.main_grids()[1].rows(), 3);
}

#[tokio::test]
async fn spells_fill_the_first_row_left_to_right() {
    let w = world().await;
    for key in ["bolt", "ray"] {
        w.app
            .sync
            .handle(ItemEvent::Added(spell("hero", key, key, 0)))
            .await
            .unwrap();
    }

    let outcome = w
        .app
        .sync
        .handle(ItemEvent::Added(spell("hero", "missile", "Magic Missile", 1)))
        .await
        .unwrap();

    assert_eq!(outcome, SyncOutcome::Placed(at(1, 2, 0)));
}

#[tokio::test]
async fn re_prepared_spell_moves_to_its_classified_grid() {
    let w = world().await;
    let shield = spell("hero", "shield", "Shield", 1).with_preparation(prep(true));
    w.directory.insert(shield.clone()).await;
    w.app
        .session
        .place(at(0, 0, 0), &shield.stable_id, false)
        .await
        .unwrap();

    for prepared in [false, true] {
        w.app
            .sync
            .handle(ItemEvent::Changed {
                item: shield.clone().with_preparation(prep(prepared)),
                changed: [ItemField::Preparation].into_iter().collect(),
            })
            .await
            .unwrap();
    }

    let set = w.app.session.snapshot().await.unwrap();
    assert_eq!(set.locate_all(&shield.stable_id), vec![at(1, 0, 0)]);
    assert!(set.main_grids()[0].is_empty());
}

#[tokio::test]
async fn bulk_populate_skips_spells_already_on_the_panel() {
    let w = world().await;
    let ids: Vec<StableId> = (0..7).map(|i| stable_id("hero", &format!("s{i}"))).collect();
    for i in 0..7 {
        let key = format!("s{i}");
        w.directory.insert(spell("hero", &key, &key, i % 3)).await;
    }
    for (col, id) in ids.iter().take(2).enumerate() {
        w.app
            .session
            .place(at(0, col as u32, 0), id, false)
            .await
            .unwrap();
    }

    let outcome = w
        .app
        .session
        .bulk_populate(GridKey::Main(1), &ids)
        .await
        .unwrap();

    assert_eq!(outcome.requested, 7);
    assert_eq!(outcome.placed_count(), 5);
    assert_eq!(outcome.already_present.len(), 2);
    assert_eq!(outcome.dropped_count(), 0);
}

#[tokio::test]
async fn bulk_populate_overflow_keeps_the_first_in_sort_order() {
    let w = world().await;
    w.app.session.remove_row().await.unwrap();
    w.app.session.remove_row().await.unwrap();
    w.directory.insert(weapon("hero", "filler1", "Filler")).await;
    w.directory.insert(weapon("hero", "filler2", "Filler")).await;
    w.app
        .session
        .place(at(1, 0, 0), &stable_id("hero", "filler1"), false)
        .await
        .unwrap();
    w.app
        .session
        .place(at(1, 1, 0), &stable_id("hero", "filler2"), false)
        .await
        .unwrap();

    let mut ids = Vec::new();
    for (key, tier) in [("e", 4), ("a", 0), ("d", 3), ("b", 1), ("c", 2)] {
        w.directory.insert(spell("hero", key, key, tier)).await;
        ids.push(stable_id("hero", key));
    }

    let outcome = w
        .app
        .session
        .bulk_populate(GridKey::Main(1), &ids)
        .await
        .unwrap();

    assert_eq!(outcome.placed_count(), 3);
    assert_eq!(
        outcome.dropped,
        vec![stable_id("hero", "d"), stable_id("hero", "e")]
    );
    let set = w.app.session.snapshot().await.unwrap();
    assert_eq!(set.get(at(1, 2, 0)).unwrap().stable_id, stable_id("hero", "a"));
    assert_eq!(set.get(at(1, 4, 0)).unwrap().stable_id, stable_id("hero", "c"));
}

#[tokio::test]
async fn dragging_onto_an_occupied_slot_swaps_exactly() {
    let w = world().await;
    w.directory.insert(weapon("hero", "sword", "Sword")).await;
    w.directory.insert(weapon("hero", "bow", "Bow")).await;
    let sword = stable_id("hero", "sword");
    let bow = stable_id("hero", "bow");
    w.app.session.place(at(0, 0, 0), &sword, false).await.unwrap();
    w.app.session.place(at(0, 1, 1), &bow, false).await.unwrap();

    w.app.drag_drop.start_from_slot(at(0, 0, 0)).await.unwrap();
    let outcome = w
        .app
        .drag_drop
        .drop_on(Some(at(0, 1, 1)), false)
        .await
        .unwrap();

    assert!(matches!(outcome, DropOutcome::Swapped(_)));
    let set = w.app.session.snapshot().await.unwrap();
    assert_eq!(set.get(at(0, 0, 0)).unwrap().stable_id, bow);
    assert_eq!(set.get(at(0, 1, 1)).unwrap().stable_id, sword);
    assert_eq!(set.main_grids()[0].len(), 2);
}

#[tokio::test]
async fn layout_survives_a_save_and_reload() {
    let store: Arc<dyn LayoutStore> = Arc::new(MemoryLayoutStore::new());
    let directory = Arc::new(MemoryDirectory::new());
    directory.insert(weapon("hero", "sword", "Sword")).await;
    directory.insert(spell("hero", "bolt", "Fire Bolt", 0)).await;
    directory
        .insert(item("hero", "pack", "Backpack", "backpack"))
        .await;
    directory.insert(item("hero", "rope", "Rope", "tool")).await;

    let first = world_with(store.clone(), directory.clone());
    let session = &first.app.session;
    session.select(selection("hero")).await.unwrap();
    session
        .place(at(0, 0, 0), &stable_id("hero", "sword"), false)
        .await
        .unwrap();
    session
        .place(at(1, 2, 1), &stable_id("hero", "bolt"), false)
        .await
        .unwrap();
    session
        .set_allow_duplicate(GridKey::Main(2), true)
        .await
        .unwrap();
    session
        .place(at(2, 0, 0), &stable_id("hero", "bolt"), false)
        .await
        .unwrap();
    let pack = at(0, 4, 2);
    session
        .place(pack, &stable_id("hero", "pack"), false)
        .await
        .unwrap();
    let popover = session.open_popover(pack).await.unwrap();
    assert_eq!(
        popover,
        GridKey::Popover {
            host: HostKey::Main(0),
            address: SlotAddress::new(4, 2),
        }
    );
    session
        .place(
            SlotLocation::new(popover, SlotAddress::new(1, 1)),
            &stable_id("hero", "rope"),
            false,
        )
        .await
        .unwrap();
    session
        .place(
            SlotLocation::new(GridKey::WeaponSet(1), SlotAddress::new(0, 0)),
            &stable_id("hero", "sword"),
            false,
        )
        .await
        .unwrap();
    session.toggle_lock(GridKey::Main(1)).await.unwrap();
    session.set_active_weapon_set(1).await.unwrap();
    session.set_portrait_visible(false).await.unwrap();
    let saved = session.snapshot().await.unwrap();

    let second = world_with(store, directory);
    second.app.session.select(selection("hero")).await.unwrap();
    let loaded = second.app.session.snapshot().await.unwrap();

    assert_eq!(loaded, saved);
    assert!(first.notifier.notices().is_empty());
}

#[tokio::test]
async fn reload_prunes_items_deleted_while_away() {
    let store: Arc<dyn LayoutStore> = Arc::new(MemoryLayoutStore::new());
    let directory = Arc::new(MemoryDirectory::new());
    directory.insert(weapon("hero", "sword", "Sword")).await;
    directory.insert(weapon("hero", "bow", "Bow")).await;

    let first = world_with(store.clone(), directory.clone());
    first.app.session.select(selection("hero")).await.unwrap();
    first
        .app
        .session
        .place(at(0, 0, 0), &stable_id("hero", "sword"), false)
        .await
        .unwrap();
    first
        .app
        .session
        .place(at(0, 1, 0), &stable_id("hero", "bow"), false)
        .await
        .unwrap();

    directory.remove(&stable_id("hero", "bow")).await;
    let second = world_with(store.clone(), directory);
    second.app.session.select(selection("hero")).await.unwrap();

    let set = second.app.session.snapshot().await.unwrap();
    assert_eq!(set.main_grids()[0].len(), 1);
    assert_eq!(set.combat().len(), 9);
    let record = store.load(&owner("hero")).await.unwrap().unwrap();
    assert_eq!(record.containers[0].items.len(), 1);
}

#[tokio::test]
async fn file_store_round_trip_through_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let directory = Arc::new(MemoryDirectory::new());
    directory.insert(weapon("hero", "sword", "Sword")).await;

    let first = world_with(
        Arc::new(FileLayoutStore::new(dir.path())),
        directory.clone(),
    );
    first.app.session.select(selection("hero")).await.unwrap();
    first
        .app
        .session
        .place(at(2, 3, 1), &stable_id("hero", "sword"), false)
        .await
        .unwrap();
    let saved = first.app.session.snapshot().await.unwrap();

    let second = world_with(Arc::new(FileLayoutStore::new(dir.path())), directory);
    second.app.session.select(selection("hero")).await.unwrap();

    assert_eq!(second.app.session.snapshot().await.unwrap(), saved);
}

#[tokio::test]
async fn viewer_follows_the_authoritative_client() {
    let store: Arc<dyn LayoutStore> = Arc::new(MemoryLayoutStore::new());
    let directory = Arc::new(MemoryDirectory::new());
    directory.insert(weapon("hero", "sword", "Sword")).await;

    let gm = world_with(store.clone(), directory.clone());
    gm.app.session.select(selection("hero")).await.unwrap();
    let viewer = world_with(store.clone(), directory);
    viewer.app.session.set_authority(false);
    viewer.app.session.select(selection("hero")).await.unwrap();

    gm.app
        .session
        .place(at(0, 2, 2), &stable_id("hero", "sword"), false)
        .await
        .unwrap();
    let record = store.load(&owner("hero")).await.unwrap().unwrap();
    viewer
        .app
        .session
        .replace_from_remote(&owner("hero"), record)
        .await
        .unwrap();

    assert_eq!(
        viewer.app.session.snapshot().await.unwrap(),
        gm.app.session.snapshot().await.unwrap()
    );
    assert_eq!(
        viewer
            .app
            .sync
            .handle(ItemEvent::Removed {
                owner: owner("hero"),
                stable_id: stable_id("hero", "sword"),
            })
            .await
            .unwrap(),
        SyncOutcome::Skipped(crate::use_cases::SkipReason::NotAuthoritative)
    );
}
