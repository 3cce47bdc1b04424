//! Versioned layout record.
//!
//! The persisted projection of a container set, stored as JSON under
//! [`LAYOUT_NAMESPACE`] on the owning entity. Records without a `version`
//! field were written by older releases and are migrated on read.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use quickslot_domain::{
    CachedDisplay, ContainerSet, ContainerSetLayout, DomainError, GridKey, ItemReference, OwnerId,
    SlotAddress, SlotGrid, SlotLocation, SortHints, StableId,
};

use crate::infrastructure::ports::RepoError;

/// Attribute key the layout lives under.
pub const LAYOUT_NAMESPACE: &str = "quickslot.layout";

/// Current record version.
pub const RECORD_VERSION: u32 = 1;

fn default_true() -> bool {
    true
}

/// Full snapshot of one owner's container set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedLayout {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
    pub containers: Vec<PersistedGrid>,
    #[serde(default)]
    pub weapon_sets: Vec<PersistedGrid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat_grid: Option<PersistedGrid>,
    #[serde(default)]
    pub active_set: usize,
    #[serde(default = "default_true")]
    pub portrait_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedGrid {
    pub index: usize,
    pub cols: u32,
    pub rows: u32,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub allow_duplicate: bool,
    #[serde(default)]
    pub items: BTreeMap<SlotAddress, PersistedEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEntry {
    pub stable_id: StableId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<CachedDisplay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_hints: Option<SortHints>,
    /// Popover grid hosted by this slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_layout: Option<Box<PersistedGrid>>,
}

/// A stored entry that no longer passes placement validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEntry {
    pub location: SlotLocation,
    pub stable_id: StableId,
    pub reason: DomainError,
}

/// Container set rebuilt from a record.
#[derive(Debug)]
pub struct RestoredLayout {
    pub set: ContainerSet,
    pub rejected: Vec<RejectedEntry>,
}

impl PersistedEntry {
    fn capture(reference: &ItemReference) -> Self {
        Self {
            stable_id: reference.stable_id.clone(),
            cached: reference.cached.clone(),
            sort_hints: reference.sort_hints.clone(),
            container_layout: None,
        }
    }

    fn to_reference(&self) -> ItemReference {
        ItemReference {
            stable_id: self.stable_id.clone(),
            cached: self.cached.clone(),
            sort_hints: self.sort_hints.clone(),
        }
    }
}

impl PersistedGrid {
    fn capture(set: &ContainerSet, grid: &SlotGrid) -> Self {
        let items = grid
            .iter()
            .map(|(address, reference)| {
                let mut entry = PersistedEntry::capture(reference);
                entry.container_layout = set
                    .popover_at(grid.location(address))
                    .map(|popover| Box::new(Self::capture(set, popover)));
                (address, entry)
            })
            .collect();
        Self {
            index: grid.index(),
            cols: grid.cols(),
            rows: grid.rows(),
            locked: grid.is_locked(),
            allow_duplicate: grid.allows_duplicates(),
            items,
        }
    }

    fn empty_grid(&self, key: GridKey, rows: Option<u32>) -> Result<SlotGrid, DomainError> {
        Ok(SlotGrid::new(key, self.cols, rows.unwrap_or(self.rows))?
            .with_locked(self.locked)
            .with_allow_duplicate(self.allow_duplicate))
    }
}

impl PersistedLayout {
    /// Snapshot a container set.
    pub fn capture(set: &ContainerSet, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: RECORD_VERSION,
            saved_at: Some(saved_at),
            containers: set
                .main_grids()
                .iter()
                .map(|g| PersistedGrid::capture(set, g))
                .collect(),
            weapon_sets: set
                .weapon_sets()
                .iter()
                .map(|g| PersistedGrid::capture(set, g))
                .collect(),
            combat_grid: Some(PersistedGrid::capture(set, set.combat())),
            active_set: set.active_weapon_set(),
            portrait_visible: set.portrait_visible(),
        }
    }

    /// Rebuild the container set.
    ///
    /// Every entry goes through the same placement checks as a live edit
    /// (locks overridden). Entries that fail are returned, not fatal. Main
    /// grids adopt the first container's row count.
    pub fn restore(
        &self,
        owner: OwnerId,
        defaults: &ContainerSetLayout,
    ) -> Result<RestoredLayout, DomainError> {
        let containers = sorted_by_index(&self.containers);
        let weapon_sets = sorted_by_index(&self.weapon_sets);

        let main = if containers.is_empty() {
            (0..defaults.main_count.max(1))
                .map(|i| SlotGrid::new(GridKey::Main(i), defaults.main_cols, defaults.main_rows))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            let shared_rows = containers[0].rows;
            containers
                .iter()
                .enumerate()
                .map(|(i, g)| g.empty_grid(GridKey::Main(i), Some(shared_rows)))
                .collect::<Result<Vec<_>, _>>()?
        };
        let weapons = weapon_sets
            .iter()
            .enumerate()
            .map(|(i, g)| g.empty_grid(GridKey::WeaponSet(i), None))
            .collect::<Result<Vec<_>, _>>()?;
        let combat = match &self.combat_grid {
            Some(g) => g.empty_grid(GridKey::Combat, None)?,
            None => SlotGrid::new(GridKey::Combat, defaults.combat_cols, defaults.combat_rows)?,
        };
        let mut set = ContainerSet::from_grids(owner, main, weapons, combat)?;

        let mut sources: Vec<(GridKey, &PersistedGrid)> = containers
            .iter()
            .enumerate()
            .map(|(i, g)| (GridKey::Main(i), *g))
            .chain(
                weapon_sets
                    .iter()
                    .enumerate()
                    .map(|(i, g)| (GridKey::WeaponSet(i), *g)),
            )
            .chain(self.combat_grid.iter().map(|g| (GridKey::Combat, g)))
            .collect();
        // Strict grids first so their entries claim the scope before any
        // duplicate-tolerant grid repeats them.
        sources.sort_by_key(|(_, g)| g.allow_duplicate);

        let mut rejected = Vec::new();
        for (key, record) in sources {
            for (address, entry) in &record.items {
                let location = SlotLocation::new(key, *address);
                if let Err(reason) = set.place(location, entry.to_reference(), true) {
                    rejected.push(RejectedEntry {
                        location,
                        stable_id: entry.stable_id.clone(),
                        reason,
                    });
                    continue;
                }
                if let Some(layout) = &entry.container_layout {
                    restore_popover(&mut set, location, entry, layout, &mut rejected);
                }
            }
        }

        if self.active_set < set.weapon_sets().len() {
            set.set_active_weapon_set(self.active_set)?;
        }
        set.set_portrait_visible(self.portrait_visible);
        Ok(RestoredLayout { set, rejected })
    }

    /// Decode a stored JSON value, migrating unversioned records.
    pub fn from_value(value: Value) -> Result<Self, RepoError> {
        if value.get("version").is_some() {
            let record: Self = serde_json::from_value(value).map_err(RepoError::serialization)?;
            if record.version > RECORD_VERSION {
                return Err(RepoError::serialization(format!(
                    "Unsupported layout record version {}",
                    record.version
                )));
            }
            return Ok(record);
        }
        let legacy: LegacyLayout = serde_json::from_value(value).map_err(RepoError::serialization)?;
        tracing::info!("Migrating unversioned layout record");
        Ok(legacy.migrate())
    }

    pub fn to_value(&self) -> Result<Value, RepoError> {
        serde_json::to_value(self).map_err(RepoError::serialization)
    }
}

fn sorted_by_index(grids: &[PersistedGrid]) -> Vec<&PersistedGrid> {
    let mut sorted: Vec<&PersistedGrid> = grids.iter().collect();
    sorted.sort_by_key(|g| g.index);
    sorted
}

fn restore_popover(
    set: &mut ContainerSet,
    host: SlotLocation,
    host_entry: &PersistedEntry,
    layout: &PersistedGrid,
    rejected: &mut Vec<RejectedEntry>,
) {
    let Some(host_key) = host.grid.as_host() else {
        return;
    };
    let key = GridKey::Popover {
        host: host_key,
        address: host.address,
    };
    let attached = layout
        .empty_grid(key, None)
        .and_then(|grid| set.attach_popover(grid));
    if let Err(reason) = attached {
        rejected.push(RejectedEntry {
            location: host,
            stable_id: host_entry.stable_id.clone(),
            reason,
        });
        return;
    }
    for (address, entry) in &layout.items {
        let location = SlotLocation::new(key, *address);
        if let Err(reason) = set.place(location, entry.to_reference(), true) {
            rejected.push(RejectedEntry {
                location,
                stable_id: entry.stable_id.clone(),
                reason,
            });
        }
    }
}

// =============================================================================
// Legacy (unversioned) records
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyLayout {
    #[serde(default)]
    containers: Option<LegacyGrids>,
    #[serde(default)]
    weapon_sets: Option<LegacyGrids>,
    #[serde(default)]
    combat_grid: Option<LegacyGrid>,
    #[serde(default)]
    active_set: Option<usize>,
    #[serde(default)]
    portrait_visible: Option<bool>,
}

/// Older releases wrote grid lists either as arrays or as objects keyed by
/// the index string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyGrids {
    List(Vec<LegacyGrid>),
    Keyed(BTreeMap<String, LegacyGrid>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyGrid {
    cols: u32,
    rows: u32,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    allow_duplicate: bool,
    #[serde(default)]
    items: BTreeMap<String, LegacyEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyEntry {
    uuid: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    img: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    container_layout: Option<Box<LegacyGrid>>,
}

impl LegacyLayout {
    fn migrate(self) -> PersistedLayout {
        PersistedLayout {
            version: RECORD_VERSION,
            saved_at: None,
            containers: self.containers.map(LegacyGrids::migrate).unwrap_or_default(),
            weapon_sets: self.weapon_sets.map(LegacyGrids::migrate).unwrap_or_default(),
            combat_grid: self.combat_grid.map(|g| g.migrate(0)),
            active_set: self.active_set.unwrap_or(0),
            portrait_visible: self.portrait_visible.unwrap_or(true),
        }
    }
}

impl LegacyGrids {
    fn migrate(self) -> Vec<PersistedGrid> {
        match self {
            Self::List(grids) => grids
                .into_iter()
                .enumerate()
                .map(|(i, g)| g.migrate(i))
                .collect(),
            Self::Keyed(grids) => grids
                .into_iter()
                .filter_map(|(key, g)| match key.parse::<usize>() {
                    Ok(index) => Some(g.migrate(index)),
                    Err(_) => {
                        tracing::warn!(key = %key, "Skipping legacy grid with non-numeric index");
                        None
                    }
                })
                .collect(),
        }
    }
}

impl LegacyGrid {
    fn migrate(self, index: usize) -> PersistedGrid {
        let items = self
            .items
            .into_iter()
            .filter_map(|(key, entry)| {
                let address = match key.parse::<SlotAddress>() {
                    Ok(address) => address,
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Skipping legacy slot");
                        return None;
                    }
                };
                entry.migrate().map(|entry| (address, entry))
            })
            .collect();
        PersistedGrid {
            index,
            cols: self.cols,
            rows: self.rows,
            locked: self.locked,
            allow_duplicate: self.allow_duplicate,
            items,
        }
    }
}

impl LegacyEntry {
    fn migrate(self) -> Option<PersistedEntry> {
        let stable_id = match StableId::new(self.uuid) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping legacy entry without an id");
                return None;
            }
        };
        let cached = self.name.map(|name| CachedDisplay {
            name,
            icon: self.img,
            category: self.kind.unwrap_or_default().to_lowercase(),
            activation_kind: None,
        });
        Some(PersistedEntry {
            stable_id,
            cached,
            sort_hints: None,
            container_layout: self.container_layout.map(|g| Box::new((*g).migrate(0))),
        })
    }
}
