//! Panel settings.
//!
//! Loaded from `QUICKSLOT_*` environment variables, with a `.env` /
//! `.env.local` at the repo root taken into account first. Malformed values
//! log a warning and fall back to the default.
//!
//! | Variable | Default |
//! |---|---|
//! | `QUICKSLOT_MAIN_CONTAINERS` | 3 |
//! | `QUICKSLOT_MAIN_COLS` / `QUICKSLOT_MAIN_ROWS` | 5 / 3 |
//! | `QUICKSLOT_WEAPON_SETS` | 3 |
//! | `QUICKSLOT_WEAPON_SET_COLS` / `QUICKSLOT_WEAPON_SET_ROWS` | 2 / 1 |
//! | `QUICKSLOT_COMBAT_COLS` / `QUICKSLOT_COMBAT_ROWS` | 3 / 3 |
//! | `QUICKSLOT_POPOVER_COLS` / `QUICKSLOT_POPOVER_ROWS` | 3 / 2 |
//! | `QUICKSLOT_ALLOW_PASSIVE` | false |
//! | `QUICKSLOT_CLASSIFIER` | JSON, see [`default_classifier`] |
//! | `QUICKSLOT_AUTO_POPULATE` | true |
//! | `QUICKSLOT_CACHE_TTL_SECS` | 1800 |
//! | `QUICKSLOT_STORAGE_DIR` | platform data dir + `layouts` |

use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use quickslot_domain::{
    CategoryMatcher, ClassifierConfig, ContainerSetLayout, ItemAttributes, ItemReference, OwnerId,
    StableId,
};
use serde::{Deserialize, Serialize};

/// One entry of the fixed combat action grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatAction {
    pub stable_id: StableId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl CombatAction {
    pub fn reference(&self, owner: &OwnerId) -> ItemReference {
        let mut attrs =
            ItemAttributes::new(self.stable_id.clone(), owner.clone(), &self.name, "action");
        if let Some(icon) = &self.icon {
            attrs = attrs.with_icon(icon);
        }
        ItemReference::from_attributes(&attrs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelSettings {
    pub layout: ContainerSetLayout,
    pub popover_cols: u32,
    pub popover_rows: u32,
    /// Auto-add items without an activation
    pub allow_passive: bool,
    pub classifier: ClassifierConfig,
    pub combat_actions: Vec<CombatAction>,
    /// Populate a layout from owned items when none is stored
    pub auto_populate_new_layouts: bool,
    pub cache_ttl_secs: u64,
    pub storage_dir: Option<PathBuf>,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            layout: ContainerSetLayout::default(),
            popover_cols: 3,
            popover_rows: 2,
            allow_passive: false,
            classifier: default_classifier(),
            combat_actions: default_combat_actions(),
            auto_populate_new_layouts: true,
            cache_ttl_secs: 30 * 60,
            storage_dir: None,
        }
    }
}

/// Weapons and equipment, then spells, then features and consumables.
pub fn default_classifier() -> ClassifierConfig {
    let set = |categories: &[&str]| -> Vec<CategoryMatcher> {
        categories
            .iter()
            .map(|c| CategoryMatcher::Category((*c).to_string()))
            .collect()
    };
    ClassifierConfig::new(vec![
        set(&["weapon", "equipment"]),
        set(&["spell"]),
        set(&["feat", "consumable", "tool"]),
    ])
}

fn default_combat_actions() -> Vec<CombatAction> {
    [
        "Dash",
        "Disengage",
        "Dodge",
        "Help",
        "Hide",
        "Ready",
        "Search",
        "Grapple",
        "Shove",
    ]
    .into_iter()
    .filter_map(|name| {
        let stable_id = StableId::new(format!("combat.{}", name.to_lowercase())).ok()?;
        Some(CombatAction {
            stable_id,
            name: name.to_string(),
            icon: None,
        })
    })
    .collect()
}

impl PanelSettings {
    /// Load settings from the environment (and `.env` files).
    pub fn from_env() -> Self {
        load_dotenv_from_repo_root();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let layout = ContainerSetLayout {
            main_count: parse_var(&lookup, "QUICKSLOT_MAIN_CONTAINERS", defaults.layout.main_count),
            main_cols: parse_var(&lookup, "QUICKSLOT_MAIN_COLS", defaults.layout.main_cols),
            main_rows: parse_var(&lookup, "QUICKSLOT_MAIN_ROWS", defaults.layout.main_rows),
            weapon_set_count: parse_var(
                &lookup,
                "QUICKSLOT_WEAPON_SETS",
                defaults.layout.weapon_set_count,
            ),
            weapon_set_cols: parse_var(
                &lookup,
                "QUICKSLOT_WEAPON_SET_COLS",
                defaults.layout.weapon_set_cols,
            ),
            weapon_set_rows: parse_var(
                &lookup,
                "QUICKSLOT_WEAPON_SET_ROWS",
                defaults.layout.weapon_set_rows,
            ),
            combat_cols: parse_var(&lookup, "QUICKSLOT_COMBAT_COLS", defaults.layout.combat_cols),
            combat_rows: parse_var(&lookup, "QUICKSLOT_COMBAT_ROWS", defaults.layout.combat_rows),
        };

        let classifier = match lookup("QUICKSLOT_CLASSIFIER") {
            Some(raw) => serde_json::from_str::<ClassifierConfig>(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Invalid QUICKSLOT_CLASSIFIER, using default");
                defaults.classifier.clone()
            }),
            None => defaults.classifier.clone(),
        };

        Self {
            layout,
            popover_cols: parse_var(&lookup, "QUICKSLOT_POPOVER_COLS", defaults.popover_cols),
            popover_rows: parse_var(&lookup, "QUICKSLOT_POPOVER_ROWS", defaults.popover_rows),
            allow_passive: parse_var(&lookup, "QUICKSLOT_ALLOW_PASSIVE", defaults.allow_passive),
            classifier,
            combat_actions: defaults.combat_actions,
            auto_populate_new_layouts: parse_var(
                &lookup,
                "QUICKSLOT_AUTO_POPULATE",
                defaults.auto_populate_new_layouts,
            ),
            cache_ttl_secs: parse_var(&lookup, "QUICKSLOT_CACHE_TTL_SECS", defaults.cache_ttl_secs),
            storage_dir: lookup("QUICKSLOT_STORAGE_DIR")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Configured directory, or the platform data directory.
    pub fn storage_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage_dir {
            return dir.clone();
        }
        match ProjectDirs::from("io", "quickslot", "quickslot") {
            Some(dirs) => dirs.data_dir().join("layouts"),
            None => PathBuf::from("quickslot_layouts"),
        }
    }

    pub fn combat_ids(&self) -> HashSet<StableId> {
        self.combat_actions
            .iter()
            .map(|a| a.stable_id.clone())
            .collect()
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Invalid setting, using default");
            default
        }
    }
}

/// Load `.env.local` then `.env` from the repo root. Existing variables win.
pub fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
