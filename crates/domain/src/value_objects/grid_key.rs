//! Grid identity and dedupe scope
//!
//! Each grid in a container set is named by a `GridKey`. The key also fixes
//! the grid's dedupe scope:
//!
//! | Role       | Scope                                   |
//! |------------|-----------------------------------------|
//! | Main       | all main grids together                 |
//! | Weapon set | all weapon-set grids together           |
//! | Combat     | the combat grid alone                   |
//! | Popover    | the popover's own contents              |

use std::fmt;

use serde::{Deserialize, Serialize};

use super::SlotAddress;

/// The role a grid plays inside a container set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridRole {
    Main,
    WeaponSet,
    Combat,
    Popover,
}

impl fmt::Display for GridRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::WeaponSet => write!(f, "weapon_set"),
            Self::Combat => write!(f, "combat"),
            Self::Popover => write!(f, "popover"),
        }
    }
}

/// A grid that may host popovers in its slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKey {
    Main(usize),
    WeaponSet(usize),
}

impl From<HostKey> for GridKey {
    fn from(value: HostKey) -> Self {
        match value {
            HostKey::Main(index) => GridKey::Main(index),
            HostKey::WeaponSet(index) => GridKey::WeaponSet(index),
        }
    }
}

/// Addresses one grid of a container set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridKey {
    Main(usize),
    WeaponSet(usize),
    Combat,
    Popover { host: HostKey, address: SlotAddress },
}

impl GridKey {
    pub fn role(&self) -> GridRole {
        match self {
            Self::Main(_) => GridRole::Main,
            Self::WeaponSet(_) => GridRole::WeaponSet,
            Self::Combat => GridRole::Combat,
            Self::Popover { .. } => GridRole::Popover,
        }
    }

    pub fn scope(&self) -> DedupeScope {
        match *self {
            Self::Main(_) => DedupeScope::Main,
            Self::WeaponSet(_) => DedupeScope::WeaponSets,
            Self::Combat => DedupeScope::Combat,
            Self::Popover { host, address } => DedupeScope::Popover { host, address },
        }
    }

    /// The key as a popover host, if grids of this role can host popovers.
    pub fn as_host(&self) -> Option<HostKey> {
        match *self {
            Self::Main(index) => Some(HostKey::Main(index)),
            Self::WeaponSet(index) => Some(HostKey::WeaponSet(index)),
            _ => None,
        }
    }
}

impl fmt::Display for GridKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main(index) => write!(f, "main grid {index}"),
            Self::WeaponSet(index) => write!(f, "weapon set {index}"),
            Self::Combat => write!(f, "combat grid"),
            Self::Popover { host, address } => {
                write!(f, "popover at {} [{address}]", GridKey::from(*host))
            }
        }
    }
}

/// The set of grids within which a stable id may appear only once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DedupeScope {
    Main,
    WeaponSets,
    Combat,
    Popover { host: HostKey, address: SlotAddress },
}

impl DedupeScope {
    pub fn contains(&self, key: &GridKey) -> bool {
        key.scope() == *self
    }
}

/// A slot inside a specific grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotLocation {
    pub grid: GridKey,
    pub address: SlotAddress,
}

impl SlotLocation {
    pub const fn new(grid: GridKey, address: SlotAddress) -> Self {
        Self { grid, address }
    }
}

impl fmt::Display for SlotLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.grid, self.address)
    }
}
