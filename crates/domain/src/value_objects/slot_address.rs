//! Slot address value object
//!
//! Addresses are zero-based `(col, row)` pairs. Their persisted form is the
//! `"<col>-<row>"` string key, and they order row-major so that iterating a
//! sorted collection of addresses visits row 0 left to right, then row 1.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A cell address inside one slot grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotAddress {
    pub col: u32,
    pub row: u32,
}

impl SlotAddress {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Whether the address fits a grid of the given dimensions.
    #[inline]
    pub fn fits(&self, cols: u32, rows: u32) -> bool {
        self.col < cols && self.row < rows
    }

    /// All addresses of a `cols` x `rows` grid in row-major order.
    pub fn row_major(cols: u32, rows: u32) -> impl Iterator<Item = SlotAddress> {
        (0..rows).flat_map(move |row| (0..cols).map(move |col| SlotAddress::new(col, row)))
    }
}

impl Ord for SlotAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for SlotAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SlotAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.col, self.row)
    }
}

impl FromStr for SlotAddress {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (col, row) = s
            .split_once('-')
            .ok_or_else(|| DomainError::parse(format!("Slot key '{s}' is not <col>-<row>")))?;
        let col = col
            .trim()
            .parse::<u32>()
            .map_err(|e| DomainError::parse(format!("Slot key '{s}' has a bad column: {e}")))?;
        let row = row
            .trim()
            .parse::<u32>()
            .map_err(|e| DomainError::parse(format!("Slot key '{s}' has a bad row: {e}")))?;
        Ok(Self::new(col, row))
    }
}

impl TryFrom<String> for SlotAddress {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotAddress> for String {
    fn from(value: SlotAddress) -> Self {
        value.to_string()
    }
}
