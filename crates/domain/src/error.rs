//! Unified error types for the domain layer
//!
//! Every grid mutation reports failure through `DomainError`. Placement rule
//! violations (bounds, lock, duplicate policy) are grouped under
//! `ValidationError` so callers can surface them as a single notice kind.

use thiserror::Error;

use crate::ids::{OwnerId, StableId};
use crate::value_objects::{GridKey, SlotAddress, SlotLocation};

/// A placement rule was violated; the mutation was not applied.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Address {address} is outside {grid} ({cols}x{rows})")]
    OutOfBounds {
        grid: GridKey,
        address: SlotAddress,
        cols: u32,
        rows: u32,
    },

    #[error("{grid} is locked")]
    Locked { grid: GridKey },

    #[error("{stable_id} already occupies {existing}")]
    Duplicate {
        stable_id: StableId,
        existing: SlotLocation,
    },

    #[error("No such grid: {0}")]
    UnknownGrid(GridKey),

    #[error("Invalid grid dimensions: {cols}x{rows}")]
    InvalidDimensions { cols: u32, rows: u32 },

    /// Main grids must always share one row count.
    #[error("{grid} has {found} rows, expected {expected}")]
    RowMismatch {
        grid: GridKey,
        expected: u32,
        found: u32,
    },

    #[error("Weapon set {index} does not exist ({count} configured)")]
    UnknownWeaponSet { index: usize, count: usize },

    #[error("Slot {0} is empty")]
    EmptySlot(SlotLocation),

    #[error("{0} cannot host a popover")]
    NotAContainer(SlotLocation),

    #[error("Cannot move {0} onto itself")]
    SameSlot(SlotLocation),

    #[error("{0} cannot be placed inside its own popover")]
    SelfNested(StableId),
}

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Placement rule violation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Item belongs to another owning entity
    #[error("{stable_id} is not owned by {expected}")]
    Ownership {
        stable_id: StableId,
        expected: OwnerId,
        actual: Option<OwnerId>,
    },

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string
    /// doesn't match the expected format, e.g. a slot key that is not
    /// `"<col>-<row>"`.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an ownership error
    pub fn ownership(stable_id: StableId, expected: OwnerId, actual: Option<OwnerId>) -> Self {
        Self::Ownership {
            stable_id,
            expected,
            actual,
        }
    }

    /// Whether this is a placement rule violation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err: DomainError = ValidationError::OutOfBounds {
            grid: GridKey::Main(1),
            address: SlotAddress::new(5, 0),
            cols: 5,
            rows: 3,
        }
        .into();
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Validation failed: Address 5-0 is outside main grid 1 (5x3)"
        );
    }

    #[test]
    fn test_ownership_error() {
        let err = DomainError::ownership(
            StableId::new("Item.a").unwrap(),
            OwnerId::new("Actor.hero").unwrap(),
            Some(OwnerId::new("Actor.villain").unwrap()),
        );
        assert!(matches!(err, DomainError::Ownership { .. }));
        assert_eq!(err.to_string(), "Item.a is not owned by Actor.hero");
    }
}
