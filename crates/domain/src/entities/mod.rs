//! Domain entities - Core business objects with identity

mod slot_grid;

pub use slot_grid::{SlotGrid, MAX_GRID_DIMENSION};
