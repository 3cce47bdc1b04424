//! Use cases - User story orchestration.
//!
//! - `layout` - the active layout and every user command on it
//! - `sync` - reconciliation with item lifecycle events
//! - `drag_drop` - drag gestures ending in swaps or placements

pub mod drag_drop;
pub mod layout;
pub mod sync;

pub use drag_drop::{CancelReason, DragDropController, DragPayload, DragState, DropOutcome};
pub use layout::{LayoutError, LayoutSession};
pub use sync::{ItemEvent, ItemField, SkipReason, SyncEngine, SyncOutcome};
