//! Domain Events
//!
//! Return types from container set mutations, communicating what happened
//! so callers can persist, notify, and re-render appropriately.

pub mod layout_events;

pub use layout_events::*;
