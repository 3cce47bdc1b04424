//! In-memory runtime state shared by the use cases.

pub mod event_bus;

pub use event_bus::{EventBus, LayoutEvent};
