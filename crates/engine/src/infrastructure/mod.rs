//! Infrastructure: ports and the adapters that implement them.

pub mod cache;
pub mod clock;
pub mod notifier;
pub mod persistence;
pub mod ports;
pub mod settings;
