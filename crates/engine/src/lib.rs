//! Quickslot Engine library.
//!
//! Runtime side of the quick slot panel: loading and saving layouts,
//! reconciling them with item changes, and drag/drop editing.
//!
//! ## Structure
//!
//! - `use_cases/` - Session commands, item sync, drag/drop
//! - `stores/` - In-memory runtime state (event bus)
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

/// Test fixtures module for integration testing.
#[cfg(test)]
pub mod test_fixtures;

/// End-to-end scenarios through the public session API.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
