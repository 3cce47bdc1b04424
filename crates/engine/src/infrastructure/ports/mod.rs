//! Port traits for infrastructure boundaries.
//!
//! Ports exist for:
//! - Layout storage (could swap files -> host attribute storage)
//! - Item lookup (the host's entity directory)
//! - User notifications
//! - Clock (for testing)

mod error;
mod external;
mod repos;
mod testing;
pub mod types;

// =============================================================================
// Storage and Lookup Ports
// =============================================================================
pub use repos::{EntityDirectory, LayoutStore};

// =============================================================================
// Types
// =============================================================================
pub use types::Selection;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{Notice, NoticeLevel, Notifier};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{MockEntityDirectory, MockLayoutStore};

#[cfg(test)]
pub use external::MockNotifier;

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::ClockPort;

// =============================================================================
// Error Types
// =============================================================================
pub use error::RepoError;
