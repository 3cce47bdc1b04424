//! Layout persistence: the versioned record and its stores.

pub mod file_store;
pub mod memory_store;
pub mod record;

pub use file_store::FileLayoutStore;
pub use memory_store::MemoryLayoutStore;
pub use record::{
    PersistedEntry, PersistedGrid, PersistedLayout, RejectedEntry, RestoredLayout,
    LAYOUT_NAMESPACE, RECORD_VERSION,
};
