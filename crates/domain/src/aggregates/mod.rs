//! Aggregate roots - domain objects that own their related data
//!
//! The container set owns every grid of one entity; all cross-grid rules
//! (dedupe scopes, shared main row count, popover lifetime) live here.

pub mod container_set;

pub use container_set::{ContainerSet, ContainerSetLayout};
