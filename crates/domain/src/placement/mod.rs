//! Automatic placement heuristics
//!
//! - `classifier` - picks a preferred main container for an item
//! - `sort` - deterministic ordering used by bulk placement and sorting

pub mod classifier;
pub mod sort;

pub use classifier::{classify, CategoryMatcher, ClassifierConfig};
pub use sort::{sort_attributes, SortCategory, SortKey};
