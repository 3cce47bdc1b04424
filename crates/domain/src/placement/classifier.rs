//! Placement classifier
//!
//! Maps item attributes to the index of the main container that should
//! receive the item. The configuration is an ordered list of accepted
//! category sets, one per container; entries are either an exact category
//! (`"spell"`) or a compound `category:subcategory` (`"feat:class"`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entities::SlotGrid;
use crate::error::DomainError;
use crate::value_objects::ItemAttributes;

/// One accepted category entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CategoryMatcher {
    Category(String),
    Compound {
        category: String,
        subcategory: String,
    },
}

impl CategoryMatcher {
    pub fn matches(&self, attrs: &ItemAttributes) -> bool {
        match self {
            Self::Category(category) => &attrs.category == category,
            Self::Compound {
                category,
                subcategory,
            } => &attrs.category == category && attrs.subcategory.as_ref() == Some(subcategory),
        }
    }
}

impl FromStr for CategoryMatcher {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.split_once(':') {
            Some((category, subcategory)) => {
                let (category, subcategory) = (category.trim(), subcategory.trim());
                if category.is_empty() || subcategory.is_empty() {
                    return Err(DomainError::parse(format!("Bad compound category '{s}'")));
                }
                Ok(Self::Compound {
                    category: category.to_string(),
                    subcategory: subcategory.to_string(),
                })
            }
            None if normalized.is_empty() => Err(DomainError::parse("Empty category")),
            None => Ok(Self::Category(normalized)),
        }
    }
}

impl TryFrom<String> for CategoryMatcher {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryMatcher> for String {
    fn from(value: CategoryMatcher) -> Self {
        value.to_string()
    }
}

impl fmt::Display for CategoryMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Category(category) => f.write_str(category),
            Self::Compound {
                category,
                subcategory,
            } => write!(f, "{category}:{subcategory}"),
        }
    }
}

/// Ordered per-container accepted category sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassifierConfig {
    containers: Vec<Vec<CategoryMatcher>>,
}

impl ClassifierConfig {
    pub fn new(containers: Vec<Vec<CategoryMatcher>>) -> Self {
        Self { containers }
    }

    /// Build from string lists, e.g. `[["weapon"], ["spell", "feat:class"]]`.
    pub fn parse<S: AsRef<str>>(containers: &[Vec<S>]) -> Result<Self, DomainError> {
        let containers = containers
            .iter()
            .map(|set| set.iter().map(|s| s.as_ref().parse()).collect())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { containers })
    }

    pub fn containers(&self) -> &[Vec<CategoryMatcher>] {
        &self.containers
    }
}

/// Choose the main container for an item.
///
/// First matching container (among those that exist) wins; otherwise the
/// first container with a free slot; otherwise 0. Pure: the same inputs
/// always produce the same index.
pub fn classify(attrs: &ItemAttributes, config: &ClassifierConfig, grids: &[SlotGrid]) -> usize {
    if grids.is_empty() {
        return 0;
    }
    let matched = config
        .containers
        .iter()
        .take(grids.len())
        .position(|set| set.iter().any(|m| m.matches(attrs)));
    if let Some(index) = matched {
        return index;
    }
    grids.iter().position(|g| !g.is_full()).unwrap_or(0)
}
