//! Layout use case errors.

use quickslot_domain::{DomainError, StableId, ValidationError};

use crate::infrastructure::ports::{Notice, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("No layout is loaded")]
    NoActiveLayout,

    #[error("This session has no edit authority")]
    NotAuthoritative,

    /// The item no longer exists in the directory
    #[error("Item {0} could not be found")]
    Resolution(StableId),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl From<ValidationError> for LayoutError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

impl LayoutError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_validation())
    }

    pub fn is_ownership(&self) -> bool {
        matches!(self, Self::Domain(DomainError::Ownership { .. }))
    }

    /// The notice shown to the user when an explicit command fails.
    pub fn notice(&self) -> Notice {
        match self {
            Self::Domain(DomainError::Validation(e)) => Notice::warning(e.to_string()),
            Self::Domain(_) | Self::Resolution(_) => Notice::warning(self.to_string()),
            Self::NoActiveLayout | Self::NotAuthoritative => Notice::info(self.to_string()),
            Self::Repo(_) => Notice::error(self.to_string()),
        }
    }
}
