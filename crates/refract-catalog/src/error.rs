//! Catalog and stage construction errors.

use refract_core::GraphError;
use thiserror::Error;

use crate::id::TransformId;

/// Errors from catalog lookups and registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// No transform with this id is registered.
    #[error("transform {0} is not in the catalog")]
    NotFound(TransformId),
    /// A transform with this id is already registered.
    #[error("transform {0} is already registered")]
    DuplicateId(TransformId),
    /// The raw id cannot name a transform.
    #[error("invalid transform id {0}")]
    InvalidId(u16),
}

/// Errors raised while a transform builds its stage.
#[derive(Debug, Error)]
pub enum StageError {
    /// A graph mutation was rejected.
    #[error("graph rejected stage: {0}")]
    Graph(#[from] GraphError),
    /// A composite referenced a missing transform.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// The constructor refused to build.
    #[error("transform {id} failed to build: {reason}")]
    Construction {
        /// Transform being built.
        id: TransformId,
        /// Why it failed.
        reason: String,
    },
}

impl StageError {
    /// Shorthand for [`StageError::Construction`].
    pub fn construction(id: TransformId, reason: impl Into<String>) -> Self {
        Self::Construction {
            id,
            reason: reason.into(),
        }
    }
}
