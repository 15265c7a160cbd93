//! Catalog error taxonomy.

use crate::model::{EntityKind, RecordId};
use crate::repo::RepoError;
use thiserror::Error;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Use-case level failure, one variant per caller-visible error class.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A book create referenced author/genre ids that do not all exist.
    #[error("some referenced author or genre ids do not exist")]
    Validation {
        invalid_author_ids: Vec<RecordId>,
        invalid_genre_ids: Vec<RecordId>,
    },
    /// The targeted record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: RecordId },
    /// The store rejected a write referencing a missing author or genre.
    #[error("referenced author or genre does not exist ({0})")]
    StoreReferential(String),
    /// Anything else: connectivity, bad persisted data, poisoned handles.
    #[error("unexpected catalog failure: {0}")]
    Unexpected(#[source] RepoError),
}

impl CatalogError {
    /// Short machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
            Self::StoreReferential(_) => "store_referential",
            Self::Unexpected(_) => "unexpected",
        }
    }
}

impl From<RepoError> for CatalogError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => Self::NotFound { kind, id },
            RepoError::ForeignKey(message) => Self::StoreReferential(message),
            other => Self::Unexpected(other),
        }
    }
}
