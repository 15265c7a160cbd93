//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contract: create / find-many / find-one / update /
//!   delete with a name filter, an offset/count window and relation
//!   directives.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Identifiers are assigned and kept unique by the store.
//! - Update/delete of a missing id returns `RepoError::NotFound`.
//! - Relation edges to missing rows are rejected by the store at write time
//!   and surface as `RepoError::ForeignKey`.

pub mod book_repo;
pub mod record_repo;

use crate::db::DbError;
use crate::model::{EntityKind, RecordId};
use rusqlite::ffi;
use rusqlite::ErrorCode;
use thiserror::Error;

pub use book_repo::{BookRelations, BookRepository, RelationDirective, SqliteBookRepository};
pub use record_repo::{Entity, RecordRepository, SqliteRecordRepository};

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error shared by every repository.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: RecordId },
    /// The store refused a write that references a missing row.
    #[error("foreign key constraint failed: {0}")]
    ForeignKey(String),
    /// The shared store handle cannot be used (for example a poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl RepoError {
    pub fn not_found(kind: EntityKind, id: RecordId) -> Self {
        Self::NotFound { kind, id }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &value {
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY
            {
                return Self::ForeignKey(
                    message
                        .clone()
                        .unwrap_or_else(|| "FOREIGN KEY constraint failed".to_string()),
                );
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}
