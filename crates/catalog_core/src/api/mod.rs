//! Catalog request surface.
//!
//! # Responsibility
//! - Own the long-lived store handle for the process.
//! - Expose one method per catalog operation, each returning a `Response`.
//!
//! # Invariants
//! - Every operation yields exactly one `Response`, including on failure.
//! - The store handle is shared behind a `Mutex`; each operation holds it for
//!   one repository round trip and never across operations.

mod response;

pub use response::{respond, respond_list, ListEnvelope, Response, Status};

use crate::config::CatalogConfig;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::author::{Author, AuthorDraft, AuthorPatch};
use crate::model::book::{BookDraft, BookPatch};
use crate::model::genre::{Genre, GenreDraft, GenrePatch};
use crate::model::RecordId;
use crate::query::{ListParams, DEFAULT_LIMIT};
use crate::repo::{RepoError, SqliteBookRepository, SqliteRecordRepository};
use crate::service::{AuthorService, BookService, CatalogError, CatalogResult, GenreService};
use log::info;
use rusqlite::Connection;
use std::sync::{Mutex, PoisonError};

/// Catalog entry point holding the shared store handle.
pub struct Catalog {
    conn: Mutex<Connection>,
    default_limit: u32,
}

impl Catalog {
    /// Wraps an already bootstrapped connection (see `db::open_db`).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Opens the configured database file.
    pub fn open(config: &CatalogConfig) -> Result<Self, DbError> {
        let conn = open_db(&config.database_path)?;
        Ok(Self::new(conn).with_default_limit(config.default_limit))
    }

    /// Opens an empty in-memory catalog.
    pub fn open_in_memory() -> Result<Self, DbError> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn with_default_limit(mut self, default_limit: u32) -> Self {
        if default_limit > 0 {
            self.default_limit = default_limit;
        }
        self
    }

    /// Closes the store handle, flushing SQLite state.
    pub fn close(self) -> Result<(), DbError> {
        let conn = self
            .conn
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, err)| DbError::Sqlite(err))?;
        info!("event=db_close module=api status=ok");
        Ok(())
    }

    pub fn list_authors(&self, params: &ListParams) -> Response {
        respond_list(self.with_conn(|conn| self.authors(conn).list(params)))
    }

    pub fn create_author(&self, draft: &AuthorDraft) -> Response {
        respond(self.with_conn(|conn| self.authors(conn).create(draft)))
    }

    pub fn update_author(&self, id: RecordId, patch: &AuthorPatch) -> Response {
        respond(self.with_conn(|conn| self.authors(conn).update(id, patch)))
    }

    pub fn delete_author(&self, id: RecordId) -> Response {
        respond(self.with_conn(|conn| self.authors(conn).delete(id)))
    }

    pub fn list_genres(&self, params: &ListParams) -> Response {
        respond_list(self.with_conn(|conn| self.genres(conn).list(params)))
    }

    pub fn create_genre(&self, draft: &GenreDraft) -> Response {
        respond(self.with_conn(|conn| self.genres(conn).create(draft)))
    }

    pub fn update_genre(&self, id: RecordId, patch: &GenrePatch) -> Response {
        respond(self.with_conn(|conn| self.genres(conn).update(id, patch)))
    }

    pub fn delete_genre(&self, id: RecordId) -> Response {
        respond(self.with_conn(|conn| self.genres(conn).delete(id)))
    }

    pub fn list_books(&self, params: &ListParams) -> Response {
        respond_list(self.with_conn(|conn| self.books(conn).list_books(params)))
    }

    /// Gets one book; a missing id answers `200` with a `null` body.
    pub fn get_book(&self, id: RecordId) -> Response {
        respond(self.with_conn(|conn| self.books(conn).get_book(id)))
    }

    pub fn create_book(&self, draft: &BookDraft) -> Response {
        respond(self.with_conn(|conn| self.books(conn).create_book(draft)))
    }

    pub fn update_book(&self, id: RecordId, patch: &BookPatch) -> Response {
        respond(self.with_conn(|conn| self.books(conn).update_book(id, patch)))
    }

    pub fn delete_book(&self, id: RecordId) -> Response {
        respond(self.with_conn(|conn| self.books(conn).delete_book(id)))
    }

    fn with_conn<T>(
        &self,
        operation: impl FnOnce(&mut Connection) -> CatalogResult<T>,
    ) -> CatalogResult<T> {
        let mut guard = self.conn.lock().map_err(|_| {
            CatalogError::from(RepoError::Unavailable(
                "store handle lock poisoned".to_string(),
            ))
        })?;
        operation(&mut guard)
    }

    fn authors<'conn>(
        &self,
        conn: &'conn Connection,
    ) -> AuthorService<SqliteRecordRepository<'conn, Author>> {
        AuthorService::new(SqliteRecordRepository::new(conn)).with_default_limit(self.default_limit)
    }

    fn genres<'conn>(
        &self,
        conn: &'conn Connection,
    ) -> GenreService<SqliteRecordRepository<'conn, Genre>> {
        GenreService::new(SqliteRecordRepository::new(conn)).with_default_limit(self.default_limit)
    }

    fn books<'conn>(&self, conn: &'conn mut Connection) -> BookService<SqliteBookRepository<'conn>> {
        BookService::new(SqliteBookRepository::new(conn)).with_default_limit(self.default_limit)
    }
}
