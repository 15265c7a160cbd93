//! Core catalog logic for authors, genres and books.
//!
//! List requests become store-side filtered and paginated queries whose
//! pages are sorted locally; book writes validate and synchronize the
//! author/genre relations. Transport layers call into `api::Catalog`.

pub mod api;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;

pub use api::{Catalog, ListEnvelope, Response, Status};
pub use config::{CatalogConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::author::{Author, AuthorDraft, AuthorPatch};
pub use model::book::{Book, BookDraft, BookPatch, BookRecord};
pub use model::genre::{Genre, GenreDraft, GenrePatch};
pub use model::{EntityKind, RecordId};
pub use query::{ListParams, ListQuery, NameFilter, SortOrder, Window};
pub use repo::{
    BookRelations, BookRepository, Entity, RecordRepository, RelationDirective, RepoError,
    RepoResult, SqliteBookRepository, SqliteRecordRepository,
};
pub use service::{
    AuthorService, BookService, CatalogError, CatalogResult, GenreService, RecordService,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
