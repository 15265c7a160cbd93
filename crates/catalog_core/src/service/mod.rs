//! Catalog use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into list/create/update/delete use-cases.
//! - Own the book relationship synchronization policy.
//! - Translate persistence errors into the catalog error taxonomy.
//!
//! # Invariants
//! - Services stay storage-agnostic: they only see repository traits.
//! - Every use-case returns `Result<_, CatalogError>`; nothing is swallowed.

pub mod book_service;
pub mod error;
pub mod record_service;

pub use book_service::BookService;
pub use error::{CatalogError, CatalogResult};
pub use record_service::{AuthorService, GenreService, RecordService};
