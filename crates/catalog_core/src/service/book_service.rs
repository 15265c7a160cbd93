//! Book use-cases and relationship synchronization.
//!
//! # Responsibility
//! - Validate author/genre ids before creating a book and connect the book
//!   to exactly the validated rows.
//! - Replace both edge sets wholesale on update.
//! - Serve book lists and single reads with nested authors/genres.
//!
//! # Invariants
//! - Create: fetched-author count must equal `author_ids.len()` and
//!   fetched-genre count must equal `genre_ids.len()`, otherwise nothing is
//!   written and `CatalogError::Validation` is returned.
//! - Update: no pre-write existence check. Dangling ids are rejected by the
//!   store and surface as `CatalogError::StoreReferential`.
//! - Validation and the create write are separate steps. A row deleted in
//!   between makes the write fail on its foreign key; that failure is
//!   reported as `CatalogError::Validation` so callers can retry.

use super::error::{CatalogError, CatalogResult};
use crate::model::book::{Book, BookDraft, BookPatch, BookRecord};
use crate::model::RecordId;
use crate::query::{sort_page, ListParams, ListQuery, DEFAULT_LIMIT};
use crate::repo::{BookRelations, BookRepository, RepoError};
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Book service facade over repository implementations.
pub struct BookService<R: BookRepository> {
    repo: R,
    default_limit: u32,
}

impl<R: BookRepository> BookService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Overrides the page size used when a list request omits `limit`.
    pub fn with_default_limit(mut self, default_limit: u32) -> Self {
        self.default_limit = default_limit;
        self
    }

    /// Lists one page of books with nested authors and genres.
    pub fn list_books(&self, params: &ListParams) -> CatalogResult<Vec<BookRecord>> {
        let query = ListQuery::with_default_limit(params, self.default_limit);
        let mut books = self.repo.find_books(&query.filter, query.window)?;
        sort_page(&mut books, query.sort);
        debug!(
            "event=book_list module=service status=ok offset={} count={} returned={}",
            query.window.offset,
            query.window.count,
            books.len()
        );
        Ok(books)
    }

    /// Gets one book; a missing id is `Ok(None)`, not an error.
    pub fn get_book(&self, id: RecordId) -> CatalogResult<Option<BookRecord>> {
        Ok(self.repo.find_book(id)?)
    }

    /// Creates a book after validating every referenced author and genre.
    pub fn create_book(&mut self, draft: &BookDraft) -> CatalogResult<BookRecord> {
        let authors = self.repo.find_authors(&draft.author_ids)?;
        let genres = self.repo.find_genres(&draft.genre_ids)?;

        if authors.len() != draft.author_ids.len() || genres.len() != draft.genre_ids.len() {
            let err = CatalogError::Validation {
                invalid_author_ids: unmatched_ids(
                    &draft.author_ids,
                    authors.iter().map(|author| author.id),
                ),
                invalid_genre_ids: unmatched_ids(
                    &draft.genre_ids,
                    genres.iter().map(|genre| genre.id),
                ),
            };
            warn!(
                "event=book_create module=service status=rejected error_code={} requested_authors={} found_authors={} requested_genres={} found_genres={}",
                err.code(),
                draft.author_ids.len(),
                authors.len(),
                draft.genre_ids.len(),
                genres.len()
            );
            return Err(err);
        }

        let relations = BookRelations::connect(
            authors.iter().map(|author| author.id).collect(),
            genres.iter().map(|genre| genre.id).collect(),
        );
        match self.repo.create_book(draft, &relations) {
            Ok(record) => {
                info!(
                    "event=book_create module=service status=ok id={} authors={} genres={}",
                    record.id,
                    record.authors.len(),
                    record.genres.len()
                );
                Ok(record)
            }
            Err(RepoError::ForeignKey(message)) => {
                warn!(
                    "event=book_create module=service status=rejected error_code=relation_race error={message}"
                );
                Err(self.revalidate(draft))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Updates a book and replaces both edge sets with the patch id lists.
    pub fn update_book(&mut self, id: RecordId, patch: &BookPatch) -> CatalogResult<BookRecord> {
        let relations = BookRelations::replace(patch.author_ids.clone(), patch.genre_ids.clone());
        match self.repo.update_book(id, patch, &relations) {
            Ok(record) => {
                info!(
                    "event=book_update module=service status=ok id={id} authors={} genres={}",
                    record.authors.len(),
                    record.genres.len()
                );
                Ok(record)
            }
            Err(err) => {
                let err = CatalogError::from(err);
                if !matches!(err, CatalogError::Unexpected(_)) {
                    warn!(
                        "event=book_update module=service status=rejected id={id} error_code={}",
                        err.code()
                    );
                }
                Err(err)
            }
        }
    }

    /// Deletes a book and its edges; authors and genres are untouched.
    pub fn delete_book(&self, id: RecordId) -> CatalogResult<Book> {
        let deleted = self.repo.delete_book(id)?;
        info!("event=book_delete module=service status=ok id={id}");
        Ok(deleted)
    }

    pub fn count_books(&self) -> CatalogResult<u64> {
        Ok(self.repo.count_books()?)
    }

    fn revalidate(&self, draft: &BookDraft) -> CatalogError {
        let authors = match self.repo.find_authors(&draft.author_ids) {
            Ok(authors) => authors,
            Err(err) => return err.into(),
        };
        let genres = match self.repo.find_genres(&draft.genre_ids) {
            Ok(genres) => genres,
            Err(err) => return err.into(),
        };
        CatalogError::Validation {
            invalid_author_ids: unmatched_ids(
                &draft.author_ids,
                authors.iter().map(|author| author.id),
            ),
            invalid_genre_ids: unmatched_ids(&draft.genre_ids, genres.iter().map(|genre| genre.id)),
        }
    }
}

/// Returns requested ids that were not found, plus ids requested more than
/// once, sorted and deduplicated.
fn unmatched_ids(requested: &[RecordId], found: impl Iterator<Item = RecordId>) -> Vec<RecordId> {
    let found: BTreeSet<RecordId> = found.collect();
    let mut seen = BTreeSet::new();
    let mut unmatched = BTreeSet::new();
    for id in requested {
        if !found.contains(id) || !seen.insert(*id) {
            unmatched.insert(*id);
        }
    }
    unmatched.into_iter().collect()
}
