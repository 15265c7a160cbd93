//! Generic list/create/update/delete use-cases for flat records.
//!
//! # Responsibility
//! - Serve authors and genres through one implementation.
//! - Apply the list query policy (store-side filter and window, page-local
//!   sort).

use super::error::CatalogResult;
use crate::model::author::Author;
use crate::model::genre::Genre;
use crate::model::RecordId;
use crate::query::{sort_page, ListParams, ListQuery, Named, DEFAULT_LIMIT};
use crate::repo::{Entity, RecordRepository};
use log::{debug, info};
use std::marker::PhantomData;

/// Use-case service over one record type.
pub struct RecordService<E, R> {
    repo: R,
    default_limit: u32,
    _entity: PhantomData<E>,
}

pub type AuthorService<R> = RecordService<Author, R>;
pub type GenreService<R> = RecordService<Genre, R>;

impl<E, R> RecordService<E, R>
where
    E: Entity + Named,
    R: RecordRepository<E>,
{
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            default_limit: DEFAULT_LIMIT,
            _entity: PhantomData,
        }
    }

    /// Overrides the page size used when a list request omits `limit`.
    pub fn with_default_limit(mut self, default_limit: u32) -> Self {
        self.default_limit = default_limit;
        self
    }

    /// Lists one page of records.
    ///
    /// Filtering and pagination run in the store; `sort` only reorders the
    /// fetched page.
    pub fn list(&self, params: &ListParams) -> CatalogResult<Vec<E>> {
        let query = ListQuery::with_default_limit(params, self.default_limit);
        let mut items = self.repo.find_many(&query.filter, query.window)?;
        sort_page(&mut items, query.sort);
        debug!(
            "event={}_list module=service status=ok offset={} count={} returned={}",
            E::KIND,
            query.window.offset,
            query.window.count,
            items.len()
        );
        Ok(items)
    }

    pub fn get(&self, id: RecordId) -> CatalogResult<Option<E>> {
        Ok(self.repo.find_one(id)?)
    }

    pub fn create(&self, draft: &E::Draft) -> CatalogResult<E> {
        let created = self.repo.create(draft)?;
        info!(
            "event={}_create module=service status=ok id={}",
            E::KIND,
            created.id()
        );
        Ok(created)
    }

    /// Applies a partial update; a missing id yields `CatalogError::NotFound`.
    pub fn update(&self, id: RecordId, patch: &E::Patch) -> CatalogResult<E> {
        let updated = self.repo.update(id, patch)?;
        info!("event={}_update module=service status=ok id={id}", E::KIND);
        Ok(updated)
    }

    /// Deletes a record and returns it; edges pointing at it are removed by
    /// the store.
    pub fn delete(&self, id: RecordId) -> CatalogResult<E> {
        let deleted = self.repo.delete(id)?;
        info!("event={}_delete module=service status=ok id={id}", E::KIND);
        Ok(deleted)
    }

    pub fn count(&self) -> CatalogResult<u64> {
        Ok(self.repo.count()?)
    }
}
