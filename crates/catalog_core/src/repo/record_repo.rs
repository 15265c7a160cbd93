//! Generic record repository over an entity descriptor.
//!
//! # Responsibility
//! - Provide one CRUD implementation shared by authors, genres and the base
//!   book row.
//! - Keep per-entity knowledge (table, columns, row mapping) in `Entity`.
//!
//! # Invariants
//! - Unfiltered, unsorted reads return rows in ascending id order.
//! - Writes return the row as stored (`RETURNING`), in the same statement.

use super::{RepoError, RepoResult};
use crate::db::FOLD_FUNCTION;
use crate::model::author::{Author, AuthorDraft, AuthorPatch};
use crate::model::book::{Book, BookDraft, BookPatch};
use crate::model::genre::{Genre, GenreDraft, GenrePatch};
use crate::model::{EntityKind, RecordId};
use crate::query::{NameFilter, Window};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::marker::PhantomData;

/// Storage descriptor for one record type.
pub trait Entity: Sized {
    const KIND: EntityKind;
    const TABLE: &'static str;
    /// Writable columns (everything but `id`), in bind order.
    const COLUMNS: &'static [&'static str];
    /// Column targeted by `NameFilter`.
    const NAME_COLUMN: &'static str = "name";

    type Draft;
    type Patch;

    fn id(&self) -> RecordId;
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
    /// One value per entry of `COLUMNS`.
    fn draft_values(draft: &Self::Draft) -> Vec<Value>;
    /// One value per entry of `COLUMNS`; `Value::Null` keeps the stored value.
    fn patch_values(patch: &Self::Patch) -> Vec<Value>;
}

impl Entity for Author {
    const KIND: EntityKind = EntityKind::Author;
    const TABLE: &'static str = "authors";
    const COLUMNS: &'static [&'static str] = &["name", "year"];

    type Draft = AuthorDraft;
    type Patch = AuthorPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            year: row.get("year")?,
        })
    }

    fn draft_values(draft: &Self::Draft) -> Vec<Value> {
        vec![Value::Text(draft.name.clone()), Value::Integer(draft.year)]
    }

    fn patch_values(patch: &Self::Patch) -> Vec<Value> {
        vec![
            patch.name.clone().map_or(Value::Null, Value::Text),
            patch.year.map_or(Value::Null, Value::Integer),
        ]
    }
}

impl Entity for Genre {
    const KIND: EntityKind = EntityKind::Genre;
    const TABLE: &'static str = "genres";
    const COLUMNS: &'static [&'static str] = &["name"];

    type Draft = GenreDraft;
    type Patch = GenrePatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    fn draft_values(draft: &Self::Draft) -> Vec<Value> {
        vec![Value::Text(draft.name.clone())]
    }

    fn patch_values(patch: &Self::Patch) -> Vec<Value> {
        vec![patch.name.clone().map_or(Value::Null, Value::Text)]
    }
}

/// Base book row only; relation ids in drafts/patches are handled by
/// `SqliteBookRepository`.
impl Entity for Book {
    const KIND: EntityKind = EntityKind::Book;
    const TABLE: &'static str = "books";
    const COLUMNS: &'static [&'static str] = &["name", "img"];

    type Draft = BookDraft;
    type Patch = BookPatch;

    fn id(&self) -> RecordId {
        self.id
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            img: row.get("img")?,
        })
    }

    fn draft_values(draft: &Self::Draft) -> Vec<Value> {
        vec![Value::Text(draft.name.clone()), Value::Text(draft.img.clone())]
    }

    fn patch_values(patch: &Self::Patch) -> Vec<Value> {
        vec![
            patch.name.clone().map_or(Value::Null, Value::Text),
            patch.img.clone().map_or(Value::Null, Value::Text),
        ]
    }
}

/// Repository interface for single-table record CRUD.
pub trait RecordRepository<E: Entity> {
    /// Inserts one row and returns it with its assigned id.
    fn create(&self, draft: &E::Draft) -> RepoResult<E>;
    /// Lists rows matching `filter` inside `window`, in ascending id order.
    fn find_many(&self, filter: &NameFilter, window: Window) -> RepoResult<Vec<E>>;
    /// Returns the existing rows among `ids`, in ascending id order.
    fn find_by_ids(&self, ids: &[RecordId]) -> RepoResult<Vec<E>>;
    fn find_one(&self, id: RecordId) -> RepoResult<Option<E>>;
    /// Applies a partial update and returns the stored row.
    fn update(&self, id: RecordId, patch: &E::Patch) -> RepoResult<E>;
    /// Deletes one row and returns it as it was before deletion.
    fn delete(&self, id: RecordId) -> RepoResult<E>;
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn, E> {
    conn: &'conn Connection,
    _entity: PhantomData<E>,
}

impl<'conn, E: Entity> SqliteRecordRepository<'conn, E> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> RecordRepository<E> for SqliteRecordRepository<'_, E> {
    fn create(&self, draft: &E::Draft) -> RepoResult<E> {
        insert_row::<E>(self.conn, draft)
    }

    fn find_many(&self, filter: &NameFilter, window: Window) -> RepoResult<Vec<E>> {
        select_page::<E>(self.conn, filter, window)
    }

    fn find_by_ids(&self, ids: &[RecordId]) -> RepoResult<Vec<E>> {
        select_by_ids::<E>(self.conn, ids)
    }

    fn find_one(&self, id: RecordId) -> RepoResult<Option<E>> {
        select_one::<E>(self.conn, id)
    }

    fn update(&self, id: RecordId, patch: &E::Patch) -> RepoResult<E> {
        update_row::<E>(self.conn, id, patch)
    }

    fn delete(&self, id: RecordId) -> RepoResult<E> {
        delete_row::<E>(self.conn, id)
    }

    fn count(&self) -> RepoResult<u64> {
        count_rows::<E>(self.conn)
    }
}

fn select_sql<E: Entity>() -> String {
    format!("SELECT id, {} FROM {}", E::COLUMNS.join(", "), E::TABLE)
}

fn returning_sql<E: Entity>() -> String {
    format!("RETURNING id, {}", E::COLUMNS.join(", "))
}

pub(crate) fn insert_row<E: Entity>(conn: &Connection, draft: &E::Draft) -> RepoResult<E> {
    let placeholders = (1..=E::COLUMNS.len())
        .map(|idx| format!("?{idx}"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({placeholders}) {};",
        E::TABLE,
        E::COLUMNS.join(", "),
        returning_sql::<E>()
    );
    let row = conn.query_row(&sql, params_from_iter(E::draft_values(draft)), |row| {
        E::from_row(row)
    })?;
    Ok(row)
}

pub(crate) fn select_page<E: Entity>(
    conn: &Connection,
    filter: &NameFilter,
    window: Window,
) -> RepoResult<Vec<E>> {
    let mut sql = format!("{} WHERE 1 = 1", select_sql::<E>());
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(needle) = filter.needle() {
        sql.push_str(&format!(
            " AND instr({FOLD_FUNCTION}({}), ?) > 0",
            E::NAME_COLUMN
        ));
        bind_values.push(Value::Text(needle.to_string()));
    }

    sql.push_str(" ORDER BY id ASC LIMIT ? OFFSET ?");
    bind_values.push(Value::Integer(i64::from(window.count)));
    bind_values.push(Value::Integer(
        i64::try_from(window.offset).unwrap_or(i64::MAX),
    ));

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(E::from_row(row)?);
    }
    Ok(items)
}

pub(crate) fn select_by_ids<E: Entity>(conn: &Connection, ids: &[RecordId]) -> RepoResult<Vec<E>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "{} WHERE id IN ({placeholders}) ORDER BY id ASC;",
        select_sql::<E>()
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(ids.iter()))?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(E::from_row(row)?);
    }
    Ok(items)
}

pub(crate) fn select_one<E: Entity>(conn: &Connection, id: RecordId) -> RepoResult<Option<E>> {
    let sql = format!("{} WHERE id = ?1;", select_sql::<E>());
    let row = conn
        .query_row(&sql, [id], |row| E::from_row(row))
        .optional()?;
    Ok(row)
}

pub(crate) fn update_row<E: Entity>(
    conn: &Connection,
    id: RecordId,
    patch: &E::Patch,
) -> RepoResult<E> {
    let assignments = E::COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, column)| format!("{column} = COALESCE(?{}, {column})", idx + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {assignments} WHERE id = ?{} {};",
        E::TABLE,
        E::COLUMNS.len() + 1,
        returning_sql::<E>()
    );

    let mut bind_values = E::patch_values(patch);
    bind_values.push(Value::Integer(id));
    conn.query_row(&sql, params_from_iter(bind_values), |row| E::from_row(row))
        .optional()?
        .ok_or_else(|| RepoError::not_found(E::KIND, id))
}

pub(crate) fn delete_row<E: Entity>(conn: &Connection, id: RecordId) -> RepoResult<E> {
    let sql = format!(
        "DELETE FROM {} WHERE id = ?1 {};",
        E::TABLE,
        returning_sql::<E>()
    );
    conn.query_row(&sql, [id], |row| E::from_row(row))
        .optional()?
        .ok_or_else(|| RepoError::not_found(E::KIND, id))
}

pub(crate) fn count_rows<E: Entity>(conn: &Connection) -> RepoResult<u64> {
    let count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {};", E::TABLE),
        [],
        |row| row.get(0),
    )?;
    Ok(u64::try_from(count).unwrap_or(0))
}
