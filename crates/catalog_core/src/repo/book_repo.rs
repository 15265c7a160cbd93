//! Book repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist book rows together with their author/genre edge sets.
//! - Resolve edges to full author/genre rows on every book read.
//! - Expose related-row lookups used by create-path validation.
//!
//! # Invariants
//! - A create or update with relations is one transaction: the base row and
//!   both edge sets commit together or not at all.
//! - `RelationDirective::Connect` only adds edges.
//! - `RelationDirective::Replace` leaves the edge set exactly equal to the
//!   supplied ids.
//! - Edges are rows of `book_authors` / `book_genres`; deleting a book,
//!   author or genre cascades to its edges only.

use super::record_repo::{
    count_rows, delete_row, insert_row, select_by_ids, select_one, select_page, update_row,
};
use super::RepoResult;
use crate::model::author::Author;
use crate::model::book::{Book, BookDraft, BookPatch, BookRecord};
use crate::model::genre::Genre;
use crate::model::RecordId;
use crate::query::{NameFilter, Window};
use rusqlite::{params, Connection, TransactionBehavior};

/// How a write treats an existing edge set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationDirective {
    /// Add edges to the given ids, keeping existing ones.
    Connect(Vec<RecordId>),
    /// Make the edge set exactly the given ids.
    Replace(Vec<RecordId>),
}

impl RelationDirective {
    pub fn ids(&self) -> &[RecordId] {
        match self {
            Self::Connect(ids) | Self::Replace(ids) => ids,
        }
    }
}

/// Relation directives for both book edge sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRelations {
    pub authors: RelationDirective,
    pub genres: RelationDirective,
}

impl BookRelations {
    pub fn connect(authors: Vec<RecordId>, genres: Vec<RecordId>) -> Self {
        Self {
            authors: RelationDirective::Connect(authors),
            genres: RelationDirective::Connect(genres),
        }
    }

    pub fn replace(authors: Vec<RecordId>, genres: Vec<RecordId>) -> Self {
        Self {
            authors: RelationDirective::Replace(authors),
            genres: RelationDirective::Replace(genres),
        }
    }
}

/// Repository interface for books and their relations.
pub trait BookRepository {
    /// Returns the existing authors among `ids`.
    fn find_authors(&self, ids: &[RecordId]) -> RepoResult<Vec<Author>>;
    /// Returns the existing genres among `ids`.
    fn find_genres(&self, ids: &[RecordId]) -> RepoResult<Vec<Genre>>;
    /// Inserts a book and applies `relations` atomically.
    fn create_book(&mut self, draft: &BookDraft, relations: &BookRelations)
        -> RepoResult<BookRecord>;
    /// Updates a book and applies `relations` atomically.
    fn update_book(
        &mut self,
        id: RecordId,
        patch: &BookPatch,
        relations: &BookRelations,
    ) -> RepoResult<BookRecord>;
    fn find_books(&self, filter: &NameFilter, window: Window) -> RepoResult<Vec<BookRecord>>;
    fn find_book(&self, id: RecordId) -> RepoResult<Option<BookRecord>>;
    /// Deletes a book (and its edges) and returns the base row.
    fn delete_book(&self, id: RecordId) -> RepoResult<Book>;
    fn count_books(&self) -> RepoResult<u64>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn find_authors(&self, ids: &[RecordId]) -> RepoResult<Vec<Author>> {
        select_by_ids::<Author>(self.conn, ids)
    }

    fn find_genres(&self, ids: &[RecordId]) -> RepoResult<Vec<Genre>> {
        select_by_ids::<Genre>(self.conn, ids)
    }

    fn create_book(
        &mut self,
        draft: &BookDraft,
        relations: &BookRelations,
    ) -> RepoResult<BookRecord> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let book = insert_row::<Book>(&tx, draft)?;
        apply_directive(&tx, book.id, EdgeTable::Authors, &relations.authors)?;
        apply_directive(&tx, book.id, EdgeTable::Genres, &relations.genres)?;
        let record = load_record(&tx, book)?;
        tx.commit()?;
        Ok(record)
    }

    fn update_book(
        &mut self,
        id: RecordId,
        patch: &BookPatch,
        relations: &BookRelations,
    ) -> RepoResult<BookRecord> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let book = update_row::<Book>(&tx, id, patch)?;
        apply_directive(&tx, book.id, EdgeTable::Authors, &relations.authors)?;
        apply_directive(&tx, book.id, EdgeTable::Genres, &relations.genres)?;
        let record = load_record(&tx, book)?;
        tx.commit()?;
        Ok(record)
    }

    fn find_books(&self, filter: &NameFilter, window: Window) -> RepoResult<Vec<BookRecord>> {
        select_page::<Book>(self.conn, filter, window)?
            .into_iter()
            .map(|book| load_record(self.conn, book))
            .collect()
    }

    fn find_book(&self, id: RecordId) -> RepoResult<Option<BookRecord>> {
        select_one::<Book>(self.conn, id)?
            .map(|book| load_record(self.conn, book))
            .transpose()
    }

    fn delete_book(&self, id: RecordId) -> RepoResult<Book> {
        delete_row::<Book>(self.conn, id)
    }

    fn count_books(&self) -> RepoResult<u64> {
        count_rows::<Book>(self.conn)
    }
}

#[derive(Debug, Clone, Copy)]
enum EdgeTable {
    Authors,
    Genres,
}

impl EdgeTable {
    fn table(self) -> &'static str {
        match self {
            Self::Authors => "book_authors",
            Self::Genres => "book_genres",
        }
    }

    fn target_column(self) -> &'static str {
        match self {
            Self::Authors => "author_id",
            Self::Genres => "genre_id",
        }
    }
}

fn apply_directive(
    conn: &Connection,
    book_id: RecordId,
    edges: EdgeTable,
    directive: &RelationDirective,
) -> RepoResult<()> {
    if let RelationDirective::Replace(_) = directive {
        conn.execute(
            &format!("DELETE FROM {} WHERE book_id = ?1;", edges.table()),
            [book_id],
        )?;
    }

    // OR IGNORE only covers the composite primary key; foreign key failures
    // still abort the statement.
    let mut stmt = conn.prepare(&format!(
        "INSERT OR IGNORE INTO {} (book_id, {}) VALUES (?1, ?2);",
        edges.table(),
        edges.target_column()
    ))?;
    for target_id in directive.ids() {
        stmt.execute(params![book_id, target_id])?;
    }
    Ok(())
}

fn load_record(conn: &Connection, book: Book) -> RepoResult<BookRecord> {
    let authors = load_authors(conn, book.id)?;
    let genres = load_genres(conn, book.id)?;
    Ok(BookRecord::assemble(book, authors, genres))
}

fn load_authors(conn: &Connection, book_id: RecordId) -> RepoResult<Vec<Author>> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.name, a.year
         FROM book_authors ba
         INNER JOIN authors a ON a.id = ba.author_id
         WHERE ba.book_id = ?1
         ORDER BY a.id ASC;",
    )?;
    let mut rows = stmt.query([book_id])?;
    let mut authors = Vec::new();
    while let Some(row) = rows.next()? {
        authors.push(Author {
            id: row.get(0)?,
            name: row.get(1)?,
            year: row.get(2)?,
        });
    }
    Ok(authors)
}

fn load_genres(conn: &Connection, book_id: RecordId) -> RepoResult<Vec<Genre>> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.name
         FROM book_genres bg
         INNER JOIN genres g ON g.id = bg.genre_id
         WHERE bg.book_id = ?1
         ORDER BY g.id ASC;",
    )?;
    let mut rows = stmt.query([book_id])?;
    let mut genres = Vec::new();
    while let Some(row) = rows.next()? {
        genres.push(Genre {
            id: row.get(0)?,
            name: row.get(1)?,
        });
    }
    Ok(genres)
}
