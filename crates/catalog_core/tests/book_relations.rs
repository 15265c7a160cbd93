use catalog_core::db::open_db_in_memory;
use catalog_core::{
    Author, AuthorDraft, Book, BookDraft, BookPatch, BookRecord, BookRelations, BookRepository,
    BookService, CatalogError, EntityKind, Genre, GenreDraft, NameFilter, RecordId,
    RecordRepository, RepoResult, SqliteBookRepository, SqliteRecordRepository, Window,
};
use rusqlite::Connection;
use std::cell::Cell;

fn seed_authors(conn: &Connection, names: &[&str]) -> Vec<RecordId> {
    let repo = SqliteRecordRepository::<Author>::new(conn);
    names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            repo.create(&AuthorDraft {
                name: name.to_string(),
                year: 1900 + index as i64,
            })
            .unwrap()
            .id
        })
        .collect()
}

fn seed_genres(conn: &Connection, names: &[&str]) -> Vec<RecordId> {
    let repo = SqliteRecordRepository::<Genre>::new(conn);
    names
        .iter()
        .map(|name| {
            repo.create(&GenreDraft {
                name: name.to_string(),
            })
            .unwrap()
            .id
        })
        .collect()
}

fn draft(name: &str, author_ids: Vec<RecordId>, genre_ids: Vec<RecordId>) -> BookDraft {
    BookDraft {
        name: name.to_string(),
        img: format!("{name}.png"),
        author_ids,
        genre_ids,
    }
}

fn replace_patch(author_ids: Vec<RecordId>, genre_ids: Vec<RecordId>) -> BookPatch {
    BookPatch {
        author_ids,
        genre_ids,
        ..BookPatch::default()
    }
}

fn edge_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn create_with_missing_author_fails_and_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let authors = seed_authors(&conn, &["Robert C. Martin"]);
    let missing = authors[0] + 1;

    let mut service = BookService::new(SqliteBookRepository::new(&mut conn));
    let err = service
        .create_book(&draft("Clean Code", vec![authors[0], missing], vec![]))
        .unwrap_err();

    match err {
        CatalogError::Validation {
            invalid_author_ids,
            invalid_genre_ids,
        } => {
            assert_eq!(invalid_author_ids, vec![missing]);
            assert!(invalid_genre_ids.is_empty());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.count_books().unwrap(), 0);
    drop(service);
    assert_eq!(edge_count(&conn, "book_authors"), 0);
}

#[test]
fn create_with_missing_genre_lists_invalid_genre_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let genres = seed_genres(&conn, &["Software"]);

    let mut service = BookService::new(SqliteBookRepository::new(&mut conn));
    let err = service
        .create_book(&draft("Refactoring", vec![], vec![genres[0], 77]))
        .unwrap_err();

    assert!(matches!(
        err,
        CatalogError::Validation { ref invalid_genre_ids, .. } if invalid_genre_ids == &vec![77]
    ));
    assert_eq!(service.count_books().unwrap(), 0);
}

#[test]
fn create_with_repeated_id_is_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let authors = seed_authors(&conn, &["Kent Beck"]);

    let mut service = BookService::new(SqliteBookRepository::new(&mut conn));
    let err = service
        .create_book(&draft("TDD", vec![authors[0], authors[0]], vec![]))
        .unwrap_err();

    assert!(matches!(
        err,
        CatalogError::Validation { ref invalid_author_ids, .. } if invalid_author_ids == &vec![authors[0]]
    ));
}

#[test]
fn create_connects_exactly_the_given_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let authors = seed_authors(&conn, &["Gamma", "Helm", "Johnson"]);
    let genres = seed_genres(&conn, &["Software", "Design"]);

    let mut service = BookService::new(SqliteBookRepository::new(&mut conn));
    let created = service
        .create_book(&draft(
            "Design Patterns",
            vec![authors[2], authors[0]],
            vec![genres[1]],
        ))
        .unwrap();

    assert_eq!(created.author_ids(), vec![authors[0], authors[2]]);
    assert_eq!(created.genre_ids(), vec![genres[1]]);
    assert_eq!(created.authors[0].name, "Gamma");
    assert_eq!(created.genres[0].name, "Design");

    let fetched = service.get_book(created.id).unwrap().unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn create_without_relations_yields_empty_sets() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = BookService::new(SqliteBookRepository::new(&mut conn));

    let created = service.create_book(&draft("Untitled", vec![], vec![])).unwrap();

    assert!(created.authors.is_empty());
    assert!(created.genres.is_empty());
}

#[test]
fn update_replaces_author_set_wholesale() {
    let mut conn = open_db_in_memory().unwrap();
    let authors = seed_authors(&conn, &["One", "Two", "Three"]);

    let mut service = BookService::new(SqliteBookRepository::new(&mut conn));
    let created = service
        .create_book(&draft("Anthology", vec![authors[0], authors[1]], vec![]))
        .unwrap();
    assert_eq!(created.author_ids(), vec![authors[0], authors[1]]);

    let updated = service
        .update_book(created.id, &replace_patch(vec![authors[2]], vec![]))
        .unwrap();

    assert_eq!(updated.author_ids(), vec![authors[2]]);
    assert_eq!(updated.name, "Anthology");
    assert_eq!(updated.img, "Anthology.png");
}

#[test]
fn repeating_the_same_update_leaves_the_set_unchanged() {
    let mut conn = open_db_in_memory().unwrap();
    let authors = seed_authors(&conn, &["Solo"]);
    let genres = seed_genres(&conn, &["Memoir"]);

    let mut service = BookService::new(SqliteBookRepository::new(&mut conn));
    let created = service
        .create_book(&draft("Life", vec![authors[0]], vec![genres[0]]))
        .unwrap();
    assert_eq!(created.author_ids(), vec![authors[0]]);

    let patch = replace_patch(vec![authors[0]], vec![genres[0]]);
    let first = service.update_book(created.id, &patch).unwrap();
    let second = service.update_book(created.id, &patch).unwrap();

    assert_eq!(first, second);
    assert_eq!(second.author_ids(), vec![authors[0]]);
    assert_eq!(second.genre_ids(), vec![genres[0]]);
    drop(service);
    assert_eq!(edge_count(&conn, "book_authors"), 1);
    assert_eq!(edge_count(&conn, "book_genres"), 1);
}

#[test]
fn update_without_relation_ids_clears_both_sets() {
    let mut conn = open_db_in_memory().unwrap();
    let authors = seed_authors(&conn, &["Writer"]);
    let genres = seed_genres(&conn, &["Essay"]);

    let mut service = BookService::new(SqliteBookRepository::new(&mut conn));
    let created = service
        .create_book(&draft("Notes", vec![authors[0]], vec![genres[0]]))
        .unwrap();

    let updated = service
        .update_book(
            created.id,
            &BookPatch {
                name: Some("Collected Notes".to_string()),
                ..BookPatch::default()
            },
        )
        .unwrap();

    assert_eq!(updated.name, "Collected Notes");
    assert!(updated.authors.is_empty());
    assert!(updated.genres.is_empty());
}

#[test]
fn update_with_dangling_id_is_a_store_rejection() {
    let mut conn = open_db_in_memory().unwrap();
    let authors = seed_authors(&conn, &["Existing"]);

    let mut service = BookService::new(SqliteBookRepository::new(&mut conn));
    let created = service
        .create_book(&draft("Kept", vec![authors[0]], vec![]))
        .unwrap();

    let err = service
        .update_book(
            created.id,
            &BookPatch {
                name: Some("Renamed".to_string()),
                author_ids: vec![authors[0], 999],
                ..BookPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, CatalogError::StoreReferential(_)));

    let unchanged = service.get_book(created.id).unwrap().unwrap();
    assert_eq!(unchanged.name, "Kept");
    assert_eq!(unchanged.author_ids(), vec![authors[0]]);
}

#[test]
fn update_and_delete_of_missing_book_are_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = BookService::new(SqliteBookRepository::new(&mut conn));

    let err = service
        .update_book(5, &replace_patch(vec![], vec![]))
        .unwrap_err();
    assert!(matches!(
        err,
        CatalogError::NotFound {
            kind: EntityKind::Book,
            id: 5
        }
    ));

    let err = service.delete_book(5).unwrap_err();
    assert!(matches!(err, CatalogError::NotFound { id: 5, .. }));
    assert_eq!(service.get_book(5).unwrap(), None);
}

#[test]
fn deleting_an_author_detaches_it_and_keeps_the_book() {
    let mut conn = open_db_in_memory().unwrap();
    let authors = seed_authors(&conn, &["Stays", "Goes"]);

    let book_id = {
        let mut service = BookService::new(SqliteBookRepository::new(&mut conn));
        service
            .create_book(&draft("Duet", vec![authors[0], authors[1]], vec![]))
            .unwrap()
            .id
    };

    SqliteRecordRepository::<Author>::new(&conn)
        .delete(authors[1])
        .unwrap();

    let service = BookService::new(SqliteBookRepository::new(&mut conn));
    let book = service.get_book(book_id).unwrap().unwrap();
    assert_eq!(book.author_ids(), vec![authors[0]]);
    assert_eq!(service.count_books().unwrap(), 1);
}

#[test]
fn deleting_a_book_keeps_authors_and_genres() {
    let mut conn = open_db_in_memory().unwrap();
    let authors = seed_authors(&conn, &["Author"]);
    let genres = seed_genres(&conn, &["Genre"]);

    let deleted = {
        let mut service = BookService::new(SqliteBookRepository::new(&mut conn));
        let created = service
            .create_book(&draft("Gone", vec![authors[0]], vec![genres[0]]))
            .unwrap();
        service.delete_book(created.id).unwrap()
    };

    assert_eq!(deleted.name, "Gone");
    assert_eq!(edge_count(&conn, "book_authors"), 0);
    assert_eq!(edge_count(&conn, "book_genres"), 0);
    assert_eq!(
        SqliteRecordRepository::<Author>::new(&conn).count().unwrap(),
        1
    );
    assert_eq!(SqliteRecordRepository::<Genre>::new(&conn).count().unwrap(), 1);
}

/// Reports every requested author as present on the first lookup only,
/// the way a concurrent delete between validation and write would look.
struct StaleAuthorLookup<'conn> {
    inner: SqliteBookRepository<'conn>,
    stale: Cell<bool>,
}

impl BookRepository for StaleAuthorLookup<'_> {
    fn find_authors(&self, ids: &[RecordId]) -> RepoResult<Vec<Author>> {
        if self.stale.replace(false) {
            return Ok(ids
                .iter()
                .map(|id| Author {
                    id: *id,
                    name: String::new(),
                    year: 0,
                })
                .collect());
        }
        self.inner.find_authors(ids)
    }

    fn find_genres(&self, ids: &[RecordId]) -> RepoResult<Vec<Genre>> {
        self.inner.find_genres(ids)
    }

    fn create_book(&mut self, draft: &BookDraft, relations: &BookRelations) -> RepoResult<BookRecord> {
        self.inner.create_book(draft, relations)
    }

    fn update_book(
        &mut self,
        id: RecordId,
        patch: &BookPatch,
        relations: &BookRelations,
    ) -> RepoResult<BookRecord> {
        self.inner.update_book(id, patch, relations)
    }

    fn find_books(&self, filter: &NameFilter, window: Window) -> RepoResult<Vec<BookRecord>> {
        self.inner.find_books(filter, window)
    }

    fn find_book(&self, id: RecordId) -> RepoResult<Option<BookRecord>> {
        self.inner.find_book(id)
    }

    fn delete_book(&self, id: RecordId) -> RepoResult<Book> {
        self.inner.delete_book(id)
    }

    fn count_books(&self) -> RepoResult<u64> {
        self.inner.count_books()
    }
}

#[test]
fn author_removed_after_validation_is_reported_as_validation_error() {
    let mut conn = open_db_in_memory().unwrap();
    let authors = seed_authors(&conn, &["Present"]);
    let vanished = authors[0] + 10;

    let mut service = BookService::new(StaleAuthorLookup {
        inner: SqliteBookRepository::new(&mut conn),
        stale: Cell::new(true),
    });
    let err = service
        .create_book(&draft("Racy", vec![authors[0], vanished], vec![]))
        .unwrap_err();

    match err {
        CatalogError::Validation {
            invalid_author_ids, ..
        } => assert_eq!(invalid_author_ids, vec![vanished]),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(service.count_books().unwrap(), 0);
}
