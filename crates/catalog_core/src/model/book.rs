//! Book records, nested read model and write inputs.
//!
//! # Invariants
//! - `BookRecord.authors` / `BookRecord.genres` hold fully resolved rows,
//!   never bare ids, ordered by id.
//! - Draft/patch id lists default to empty when omitted by the caller.

use super::author::Author;
use super::genre::Genre;
use super::RecordId;
use serde::{Deserialize, Serialize};

/// Persisted book row without relations.
///
/// This is the shape returned for a deleted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: RecordId,
    pub name: String,
    /// Image reference (URL or storage key).
    pub img: String,
}

/// Book read model with nested authors and genres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: RecordId,
    pub name: String,
    pub img: String,
    /// Serialized as `author` to match the client schema.
    #[serde(rename = "author")]
    pub authors: Vec<Author>,
    /// Serialized as `genre` to match the client schema.
    #[serde(rename = "genre")]
    pub genres: Vec<Genre>,
}

impl BookRecord {
    /// Builds the read model from a base row and its resolved relations.
    pub fn assemble(book: Book, authors: Vec<Author>, genres: Vec<Genre>) -> Self {
        Self {
            id: book.id,
            name: book.name,
            img: book.img,
            authors,
            genres,
        }
    }

    pub fn author_ids(&self) -> Vec<RecordId> {
        self.authors.iter().map(|author| author.id).collect()
    }

    pub fn genre_ids(&self) -> Vec<RecordId> {
        self.genres.iter().map(|genre| genre.id).collect()
    }
}

/// Create input for a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub name: String,
    pub img: String,
    #[serde(default, rename = "authorIds", alias = "author")]
    pub author_ids: Vec<RecordId>,
    #[serde(default, rename = "genreIds", alias = "genre")]
    pub genre_ids: Vec<RecordId>,
}

/// Update input for a book.
///
/// Base fields are partial; the id lists are authoritative and replace the
/// stored sets, so omitting them clears the relations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default, rename = "authorIds", alias = "author")]
    pub author_ids: Vec<RecordId>,
    #[serde(default, rename = "genreIds", alias = "genre")]
    pub genre_ids: Vec<RecordId>,
}
