//! Catalog domain model.
//!
//! # Responsibility
//! - Define the author, genre and book records exchanged by every layer.
//! - Define write inputs (drafts for create, patches for update).
//!
//! # Invariants
//! - Every record is identified by a store-assigned integer id.
//! - Authors and genres never reference other records; books reference
//!   authors and genres through attribute-free edge sets.

pub mod author;
pub mod book;
pub mod genre;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned record identifier.
pub type RecordId = i64;

/// Record family, used for error reporting and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Author,
    Genre,
    Book,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Genre => "genre",
            Self::Book => "book",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
