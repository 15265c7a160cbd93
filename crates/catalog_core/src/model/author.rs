//! Author records and write inputs.

use super::RecordId;
use serde::{Deserialize, Serialize};

/// Persisted author row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: RecordId,
    pub name: String,
    /// Year associated with the author (birth or debut, caller-defined).
    pub year: i64,
}

/// Create input for an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorDraft {
    pub name: String,
    pub year: i64,
}

/// Partial update for an author. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
}
