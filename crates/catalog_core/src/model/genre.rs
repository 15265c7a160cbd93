//! Genre records and write inputs.

use super::RecordId;
use serde::{Deserialize, Serialize};

/// Persisted genre row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: RecordId,
    pub name: String,
}

/// Create input for a genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreDraft {
    pub name: String,
}

/// Partial update for a genre. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenrePatch {
    #[serde(default)]
    pub name: Option<String>,
}
