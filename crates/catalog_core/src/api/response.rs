//! Response assembly for catalog operations.
//!
//! # Responsibility
//! - Shape use-case results into the outward JSON representation.
//! - Map every `CatalogError` to exactly one client or server response.
//!
//! # Invariants
//! - List results are wrapped as `{"data": [...]}`; single records are bare.
//! - Server errors expose a generic message only; details go to the log.

use crate::model::RecordId;
use crate::service::CatalogError;
use log::error;
use serde::Serialize;
use serde_json::{json, Value};

const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Outcome class of one catalog operation, aligned with HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    InternalError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::InternalError => 500,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// Envelope for list results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    invalid_author_ids: Vec<RecordId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    invalid_genre_ids: Vec<RecordId>,
}

/// One catalog response: a status plus a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: Status,
    pub body: Value,
}

impl Response {
    /// Successful response carrying `value` as the body.
    pub fn ok<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self {
                status: Status::Ok,
                body,
            },
            Err(err) => {
                error!(
                    "event=response_encode module=api status=error error_code=serialize_failed error={err}"
                );
                Self::internal_error()
            }
        }
    }

    /// Successful list response (`{"data": [...]}`).
    pub fn list<T: Serialize>(items: Vec<T>) -> Self {
        Self::ok(&ListEnvelope { data: items })
    }

    /// Maps a use-case error to its response; unexpected errors are logged.
    pub fn from_error(err: &CatalogError) -> Self {
        match err {
            CatalogError::Validation {
                invalid_author_ids,
                invalid_genre_ids,
            } => Self::error_body(
                Status::BadRequest,
                ErrorBody {
                    message: err.to_string(),
                    invalid_author_ids: invalid_author_ids.clone(),
                    invalid_genre_ids: invalid_genre_ids.clone(),
                },
            ),
            CatalogError::NotFound { .. } => Self::message(Status::NotFound, err.to_string()),
            CatalogError::StoreReferential(_) => {
                Self::message(Status::BadRequest, err.to_string())
            }
            CatalogError::Unexpected(source) => {
                error!(
                    "event=request_failed module=api status=error error_code={} error={source}",
                    err.code()
                );
                Self::internal_error()
            }
        }
    }

    pub fn internal_error() -> Self {
        Self::message(Status::InternalError, INTERNAL_ERROR_MESSAGE.to_string())
    }

    fn message(status: Status, message: String) -> Self {
        Self {
            status,
            body: json!({ "message": message }),
        }
    }

    fn error_body(status: Status, body: ErrorBody) -> Self {
        match serde_json::to_value(&body) {
            Ok(body) => Self { status, body },
            Err(_) => Self::message(status, body.message),
        }
    }
}

/// Converts a single-record result into a response.
pub fn respond<T: Serialize>(result: Result<T, CatalogError>) -> Response {
    match result {
        Ok(value) => Response::ok(&value),
        Err(err) => Response::from_error(&err),
    }
}

/// Converts a list result into a `{"data": [...]}` response.
pub fn respond_list<T: Serialize>(result: Result<Vec<T>, CatalogError>) -> Response {
    match result {
        Ok(items) => Response::list(items),
        Err(err) => Response::from_error(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::{respond, Response, Status};
    use crate::model::EntityKind;
    use crate::repo::RepoError;
    use crate::service::CatalogError;
    use serde_json::json;

    #[test]
    fn validation_error_lists_invalid_ids() {
        let err = CatalogError::Validation {
            invalid_author_ids: vec![2],
            invalid_genre_ids: Vec::new(),
        };
        let response = Response::from_error(&err);
        assert_eq!(response.status.code(), 400);
        assert_eq!(response.body["invalidAuthorIds"], json!([2]));
        assert!(response.body.get("invalidGenreIds").is_none());
    }

    #[test]
    fn not_found_is_distinct_client_error() {
        let response = Response::from_error(&CatalogError::NotFound {
            kind: EntityKind::Author,
            id: 9,
        });
        assert_eq!(response.status, Status::NotFound);
        assert_eq!(response.body["message"], json!("author not found: 9"));
    }

    #[test]
    fn unexpected_error_hides_details() {
        let err = CatalogError::Unexpected(RepoError::Unavailable("lock poisoned".to_string()));
        let response = Response::from_error(&err);
        assert_eq!(response.status.code(), 500);
        assert_eq!(response.body, json!({ "message": "internal server error" }));
    }

    #[test]
    fn empty_single_result_is_null_body() {
        let response = respond::<Option<u8>>(Ok(None));
        assert!(response.status.is_success());
        assert!(response.body.is_null());
    }
}
