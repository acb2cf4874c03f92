use std::fmt::Display;

use atlas_db::DbError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// An error answered as `{"message": ...}` with the given status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Logs `err` and answers with a generic message.
    pub fn internal(err: impl Display) -> Self {
        error!("request failed: {err}");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(_) | DbError::NoEntityExists { .. } => {
                Self::not_found(err.to_string())
            }
            DbError::NonUniqueResult { .. } => Self::new(StatusCode::CONFLICT, err.to_string()),
            DbError::UniqueViolation(_) => {
                Self::new(StatusCode::CONFLICT, "country already exists")
            }
            DbError::UnsupportedField(_)
            | DbError::InvalidColumn(_)
            | DbError::EmptyUpdate
            | DbError::InvalidChunkSize
            | DbError::InvalidPage(_)
            | DbError::InvalidRecord(_) => Self::bad_request(err.to_string()),
            other => Self::internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            message: &self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use atlas_db::Record;

    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DbError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                DbError::no_entity_exists("Query updated no rows", Record::new()),
                StatusCode::NOT_FOUND,
            ),
            (
                DbError::non_unique_result("many", Record::new()),
                StatusCode::CONFLICT,
            ),
            (DbError::UnsupportedField("secret".into()), StatusCode::BAD_REQUEST),
            (DbError::InvalidColumn("nope".into()), StatusCode::BAD_REQUEST),
            (DbError::EmptyUpdate, StatusCode::BAD_REQUEST),
            (
                DbError::QueryError("disk I/O error".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = ApiError::from(DbError::QueryError("no such table: country".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let err = ApiError::from(DbError::UniqueViolation(
            "UNIQUE constraint failed: country.country_id".into(),
        ));
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert!(!err.message.contains("UNIQUE"));
    }

    #[test]
    fn test_message_is_kept() {
        let err = ApiError::from(DbError::no_entity_exists("Query updated no rows", Record::new()));
        assert_eq!(err.message, "Query updated no rows");
    }
}
