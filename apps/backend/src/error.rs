//! Error handling for the backend API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use studydeck_core::{ParseError, StudyError};
use thiserror::Error;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        ApiError::Parse(err.to_string())
    }
}

impl From<StudyError> for ApiError {
    fn from(err: StudyError) -> Self {
        match err {
            StudyError::DeckNotFound(_) | StudyError::UnknownCard(_) => {
                ApiError::NotFound(err.to_string())
            }
            StudyError::Store(e) => ApiError::Internal(e.to_string()),
            _ => ApiError::BadRequest(err.to_string()),
        }
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Parse(_) => (StatusCode::BAD_REQUEST, "parse_error"),
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            ApiError::Migration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "migration_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_status() {
        let error = ApiError::Unauthorized("invalid token".to_string());
        assert_eq!(error.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_forbidden_status() {
        let error = ApiError::Forbidden("not the deck owner".to_string());
        assert_eq!(error.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_not_found_status() {
        let error = ApiError::NotFound("deck".to_string());
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_bad_request_status() {
        let error = ApiError::BadRequest("answer must not be empty".to_string());
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_parse_error_from_core() {
        let error: ApiError = ParseError::MissingAnswer { line: 4 }.into();
        assert_eq!(error.to_string(), "Parse error: missing answer at line 4");
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_study_error_mapping() {
        let error: ApiError = StudyError::EmptyAnswer.into();
        assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

        let error: ApiError = StudyError::UnknownCard(7).into();
        assert_eq!(error.to_string(), "Not found: card 7 is not in this deck");
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_server_errors() {
        let error = ApiError::Internal("unexpected error".to_string());
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let error = ApiError::Migration("migration failed".to_string());
        assert_eq!(error.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            ApiError::Unauthorized("invalid token".to_string()).to_string(),
            "Unauthorized: invalid token"
        );
        assert_eq!(
            ApiError::NotFound("Card 12".to_string()).to_string(),
            "Not found: Card 12"
        );
        assert_eq!(
            ApiError::BadRequest("missing field".to_string()).to_string(),
            "Bad request: missing field"
        );
    }
}
