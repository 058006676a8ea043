//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// All errors that can occur in the application are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Book with the given id was not found
    #[error("Book not found: {0}")]
    BookNotFound(String),

    /// User with the given email was not found
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Reading-list entry for the given book id was not found
    #[error("Reading list entry not found for book: {0}")]
    ReadingListEntryNotFound(String),

    /// Comment could not be added (the target book does not exist)
    #[error("Book not found or comment not added: {0}")]
    CommentNotAdded(String),

    /// Book id supplied by the client is not a valid ObjectId
    #[error("Invalid book id: {0}")]
    InvalidBookId(String),

    /// Error returned by the document store
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BookNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::UserNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::ReadingListEntryNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::CommentNotAdded(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidBookId(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
