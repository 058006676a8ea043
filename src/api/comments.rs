//! Comment API handlers
//!
//! Contains HTTP request handlers for the per-book comment thread.

use crate::api::utils::{document_to_json, parse_book_id};
use crate::db::CatalogDb;
use crate::error::AppError;
use axum::{
    extract::{Path, State},
    response::Json,
};
use mongodb::bson::Bson;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Add comment request
#[derive(Deserialize)]
pub struct AddCommentRequest {
    /// Free-form comment payload, stored as given
    pub comment: Bson,
}

/// Message response
#[derive(Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}

/// POST /comment/:id - Append a comment to a book
///
/// The push filter only matches an existing book, so a miss shows up as
/// `modified_count` zero and is reported as not-found.
pub async fn add_comment(
    State(db): State<CatalogDb>,
    Path(id): Path<String>,
    Json(request): Json<AddCommentRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let book_id = parse_book_id(&id)?;
    let result = db.add_comment(book_id, request.comment).await?;
    if result.modified_count != 1 {
        return Err(AppError::CommentNotAdded(id));
    }

    Ok(Json(MessageResponse {
        message: "Comment added successfully".to_string(),
    }))
}

/// GET /comment/:id - Get a book's comments
///
/// Responds with the projected document, which is empty when the book
/// exists but nothing has been commented yet.
pub async fn get_comments(
    State(db): State<CatalogDb>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let book_id = parse_book_id(&id)?;
    let comments = db
        .get_comments(book_id)
        .await?
        .ok_or(AppError::BookNotFound(id))?;

    Ok(Json(document_to_json(comments)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    async fn lazy_db() -> CatalogDb {
        let config = DatabaseConfig {
            url: "mongodb://localhost:27017".to_string(),
            name: "catalog-handler-tests".to_string(),
        };
        CatalogDb::new(&config).await.unwrap()
    }

    #[tokio::test]
    async fn test_add_comment_rejects_malformed_id() {
        let db = lazy_db().await;
        let request = AddCommentRequest {
            comment: Bson::String("Loved it".to_string()),
        };
        let result = add_comment(State(db), Path("bad".to_string()), Json(request)).await;
        assert!(matches!(result, Err(AppError::InvalidBookId(_))));
    }

    #[tokio::test]
    async fn test_get_comments_rejects_malformed_id() {
        let db = lazy_db().await;
        let result = get_comments(State(db), Path("bad".to_string())).await;
        assert!(matches!(result, Err(AppError::InvalidBookId(_))));
    }
}
