//! Book catalog API handlers
//!
//! Contains HTTP request handlers for book CRUD operations.

use crate::api::utils::{delete_ack, document_to_json, insert_ack, parse_book_id, update_ack};
use crate::db::CatalogDb;
use crate::error::AppError;
use axum::{
    extract::{Path, State},
    response::Json,
};
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of books returned by the recent-books route
pub const RECENT_BOOKS_LIMIT: i64 = 10;

/// Book list response
#[derive(Serialize)]
pub struct BookListResponse {
    /// Whether the lookup succeeded
    pub status: bool,
    /// The requested book documents
    pub data: Vec<Value>,
}

/// Add review request
#[derive(Deserialize)]
pub struct AddReviewRequest {
    /// Free-form review payload, stored as given
    pub review: Bson,
}

/// GET /books - List all books
pub async fn list_books(State(db): State<CatalogDb>) -> Result<Json<BookListResponse>, AppError> {
    let books = db.list_books().await?;
    Ok(Json(BookListResponse {
        status: true,
        data: books.into_iter().map(document_to_json).collect(),
    }))
}

/// GET /books/last-ten - List the ten most recently created books
pub async fn recent_books(State(db): State<CatalogDb>) -> Result<Json<BookListResponse>, AppError> {
    let books = db.recent_books(RECENT_BOOKS_LIMIT).await?;
    Ok(Json(BookListResponse {
        status: true,
        data: books.into_iter().map(document_to_json).collect(),
    }))
}

/// POST /book - Create a new book
pub async fn create_book(
    State(db): State<CatalogDb>,
    Json(book): Json<Document>,
) -> Result<Json<Value>, AppError> {
    let result = db.create_book(book).await?;
    Ok(Json(insert_ack(result.inserted_id)))
}

/// GET /book/:id - Get a single book
///
/// An unknown id responds with JSON `null`; absence is a valid outcome here.
pub async fn get_book(
    State(db): State<CatalogDb>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let book_id = parse_book_id(&id)?;
    let body = match db.get_book(book_id).await? {
        Some(book) => document_to_json(book),
        None => Value::Null,
    };
    Ok(Json(body))
}

/// PATCH /book/:id - Apply a partial update to a book
pub async fn update_book(
    State(db): State<CatalogDb>,
    Path(id): Path<String>,
    Json(updates): Json<Document>,
) -> Result<Json<Value>, AppError> {
    let book_id = parse_book_id(&id)?;
    let result = db.update_book(book_id, updates).await?;
    Ok(Json(update_ack(&result)))
}

/// PATCH /book/add-review/:id - Prepend a review to a book
pub async fn add_review(
    State(db): State<CatalogDb>,
    Path(id): Path<String>,
    Json(request): Json<AddReviewRequest>,
) -> Result<Json<Value>, AppError> {
    let book_id = parse_book_id(&id)?;
    let result = db.add_review(book_id, request.review).await?;
    Ok(Json(update_ack(&result)))
}

/// DELETE /book/:id - Delete a book
pub async fn delete_book(
    State(db): State<CatalogDb>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let book_id = parse_book_id(&id)?;
    let result = db.delete_book(book_id).await?;
    Ok(Json(delete_ack(result.deleted_count)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use mongodb::bson::doc;

    /// Build a handle without touching the network; the driver only
    /// connects on the first operation, so malformed-id paths never reach it.
    async fn lazy_db() -> CatalogDb {
        let config = DatabaseConfig {
            url: "mongodb://localhost:27017".to_string(),
            name: "catalog-handler-tests".to_string(),
        };
        CatalogDb::new(&config).await.unwrap()
    }

    #[tokio::test]
    async fn test_get_book_rejects_malformed_id() {
        let db = lazy_db().await;
        let result = get_book(State(db), Path("not-an-id".to_string())).await;
        match result {
            Err(AppError::InvalidBookId(id)) => assert_eq!(id, "not-an-id"),
            _ => panic!("Expected InvalidBookId"),
        }
    }

    #[tokio::test]
    async fn test_update_book_rejects_malformed_id() {
        let db = lazy_db().await;
        let result = update_book(
            State(db),
            Path("xyz".to_string()),
            Json(doc! { "price": 10 }),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidBookId(_))));
    }

    #[tokio::test]
    async fn test_add_review_rejects_malformed_id() {
        let db = lazy_db().await;
        let request = AddReviewRequest {
            review: Bson::String("Great read".to_string()),
        };
        let result = add_review(State(db), Path("xyz".to_string()), Json(request)).await;
        assert!(matches!(result, Err(AppError::InvalidBookId(_))));
    }

    #[tokio::test]
    async fn test_delete_book_rejects_malformed_id() {
        let db = lazy_db().await;
        let result = delete_book(State(db), Path(String::new())).await;
        assert!(matches!(result, Err(AppError::InvalidBookId(_))));
    }
}
