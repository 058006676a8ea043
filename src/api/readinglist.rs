//! Reading-list API handlers
//!
//! Contains HTTP request handlers for reading-list membership, the joined
//! reading-list view, and the per-entry completion flag.

use crate::api::utils::{
    document_to_json, insert_ack, parse_book_id, require_user, update_ack,
};
use crate::db::{CatalogDb, ReadingListAdd};
use crate::error::AppError;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Add to reading list request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToReadingListRequest {
    /// Email of the owning user, created on first use
    pub user_email: String,
    /// Hex id of the book to add
    pub book_id: String,
}

/// Completion flag request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishBookRequest {
    /// Email of the owning user
    pub user_email: String,
    /// Hex id of the book whose entry is updated
    pub book_id: String,
    /// New value for the completion flag
    pub is_finished: bool,
}

/// Joined reading list response
#[derive(Serialize)]
pub struct ReadingListResponse {
    /// Book summaries with per-entry completion flags, list order
    pub readinglist: Vec<Value>,
}

/// Message response
#[derive(Serialize)]
pub struct MessageResponse {
    /// Human-readable message
    pub message: String,
}

/// GET /readinglist/:user_email - Get a user's joined reading list
pub async fn get_reading_list(
    State(db): State<CatalogDb>,
    Path(user_email): Path<String>,
) -> Result<Json<ReadingListResponse>, AppError> {
    require_user(&db, &user_email).await?;
    let entries = db.joined_reading_list(&user_email).await?;
    Ok(Json(ReadingListResponse {
        readinglist: entries.into_iter().map(document_to_json).collect(),
    }))
}

/// POST /readinglist - Add a book to a user's reading list
///
/// The first add for an email creates the user document; the
/// acknowledgment echoes whichever write ran. Re-adding a listed book is
/// acknowledged with zero modifications.
pub async fn add_to_reading_list(
    State(db): State<CatalogDb>,
    Json(request): Json<AddToReadingListRequest>,
) -> Result<Json<Value>, AppError> {
    let book_id = parse_book_id(&request.book_id)?;
    let body = match db.add_to_reading_list(&request.user_email, book_id).await? {
        ReadingListAdd::Created(result) => insert_ack(result.inserted_id),
        ReadingListAdd::Updated(result) => update_ack(&result),
    };
    Ok(Json(body))
}

/// PATCH /readinglist - Set the completion flag on a reading-list entry
///
/// Re-setting the flag to its current value succeeds; only a missing user
/// or entry is an error.
pub async fn finish_book(
    State(db): State<CatalogDb>,
    Json(request): Json<FinishBookRequest>,
) -> Result<Json<Value>, AppError> {
    let book_id = parse_book_id(&request.book_id)?;
    let result = db
        .set_reading_list_finished(&request.user_email, book_id, request.is_finished)
        .await?;
    if result.matched_count == 0 {
        return Err(AppError::ReadingListEntryNotFound(request.book_id));
    }

    Ok(Json(update_ack(&result)))
}

/// DELETE /readinglist/:user_email/:book_id - Remove a book's entry
///
/// Removing a book that is not listed is a no-op for a known user.
pub async fn remove_from_reading_list(
    State(db): State<CatalogDb>,
    Path((user_email, book_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_book_id(&book_id)?;
    let result = db.remove_from_reading_list(&user_email, id).await?;
    if result.matched_count == 0 {
        return Err(AppError::UserNotFound(user_email));
    }

    Ok(Json(MessageResponse {
        message: "Book removed from reading list".to_string(),
    }))
}
