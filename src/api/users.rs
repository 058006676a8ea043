//! User API handlers
//!
//! Contains HTTP request handlers for user profile creation and lookup.

use crate::api::utils::{document_to_json, insert_ack};
use crate::db::CatalogDb;
use crate::error::AppError;
use axum::{
    extract::{Path, State},
    response::Json,
};
use mongodb::bson::{Bson, Document};
use serde::Serialize;
use serde_json::Value;

/// User lookup response
///
/// A miss is reported as `{"status": false}` with a 200, never as an
/// error; clients poll this route to decide whether to create a profile.
#[derive(Serialize)]
pub struct UserLookupResponse {
    /// Whether a usable profile was found
    pub status: bool,
    /// The user document, present only on a hit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Whether a fetched user document carries a non-empty string email
fn has_usable_email(user: &Document) -> bool {
    matches!(user.get("email"), Some(Bson::String(email)) if !email.is_empty())
}

/// POST /user - Create a user profile
pub async fn create_user(
    State(db): State<CatalogDb>,
    Json(user): Json<Document>,
) -> Result<Json<Value>, AppError> {
    let result = db.create_user(user).await?;
    Ok(Json(insert_ack(result.inserted_id)))
}

/// GET /user/:email - Get a user profile by email
pub async fn get_user(
    State(db): State<CatalogDb>,
    Path(email): Path<String>,
) -> Result<Json<UserLookupResponse>, AppError> {
    match db.find_user_by_email(&email).await? {
        Some(user) if has_usable_email(&user) => Ok(Json(UserLookupResponse {
            status: true,
            data: Some(document_to_json(user)),
        })),
        _ => Ok(Json(UserLookupResponse {
            status: false,
            data: None,
        })),
    }
}
