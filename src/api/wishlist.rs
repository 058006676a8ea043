//! Wishlist API handlers
//!
//! Contains HTTP request handlers for wishlist membership and the joined
//! wishlist view.

use crate::api::utils::{document_to_json, parse_book_id, require_user, update_ack};
use crate::db::CatalogDb;
use crate::error::AppError;
use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Add to wishlist request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistRequest {
    /// Email of the owning user, created on first use
    pub user_email: String,
    /// Hex id of the book to add
    pub book_id: String,
}

/// Joined wishlist response
#[derive(Serialize)]
pub struct WishlistResponse {
    /// Full book documents in list order
    pub wishlist: Vec<Value>,
}

async fn joined_wishlist_body(db: &CatalogDb, email: &str) -> Result<WishlistResponse, AppError> {
    let books = db.joined_wishlist(email).await?;
    Ok(WishlistResponse {
        wishlist: books.into_iter().map(document_to_json).collect(),
    })
}

/// GET /wishlist/:user_email - Get a user's joined wishlist
///
/// An unknown user is a 404; a known user with nothing wishlisted gets an
/// empty array.
pub async fn get_wishlist(
    State(db): State<CatalogDb>,
    Path(user_email): Path<String>,
) -> Result<Json<WishlistResponse>, AppError> {
    require_user(&db, &user_email).await?;
    Ok(Json(joined_wishlist_body(&db, &user_email).await?))
}

/// POST /wishlist - Add a book to a user's wishlist
///
/// A single upserting `$addToSet` covers every case: the user document is
/// created when absent and a repeated add changes nothing.
pub async fn add_to_wishlist(
    State(db): State<CatalogDb>,
    Json(request): Json<AddToWishlistRequest>,
) -> Result<Json<Value>, AppError> {
    let book_id = parse_book_id(&request.book_id)?;
    let result = db.add_to_wishlist(&request.user_email, book_id).await?;
    Ok(Json(update_ack(&result)))
}

/// DELETE /wishlist/:user_email/:book_id - Remove a book and return the
/// refreshed wishlist
///
/// Removing an id that is not on the list is a no-op. The rejoin is a
/// second round trip, so writes landing in between are visible in the
/// returned list.
pub async fn remove_from_wishlist(
    State(db): State<CatalogDb>,
    Path((user_email, book_id)): Path<(String, String)>,
) -> Result<Json<WishlistResponse>, AppError> {
    let id = parse_book_id(&book_id)?;
    let result = db.remove_from_wishlist(&user_email, id).await?;
    if result.matched_count == 0 {
        return Err(AppError::UserNotFound(user_email));
    }

    Ok(Json(joined_wishlist_body(&db, &user_email).await?))
}
