//! Book repository operations
//!
//! All database interactions for the `books` collection: catalog CRUD,
//! review prepends, and comment appends.

use crate::db::CatalogDb;
use crate::error::AppError;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use mongodb::options::{FindOneOptions, FindOptions};
use mongodb::results::{DeleteResult, InsertOneResult, UpdateResult};
use tracing::debug;

/// Stamp the server-managed fields onto a new book document
///
/// `reviews` always starts empty and `createdAt` is always set server-side,
/// overwriting any values the client supplied for either field.
fn stamp_new_book(book: &mut Document) {
    book.insert("reviews", Bson::Array(Vec::new()));
    book.insert("createdAt", DateTime::now());
}

/// Build the update that prepends a review to a book's `reviews` array
fn review_prepend_update(review: Bson) -> Document {
    doc! {
        "$push": {
            "reviews": {
                "$each": [review],
                "$position": 0,
            }
        }
    }
}

impl CatalogDb {
    /// Get all books, in natural collection order
    pub async fn list_books(&self) -> Result<Vec<Document>, AppError> {
        let mut cursor = self.books.find(doc! {}, None).await?;
        let mut books = Vec::new();
        while let Some(book) = cursor.try_next().await? {
            books.push(book);
        }
        Ok(books)
    }

    /// Get the most recently created books, newest first
    pub async fn recent_books(&self, limit: i64) -> Result<Vec<Document>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .limit(limit)
            .build();
        let mut cursor = self.books.find(doc! {}, options).await?;
        let mut books = Vec::new();
        while let Some(book) = cursor.try_next().await? {
            books.push(book);
        }
        Ok(books)
    }

    /// Insert a new book
    ///
    /// The client-supplied fields are stored as-is apart from the
    /// server-managed `reviews` and `createdAt` stamps.
    pub async fn create_book(&self, mut book: Document) -> Result<InsertOneResult, AppError> {
        stamp_new_book(&mut book);
        let result = self.books.insert_one(book, None).await?;
        debug!(book_id = %result.inserted_id, "Created book");
        Ok(result)
    }

    /// Get a single book by id
    pub async fn get_book(&self, id: ObjectId) -> Result<Option<Document>, AppError> {
        Ok(self.books.find_one(doc! { "_id": id }, None).await?)
    }

    /// Apply a partial update to a book
    ///
    /// Each provided key overwrites the stored value (`$set` semantics);
    /// keys not provided are left untouched.
    pub async fn update_book(
        &self,
        id: ObjectId,
        updates: Document,
    ) -> Result<UpdateResult, AppError> {
        Ok(self
            .books
            .update_one(doc! { "_id": id }, doc! { "$set": updates }, None)
            .await?)
    }

    /// Prepend a review to a book's `reviews` array (newest first)
    pub async fn add_review(&self, id: ObjectId, review: Bson) -> Result<UpdateResult, AppError> {
        Ok(self
            .books
            .update_one(doc! { "_id": id }, review_prepend_update(review), None)
            .await?)
    }

    /// Append a comment to a book's `comments` array
    ///
    /// The array is created by the store on first append.
    pub async fn add_comment(&self, id: ObjectId, comment: Bson) -> Result<UpdateResult, AppError> {
        Ok(self
            .books
            .update_one(
                doc! { "_id": id },
                doc! { "$push": { "comments": comment } },
                None,
            )
            .await?)
    }

    /// Get only the comments of a book
    ///
    /// Returns the projected document (`comments` without `_id`), or `None`
    /// when the book does not exist.
    pub async fn get_comments(&self, id: ObjectId) -> Result<Option<Document>, AppError> {
        let options = FindOneOptions::builder()
            .projection(doc! { "_id": 0, "comments": 1 })
            .build();
        Ok(self.books.find_one(doc! { "_id": id }, options).await?)
    }

    /// Delete a book by id
    ///
    /// A zero `deleted_count` (unknown id) is not an error. References to
    /// the book left behind in wishlists or reading lists are not cleaned
    /// up; joined reads drop them.
    pub async fn delete_book(&self, id: ObjectId) -> Result<DeleteResult, AppError> {
        let result = self.books.delete_one(doc! { "_id": id }, None).await?;
        debug!(book_id = %id, deleted = result.deleted_count, "Deleted book");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_new_book_sets_managed_fields() {
        let mut book = doc! { "title": "X", "author": "Y" };
        stamp_new_book(&mut book);

        assert_eq!(book.get_array("reviews").unwrap().len(), 0);
        assert!(matches!(book.get("createdAt"), Some(Bson::DateTime(_))));
        assert_eq!(book.get_str("title").unwrap(), "X");
    }

    #[test]
    fn test_stamp_new_book_overwrites_client_values() {
        let mut book = doc! {
            "title": "X",
            "reviews": ["planted"],
            "createdAt": "1999-01-01",
        };
        stamp_new_book(&mut book);

        assert_eq!(book.get_array("reviews").unwrap().len(), 0);
        assert!(matches!(book.get("createdAt"), Some(Bson::DateTime(_))));
    }

    #[test]
    fn test_review_prepend_update_inserts_at_position_zero() {
        let update = review_prepend_update(Bson::String("great".to_string()));

        let push = update.get_document("$push").unwrap();
        let reviews = push.get_document("reviews").unwrap();
        assert_eq!(reviews.get_i32("$position").unwrap(), 0);
        let each = reviews.get_array("$each").unwrap();
        assert_eq!(each.len(), 1);
        assert_eq!(each[0], Bson::String("great".to_string()));
    }
}
