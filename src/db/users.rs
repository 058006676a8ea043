//! User repository operations and the list-membership aggregator
//!
//! Covers user creation and lookup plus the wishlist / reading-list
//! operations: set-semantics adds, removals, the completion flag, and the
//! aggregation pipelines that join list references against the `books`
//! collection.

use crate::db::{CatalogDb, BOOKS_COLLECTION};
use crate::error::AppError;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::UpdateOptions;
use mongodb::results::{InsertOneResult, UpdateResult};
use tracing::debug;

/// Outcome of a reading-list add
///
/// The user document is created on the first add and updated afterwards;
/// callers echo the acknowledgment of whichever write ran.
pub enum ReadingListAdd {
    /// A new user document was inserted with a single-entry reading list
    Created(InsertOneResult),
    /// An existing user document was updated (no-op when the entry existed)
    Updated(UpdateResult),
}

/// Build a fresh reading-list entry for a book
///
/// Entries are keyed by `bookId`; the completion flag always starts false.
fn reading_entry(book_id: ObjectId) -> Document {
    doc! { "bookId": book_id, "isFinished": false }
}

/// Pipeline joining a user's wishlist against the `books` collection
///
/// Unwinds the stored id list with its array index, resolves each id via
/// `$lookup`, and sorts on the recorded index so the result preserves list
/// order. The inner `$unwind` drops entries whose book no longer exists.
fn wishlist_pipeline(email: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "email": email } },
        doc! { "$unwind": { "path": "$wishlist", "includeArrayIndex": "position" } },
        doc! { "$lookup": {
            "from": BOOKS_COLLECTION,
            "localField": "wishlist",
            "foreignField": "_id",
            "as": "book",
        } },
        doc! { "$unwind": "$book" },
        doc! { "$sort": { "position": 1 } },
        doc! { "$replaceRoot": { "newRoot": "$book" } },
    ]
}

/// Pipeline joining a user's reading list against the `books` collection
///
/// Same join skeleton as the wishlist, but the result is a fixed summary
/// projection of the book plus the per-entry completion flag carried from
/// the user's list entry.
fn reading_list_pipeline(email: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "email": email } },
        doc! { "$unwind": { "path": "$readinglist", "includeArrayIndex": "position" } },
        doc! { "$lookup": {
            "from": BOOKS_COLLECTION,
            "localField": "readinglist.bookId",
            "foreignField": "_id",
            "as": "book",
        } },
        doc! { "$unwind": "$book" },
        doc! { "$sort": { "position": 1 } },
        doc! { "$project": {
            "_id": "$book._id",
            "title": "$book.title",
            "author": "$book.author",
            "genre": "$book.genre",
            "publicationDate": "$book.publicationDate",
            "image": "$book.image",
            "price": "$book.price",
            "isFinished": "$readinglist.isFinished",
        } },
    ]
}

impl CatalogDb {
    /// Insert a new user document as supplied
    ///
    /// No uniqueness check is made against the email.
    pub async fn create_user(&self, user: Document) -> Result<InsertOneResult, AppError> {
        let result = self.users.insert_one(user, None).await?;
        debug!(user_id = %result.inserted_id, "Created user");
        Ok(result)
    }

    /// Get a user document by email
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<Document>, AppError> {
        Ok(self.users.find_one(doc! { "email": email }, None).await?)
    }

    /// Get the joined wishlist of a user: full book documents, list order
    ///
    /// Dangling references are dropped. Callers are expected to have
    /// checked the user exists; an unknown email yields an empty list.
    pub async fn joined_wishlist(&self, email: &str) -> Result<Vec<Document>, AppError> {
        let mut cursor = self.users.aggregate(wishlist_pipeline(email), None).await?;
        let mut books = Vec::new();
        while let Some(book) = cursor.try_next().await? {
            books.push(book);
        }
        Ok(books)
    }

    /// Get the joined reading list of a user: book summaries plus the
    /// per-entry completion flag, list order
    pub async fn joined_reading_list(&self, email: &str) -> Result<Vec<Document>, AppError> {
        let mut cursor = self
            .users
            .aggregate(reading_list_pipeline(email), None)
            .await?;
        let mut entries = Vec::new();
        while let Some(entry) = cursor.try_next().await? {
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Add a book to a user's wishlist, creating the user when absent
    ///
    /// `$addToSet` under an upsert gives the whole operation set semantics
    /// in one step: a missing user document is created with a single-entry
    /// wishlist, and re-adding a present id modifies nothing.
    pub async fn add_to_wishlist(
        &self,
        email: &str,
        book_id: ObjectId,
    ) -> Result<UpdateResult, AppError> {
        let options = UpdateOptions::builder().upsert(true).build();
        let result = self
            .users
            .update_one(
                doc! { "email": email },
                doc! { "$addToSet": { "wishlist": book_id } },
                options,
            )
            .await?;
        debug!(email, book_id = %book_id, modified = result.modified_count, "Wishlist add");
        Ok(result)
    }

    /// Remove a book from a user's wishlist
    ///
    /// A `matched_count` of zero means the user does not exist; a matched
    /// user with zero `modified_count` means the id was not on the list.
    pub async fn remove_from_wishlist(
        &self,
        email: &str,
        book_id: ObjectId,
    ) -> Result<UpdateResult, AppError> {
        Ok(self
            .users
            .update_one(
                doc! { "email": email },
                doc! { "$pull": { "wishlist": book_id } },
                None,
            )
            .await?)
    }

    /// Add a book to a user's reading list, creating the user when absent
    ///
    /// Entries are deduplicated by `bookId` alone: the `$ne` guard makes the
    /// push a no-op when any entry for the book exists, whatever its
    /// completion flag. The guard cannot be combined with an upsert (an
    /// unmatched guard would insert a second user document), so the user
    /// lookup runs first.
    pub async fn add_to_reading_list(
        &self,
        email: &str,
        book_id: ObjectId,
    ) -> Result<ReadingListAdd, AppError> {
        match self.find_user_by_email(email).await? {
            None => {
                let user = doc! { "email": email, "readinglist": [reading_entry(book_id)] };
                let result = self.users.insert_one(user, None).await?;
                debug!(email, book_id = %book_id, "Reading list add created user");
                Ok(ReadingListAdd::Created(result))
            }
            Some(_) => {
                let filter = doc! {
                    "email": email,
                    "readinglist.bookId": { "$ne": book_id },
                };
                let update = doc! { "$push": { "readinglist": reading_entry(book_id) } };
                let result = self.users.update_one(filter, update, None).await?;
                debug!(email, book_id = %book_id, modified = result.modified_count, "Reading list add");
                Ok(ReadingListAdd::Updated(result))
            }
        }
    }

    /// Remove a book's entry from a user's reading list
    ///
    /// Same contract as the wishlist removal: `matched_count` zero means
    /// the user does not exist.
    pub async fn remove_from_reading_list(
        &self,
        email: &str,
        book_id: ObjectId,
    ) -> Result<UpdateResult, AppError> {
        Ok(self
            .users
            .update_one(
                doc! { "email": email },
                doc! { "$pull": { "readinglist": { "bookId": book_id } } },
                None,
            )
            .await?)
    }

    /// Set the completion flag on a reading-list entry
    ///
    /// Matches the embedded entry by book id and updates it positionally;
    /// `matched_count` zero means no such user or no such entry.
    pub async fn set_reading_list_finished(
        &self,
        email: &str,
        book_id: ObjectId,
        is_finished: bool,
    ) -> Result<UpdateResult, AppError> {
        Ok(self
            .users
            .update_one(
                doc! { "email": email, "readinglist.bookId": book_id },
                doc! { "$set": { "readinglist.$.isFinished": is_finished } },
                None,
            )
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    fn stage_names(pipeline: &[Document]) -> Vec<&str> {
        pipeline
            .iter()
            .map(|stage| stage.keys().next().map(String::as_str).unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_reading_entry_defaults_unfinished() {
        let id = ObjectId::new();
        let entry = reading_entry(id);
        assert_eq!(entry.get_object_id("bookId").unwrap(), id);
        assert!(!entry.get_bool("isFinished").unwrap());
    }

    #[test]
    fn test_wishlist_pipeline_shape() {
        let pipeline = wishlist_pipeline("u@e.com");
        assert_eq!(
            stage_names(&pipeline),
            vec![
                "$match",
                "$unwind",
                "$lookup",
                "$unwind",
                "$sort",
                "$replaceRoot"
            ]
        );

        let matched = pipeline[0].get_document("$match").unwrap();
        assert_eq!(matched.get_str("email").unwrap(), "u@e.com");

        // List order is preserved through the recorded array index.
        let unwind = pipeline[1].get_document("$unwind").unwrap();
        assert_eq!(unwind.get_str("includeArrayIndex").unwrap(), "position");
        let sort = pipeline[4].get_document("$sort").unwrap();
        assert_eq!(sort.get_i32("position").unwrap(), 1);

        let lookup = pipeline[2].get_document("$lookup").unwrap();
        assert_eq!(lookup.get_str("from").unwrap(), BOOKS_COLLECTION);
        assert_eq!(lookup.get_str("localField").unwrap(), "wishlist");
        assert_eq!(lookup.get_str("foreignField").unwrap(), "_id");

        // The plain unwind of the lookup output filters dangling references.
        assert_eq!(pipeline[3].get_str("$unwind").unwrap(), "$book");
    }

    #[test]
    fn test_reading_list_pipeline_projection() {
        let pipeline = reading_list_pipeline("u@e.com");
        assert_eq!(
            stage_names(&pipeline),
            vec![
                "$match",
                "$unwind",
                "$lookup",
                "$unwind",
                "$sort",
                "$project"
            ]
        );

        let lookup = pipeline[2].get_document("$lookup").unwrap();
        assert_eq!(lookup.get_str("localField").unwrap(), "readinglist.bookId");

        let projection = pipeline[5].get_document("$project").unwrap();
        let keys: Vec<&str> = projection.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "_id",
                "title",
                "author",
                "genre",
                "publicationDate",
                "image",
                "price",
                "isFinished"
            ]
        );
        // The flag comes from the user's entry, not the book document.
        assert_eq!(
            projection.get("isFinished"),
            Some(&Bson::String("$readinglist.isFinished".to_string()))
        );
    }
}
