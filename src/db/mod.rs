//! Document store access
//!
//! Handles the MongoDB connection lifecycle and all collection operations
//! for books, users, and their wishlists / reading lists.

mod books;
mod users;

pub use users::ReadingListAdd;

use crate::config::DatabaseConfig;
use crate::error::AppError;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection, Database};
use tracing::info;

/// Name of the collection holding book documents
pub const BOOKS_COLLECTION: &str = "books";

/// Name of the collection holding user documents
pub const USERS_COLLECTION: &str = "users";

/// Handle to the book-catalog database
///
/// Wraps a single `mongodb::Client` created at process start. The handle is
/// cheap to clone (the driver shares one connection pool across clones) and
/// is stored in the router state, so every request task reuses the same
/// long-lived connection.
#[derive(Clone)]
pub struct CatalogDb {
    client: Client,
    database: Database,
    books: Collection<Document>,
    users: Collection<Document>,
}

impl CatalogDb {
    /// Build a handle from configuration without contacting the store
    ///
    /// The driver connects lazily, so this only fails on a malformed
    /// connection string. Use [`CatalogDb::connect`] to also verify the
    /// store is reachable.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, AppError> {
        let client = Client::with_uri_str(&config.url).await?;
        let database = client.database(&config.name);
        Ok(Self {
            books: database.collection(BOOKS_COLLECTION),
            users: database.collection(USERS_COLLECTION),
            database,
            client,
        })
    }

    /// Connect to the store and verify it responds
    ///
    /// # Arguments
    /// * `config` - Database connection settings
    ///
    /// # Returns
    /// * `Ok(CatalogDb)` if the store answered the ping
    /// * `Err(AppError)` if the connection string is invalid or the store is unreachable
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let db = Self::new(config).await?;
        db.ping().await?;
        info!(database = %config.name, "Connected to MongoDB");
        Ok(db)
    }

    /// Round-trip a `ping` command to the store
    pub async fn ping(&self) -> Result<(), AppError> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    /// Release the underlying client, closing its connections
    ///
    /// Call once at process shutdown, after the server has stopped
    /// accepting requests.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("MongoDB client shut down");
    }

    /// Get the books collection handle (for raw operations if needed)
    #[allow(dead_code)]
    pub fn books(&self) -> &Collection<Document> {
        &self.books
    }
}
