//! Book Catalog Backend
//!
//! A REST API server over a MongoDB document store for a book catalog,
//! user profiles, wishlists, and reading lists.

mod api;
mod config;
mod db;
mod error;

use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use config::Config;
use db::CatalogDb;
use std::net::SocketAddr;
use std::time::Instant;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// Request ID middleware - adds unique ID to each request for tracing
async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        uri = %uri,
    );

    let response = next.run(request).instrument(span).await;

    let duration = start.elapsed();
    info!(
        request_id = %request_id,
        method = %method,
        uri = %uri,
        status = %response.status().as_u16(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded: {:?}", config);

    // Connect to the document store and verify it responds
    let db = CatalogDb::connect(&config.database).await?;

    // Build our application with routes
    let app = Router::new()
        // Liveness
        .route("/", get(hello_world))
        // Book catalog
        .route("/books", get(api::books::list_books))
        .route("/books/last-ten", get(api::books::recent_books))
        .route("/book", post(api::books::create_book))
        .route(
            "/book/:id",
            get(api::books::get_book)
                .patch(api::books::update_book)
                .delete(api::books::delete_book),
        )
        .route("/book/add-review/:id", patch(api::books::add_review))
        // Comments
        .route(
            "/comment/:id",
            post(api::comments::add_comment).get(api::comments::get_comments),
        )
        // Users
        .route("/user", post(api::users::create_user))
        .route("/user/:email", get(api::users::get_user))
        // Wishlist
        .route("/wishlist", post(api::wishlist::add_to_wishlist))
        .route("/wishlist/:user_email", get(api::wishlist::get_wishlist))
        .route(
            "/wishlist/:user_email/:book_id",
            delete(api::wishlist::remove_from_wishlist),
        )
        // Reading list
        .route(
            "/readinglist",
            post(api::readinglist::add_to_reading_list).patch(api::readinglist::finish_book),
        )
        .route(
            "/readinglist/:user_email",
            get(api::readinglist::get_reading_list),
        )
        .route(
            "/readinglist/:user_email/:book_id",
            delete(api::readinglist::remove_from_reading_list),
        )
        // Middleware (order matters - request_id should be first)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(CorsLayer::permissive()) // Allow CORS for development
        .with_state(db.clone());

    // Bind to address from config
    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;

    info!("🚀 Server running on http://{}", addr);
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Handle graceful shutdown signals (Ctrl+C, SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

async fn hello_world() -> &'static str {
    "Hello World!"
}
