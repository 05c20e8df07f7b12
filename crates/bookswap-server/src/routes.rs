//! API routes

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use bookswap_api::auth::AppState;
use bookswap_api::{auth, books, exchanges};

/// Request body cap: a 10 MiB cover plus the other form parts.
const MAX_BODY_BYTES: usize = 12 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    let uploads_dir = state.uploads_dir.clone();

    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/api/auth/user", get(auth::current_user))
        .route(
            "/api/books",
            get(books::list_books).post(books::create_book),
        )
        .route(
            "/api/books/{book_id}",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/api/my-books", get(books::my_books))
        .route("/api/exchange-requests", post(exchanges::create_request))
        .route(
            "/api/exchange-requests/{request_id}/status",
            put(exchanges::update_status),
        )
        .route("/api/my-requests", get(exchanges::my_requests))
        .route("/api/incoming-requests", get(exchanges::incoming_requests))
        .route("/health", get(health))
        .nest_service("/uploads", ServeDir::new(uploads_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
