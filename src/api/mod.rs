use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::warn;

use crate::{db_call, AppState};

mod books;

use books::*;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_ui))
        .route("/health", get(health))
        .route("/books", get(list_books))
        .route("/search", get(search_books))
        .route("/add_book", post(add_book))
        .route("/delete_book", post(delete_book))
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn serve_ui() -> axum::response::Html<&'static str> {
    axum::response::Html(include_str!("../../web/index.html"))
}

/// GET /health — uptime and holdings count.
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let books = match db_call(&state.db, |db| db.count()).await {
        Ok(Ok(n)) => Some(n),
        Ok(Err(e)) | Err(e) => {
            warn!(error = %e, "health: book count failed");
            None
        }
    };
    Json(serde_json::json!({
        "name": "libsearch",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started_at.elapsed().as_secs(),
        "books": books,
    }))
}
