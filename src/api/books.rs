//! Catalog handlers: list, search, add, delete.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::{Book, BookInput};
use crate::error::CatalogError;
use crate::{db_call, search, AppState};

/// Response body for add/delete.
#[derive(Debug, Serialize)]
pub(super) struct Outcome {
    success: bool,
    message: String,
}

impl Outcome {
    fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self { success: true, message: message.into() })
    }
}

/// GET /books — every holding, newest first.
pub(super) async fn list_books(
    State(state): State<AppState>,
) -> Result<Json<Vec<Book>>, CatalogError> {
    let books = db_call(&state.db, |db| db.list_all()).await??;
    Ok(Json(books))
}

#[derive(Deserialize)]
pub(super) struct SearchQuery {
    #[serde(default)]
    keyword: String,
}

/// GET /search?keyword=… — local matches, then Google Books hits not held locally.
pub(super) async fn search_books(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<Book>>, CatalogError> {
    let results = search::search(&state, &q.keyword).await?;
    Ok(Json(results))
}

/// POST /add_book
pub(super) async fn add_book(
    State(state): State<AppState>,
    body: Result<Json<BookInput>, JsonRejection>,
) -> Result<Json<Outcome>, CatalogError> {
    let Json(input) = body?;
    let book = db_call(&state.db, move |db| {
        if db.exists(&input.isbn)? {
            return Err(CatalogError::DuplicateIsbn);
        }
        db.insert(input)
    })
    .await??;

    info!(id = ?book.id, isbn = %book.isbn, "book added");
    Ok(Outcome::ok(format!("成功！《{}》已加入館藏。", book.title)))
}

#[derive(Deserialize)]
pub(super) struct DeleteBody {
    id: Option<i64>,
}

/// POST /delete_book
///
/// Reports success whether or not the id existed.
pub(super) async fn delete_book(
    State(state): State<AppState>,
    body: Result<Json<DeleteBody>, JsonRejection>,
) -> Result<Json<Outcome>, CatalogError> {
    let Json(body) = body?;
    if let Some(id) = body.id {
        let gone = db_call(&state.db, move |db| {
            let book = db.get(id)?;
            db.delete(id)?;
            Ok::<_, CatalogError>(book)
        })
        .await??;
        match gone {
            Some(b) => info!(id, title = %b.title, "book deleted"),
            None => debug!(id, "delete_book: no such id"),
        }
    }
    Ok(Outcome::ok("刪除成功！"))
}
