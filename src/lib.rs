//! libsearch — library catalog search.
//! Local SQLite holdings merged with Google Books results, deduplicated by ISBN.

pub mod api;
pub mod db;
pub mod error;
pub mod lookup;
pub mod search;

use std::sync::Arc;

pub type SharedDB = Arc<db::BookDB>;

/// Run a blocking DB operation on tokio's blocking thread pool.
///
/// All synchronous BookDB calls in async context go through this
/// so they don't stall tokio worker threads.
pub async fn db_call<F, T>(db: &SharedDB, f: F) -> Result<T, error::CatalogError>
where
    F: FnOnce(&db::BookDB) -> T + Send + 'static,
    T: Send + 'static,
{
    let db = Arc::clone(db);
    tokio::task::spawn_blocking(move || f(&db))
        .await
        .map_err(|e| error::CatalogError::Internal(e.to_string()))
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: SharedDB,
    pub lookup: lookup::LookupConfig,
    pub started_at: std::time::Instant,
}

impl AppState {
    pub fn new(db: db::BookDB, lookup: lookup::LookupConfig) -> Self {
        Self {
            db: Arc::new(db),
            lookup,
            started_at: std::time::Instant::now(),
        }
    }
}
