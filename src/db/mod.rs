//! SQLite-backed catalog storage: one `books` table behind an r2d2 pool.

mod books;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Set busy_timeout on every connection handed out by the pool.
#[derive(Debug)]
struct BusyTimeoutCustomizer;
impl r2d2::CustomizeConnection<rusqlite::Connection, rusqlite::Error> for BusyTimeoutCustomizer {
    fn on_acquire(&self, conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(())
    }
}

type PooledConn = r2d2::PooledConnection<SqliteConnectionManager>;

/// Placeholder ISBN for records whose ISBN is unknown.
/// Never counts as a match: duplicate checks and search dedup both skip it.
pub const NO_ISBN: &str = "無ISBN";

/// Where a record came from. Derived at read time, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "館藏")]
    Local,
    #[serde(rename = "Google Books API")]
    GoogleBooks,
}

/// A catalog record, either a local holding or an external search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned id; `None` for external records.
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: String,
    pub pub_date: String,
    pub description: String,
    pub subject: String,
    pub image_url: String,
    pub source: Source,
}

impl Book {
    pub fn has_isbn(&self) -> bool {
        self.isbn != NO_ISBN
    }
}

/// Body of an add request. Missing or null fields fall back to empty strings,
/// except `isbn` which falls back to [`NO_ISBN`].
#[derive(Debug, Default, Deserialize)]
pub struct BookInput {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
    #[serde(default = "default_isbn", deserialize_with = "null_as_no_isbn")]
    pub isbn: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub publisher: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pub_date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub image_url: String,
}

fn default_isbn() -> String {
    NO_ISBN.into()
}

fn null_as_empty<'de, D>(d: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

fn null_as_no_isbn<'de, D>(d: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(d)?.unwrap_or_else(default_isbn))
}

impl BookInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            isbn: default_isbn(),
            ..Default::default()
        }
    }

    pub fn author(mut self, a: impl Into<String>) -> Self {
        self.author = a.into();
        self
    }

    pub fn isbn(mut self, i: impl Into<String>) -> Self {
        self.isbn = i.into();
        self
    }

    pub fn publisher(mut self, p: impl Into<String>) -> Self {
        self.publisher = p.into();
        self
    }

    pub fn pub_date(mut self, d: impl Into<String>) -> Self {
        self.pub_date = d.into();
        self
    }

    pub fn description(mut self, d: impl Into<String>) -> Self {
        self.description = d.into();
        self
    }

    pub fn subject(mut self, s: impl Into<String>) -> Self {
        self.subject = s.into();
        self
    }
}

fn validate_input(input: &BookInput) -> Result<(), CatalogError> {
    let title = input.title.trim();
    if title.is_empty() {
        return Err(CatalogError::Validation("title must not be empty".into()));
    }
    Ok(())
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT,
    isbn TEXT,
    publisher TEXT,
    pub_date TEXT,
    description TEXT,
    subject TEXT,
    image_url TEXT
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_books_isbn ON books(isbn) WHERE isbn != '無ISBN';
"#;

/// SQLite-backed book store.
pub struct BookDB {
    pool: Pool<SqliteConnectionManager>,
}

impl std::fmt::Debug for BookDB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookDB").field("pool", &self.pool.state()).finish()
    }
}

impl BookDB {
    fn conn(&self) -> Result<PooledConn, CatalogError> {
        self.pool.get().map_err(|e| CatalogError::Internal(format!("pool: {e}")))
    }

    /// Open (or create) a database at the given path.
    pub fn open(path: &str) -> Result<Self, CatalogError> {
        let pool_size = if path == ":memory:" { 2 } else { 4 };
        let manager = if path == ":memory:" {
            // Shared cache so all pool connections see the same in-memory DB.
            // Each open gets a unique name so tests don't see each other's rows.
            let name = uuid::Uuid::new_v4().to_string();
            SqliteConnectionManager::file(format!("file:{name}?mode=memory&cache=shared"))
        } else {
            SqliteConnectionManager::file(path)
        };
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_customizer(Box::new(BusyTimeoutCustomizer))
            .build(manager)
            .map_err(|e| CatalogError::Internal(format!("pool: {e}")))?;

        let conn = pool.get().map_err(|e| CatalogError::Internal(e.to_string()))?;
        if path != ":memory:" {
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        }
        conn.execute_batch(SCHEMA)?;
        drop(conn);
        Ok(Self { pool })
    }
}

/// Row mapper for `SELECT *` on `books`. Legacy rows may hold NULL in the
/// optional text columns; those read back as empty strings, and a NULL isbn
/// reads back as the placeholder.
fn row_to_book(row: &rusqlite::Row) -> rusqlite::Result<Book> {
    let text = |col: &str| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(col)?.unwrap_or_default())
    };
    Ok(Book {
        id: Some(row.get("id")?),
        title: row.get("title")?,
        author: text("author")?,
        isbn: row
            .get::<_, Option<String>>("isbn")?
            .unwrap_or_else(default_isbn),
        publisher: text("publisher")?,
        pub_date: text("pub_date")?,
        description: text("description")?,
        subject: text("subject")?,
        image_url: text("image_url")?,
        source: Source::Local,
    })
}
