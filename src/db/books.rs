//! Book CRUD and keyword lookup.

use rusqlite::params;

use super::*;

/// Books written by `reset_and_seed`.
const SEED_BOOKS: [[&str; 8]; 2] = [
    [
        "資訊與圖書館學概論",
        "王梅玲",
        "978986000001",
        "五南圖書",
        "2020-01-01",
        "本書介紹圖書館學的基礎理論與實務...",
        "圖書館學",
        "",
    ],
    [
        "Python 程式設計入門",
        "廖雪峰",
        "978986000002",
        "歐萊禮",
        "2023-05-20",
        "適合初學者的 Python 入門書...",
        "程式設計",
        "",
    ],
];

const INSERT_SQL: &str = "INSERT INTO books \
    (title, author, isbn, publisher, pub_date, description, subject, image_url) \
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl BookDB {
    /// All holdings, newest first.
    pub fn list_all(&self) -> Result<Vec<Book>, CatalogError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT * FROM books ORDER BY id DESC")?;
        let rows = stmt
            .query_map([], row_to_book)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Substring match over title, author, isbn and publisher using SQL LIKE.
    /// An empty keyword matches every row. `%` and `_` inside the keyword
    /// keep their LIKE meaning.
    pub fn search_local(&self, keyword: &str) -> Result<Vec<Book>, CatalogError> {
        let conn = self.conn()?;
        let pattern = format!("%{keyword}%");
        let mut stmt = conn.prepare(
            "SELECT * FROM books \
             WHERE title LIKE ?1 OR author LIKE ?1 OR isbn LIKE ?1 OR publisher LIKE ?1 \
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![pattern], row_to_book)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// True if a holding already carries this ISBN. Always false for the placeholder.
    pub fn exists(&self, isbn: &str) -> Result<bool, CatalogError> {
        if isbn == NO_ISBN {
            return Ok(false);
        }
        let conn = self.conn()?;
        let found = conn
            .prepare("SELECT 1 FROM books WHERE isbn = ?1 AND isbn != ?2 LIMIT 1")?
            .exists(params![isbn, NO_ISBN])?;
        Ok(found)
    }

    /// Insert a new holding. Ids are AUTOINCREMENT, so they never reuse a
    /// value from a deleted row.
    ///
    /// Callers are expected to check [`BookDB::exists`] first; the partial
    /// unique index on `isbn` still rejects a duplicate that slips past the
    /// check, reported as [`CatalogError::DuplicateIsbn`].
    pub fn insert(&self, input: BookInput) -> Result<Book, CatalogError> {
        validate_input(&input)?;
        let title = input.title.trim().to_string();
        let conn = self.conn()?;
        conn.execute(
            INSERT_SQL,
            params![
                title,
                input.author,
                input.isbn,
                input.publisher,
                input.pub_date,
                input.description,
                input.subject,
                input.image_url,
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::DuplicateIsbn
            } else {
                CatalogError::Database(e)
            }
        })?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, isbn = %input.isbn, "book inserted");

        Ok(Book {
            id: Some(id),
            title,
            author: input.author,
            isbn: input.isbn,
            publisher: input.publisher,
            pub_date: input.pub_date,
            description: input.description,
            subject: input.subject,
            image_url: input.image_url,
            source: Source::Local,
        })
    }

    pub fn get(&self, id: i64) -> Result<Option<Book>, CatalogError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT * FROM books WHERE id = ?1")?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_book(row)?)),
            None => Ok(None),
        }
    }

    /// Returns whether a row was actually removed.
    pub fn delete(&self, id: i64) -> Result<bool, CatalogError> {
        let conn = self.conn()?;
        let n = conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;
        Ok(n > 0)
    }

    pub fn count(&self) -> Result<usize, CatalogError> {
        let conn = self.conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM books", [], |r| r.get(0))?;
        Ok(n as usize)
    }

    /// Drop the table, recreate it and load the default books.
    /// Returns the number of seeded rows.
    pub fn reset_and_seed(&self) -> Result<usize, CatalogError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute_batch("DROP TABLE IF EXISTS books;")?;
        tx.execute_batch(SCHEMA)?;
        {
            let mut stmt = tx.prepare(INSERT_SQL)?;
            for b in &SEED_BOOKS {
                stmt.execute(params![b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])?;
            }
        }
        tx.commit()?;
        Ok(SEED_BOOKS.len())
    }
}
