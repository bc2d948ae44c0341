//! Local + Google Books search, deduplicated by ISBN.

use std::collections::HashSet;

use crate::db::Book;
use crate::error::CatalogError;
use crate::{db_call, lookup, AppState};

/// Local hits first, then external hits whose ISBN isn't already held.
/// Placeholder ISBNs never count as held, so they never dedup anything.
pub fn merge_results(local: Vec<Book>, external: Vec<Book>) -> Vec<Book> {
    let held: HashSet<String> = local
        .iter()
        .filter(|b| b.has_isbn())
        .map(|b| b.isbn.clone())
        .collect();
    let mut out = local;
    out.extend(external.into_iter().filter(|b| !held.contains(&b.isbn)));
    out
}

pub async fn search(state: &AppState, keyword: &str) -> Result<Vec<Book>, CatalogError> {
    let keyword = keyword.trim().to_string();
    let kw = keyword.clone();
    let local = db_call(&state.db, move |db| db.search_local(&kw)).await??;

    let external = if keyword.is_empty() {
        vec![]
    } else {
        lookup::fetch_external(&state.lookup, &keyword).await
    };
    tracing::debug!(
        keyword = %keyword,
        local = local.len(),
        external = external.len(),
        "search"
    );
    Ok(merge_results(local, external))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Source, NO_ISBN};

    fn book(id: Option<i64>, isbn: &str, source: Source) -> Book {
        Book {
            id,
            title: format!("t-{isbn}"),
            author: String::new(),
            isbn: isbn.into(),
            publisher: String::new(),
            pub_date: String::new(),
            description: String::new(),
            subject: String::new(),
            image_url: String::new(),
            source,
        }
    }

    #[test]
    fn drops_external_already_held() {
        let local = vec![book(Some(1), "111", Source::Local)];
        let external = vec![
            book(None, "111", Source::GoogleBooks),
            book(None, "222", Source::GoogleBooks),
        ];
        let merged = merge_results(local, external);
        let isbns: Vec<_> = merged.iter().map(|b| b.isbn.as_str()).collect();
        assert_eq!(isbns, ["111", "222"]);
        assert_eq!(merged[0].source, Source::Local);
    }

    #[test]
    fn placeholder_never_dedups() {
        let local = vec![book(Some(1), NO_ISBN, Source::Local)];
        let external = vec![
            book(None, NO_ISBN, Source::GoogleBooks),
            book(None, NO_ISBN, Source::GoogleBooks),
        ];
        assert_eq!(merge_results(local, external).len(), 3);
    }

    #[test]
    fn keeps_each_side_in_order() {
        let local = vec![book(Some(5), "b", Source::Local), book(Some(2), "a", Source::Local)];
        let external = vec![
            book(None, "z", Source::GoogleBooks),
            book(None, "a", Source::GoogleBooks),
            book(None, "y", Source::GoogleBooks),
        ];
        let isbns: Vec<_> = merge_results(local, external)
            .into_iter()
            .map(|b| b.isbn)
            .collect();
        assert_eq!(isbns, ["b", "a", "z", "y"]);
    }

    #[test]
    fn external_duplicates_among_themselves_survive() {
        // only local holdings filter; two external hits with the same ISBN both stay
        let external = vec![book(None, "9", Source::GoogleBooks), book(None, "9", Source::GoogleBooks)];
        assert_eq!(merge_results(vec![], external).len(), 2);
    }
}
