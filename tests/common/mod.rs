//! Shared fixtures: a stand-in Google Books endpoint served from a local axum app.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::routing::get;
use axum::Router;
use libsearch::db::BookDB;
use libsearch::lookup::LookupConfig;
use libsearch::AppState;

pub struct MockVolumes {
    pub url: String,
    hits: Arc<AtomicUsize>,
    last_q: Arc<Mutex<Option<String>>>,
}

impl MockVolumes {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<String> {
        self.last_q.lock().unwrap().clone()
    }

    pub fn config(&self) -> LookupConfig {
        LookupConfig::new(&self.url, Duration::from_secs(2)).unwrap()
    }
}

/// Serve `body` with `status` at `/volumes`, optionally after `delay`.
pub async fn serve_volumes_with(status: StatusCode, body: String, delay: Duration) -> MockVolumes {
    let hits = Arc::new(AtomicUsize::new(0));
    let last_q = Arc::new(Mutex::new(None));
    let (h, q_slot) = (hits.clone(), last_q.clone());

    let app = Router::new().route(
        "/volumes",
        get(move |Query(q): Query<HashMap<String, String>>| {
            let (h, q_slot, body) = (h.clone(), q_slot.clone(), body.clone());
            async move {
                h.fetch_add(1, Ordering::SeqCst);
                *q_slot.lock().unwrap() = q.get("q").cloned();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockVolumes { url: format!("http://{addr}/volumes"), hits, last_q }
}

pub async fn serve_volumes(body: serde_json::Value) -> MockVolumes {
    serve_volumes_with(StatusCode::OK, body.to_string(), Duration::ZERO).await
}

/// A URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/volumes")
}

pub fn state_with(lookup: LookupConfig) -> AppState {
    AppState::new(BookDB::open(":memory:").unwrap(), lookup)
}

/// Three volumes: the first carries both ISBN kinds, the second only ISBN_13,
/// the third has nothing but a title.
pub fn sample_volumes() -> serde_json::Value {
    serde_json::json!({
        "kind": "books#volumes",
        "totalItems": 3,
        "items": [
            {
                "volumeInfo": {
                    "title": "Rust in Action",
                    "authors": ["Tim McNamara"],
                    "publisher": "Manning",
                    "publishedDate": "2021-08-10",
                    "description": "Systems programming concepts and techniques.",
                    "industryIdentifiers": [
                        {"type": "ISBN_10", "identifier": "1617294551"},
                        {"type": "ISBN_13", "identifier": "9781617294556"}
                    ],
                    "categories": ["Computers"],
                    "imageLinks": {
                        "smallThumbnail": "http://books.google.com/small.jpg",
                        "thumbnail": "http://books.google.com/thumb.jpg"
                    }
                }
            },
            {
                "volumeInfo": {
                    "title": "Programming Rust",
                    "authors": ["Jim Blandy", "Jason Orendorff"],
                    "industryIdentifiers": [
                        {"type": "ISBN_13", "identifier": "9781492052593"}
                    ],
                    "categories": ["Computers", "Programming"]
                }
            },
            {
                "volumeInfo": {
                    "title": "Rust notes"
                }
            }
        ]
    })
}
