//! Google Books keyword lookup.
//! Best-effort: any failure yields an empty result, never an error.

use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::db::{Book, Source, NO_ISBN};

pub const DEFAULT_VOLUMES_URL: &str = "https://www.googleapis.com/books/v1/volumes";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_RESULTS: usize = 10;

const UNKNOWN_TITLE: &str = "未知名稱";
const UNKNOWN_AUTHOR: &str = "未知作者";
const UNKNOWN_PUBLISHER: &str = "未知出版社";
const UNKNOWN_DATE: &str = "未知日期";
const NO_DESCRIPTION: &str = "暫無摘要";
const UNCATEGORIZED: &str = "未分類";

#[derive(Clone, Debug)]
pub struct LookupConfig {
    pub volumes_url: String,
    pub max_results: usize,
    pub client: reqwest::Client,
}

impl LookupConfig {
    pub fn new(volumes_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("libsearch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            volumes_url: volumes_url.into(),
            max_results: MAX_RESULTS,
            client,
        })
    }
}

#[derive(Deserialize, Debug, Default)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Deserialize, Debug, Default)]
struct Volume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: VolumeInfo,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    publisher: Option<String>,
    published_date: Option<String>,
    description: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
    #[serde(default)]
    industry_identifiers: Vec<Identifier>,
    image_links: Option<ImageLinks>,
}

#[derive(Deserialize, Debug)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    small_thumbnail: Option<String>,
}

/// Pick the ISBN for an external record.
///
/// The first ISBN_13 ends the scan. ISBN_10 entries don't, so with several
/// of them and no ISBN_13 the last one is kept. No ISBN at all gives [`NO_ISBN`].
pub fn pick_isbn(identifiers: &[Identifier]) -> String {
    let mut isbn: &str = NO_ISBN;
    for ident in identifiers {
        match ident.kind.as_str() {
            "ISBN_13" => return ident.identifier.clone(),
            "ISBN_10" => isbn = ident.identifier.as_str(),
            _ => {}
        }
    }
    isbn.to_string()
}

fn join_or(parts: &[String], fallback: &str) -> String {
    if parts.is_empty() {
        fallback.to_string()
    } else {
        parts.join(", ")
    }
}

fn volume_to_book(v: Volume) -> Book {
    let info = v.volume_info;
    Book {
        id: None,
        title: info.title.unwrap_or_else(|| UNKNOWN_TITLE.into()),
        author: join_or(&info.authors, UNKNOWN_AUTHOR),
        isbn: pick_isbn(&info.industry_identifiers),
        publisher: info.publisher.unwrap_or_else(|| UNKNOWN_PUBLISHER.into()),
        pub_date: info.published_date.unwrap_or_else(|| UNKNOWN_DATE.into()),
        description: info.description.unwrap_or_else(|| NO_DESCRIPTION.into()),
        subject: join_or(&info.categories, UNCATEGORIZED),
        image_url: info
            .image_links
            .and_then(|l| l.small_thumbnail)
            .unwrap_or_default(),
        source: Source::GoogleBooks,
    }
}

/// Map a raw Google Books response body. Malformed JSON yields `None`.
///
/// Only the first `max_results` items are decoded; one bad item among
/// those drops the whole response, items past the cap are never looked at.
pub fn parse_volumes(body: &[u8], max_results: usize) -> Option<Vec<Book>> {
    let resp: VolumesResponse = serde_json::from_slice(body)
        .map_err(|e| warn!(error = %e, "malformed Google Books payload"))
        .ok()?;
    resp.items
        .into_iter()
        .take(max_results)
        .map(|item| serde_json::from_value::<Volume>(item).map(volume_to_book))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| warn!(error = %e, "malformed Google Books item"))
        .ok()
}

/// Search Google Books for `keyword`.
///
/// Empty keyword returns immediately without a request. Transport errors,
/// non-200 statuses and undecodable bodies all come back as an empty list.
pub async fn fetch_external(cfg: &LookupConfig, keyword: &str) -> Vec<Book> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return vec![];
    }
    info!(keyword, "querying Google Books");

    let resp = match cfg
        .client
        .get(&cfg.volumes_url)
        .query(&[("q", keyword)])
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, keyword, "Google Books request failed");
            return vec![];
        }
    };
    if resp.status() != reqwest::StatusCode::OK {
        warn!(status = %resp.status(), keyword, "Google Books returned non-200");
        return vec![];
    }
    let body = match resp.bytes().await {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, keyword, "Google Books body read failed");
            return vec![];
        }
    };
    parse_volumes(&body, cfg.max_results).unwrap_or_default()
}
