//! Cache-first asset loading.
//!
//! An [`AssetCache`] is populated once by [`AssetCache::install`], which is
//! all-or-nothing: every asset in the precache list must fetch with a 2xx
//! status or nothing is stored. [`AssetCache::respond`] then answers `GET`
//! requests from the store and only falls through to the network on a miss.
//! Entries are never revalidated or evicted; a new asset set needs a new
//! cache name.

use std::cell::RefCell;
use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;

use crate::error::{CacheError, FetchError, StoreError};

pub const CACHE_NAME: &str = "sound-dna-v1";

pub const PRECACHE_ASSETS: &[&str] = &[
    "/",
    "/static/css/style.css",
    "/static/manifest.json",
    "/static/icon-512.png",
    "https://cdn.jsdelivr.net/npm/chart.js",
    "https://fonts.googleapis.com/css2?family=Outfit:wght@300;400;600;700&family=Space+Grotesk:wght@500;700&display=swap",
];

/// A request as the page issued it. Headers and body are forwarded untouched
/// when the request goes to the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl AssetRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub url: String,
    pub status: u16,
    /// Response headers in the order the server sent them.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl AssetResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// First header called `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

/// Where a [`Served`] response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Cache,
    Network,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: AssetResponse,
    pub source: Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallFailure {
    pub url: String,
    pub reason: String,
}

/// Outcome of an install attempt, per asset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct InstallReport {
    pub cache: String,
    pub cached: Vec<String>,
    pub failed: Vec<InstallFailure>,
}

impl InstallReport {
    pub fn total(&self) -> usize {
        self.cached.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Network side of the cache.
#[async_trait(?Send)]
pub trait Fetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<AssetResponse, FetchError>;
}

/// Storage side of the cache, keyed by cache name and absolute URL.
#[async_trait(?Send)]
pub trait CacheStore {
    async fn lookup(&self, cache: &str, url: &str) -> Result<Option<AssetResponse>, StoreError>;

    /// Stores every entry or none of them.
    async fn put_all(
        &self,
        cache: &str,
        entries: &[(String, AssetResponse)],
    ) -> Result<(), StoreError>;
}

/// In-process store; contents live as long as the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    caches: RefCell<HashMap<String, HashMap<String, AssetResponse>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, cache: &str) -> usize {
        self.caches.borrow().get(cache).map_or(0, HashMap::len)
    }

    pub fn is_empty(&self, cache: &str) -> bool {
        self.len(cache) == 0
    }
}

#[async_trait(?Send)]
impl CacheStore for MemoryStore {
    async fn lookup(&self, cache: &str, url: &str) -> Result<Option<AssetResponse>, StoreError> {
        Ok(self
            .caches
            .borrow()
            .get(cache)
            .and_then(|entries| entries.get(url))
            .cloned())
    }

    async fn put_all(
        &self,
        cache: &str,
        entries: &[(String, AssetResponse)],
    ) -> Result<(), StoreError> {
        let mut caches = self.caches.borrow_mut();
        let store = caches.entry(cache.to_string()).or_default();
        for (url, response) in entries {
            store.insert(url.clone(), response.clone());
        }
        Ok(())
    }
}

/// Resolves a page-relative asset path against `origin`; absolute URLs pass through.
///
/// Protocol-relative URLs (`//host/path`) take the origin's scheme.
pub fn resolve_url(origin: &str, url: &str) -> String {
    if url.contains("://") {
        return url.to_string();
    }
    if let Some(rest) = url.strip_prefix("//") {
        let scheme = origin.split_once("://").map_or("https", |(scheme, _)| scheme);
        return format!("{scheme}://{rest}");
    }
    let origin = origin.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{origin}{url}")
    } else {
        format!("{origin}/{url}")
    }
}

pub struct AssetCache<S, F> {
    name: String,
    origin: String,
    assets: Vec<String>,
    store: S,
    fetcher: F,
}

impl<S: CacheStore, F: Fetcher> AssetCache<S, F> {
    /// A cache named [`CACHE_NAME`] over [`PRECACHE_ASSETS`].
    pub fn new(origin: impl Into<String>, store: S, fetcher: F) -> Self {
        Self {
            name: CACHE_NAME.to_string(),
            origin: origin.into(),
            assets: PRECACHE_ASSETS.iter().map(|url| (*url).to_string()).collect(),
            store,
            fetcher,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_assets<I, U>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<String>,
    {
        self.assets = assets.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Precache list resolved against the origin.
    pub fn asset_urls(&self) -> Vec<String> {
        self.assets
            .iter()
            .map(|url| resolve_url(&self.origin, url))
            .collect()
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches every asset concurrently and stores them only if all succeed.
    pub async fn install(&self) -> Result<InstallReport, CacheError> {
        let urls = self.asset_urls();
        log::info!("installing cache {} with {} assets", self.name, urls.len());

        let results = join_all(urls.into_iter().map(|url| async move {
            let result = self.fetcher.fetch(&AssetRequest::get(url.clone())).await;
            (url, result)
        }))
        .await;

        let mut report = InstallReport {
            cache: self.name.clone(),
            ..InstallReport::default()
        };
        let mut entries = Vec::with_capacity(results.len());

        for (url, result) in results {
            match result {
                Ok(response) if response.is_success() => {
                    report.cached.push(url.clone());
                    entries.push((url, response));
                }
                Ok(response) => {
                    log::warn!("asset {url} answered with status {}", response.status);
                    report.failed.push(InstallFailure {
                        url,
                        reason: format!("status {}", response.status),
                    });
                }
                Err(error) => {
                    log::warn!("asset {url} could not be fetched: {}", error.reason);
                    report.failed.push(InstallFailure {
                        url,
                        reason: error.reason,
                    });
                }
            }
        }

        if !report.is_complete() {
            return Err(CacheError::Install { report });
        }

        self.store.put_all(&self.name, &entries).await?;
        log::info!("cache {} installed ({} assets)", self.name, entries.len());
        Ok(report)
    }

    /// Answers a request cache-first. Network responses are returned as-is.
    pub async fn respond(&self, request: &AssetRequest) -> Result<Served, CacheError> {
        let url = resolve_url(&self.origin, &request.url);

        if request.is_get() {
            if let Some(response) = self.store.lookup(&self.name, &url).await? {
                log::debug!("cache hit for {url}");
                return Ok(Served {
                    response,
                    source: Source::Cache,
                });
            }
        }

        log::debug!("cache miss for {} {url}", request.method);
        let forwarded = AssetRequest {
            url,
            ..request.clone()
        };
        let response = self.fetcher.fetch(&forwarded).await?;

        Ok(Served {
            response,
            source: Source::Network,
        })
    }
}
