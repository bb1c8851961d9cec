//! Error types shared by the view and cache engines.

use thiserror::Error;

use crate::cache::InstallReport;

/// Errors raised while turning a recommendation response into a chart.
#[derive(Error, Debug)]
pub enum ViewError {
    /// The response body was not a recommendation document.
    #[error("malformed recommendation response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// There is no top match to compare against.
    #[error("response contains no recommendations")]
    NoRecommendations,
}

/// A network fetch that produced no response at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("request for {url} failed: {reason}")]
pub struct FetchError {
    pub url: String,
    pub reason: String,
}

impl FetchError {
    pub fn new(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Failure inside a [`crate::cache::CacheStore`] backend.
#[derive(Error, Debug)]
#[error("asset store failed: {source}")]
pub struct StoreError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl StoreError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Errors from [`crate::cache::AssetCache`].
#[derive(Error, Debug)]
pub enum CacheError {
    /// At least one asset could not be fetched, so nothing was stored.
    #[error(
        "install of cache {} aborted: {} of {} assets failed",
        .report.cache,
        .report.failed.len(),
        .report.total()
    )]
    Install { report: InstallReport },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
