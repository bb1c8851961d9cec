//! Platform-neutral pieces of the Sound DNA client.
//!
//! The terminal client and the web dashboard both build on this crate: the
//! recommendation wire model, the radar chart model with its single-instance
//! view, and the cache-first asset engine.

pub mod cache;
pub mod chart;
pub mod error;
pub mod model;
pub mod view;

pub use cache::{
    AssetCache, AssetRequest, AssetResponse, CacheStore, Fetcher, InstallReport, MemoryStore,
    Served, Source, CACHE_NAME, PRECACHE_ASSETS,
};
pub use chart::{RadarChart, RadarDataset, RadialScale, Rgba, SeriesStyle};
pub use error::{CacheError, FetchError, StoreError, ViewError};
pub use model::{FeatureVector, Recommendation, RecommendRequest, RecommendationResponse};
pub use view::{ChartInstance, RadarView};
