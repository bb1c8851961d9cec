use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::db::queries::{get_cached_asset, insert_cached_assets};
use sound_dna_core::{AssetResponse, CacheStore, StoreError};

/// Persistent [`CacheStore`] backed by the `asset_cache` table.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait(?Send)]
impl CacheStore for SqliteStore {
    async fn lookup(&self, cache: &str, url: &str) -> Result<Option<AssetResponse>, StoreError> {
        let record = get_cached_asset(&self.pool, cache, url)
            .await
            .map_err(StoreError::new)?;
        record
            .map(crate::db::models::CachedAssetRecord::into_response)
            .transpose()
            .map_err(StoreError::new)
    }

    async fn put_all(
        &self,
        cache: &str,
        entries: &[(String, AssetResponse)],
    ) -> Result<(), StoreError> {
        let stored_at = chrono::Utc::now().to_rfc3339();
        insert_cached_assets(&self.pool, cache, entries, &stored_at)
            .await
            .map_err(StoreError::new)
    }
}
