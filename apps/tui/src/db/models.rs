use sqlx::FromRow;

use sound_dna_core::AssetResponse;

/// A stored asset response
#[derive(Debug, FromRow, Clone)]
pub struct CachedAssetRecord {
    pub cache_name: String,
    pub url: String,
    pub status: i64,
    /// JSON array of `[name, value]` pairs
    pub headers: String,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl CachedAssetRecord {
    pub fn into_response(self) -> Result<AssetResponse, serde_json::Error> {
        Ok(AssetResponse {
            headers: serde_json::from_str(&self.headers)?,
            url: self.url,
            status: u16::try_from(self.status).unwrap_or_default(),
            body: self.body,
        })
    }
}

/// Entry count of one named cache
#[derive(Debug, FromRow, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CacheSummary {
    pub cache_name: String,
    pub entries: i64,
    pub last_stored: Option<String>,
}
