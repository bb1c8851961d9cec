use crate::api::{build_http_client, RecommendClient};
use crate::config::{init_app_config, AppConfig};
use crate::db::{create_database_pool, SqliteStore};
use crate::fetcher::ReqwestFetcher;
use color_eyre::Result;
use sound_dna_core::{AssetCache, RecommendRequest, RecommendationResponse};

/// The asset cache as the binary wires it: SQLite storage, reqwest network.
pub type PersistentCache = AssetCache<SqliteStore, ReqwestFetcher>;

#[derive(Debug)]
pub struct AppActions {
    pub config: Option<AppConfig>,
    pub client: Option<RecommendClient>,
}

impl AppActions {
    pub const fn new() -> Self {
        Self {
            config: None,
            client: None,
        }
    }

    pub fn initialize(&mut self) -> Result<()> {
        let config = init_app_config()?;
        let http = build_http_client(config.request_timeout)?;
        self.client = Some(RecommendClient::new(http, config.api_url.clone()));
        self.config = Some(config);
        Ok(())
    }

    pub async fn recommend(&self, request: &RecommendRequest) -> Result<RecommendationResponse> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| color_eyre::eyre::eyre!("Client not initialized"))?;
        client.recommend(request).await.map_err(Into::into)
    }

    /// Opens the persistent asset cache described by the configuration.
    pub async fn open_cache(&self) -> Result<PersistentCache> {
        let config = self.config()?;
        let pool = create_database_pool(&config.database_url).await?;
        let http = build_http_client(config.request_timeout)?;
        Ok(AssetCache::new(
            config.origin.clone(),
            SqliteStore::new(pool),
            ReqwestFetcher::new(http),
        ))
    }

    pub fn config(&self) -> Result<&AppConfig> {
        self.config
            .as_ref()
            .ok_or_else(|| color_eyre::eyre::eyre!("Configuration not initialized"))
    }
}

impl Default for AppActions {
    fn default() -> Self {
        Self::new()
    }
}
