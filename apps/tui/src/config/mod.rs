use color_eyre::eyre::eyre;
use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_DATABASE_NAME: &str = "sound_dna_cache.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings resolved from `.env`, the environment and CLI overrides.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the recommendation backend.
    pub api_url: String,
    /// Origin that page-relative asset paths are resolved against.
    pub origin: String,
    pub database_url: String,
    pub request_timeout: Duration,
    pub debug: bool,
}

/// Initializes the application configuration
pub fn init_app_config() -> color_eyre::eyre::Result<AppConfig> {
    // Load environment variables from .env file
    dotenv().ok();

    let api_url = env::var("SOUND_DNA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
    let origin = env::var("SOUND_DNA_ORIGIN").unwrap_or_else(|_| api_url.clone());

    let timeout_secs = match env::var("SOUND_DNA_TIMEOUT_SECS") {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|e| eyre!("Invalid SOUND_DNA_TIMEOUT_SECS {value:?}: {e}"))?,
        Err(_) => DEFAULT_TIMEOUT_SECS,
    };

    let db_name = env::var("DATABASE_NAME").unwrap_or_else(|_| DEFAULT_DATABASE_NAME.to_string());
    let base_dir: PathBuf = env::current_dir()?;
    let database_url = database_url_for(&base_dir.join(db_name))?;

    let debug = env::var("DEBUG").is_ok_and(|value| value != "0" && !value.is_empty());

    Ok(AppConfig {
        api_url: api_url.trim_end_matches('/').to_string(),
        origin,
        database_url,
        request_timeout: Duration::from_secs(timeout_secs),
        debug,
    })
}

/// Formats a SQLite path as a SQLx connection URL.
///
/// Absolute paths need three slashes (`sqlite:///abs/path.db`), relative
/// paths two (`sqlite://rel/path.db`).
pub fn database_url_for(database_path: &Path) -> color_eyre::eyre::Result<String> {
    let path_str = database_path
        .to_str()
        .ok_or_else(|| eyre!("Invalid database path"))?;

    let clean_path = path_str.trim_start_matches('/');

    if database_path.is_absolute() {
        Ok(format!("sqlite:///{clean_path}"))
    } else {
        Ok(format!("sqlite://{clean_path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_uses_three_slashes_for_absolute_paths() -> color_eyre::eyre::Result<()> {
        let url = database_url_for(Path::new("/var/lib/sound-dna/cache.db"))?;
        assert_eq!(url, "sqlite:///var/lib/sound-dna/cache.db");
        Ok(())
    }

    #[test]
    fn database_url_uses_two_slashes_for_relative_paths() -> color_eyre::eyre::Result<()> {
        let url = database_url_for(Path::new("data/cache.db"))?;
        assert_eq!(url, "sqlite://data/cache.db");
        Ok(())
    }
}
