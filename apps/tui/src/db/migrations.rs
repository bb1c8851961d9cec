use color_eyre::Result;
use sqlx::{migrate::MigrateDatabase, query, sqlite::SqlitePoolOptions, Sqlite, SqlitePool};

/// Creates the asset cache table if it doesn't exist
pub async fn setup_database(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    query(
        "CREATE TABLE IF NOT EXISTS asset_cache (
            cache_name TEXT NOT NULL,
            url TEXT NOT NULL,
            status INTEGER NOT NULL,
            headers TEXT NOT NULL DEFAULT '[]',
            body BLOB NOT NULL,
            stored_at TEXT NOT NULL,
            PRIMARY KEY (cache_name, url)
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Opens (creating if needed) the SQLite database at `database_url` and
/// applies the schema.
pub async fn create_database_pool(database_url: &str) -> Result<SqlitePool> {
    log::debug!("Initializing database with URL: {database_url}");

    if let Some(path) = database_url
        .strip_prefix("sqlite://")
        .filter(|path| !path.starts_with(":memory:"))
    {
        let db_path = if database_url.starts_with("sqlite:///") {
            path.to_string()
        } else {
            path.trim_start_matches('/').to_string()
        };

        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                log::debug!("Creating parent directory: {}", parent.display());
                std::fs::create_dir_all(parent).map_err(|e| {
                    color_eyre::eyre::eyre!("Failed to create database directory: {e}")
                })?;
            }
        }
    }

    let db_exists = Sqlite::database_exists(database_url)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Error checking database: {e}"))?;

    if !db_exists {
        log::info!("Database does not exist, creating it now");
        Sqlite::create_database(database_url)
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to create SQLite database: {e}"))?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .after_connect(|conn, _| {
            Box::pin(async move {
                use sqlx::Executor as _;
                // Set journal mode to WAL for better concurrency
                conn.execute("PRAGMA journal_mode = WAL;").await?;
                conn.execute("PRAGMA synchronous = NORMAL;").await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to connect to SQLite database: {e}"))?;

    setup_database(&pool).await?;

    Ok(pool)
}
