use sqlx::{query, query_as, SqlitePool};

use crate::db::models::{CacheSummary, CachedAssetRecord};
use sound_dna_core::AssetResponse;

/// Looks up one cached asset by exact URL
pub async fn get_cached_asset(
    pool: &SqlitePool,
    cache_name: &str,
    url: &str,
) -> Result<Option<CachedAssetRecord>, sqlx::Error> {
    query_as::<_, CachedAssetRecord>(
        "SELECT cache_name, url, status, headers, body, stored_at
         FROM asset_cache WHERE cache_name = ? AND url = ?",
    )
    .bind(cache_name)
    .bind(url)
    .fetch_optional(pool)
    .await
}

/// Stores every entry in a single transaction; either all rows land or none
pub async fn insert_cached_assets(
    pool: &SqlitePool,
    cache_name: &str,
    entries: &[(String, AssetResponse)],
    stored_at: &str,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for (url, response) in entries {
        let headers =
            serde_json::to_string(&response.headers).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;
        query(
            "INSERT OR REPLACE INTO asset_cache
                (cache_name, url, status, headers, body, stored_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(cache_name)
        .bind(url)
        .bind(i64::from(response.status))
        .bind(headers)
        .bind(response.body.as_slice())
        .bind(stored_at)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await
}

/// Lists every cache name with its entry count
pub async fn cache_summaries(pool: &SqlitePool) -> Result<Vec<CacheSummary>, sqlx::Error> {
    query_as::<_, CacheSummary>(
        "SELECT cache_name, COUNT(*) AS entries, MAX(stored_at) AS last_stored
         FROM asset_cache GROUP BY cache_name ORDER BY cache_name",
    )
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::setup_database;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> Result<SqlitePool, sqlx::Error> {
        // Use an in-memory database for testing
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        setup_database(&pool).await?;

        Ok(pool)
    }

    fn asset(url: &str, body: &str) -> (String, AssetResponse) {
        (
            url.to_string(),
            AssetResponse {
                url: url.to_string(),
                status: 200,
                headers: vec![
                    ("Content-Type".to_string(), "text/css".to_string()),
                    ("ETag".to_string(), "\"v1\"".to_string()),
                ],
                body: body.as_bytes().to_vec(),
            },
        )
    }

    #[tokio::test]
    async fn test_insert_and_get_cached_asset() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;

        insert_cached_assets(
            &pool,
            "sound-dna-v1",
            &[asset("http://localhost/static/css/style.css", "body {}")],
            "2025-04-21T10:00:00Z",
        )
        .await?;

        let record = get_cached_asset(&pool, "sound-dna-v1", "http://localhost/static/css/style.css")
            .await?
            .ok_or("asset missing")?;
        assert_eq!(record.status, 200);
        assert_eq!(record.body, b"body {}");
        let response = record.into_response()?;
        assert_eq!(response.content_type(), Some("text/css"));
        assert_eq!(response.header("etag"), Some("\"v1\""));

        // Exact URL match only, and scoped by cache name
        assert!(get_cached_asset(&pool, "sound-dna-v1", "http://localhost/static/css")
            .await?
            .is_none());
        assert!(get_cached_asset(&pool, "sound-dna-v2", "http://localhost/static/css/style.css")
            .await?
            .is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_cache_summaries_group_by_name() -> Result<(), Box<dyn std::error::Error>> {
        let pool = setup_test_db().await?;

        insert_cached_assets(
            &pool,
            "sound-dna-v1",
            &[asset("http://localhost/", "<html>"), asset("http://localhost/a.css", "")],
            "2025-04-21T10:00:00Z",
        )
        .await?;
        insert_cached_assets(
            &pool,
            "sound-dna-v0",
            &[asset("http://localhost/", "<html>")],
            "2025-01-01T10:00:00Z",
        )
        .await?;

        let summaries = cache_summaries(&pool).await?;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].cache_name, "sound-dna-v0");
        assert_eq!(summaries[0].entries, 1);
        assert_eq!(summaries[1].cache_name, "sound-dna-v1");
        assert_eq!(summaries[1].entries, 2);
        assert_eq!(
            summaries[1].last_stored.as_deref(),
            Some("2025-04-21T10:00:00Z")
        );

        Ok(())
    }
}
