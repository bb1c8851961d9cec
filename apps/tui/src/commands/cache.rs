use std::io::Write;

use color_eyre::Result;
use sound_dna_core::{AssetRequest, CacheError, Source};

use crate::app::actions::AppActions;
use crate::db::queries::cache_summaries;

/// Precaches every asset; nothing is stored unless all of them arrive.
pub async fn cache_install(actions: &AppActions) -> Result<()> {
    let cache = actions.open_cache().await?;

    match cache.install().await {
        Ok(report) => {
            println!(
                "Installed {} assets into {}",
                report.cached.len(),
                report.cache
            );
            for url in &report.cached {
                println!("  cached  {url}");
            }
            Ok(())
        }
        Err(CacheError::Install { report }) => {
            for url in &report.cached {
                println!("  fetched {url}");
            }
            for failure in &report.failed {
                println!("  failed  {} ({})", failure.url, failure.reason);
            }
            Err(CacheError::Install { report }.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Serves one URL cache-first and writes the body to `output` or stdout.
pub async fn cache_get(actions: &AppActions, url: &str, output: Option<&str>) -> Result<()> {
    let cache = actions.open_cache().await?;
    let served = cache.respond(&AssetRequest::get(url)).await?;

    match served.source {
        Source::Cache => log::info!("served {} from cache {}", served.response.url, cache.name()),
        Source::Network => log::info!(
            "served {} from network (status {})",
            served.response.url,
            served.response.status
        ),
    }

    if let Some(path) = output {
        tokio::fs::write(path, &served.response.body).await?;
        println!(
            "Wrote {} bytes to {path} ({})",
            served.response.body.len(),
            if served.source == Source::Cache {
                "cache"
            } else {
                "network"
            }
        );
    } else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&served.response.body)?;
        stdout.flush()?;
    }
    Ok(())
}

/// Lists every cache in the database with its entry count.
pub async fn cache_status(actions: &AppActions) -> Result<()> {
    let cache = actions.open_cache().await?;
    let summaries = cache_summaries(cache.store().pool()).await?;

    if summaries.is_empty() {
        println!("No caches installed");
        return Ok(());
    }

    for summary in summaries {
        let marker = if summary.cache_name == cache.name() {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<20} {:>4} entries  {}",
            summary.cache_name,
            summary.entries,
            summary.last_stored.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
