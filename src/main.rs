use anyhow::Context;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tubestrm::config::{load_collections, CONFIG};
use tubestrm::library::Materializer;
use tubestrm::scheduler::Scheduler;
use tubestrm::services::{Extractor, Fetcher, HttpFetcher, YtDlp};
use tubestrm::stream::{ResolutionCache, StreamResolver};
use tubestrm::sync::Synchronizer;
use tubestrm::web::{run_server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    info!("Logging initialized, starting the application");

    tokio::fs::create_dir_all(CONFIG.shows_path())
        .await
        .context("Failed to create shows directory")?;

    let collections = load_collections(&CONFIG.collections_path()).await?;
    info!("Loaded {} collections", collections.len());

    let client = reqwest::Client::new();
    let extractor: Arc<dyn Extractor> = Arc::new(YtDlp::new(&CONFIG.ytdlp_bin));
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(client.clone()));
    let resolver = Arc::new(StreamResolver::new(
        extractor.clone(),
        fetcher.clone(),
        ResolutionCache::new(CONFIG.cache_ttl()),
    ));

    let materializer = Materializer::new(
        Synchronizer::new(extractor),
        resolver.clone(),
        fetcher,
        CONFIG.base_url.clone(),
    );
    let scheduler = Arc::new(Scheduler::new(
        materializer,
        collections,
        CONFIG.shows_path(),
    ));

    // Create shutdown signal
    let shutdown = Arc::new(Notify::new());

    let ctrl_c_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {:?}", e);
            return;
        }
        info!("Ctrl+C received, shutting down");
        ctrl_c_shutdown.notify_waiters();
    });

    // Start web server
    let web_shutdown = shutdown.clone();
    let state = AppState {
        resolver,
        client,
        base_url: CONFIG.base_url.clone(),
    };
    let web_server_handle = tokio::spawn(async move {
        if let Err(e) = run_server(state, web_shutdown).await {
            error!("Web server error: {:?}", e);
        }
    });

    // Start scheduler
    let scheduler_shutdown = shutdown.clone();
    let scheduler_handle = tokio::spawn(async move {
        if let Err(e) = scheduler
            .run(&CONFIG.cron_schedule, CONFIG.run_cron_at_start, scheduler_shutdown)
            .await
        {
            error!("Scheduler error: {:?}", e);
        }
    });

    // Wait for both tasks to complete
    let _ = tokio::join!(web_server_handle, scheduler_handle);

    info!("Shutdown complete");
    Ok(())
}
