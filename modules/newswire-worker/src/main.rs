use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use newswire_common::Config;
use newswire_engine::{ClusterEngine, NoopEmbedder, OpenAiEmbedder, TextEmbedder, TrendingScorer};
use newswire_providers::ProviderRouter;
use newswire_store::{Cache, MemoryCache, MemoryStore, NewsStore};
use newswire_worker::jobs;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("newswire=info".parse()?))
        .init();

    info!("Newswire worker starting...");

    let config = Config::from_env();
    config.log_redacted();

    let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
    let store: Arc<dyn NewsStore> = Arc::new(MemoryStore::new());

    let router = Arc::new(ProviderRouter::new(&config, cache.clone()));

    let embedder: Arc<dyn TextEmbedder> = match &config.openai_api_key {
        Some(key) => Arc::new(OpenAiEmbedder::new(Some(key.clone()))),
        None => {
            info!("No embedding key; clustering will match by title only");
            Arc::new(NoopEmbedder::new())
        }
    };

    let engine = Arc::new(ClusterEngine::new(
        store.clone(),
        cache.clone(),
        embedder,
    ));
    let scorer = Arc::new(TrendingScorer::new(store.clone()));

    tokio::join!(
        jobs::ingest_loop(router, store.clone(), config.ingest_interval_secs),
        jobs::cluster_loop(engine, scorer, config.trending_interval_secs),
    );

    Ok(())
}
