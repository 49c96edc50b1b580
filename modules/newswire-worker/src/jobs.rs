//! Background jobs: periodic ingestion across the country/category catalog
//! and the clustering-plus-trending maintenance pass. Loop bodies log their
//! failures and keep running; nothing here can take the worker down.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use newswire_common::constants::{CATEGORIES, COUNTRY_CODES};
use newswire_engine::{ClusterEngine, TrendingScorer};
use newswire_providers::ProviderRouter;
use newswire_store::NewsStore;

/// Countries covered per ingest cycle; the cursor rotates through the whole
/// catalog across cycles.
const COUNTRIES_PER_CYCLE: usize = 3;

/// Headlines requested per provider per country/category pair.
const INGEST_PAGE_SIZE: usize = 20;

/// Fetch every source for each country/category pair and store the deduped
/// result. Returns the number of newly stored articles.
pub async fn ingest_once(
    router: &ProviderRouter,
    store: &dyn NewsStore,
    countries: &[&str],
    categories: &[&str],
) -> usize {
    let mut stored = 0usize;
    for country in countries {
        for category in categories {
            let (drafts, providers) = router
                .fetch_all_sources(country, category, INGEST_PAGE_SIZE)
                .await;
            if drafts.is_empty() {
                continue;
            }
            match store.store_articles(drafts).await {
                Ok(articles) => {
                    if !articles.is_empty() {
                        info!(
                            country,
                            category,
                            stored = articles.len(),
                            providers = ?providers,
                            "Ingested articles"
                        );
                        stored += articles.len();
                    }
                }
                Err(e) => {
                    error!(country, category, error = %e, "Storing articles failed");
                }
            }
        }
    }
    stored
}

/// Rotate through the country catalog forever, a few countries per cycle.
pub async fn ingest_loop(
    router: Arc<ProviderRouter>,
    store: Arc<dyn NewsStore>,
    interval_secs: u64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    let mut cursor = 0usize;

    loop {
        interval.tick().await;

        let countries: Vec<&str> = (0..COUNTRIES_PER_CYCLE)
            .map(|i| COUNTRY_CODES[(cursor + i) % COUNTRY_CODES.len()])
            .collect();
        cursor = (cursor + COUNTRIES_PER_CYCLE) % COUNTRY_CODES.len();

        info!(countries = ?countries, "Ingest cycle starting");
        let stored = ingest_once(&router, store.as_ref(), &countries, CATEGORIES).await;
        info!(stored, "Ingest cycle complete");
    }
}

/// Run the clustering pass, then rescore trending, on a fixed interval.
pub async fn cluster_loop(
    engine: Arc<ClusterEngine>,
    scorer: Arc<TrendingScorer>,
    interval_secs: u64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        match engine.run().await {
            Ok(created) => info!(clusters_created = created, "Clustering pass finished"),
            Err(e) => error!(error = %e, "Clustering pass failed"),
        }
        match scorer.update_scores().await {
            Ok(updated) => info!(clusters_rescored = updated, "Trending pass finished"),
            Err(e) => error!(error = %e, "Trending pass failed"),
        }
    }
}
