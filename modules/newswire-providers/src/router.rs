//! Provider router: priority failover chains with circuit breaker gating.
//!
//! Headlines prefer the curated, structured sources first; trending prefers
//! the always-available broad-coverage source. Ingestion fans out to every
//! healthy provider instead of chaining.

use std::sync::Arc;

use tracing::{error, warn};

use newswire_common::{ArticleDraft, Config};
use newswire_store::Cache;

use crate::base::NewsProvider;
use crate::breaker::{CircuitBreaker, ProviderStatus};
use crate::gdelt::GdeltProvider;
use crate::guardian::GuardianProvider;
use crate::newsapi::NewsApiProvider;

/// Precision chain: structured, curated sources first.
const HEADLINES_CHAIN: [&str; 3] = ["newsapi", "guardian", "gdelt"];

/// Coverage chain: the keyless broad source first.
const TRENDING_CHAIN: [&str; 3] = ["gdelt", "guardian", "newsapi"];

struct ProviderSlot {
    provider: Arc<dyn NewsProvider>,
    breaker: CircuitBreaker,
}

/// Capability being requested from a chain.
pub enum FetchRequest<'a> {
    Headlines { country: &'a str, category: &'a str },
    Search { query: &'a str },
}

pub struct ProviderRouter {
    slots: Vec<ProviderSlot>,
}

impl ProviderRouter {
    /// Wire the standard three adapters from config.
    pub fn new(config: &Config, cache: Arc<dyn Cache>) -> Self {
        let providers: Vec<Arc<dyn NewsProvider>> = vec![
            Arc::new(NewsApiProvider::new(config.newsapi_key.clone())),
            Arc::new(GuardianProvider::new(config.guardian_key.clone())),
            Arc::new(GdeltProvider::new()),
        ];
        Self::with_providers(providers, cache)
    }

    /// Wire arbitrary adapters (tests, alternate deployments). Chain order
    /// for `fetch_with_chain` is by provider name.
    pub fn with_providers(providers: Vec<Arc<dyn NewsProvider>>, cache: Arc<dyn Cache>) -> Self {
        let slots = providers
            .into_iter()
            .map(|provider| ProviderSlot {
                breaker: CircuitBreaker::new(provider.name(), cache.clone()),
                provider,
            })
            .collect();
        Self { slots }
    }

    /// Top headlines via the precision chain.
    pub async fn fetch_headlines(
        &self,
        country: &str,
        category: &str,
        page_size: usize,
    ) -> (Vec<ArticleDraft>, Vec<String>) {
        self.fetch_with_chain(
            &HEADLINES_CHAIN,
            FetchRequest::Headlines { country, category },
            page_size,
        )
        .await
    }

    /// Top headlines via the coverage chain.
    pub async fn fetch_trending(
        &self,
        country: &str,
        category: &str,
        page_size: usize,
    ) -> (Vec<ArticleDraft>, Vec<String>) {
        self.fetch_with_chain(
            &TRENDING_CHAIN,
            FetchRequest::Headlines { country, category },
            page_size,
        )
        .await
    }

    /// Free-text search via the precision chain.
    pub async fn fetch_search(
        &self,
        query: &str,
        page_size: usize,
    ) -> (Vec<ArticleDraft>, Vec<String>) {
        self.fetch_with_chain(&HEADLINES_CHAIN, FetchRequest::Search { query }, page_size)
            .await
    }

    /// Query every configured, non-open provider and accumulate everything.
    /// Used by ingestion, where coverage beats latency.
    pub async fn fetch_all_sources(
        &self,
        country: &str,
        category: &str,
        page_size: usize,
    ) -> (Vec<ArticleDraft>, Vec<String>) {
        let mut articles = Vec::new();
        let mut providers_used = Vec::new();

        for slot in &self.slots {
            let name = slot.provider.name();
            if !slot.provider.is_configured() {
                continue;
            }
            if slot.breaker.is_open().await {
                warn!(provider = name, "Circuit open, skipping");
                continue;
            }
            match slot
                .provider
                .fetch_top_headlines(country, category, page_size)
                .await
            {
                Ok(batch) => {
                    slot.breaker.record_success().await;
                    articles.extend(batch);
                    providers_used.push(name.to_string());
                }
                Err(e) => {
                    slot.breaker.record_failure(&e.to_string()).await;
                    error!(provider = name, error = %e, "Provider failed");
                }
            }
        }

        (articles, providers_used)
    }

    /// Execute a chain in order: skip unconfigured/open providers, continue
    /// past failures, stop early once enough results are accumulated. A
    /// chain where every provider is skipped or fails yields `([], [])`.
    pub async fn fetch_with_chain(
        &self,
        chain: &[&str],
        request: FetchRequest<'_>,
        page_size: usize,
    ) -> (Vec<ArticleDraft>, Vec<String>) {
        let mut articles = Vec::new();
        let mut providers_used = Vec::new();

        for name in chain {
            let Some(slot) = self.slots.iter().find(|s| s.provider.name() == *name) else {
                continue;
            };
            if !slot.provider.is_configured() {
                continue;
            }
            if slot.breaker.is_open().await {
                warn!(provider = name, "Circuit open, skipping in chain");
                continue;
            }

            let result = match request {
                FetchRequest::Headlines { country, category } => {
                    slot.provider
                        .fetch_top_headlines(country, category, page_size)
                        .await
                }
                FetchRequest::Search { query } => {
                    slot.provider.fetch_search(query, page_size).await
                }
            };

            match result {
                Ok(batch) => {
                    slot.breaker.record_success().await;
                    if !batch.is_empty() {
                        articles.extend(batch);
                        providers_used.push(name.to_string());
                        // Enough results; later providers only top up thin batches.
                        if articles.len() >= page_size {
                            break;
                        }
                    }
                }
                Err(e) => {
                    slot.breaker.record_failure(&e.to_string()).await;
                    error!(provider = name, error = %e, "Provider failed in chain");
                }
            }
        }

        (articles, providers_used)
    }

    /// Breaker + configuration snapshot per provider.
    pub async fn statuses(&self) -> Vec<ProviderStatus> {
        let mut statuses = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            statuses.push(slot.breaker.status(slot.provider.is_configured()).await);
        }
        statuses
    }
}
