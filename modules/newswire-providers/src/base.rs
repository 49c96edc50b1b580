use async_trait::async_trait;

use newswire_common::{ArticleDraft, Result};

/// A news data source. Adapters validate upstream payloads and convert them
/// to `ArticleDraft` immediately after the network call; the rest of the
/// pipeline never sees provider-shaped data.
#[async_trait]
pub trait NewsProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the necessary credentials are present. Unconfigured providers
    /// are skipped by the router, not failed.
    fn is_configured(&self) -> bool;

    /// Top headlines for a country + category.
    async fn fetch_top_headlines(
        &self,
        country: &str,
        category: &str,
        page_size: usize,
    ) -> Result<Vec<ArticleDraft>>;

    /// Articles matching a free-text query.
    async fn fetch_search(&self, query: &str, page_size: usize) -> Result<Vec<ArticleDraft>>;
}
