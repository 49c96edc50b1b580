//! Storage seam for articles, clusters, and memberships.
//!
//! Persistence mechanics live behind this trait; the pipeline only depends
//! on the queries below. Each job owns its own unit of work and the store
//! commits per call.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use newswire_common::{Article, ArticleDraft, Cluster, Result};

#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Insert drafts, skipping any whose fingerprint is already present.
    /// Returns the newly stored articles only.
    async fn store_articles(&self, drafts: Vec<ArticleDraft>) -> Result<Vec<Article>>;

    async fn article(&self, id: Uuid) -> Result<Option<Article>>;

    /// Unclustered articles published within the window, newest first.
    async fn unclustered_since(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Article>>;

    /// Articles within the window still lacking an embedding, newest first.
    async fn missing_embedding_since(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Article>>;

    async fn set_embedding(&self, article_id: Uuid, embedding: Vec<f32>) -> Result<()>;

    async fn create_cluster(&self, cluster: Cluster) -> Result<()>;

    async fn cluster(&self, id: Uuid) -> Result<Option<Cluster>>;

    async fn clusters_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Cluster>>;

    /// Clusters touched within the window, most recently updated first.
    async fn clusters_updated_since(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Cluster>>;

    /// Record a membership row, point the article at the cluster, and bump
    /// the cluster's `last_updated`.
    async fn assign_to_cluster(&self, article_id: Uuid, cluster_id: Uuid) -> Result<()>;

    /// Up to `limit` member embeddings for centroid computation.
    async fn member_embeddings(&self, cluster_id: Uuid, limit: usize) -> Result<Vec<Vec<f32>>>;

    /// Distinct source names among a cluster's members.
    async fn unique_source_count(&self, cluster_id: Uuid) -> Result<usize>;

    /// Publish time of the newest member article.
    async fn newest_member_published(&self, cluster_id: Uuid) -> Result<Option<DateTime<Utc>>>;

    /// Member articles fetched since the cutoff (velocity signal).
    async fn members_fetched_since(&self, cluster_id: Uuid, cutoff: DateTime<Utc>)
        -> Result<usize>;

    async fn set_cluster_score(&self, cluster_id: Uuid, score: f64) -> Result<()>;

    /// Case-insensitive title-substring candidates for search ranking,
    /// newest first, optionally filtered by category and country.
    async fn search_articles_by_title(
        &self,
        pattern: &str,
        category: Option<&str>,
        country: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Article>>;

    /// Case-insensitive canonical-title candidates, highest score first.
    async fn search_clusters_by_title(&self, pattern: &str, limit: usize) -> Result<Vec<Cluster>>;
}
