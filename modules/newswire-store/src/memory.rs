//! In-memory `NewsStore` used by the worker's default wiring and by tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use newswire_common::{Article, ArticleDraft, Cluster, ClusterMember, Result};

use crate::store::NewsStore;

#[derive(Default)]
struct Inner {
    articles: HashMap<Uuid, Article>,
    by_fingerprint: HashMap<String, Uuid>,
    clusters: HashMap<Uuid, Cluster>,
    members: Vec<ClusterMember>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn article_count(&self) -> usize {
        self.inner.read().await.articles.len()
    }

    pub async fn cluster_count(&self) -> usize {
        self.inner.read().await.clusters.len()
    }

    pub async fn members_of(&self, cluster_id: Uuid) -> Vec<ClusterMember> {
        self.inner
            .read()
            .await
            .members
            .iter()
            .filter(|m| m.cluster_id == cluster_id)
            .cloned()
            .collect()
    }
}

fn newest_first(a: &Article, b: &Article) -> std::cmp::Ordering {
    b.published_at.cmp(&a.published_at)
}

#[async_trait]
impl NewsStore for MemoryStore {
    async fn store_articles(&self, drafts: Vec<ArticleDraft>) -> Result<Vec<Article>> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let mut stored = Vec::new();
        for draft in drafts {
            if inner.by_fingerprint.contains_key(&draft.fingerprint) {
                continue;
            }
            let article = Article::from_draft(draft, now);
            inner
                .by_fingerprint
                .insert(article.fingerprint.clone(), article.id);
            inner.articles.insert(article.id, article.clone());
            stored.push(article);
        }
        Ok(stored)
    }

    async fn article(&self, id: Uuid) -> Result<Option<Article>> {
        Ok(self.inner.read().await.articles.get(&id).cloned())
    }

    async fn unclustered_since(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Article>> {
        let inner = self.inner.read().await;
        let mut matches: Vec<Article> = inner
            .articles
            .values()
            .filter(|a| a.cluster_id.is_none() && a.published_at.is_some_and(|t| t >= cutoff))
            .cloned()
            .collect();
        matches.sort_by(newest_first);
        matches.truncate(limit);
        Ok(matches)
    }

    async fn missing_embedding_since(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Article>> {
        let inner = self.inner.read().await;
        let mut matches: Vec<Article> = inner
            .articles
            .values()
            .filter(|a| a.embedding.is_none() && a.published_at.is_some_and(|t| t >= cutoff))
            .cloned()
            .collect();
        matches.sort_by(newest_first);
        matches.truncate(limit);
        Ok(matches)
    }

    async fn set_embedding(&self, article_id: Uuid, embedding: Vec<f32>) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(article) = inner.articles.get_mut(&article_id) {
            article.embedding = Some(embedding);
        }
        Ok(())
    }

    async fn create_cluster(&self, cluster: Cluster) -> Result<()> {
        self.inner.write().await.clusters.insert(cluster.id, cluster);
        Ok(())
    }

    async fn cluster(&self, id: Uuid) -> Result<Option<Cluster>> {
        Ok(self.inner.read().await.clusters.get(&id).cloned())
    }

    async fn clusters_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Cluster>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.clusters.get(id).cloned())
            .collect())
    }

    async fn clusters_updated_since(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Cluster>> {
        let inner = self.inner.read().await;
        let mut matches: Vec<Cluster> = inner
            .clusters
            .values()
            .filter(|c| c.last_updated >= cutoff)
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        matches.truncate(limit);
        Ok(matches)
    }

    async fn assign_to_cluster(&self, article_id: Uuid, cluster_id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        let source = match inner.articles.get_mut(&article_id) {
            Some(article) => {
                article.cluster_id = Some(cluster_id);
                article.source.clone()
            }
            None => {
                return Err(newswire_common::NewswireError::NotFound(format!(
                    "article {article_id}"
                )))
            }
        };
        inner.members.push(ClusterMember {
            cluster_id,
            article_id,
            source,
        });
        if let Some(cluster) = inner.clusters.get_mut(&cluster_id) {
            cluster.last_updated = Utc::now();
        }
        Ok(())
    }

    async fn member_embeddings(&self, cluster_id: Uuid, limit: usize) -> Result<Vec<Vec<f32>>> {
        let inner = self.inner.read().await;
        Ok(inner
            .articles
            .values()
            .filter(|a| a.cluster_id == Some(cluster_id))
            .filter_map(|a| a.embedding.clone())
            .take(limit)
            .collect())
    }

    async fn unique_source_count(&self, cluster_id: Uuid) -> Result<usize> {
        let inner = self.inner.read().await;
        let sources: HashSet<&str> = inner
            .members
            .iter()
            .filter(|m| m.cluster_id == cluster_id)
            .map(|m| m.source.as_str())
            .collect();
        Ok(sources.len())
    }

    async fn newest_member_published(&self, cluster_id: Uuid) -> Result<Option<DateTime<Utc>>> {
        let inner = self.inner.read().await;
        Ok(inner
            .articles
            .values()
            .filter(|a| a.cluster_id == Some(cluster_id))
            .filter_map(|a| a.published_at)
            .max())
    }

    async fn members_fetched_since(
        &self,
        cluster_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> Result<usize> {
        let inner = self.inner.read().await;
        Ok(inner
            .articles
            .values()
            .filter(|a| a.cluster_id == Some(cluster_id) && a.fetched_at >= cutoff)
            .count())
    }

    async fn set_cluster_score(&self, cluster_id: Uuid, score: f64) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(cluster) = inner.clusters.get_mut(&cluster_id) {
            cluster.score = score;
        }
        Ok(())
    }

    async fn search_articles_by_title(
        &self,
        pattern: &str,
        category: Option<&str>,
        country: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Article>> {
        let needle = pattern.to_lowercase();
        let inner = self.inner.read().await;
        let mut matches: Vec<Article> = inner
            .articles
            .values()
            .filter(|a| a.title.to_lowercase().contains(&needle))
            .filter(|a| category.is_none_or(|c| a.category == c))
            .filter(|a| country.is_none_or(|c| a.country.eq_ignore_ascii_case(c)))
            .cloned()
            .collect();
        matches.sort_by(newest_first);
        matches.truncate(limit);
        Ok(matches)
    }

    async fn search_clusters_by_title(&self, pattern: &str, limit: usize) -> Result<Vec<Cluster>> {
        let needle = pattern.to_lowercase();
        let inner = self.inner.read().await;
        let mut matches: Vec<Cluster> = inner
            .clusters
            .values()
            .filter(|c| c.canonical_title.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(limit);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, source: &str) -> ArticleDraft {
        ArticleDraft::new(
            "newsapi",
            source.to_string(),
            title.to_string(),
            format!("https://example.com/{}", title.len()),
        )
    }

    #[tokio::test]
    async fn duplicate_fingerprints_create_no_second_row() {
        let store = MemoryStore::new();
        let stored = store
            .store_articles(vec![draft("Same story", "Reuters"), draft("Same story", "Reuters")])
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);

        // A later fetch of the same story is also deduped.
        let again = store
            .store_articles(vec![draft("SAME STORY", "Reuters")])
            .await
            .unwrap();
        assert!(again.is_empty());
        assert_eq!(store.article_count().await, 1);
    }

    #[tokio::test]
    async fn assignment_records_membership_and_bumps_cluster() {
        let store = MemoryStore::new();
        let stored = store
            .store_articles(vec![draft("Flood warning issued", "AP")])
            .await
            .unwrap();
        let article = &stored[0];

        let cluster = Cluster::seeded_from(article, Utc::now() - chrono::Duration::hours(1));
        let cluster_id = cluster.id;
        let before = cluster.last_updated;
        store.create_cluster(cluster).await.unwrap();

        store.assign_to_cluster(article.id, cluster_id).await.unwrap();

        let members = store.members_of(cluster_id).await;
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].source, "AP");
        assert_eq!(store.unique_source_count(cluster_id).await.unwrap(), 1);

        let cluster = store.cluster(cluster_id).await.unwrap().unwrap();
        assert!(cluster.last_updated > before);

        let article = store.article(article.id).await.unwrap().unwrap();
        assert_eq!(article.cluster_id, Some(cluster_id));
    }

    #[tokio::test]
    async fn unclustered_query_is_windowed_and_newest_first() {
        let store = MemoryStore::new();
        let mut old = draft("Old story", "AP");
        old.published_at = Some(Utc::now() - chrono::Duration::hours(48));
        let mut fresh = draft("Fresh story", "AP");
        fresh.published_at = Some(Utc::now());
        let mut mid = draft("Mid story", "AP");
        mid.published_at = Some(Utc::now() - chrono::Duration::hours(2));
        store.store_articles(vec![old, fresh, mid]).await.unwrap();

        let cutoff = Utc::now() - chrono::Duration::hours(24);
        let got = store.unclustered_since(cutoff, 10).await.unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].title, "Fresh story");
        assert_eq!(got[1].title, "Mid story");
    }
}
