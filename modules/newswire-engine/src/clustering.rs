//! Dedup and clustering pass: group window articles into story clusters by
//! embedding-vs-centroid similarity, falling back to title similarity, then
//! to peer matching within the batch.
//!
//! The pass is a single sweep in publish order. An article early in the
//! batch can seed the cluster a later one joins, so results depend on batch
//! order; there is no fixed-point iteration.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use newswire_common::constants::{
    CENTROID_CACHE_TTL_SECS, CENTROID_MEMBER_LIMIT, CLUSTER_BATCH_LIMIT, CLUSTER_CANDIDATE_LIMIT,
    DEDUP_TIME_WINDOW_HOURS, EMBEDDING_SIMILARITY_THRESHOLD, TITLE_SIMILARITY_THRESHOLD,
};
use newswire_common::{
    centroid, cosine_similarity, title_similarity, Article, Cluster, Result,
};
use newswire_store::{cache_get, cache_set, Cache, NewsStore};

use crate::embedder::TextEmbedder;

fn centroid_key(cluster_id: Uuid) -> String {
    format!("centroid:{cluster_id}")
}

/// Text fed to the embedding model: title plus the first 200 chars of the
/// snippet.
fn embedding_text(article: &Article) -> String {
    match article.snippet.as_deref() {
        Some(snippet) => {
            let head: String = snippet.chars().take(200).collect();
            format!("{} {}", article.title, head)
        }
        None => article.title.clone(),
    }
}

enum MatchKind {
    Embedding,
    Title,
    Peer,
}

pub struct ClusterEngine {
    store: Arc<dyn NewsStore>,
    cache: Arc<dyn Cache>,
    embedder: Arc<dyn TextEmbedder>,
}

impl ClusterEngine {
    pub fn new(
        store: Arc<dyn NewsStore>,
        cache: Arc<dyn Cache>,
        embedder: Arc<dyn TextEmbedder>,
    ) -> Self {
        Self {
            store,
            cache,
            embedder,
        }
    }

    /// One clustering pass over the dedup window. Returns the number of new
    /// clusters created.
    pub async fn run(&self) -> Result<usize> {
        let now = Utc::now();
        let cutoff = now - chrono::Duration::hours(DEDUP_TIME_WINDOW_HOURS);

        self.embed_missing(cutoff).await;

        let batch = self
            .store
            .unclustered_since(cutoff, CLUSTER_BATCH_LIMIT)
            .await?;
        if batch.is_empty() {
            return Ok(0);
        }

        let mut candidates = self
            .store
            .clusters_updated_since(cutoff, CLUSTER_CANDIDATE_LIMIT)
            .await?;

        // Centroids resolved during this run, including seeds for clusters
        // created mid-pass that the shared cache has never seen.
        let mut centroids: HashMap<Uuid, Vec<f32>> = HashMap::new();
        let mut assigned: Vec<(Article, Uuid)> = Vec::new();

        let mut embedding_matches = 0usize;
        let mut title_matches = 0usize;
        let mut peer_matches = 0usize;
        let mut created = 0usize;

        let processed = batch.len();
        for article in batch {
            let matched = self
                .match_article(&article, &candidates, &assigned, &mut centroids)
                .await?;

            match matched {
                Some((cluster_id, kind)) => {
                    self.store.assign_to_cluster(article.id, cluster_id).await?;
                    if article.embedding.is_some() {
                        // Centroid is stale once an embedded member joins.
                        self.cache.delete(&centroid_key(cluster_id)).await;
                        centroids.remove(&cluster_id);
                    }
                    match kind {
                        MatchKind::Embedding => embedding_matches += 1,
                        MatchKind::Title => title_matches += 1,
                        MatchKind::Peer => peer_matches += 1,
                    }
                    assigned.push((article, cluster_id));
                }
                None => {
                    let cluster = Cluster::seeded_from(&article, now);
                    let cluster_id = cluster.id;
                    self.store.create_cluster(cluster.clone()).await?;
                    self.store.assign_to_cluster(article.id, cluster_id).await?;
                    if let Some(embedding) = article.embedding.clone() {
                        centroids.insert(cluster_id, embedding);
                    }
                    candidates.push(cluster);
                    created += 1;
                    assigned.push((article, cluster_id));
                }
            }
        }

        info!(
            processed,
            embedding_matches, title_matches, peer_matches, created, "Clustering pass complete"
        );
        Ok(created)
    }

    /// Backfill embeddings for window articles that lack one. Failures are
    /// soft: the pass continues and those articles match by title only.
    async fn embed_missing(&self, cutoff: DateTime<Utc>) {
        if !self.embedder.is_configured() {
            return;
        }
        let pending = match self
            .store
            .missing_embedding_since(cutoff, CLUSTER_BATCH_LIMIT)
            .await
        {
            Ok(pending) => pending,
            Err(e) => {
                warn!(error = %e, "Could not list articles missing embeddings");
                return;
            }
        };
        if pending.is_empty() {
            return;
        }

        let texts: Vec<String> = pending.iter().map(embedding_text).collect();
        let vectors = match self.embedder.embed_batch(&texts).await {
            Ok(vectors) => vectors,
            Err(e) => {
                warn!(error = %e, "Embedding batch failed, continuing without");
                return;
            }
        };
        if vectors.len() != pending.len() {
            warn!(
                expected = pending.len(),
                received = vectors.len(),
                "Embedding count mismatch, skipping write-back"
            );
            return;
        }

        for (article, vector) in pending.iter().zip(vectors) {
            if let Err(e) = self.store.set_embedding(article.id, vector).await {
                warn!(article_id = %article.id, error = %e, "Embedding write failed");
            }
        }
        info!(count = pending.len(), "Embeddings backfilled");
    }

    async fn match_article(
        &self,
        article: &Article,
        candidates: &[Cluster],
        assigned: &[(Article, Uuid)],
        centroids: &mut HashMap<Uuid, Vec<f32>>,
    ) -> Result<Option<(Uuid, MatchKind)>> {
        // Stage 1: best embedding-vs-centroid match within the category.
        if let Some(embedding) = &article.embedding {
            let mut best: Option<(Uuid, f32)> = None;
            for cluster in candidates {
                if cluster.category != article.category {
                    continue;
                }
                let Some(center) = self.centroid_for(cluster.id, centroids).await? else {
                    continue;
                };
                let sim = cosine_similarity(embedding, &center);
                // Strict greater-than keeps the earliest candidate on ties.
                if best.is_none_or(|(_, s)| sim > s) {
                    best = Some((cluster.id, sim));
                }
            }
            if let Some((cluster_id, sim)) = best {
                if sim >= EMBEDDING_SIMILARITY_THRESHOLD {
                    return Ok(Some((cluster_id, MatchKind::Embedding)));
                }
            }
        }

        // Stage 2: first title match within the category.
        for cluster in candidates {
            if cluster.category != article.category {
                continue;
            }
            if title_similarity(&article.title, &cluster.canonical_title)
                >= TITLE_SIMILARITY_THRESHOLD
            {
                return Ok(Some((cluster.id, MatchKind::Title)));
            }
        }

        // Stage 3: peer match against batch articles already placed.
        for (peer, cluster_id) in assigned {
            if peer.category != article.category {
                continue;
            }
            let matched = match (&article.embedding, &peer.embedding) {
                (Some(a), Some(b)) => cosine_similarity(a, b) >= EMBEDDING_SIMILARITY_THRESHOLD,
                _ => title_similarity(&article.title, &peer.title) >= TITLE_SIMILARITY_THRESHOLD,
            };
            if matched {
                return Ok(Some((*cluster_id, MatchKind::Peer)));
            }
        }

        Ok(None)
    }

    /// Resolve a cluster centroid: run-local map, then shared cache, then a
    /// fresh mean over stored member embeddings. `None` means the cluster
    /// has no embedded members and is matchable by title only.
    async fn centroid_for(
        &self,
        cluster_id: Uuid,
        centroids: &mut HashMap<Uuid, Vec<f32>>,
    ) -> Result<Option<Vec<f32>>> {
        if let Some(center) = centroids.get(&cluster_id) {
            return Ok(Some(center.clone()));
        }
        let key = centroid_key(cluster_id);
        if let Some(center) = cache_get::<Vec<f32>>(self.cache.as_ref(), &key).await {
            centroids.insert(cluster_id, center.clone());
            return Ok(Some(center));
        }
        let members = self
            .store
            .member_embeddings(cluster_id, CENTROID_MEMBER_LIMIT)
            .await?;
        if members.is_empty() {
            return Ok(None);
        }
        let center = centroid(&members);
        cache_set(
            self.cache.as_ref(),
            &key,
            &center,
            Duration::from_secs(CENTROID_CACHE_TTL_SECS),
        )
        .await;
        centroids.insert(cluster_id, center.clone());
        Ok(Some(center))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newswire_common::ArticleDraft;

    fn article_with_snippet(snippet: Option<&str>) -> Article {
        let mut draft = ArticleDraft::new(
            "newsapi",
            "Reuters".to_string(),
            "Major earthquake strikes Pacific region".to_string(),
            "https://example.com/quake".to_string(),
        );
        draft.snippet = snippet.map(str::to_string);
        Article::from_draft(draft, Utc::now())
    }

    #[test]
    fn embedding_text_appends_truncated_snippet() {
        let long = "x".repeat(500);
        let article = article_with_snippet(Some(&long));
        let text = embedding_text(&article);
        assert!(text.starts_with("Major earthquake strikes Pacific region "));
        assert_eq!(text.len(), article.title.len() + 1 + 200);
    }

    #[test]
    fn embedding_text_without_snippet_is_the_title() {
        let article = article_with_snippet(None);
        assert_eq!(embedding_text(&article), article.title);
    }
}
