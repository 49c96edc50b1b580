use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::similarity::article_fingerprint;

/// A fetched item as produced by a provider adapter, before storage assigns
/// identity. Adapters validate and convert upstream payloads into this shape
/// immediately after the network call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDraft {
    pub provider: String,
    pub source: String,
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub country: String,
    pub language: String,
    pub category: String,
    pub snippet: Option<String>,
    pub image_url: Option<String>,
    /// Dedup hash of normalized title + source, computed at construction.
    pub fingerprint: String,
}

impl ArticleDraft {
    pub fn new(provider: &str, source: String, title: String, url: String) -> Self {
        let fingerprint = article_fingerprint(&title, &source);
        Self {
            provider: provider.to_string(),
            source,
            title,
            url,
            published_at: None,
            country: "US".to_string(),
            language: "en".to_string(),
            category: "general".to_string(),
            snippet: None,
            image_url: None,
            fingerprint,
        }
    }
}

/// An immutable-once-stored article. The embedding and cluster reference are
/// filled in asynchronously after creation; nothing in the core deletes rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub provider: String,
    pub source: String,
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Utc>,
    pub country: String,
    pub language: String,
    pub category: String,
    pub snippet: Option<String>,
    pub image_url: Option<String>,
    pub embedding: Option<Vec<f32>>,
    pub fingerprint: String,
    pub cluster_id: Option<Uuid>,
}

impl Article {
    /// Assign identity to a draft at insert time. A draft without a publish
    /// timestamp gets the fetch time, so stored rows are always orderable.
    pub fn from_draft(draft: ArticleDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider: draft.provider,
            source: draft.source,
            title: draft.title,
            url: draft.url,
            published_at: Some(draft.published_at.unwrap_or(now)),
            fetched_at: now,
            country: draft.country,
            language: draft.language,
            category: draft.category,
            snippet: draft.snippet,
            image_url: draft.image_url,
            embedding: None,
            fingerprint: draft.fingerprint,
            cluster_id: None,
        }
    }
}

/// A story: one or more articles grouped by similarity. The category is
/// fixed at creation and acts as a hard partition boundary for matching.
/// Enrichment fields stay `None` here; an external enrichment pass fills
/// them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: Uuid,
    pub canonical_title: String,
    pub canonical_url: String,
    pub country: String,
    pub category: String,
    pub score: f64,
    pub last_updated: DateTime<Utc>,
    pub summary: Option<String>,
    pub key_points: Option<Vec<String>>,
    pub entities: Option<serde_json::Value>,
    pub tags: Option<Vec<String>>,
    pub why_trending: Option<String>,
}

impl Cluster {
    /// Seed a new cluster from its founding article.
    pub fn seeded_from(article: &Article, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            canonical_title: article.title.clone(),
            canonical_url: article.url.clone(),
            country: article.country.clone(),
            category: article.category.clone(),
            score: 0.0,
            last_updated: now,
            summary: None,
            key_points: None,
            entities: None,
            tags: None,
            why_trending: None,
        }
    }
}

/// Denormalized cluster↔article↔source join. One row per assignment; lets
/// the trending scorer count distinct contributing sources without rejoining
/// article rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterMember {
    pub cluster_id: Uuid,
    pub article_id: Uuid,
    pub source: String,
}
