//! Search ranking: tiered text relevance blended with recency decay and a
//! cluster-score boost, then source-diversity capping and pagination.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use newswire_common::constants::{
    MAX_SEARCH_RESULTS, MAX_SUGGESTIONS, SEARCH_CACHE_TTL_SECS, SEARCH_CANDIDATE_LIMIT,
    SEARCH_SOURCE_CAP, SUGGEST_ARTICLE_CANDIDATES, SUGGEST_CACHE_TTL_SECS,
    SUGGEST_CLUSTER_CANDIDATES,
};
use newswire_common::{normalize_title, Article, Cluster, Result};
use newswire_store::{cache_get, cache_set, Cache, NewsStore};

const W_RELEVANCE: f64 = 0.55;
const W_RECENCY: f64 = 0.25;
const W_BOOST: f64 = 0.20;

/// Hourly decay rate giving roughly half weight at 24 hours.
const RECENCY_DECAY: f64 = 0.029;
const RECENCY_FLOOR: f64 = 0.05;
const RECENCY_UNKNOWN: f64 = 0.1;

/// Tiered title-vs-query relevance in [0, 1].
///
/// Tiers, best first: exact normalized match, prefix match, every query
/// word starting a title token, every query word present somewhere, some
/// words at token boundaries, some words as bare substrings.
pub fn text_relevance(title: &str, query: &str) -> f64 {
    let title_norm = normalize_title(title);
    let query_norm = normalize_title(query);
    if query_norm.is_empty() || title_norm.is_empty() {
        return 0.0;
    }
    if title_norm == query_norm {
        return 1.0;
    }
    if title_norm.starts_with(&query_norm) {
        return 0.9;
    }

    let tokens: Vec<&str> = title_norm.split_whitespace().collect();
    let words: Vec<&str> = query_norm.split_whitespace().collect();
    let total = words.len() as f64;

    let boundary_hits = words
        .iter()
        .filter(|w| tokens.iter().any(|t| t.starts_with(**w)))
        .count();
    let substring_hits = words
        .iter()
        .filter(|w| title_norm.contains(**w))
        .count();

    if boundary_hits == words.len() {
        return 0.8;
    }
    if substring_hits == words.len() {
        return 0.6;
    }
    if boundary_hits > 0 {
        return 0.2 + 0.2 * (boundary_hits as f64 / total);
    }
    if substring_hits > 0 {
        return 0.1 + 0.1 * (substring_hits as f64 / total);
    }
    0.0
}

/// Exponential decay by age in hours, floored so old matches never vanish.
/// Articles without a timestamp get a low fixed score.
pub fn recency_score(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(published) = published_at else {
        return RECENCY_UNKNOWN;
    };
    let age_hours = ((now - published).num_seconds() as f64 / 3600.0).max(0.0);
    (-RECENCY_DECAY * age_hours).exp().max(RECENCY_FLOOR)
}

/// Log-scaled cluster-score boost saturating at 1.0 (a score of 50).
pub fn cluster_boost(score: f64) -> f64 {
    if score <= 0.0 {
        return 0.0;
    }
    ((1.0 + score).ln() / 51.0f64.ln()).min(1.0)
}

pub fn combined_rank(relevance: f64, recency: f64, boost: f64) -> f64 {
    W_RELEVANCE * relevance + W_RECENCY * recency + W_BOOST * boost
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Cluster,
    Article,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    pub kind: SuggestionKind,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterRef {
    pub id: Uuid,
    pub title: String,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub article_id: Uuid,
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_at: Option<DateTime<Utc>>,
    pub category: String,
    pub country: String,
    pub snippet: Option<String>,
    pub image_url: Option<String>,
    pub relevance: f64,
    pub rank: f64,
    pub cluster: Option<ClusterRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    pub query: String,
    pub results: Vec<SearchResult>,
    /// Matches after relevance filtering and source capping, pre-pagination.
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

pub struct SearchRanker {
    store: Arc<dyn NewsStore>,
    cache: Arc<dyn Cache>,
}

impl SearchRanker {
    pub fn new(store: Arc<dyn NewsStore>, cache: Arc<dyn Cache>) -> Self {
        Self { store, cache }
    }

    /// Typeahead suggestions: matching cluster titles first, then article
    /// titles, deduped by normalized title.
    pub async fn suggestions(&self, query: &str) -> Result<Vec<Suggestion>> {
        let q = query.trim().to_lowercase();
        if q.chars().count() < 2 {
            return Ok(Vec::new());
        }

        let key = format!("search:suggest:{q}");
        if let Some(cached) = cache_get::<Vec<Suggestion>>(self.cache.as_ref(), &key).await {
            debug!(query = %q, "Suggestion cache hit");
            return Ok(cached);
        }

        let now = Utc::now();
        let clusters = self
            .store
            .search_clusters_by_title(&q, SUGGEST_CLUSTER_CANDIDATES)
            .await?;
        let articles = self
            .store
            .search_articles_by_title(&q, None, None, SUGGEST_ARTICLE_CANDIDATES)
            .await?;

        let mut ranked: Vec<Suggestion> = Vec::new();
        for cluster in clusters {
            let relevance = text_relevance(&cluster.canonical_title, &q);
            if relevance == 0.0 {
                continue;
            }
            let score = combined_rank(
                relevance,
                recency_score(Some(cluster.last_updated), now),
                cluster_boost(cluster.score),
            );
            ranked.push(Suggestion {
                text: cluster.canonical_title,
                kind: SuggestionKind::Cluster,
                score,
            });
        }
        for article in articles {
            let relevance = text_relevance(&article.title, &q);
            if relevance == 0.0 {
                continue;
            }
            let score = combined_rank(relevance, recency_score(article.published_at, now), 0.0);
            ranked.push(Suggestion {
                text: article.title,
                kind: SuggestionKind::Article,
                score,
            });
        }

        // Stable sort keeps clusters ahead of equally scored articles.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        let mut seen = std::collections::HashSet::new();
        let mut suggestions = Vec::new();
        for suggestion in ranked {
            if seen.insert(normalize_title(&suggestion.text)) {
                suggestions.push(suggestion);
            }
            if suggestions.len() >= MAX_SUGGESTIONS {
                break;
            }
        }

        cache_set(
            self.cache.as_ref(),
            &key,
            &suggestions,
            Duration::from_secs(SUGGEST_CACHE_TTL_SECS),
        )
        .await;
        Ok(suggestions)
    }

    /// Full search: rank title-substring candidates, drop zero-relevance
    /// matches, cap results per source, then paginate.
    pub async fn search(
        &self,
        query: &str,
        category: Option<&str>,
        country: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<SearchPage> {
        let q = query.trim().to_lowercase();
        let limit = limit.clamp(1, MAX_SEARCH_RESULTS);
        if q.chars().count() < 2 {
            return Ok(SearchPage {
                query: q,
                limit,
                offset,
                ..Default::default()
            });
        }

        let key = format!(
            "search:full:{q}:{}:{}:{offset}",
            category.unwrap_or("all"),
            country.unwrap_or("all"),
        );
        if let Some(cached) = cache_get::<SearchPage>(self.cache.as_ref(), &key).await {
            debug!(query = %q, "Search cache hit");
            return Ok(cached);
        }

        let candidates = self
            .store
            .search_articles_by_title(&q, category, country, SEARCH_CANDIDATE_LIMIT)
            .await?;
        let clusters = self.clusters_of(&candidates).await?;

        let now = Utc::now();
        let mut ranked: Vec<SearchResult> = Vec::new();
        for article in candidates {
            let relevance = text_relevance(&article.title, &q);
            if relevance == 0.0 {
                continue;
            }
            let cluster = article
                .cluster_id
                .and_then(|id| clusters.get(&id))
                .map(|c| ClusterRef {
                    id: c.id,
                    title: c.canonical_title.clone(),
                    score: c.score,
                });
            let boost = cluster.as_ref().map_or(0.0, |c| cluster_boost(c.score));
            let rank = combined_rank(relevance, recency_score(article.published_at, now), boost);
            ranked.push(SearchResult {
                article_id: article.id,
                title: article.title,
                url: article.url,
                source: article.source,
                published_at: article.published_at,
                category: article.category,
                country: article.country,
                snippet: article.snippet,
                image_url: article.image_url,
                relevance,
                rank,
                cluster,
            });
        }
        ranked.sort_by(|a, b| b.rank.total_cmp(&a.rank));

        // Diversity cap: walk the ranked list and skip anything past the
        // per-source quota. No backfill; capped items are gone.
        let mut per_source: HashMap<String, usize> = HashMap::new();
        let capped: Vec<SearchResult> = ranked
            .into_iter()
            .filter(|r| {
                let count = per_source.entry(r.source.to_lowercase()).or_insert(0);
                *count += 1;
                *count <= SEARCH_SOURCE_CAP
            })
            .collect();

        let total = capped.len();
        let results = capped.into_iter().skip(offset).take(limit).collect();
        let page = SearchPage {
            query: q,
            results,
            total,
            limit,
            offset,
        };

        cache_set(
            self.cache.as_ref(),
            &key,
            &page,
            Duration::from_secs(SEARCH_CACHE_TTL_SECS),
        )
        .await;
        Ok(page)
    }

    async fn clusters_of(&self, articles: &[Article]) -> Result<HashMap<Uuid, Cluster>> {
        let ids: Vec<Uuid> = {
            let mut ids: Vec<Uuid> = articles.iter().filter_map(|a| a.cluster_id).collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let clusters = self.store.clusters_by_ids(&ids).await?;
        Ok(clusters.into_iter().map(|c| (c.id, c)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_beats_every_other_tier() {
        let q = "climate summit";
        let exact = text_relevance("Climate Summit", q);
        let prefix = text_relevance("Climate summit opens in Geneva", q);
        let boundary = text_relevance("Leaders gather as climate talks summit nears", q);
        assert_eq!(exact, 1.0);
        assert_eq!(prefix, 0.9);
        assert_eq!(boundary, 0.8);
        assert!(exact > prefix && prefix > boundary);
    }

    #[test]
    fn all_words_as_substrings_scores_mid_tier() {
        // "quake" only appears inside "earthquakes".
        let score = text_relevance("Earthquakes and aftershock risk", "quake aftershock");
        assert_eq!(score, 0.6);
    }

    #[test]
    fn partial_boundary_match_scales_with_fraction() {
        let score = text_relevance("Earthquake in Japan", "earthquake tsunami");
        assert!((score - 0.3).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn substring_only_match_scores_lowest_nonzero() {
        let score = text_relevance("Megaquake warning issued", "quake tsunami");
        assert!((score - 0.15).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn unrelated_title_scores_zero() {
        assert_eq!(
            text_relevance("Apple announces new AI features", "earthquake"),
            0.0
        );
    }

    #[test]
    fn empty_query_scores_zero() {
        assert_eq!(text_relevance("Anything", "  !!  "), 0.0);
    }

    #[test]
    fn recency_decays_with_age_and_floors() {
        let now = Utc::now();
        let fresh = recency_score(Some(now), now);
        let day_old = recency_score(Some(now - chrono::Duration::hours(24)), now);
        let ancient = recency_score(Some(now - chrono::Duration::days(365)), now);
        assert!(fresh > day_old);
        assert!(day_old > ancient);
        assert_eq!(ancient, RECENCY_FLOOR);
        assert_eq!(recency_score(None, now), RECENCY_UNKNOWN);
    }

    #[test]
    fn future_timestamps_clamp_to_now() {
        let now = Utc::now();
        let future = recency_score(Some(now + chrono::Duration::hours(5)), now);
        assert_eq!(future, 1.0);
    }

    #[test]
    fn cluster_boost_is_bounded() {
        assert_eq!(cluster_boost(0.0), 0.0);
        assert_eq!(cluster_boost(-3.0), 0.0);
        assert!(cluster_boost(5.0) > cluster_boost(1.0));
        assert_eq!(cluster_boost(50.0), 1.0);
        assert_eq!(cluster_boost(500.0), 1.0);
    }

    #[test]
    fn combined_rank_weights_sum_to_one() {
        assert!((combined_rank(1.0, 1.0, 1.0) - 1.0).abs() < 1e-9);
    }
}
