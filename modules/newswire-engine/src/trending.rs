//! Trending score: log-damped source breadth, hyperbolic recency decay, and
//! log-damped short-window velocity. Recomputed from scratch on every pass,
//! so a stale write is corrected by the next one.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use newswire_common::constants::{
    TRENDING_CLUSTER_LIMIT, TRENDING_VELOCITY_WINDOW_MINS, TRENDING_WINDOW_HOURS,
    TRENDING_W_RECENCY, TRENDING_W_SOURCES, TRENDING_W_VELOCITY,
};
use newswire_common::Result;
use newswire_store::NewsStore;

/// Minutes assumed for a cluster whose newest member has no publish time.
const UNKNOWN_AGE_MINUTES: f64 = 24.0 * 60.0;

/// Score a cluster from its three signals. Deterministic, rounded to four
/// decimals so repeated passes over unchanged inputs write identical values.
pub fn trending_score(
    unique_sources: usize,
    newest_age_minutes: Option<f64>,
    velocity: usize,
) -> f64 {
    let sources = unique_sources.max(1) as f64;
    let age = newest_age_minutes.unwrap_or(UNKNOWN_AGE_MINUTES).max(0.0);

    let source_term = TRENDING_W_SOURCES * (1.0 + sources).ln();
    let recency_term = TRENDING_W_RECENCY * (1.0 / (1.0 + age / 60.0));
    let velocity_term = TRENDING_W_VELOCITY * (1.0 + velocity as f64).ln();

    let score = source_term + recency_term + velocity_term;
    (score * 10_000.0).round() / 10_000.0
}

pub struct TrendingScorer {
    store: Arc<dyn NewsStore>,
}

impl TrendingScorer {
    pub fn new(store: Arc<dyn NewsStore>) -> Self {
        Self { store }
    }

    /// Rescore every cluster touched within the trending window. Returns the
    /// number of clusters rescored; per-cluster failures are logged and
    /// skipped.
    pub async fn update_scores(&self) -> Result<usize> {
        let now = Utc::now();
        let window_cutoff = now - chrono::Duration::hours(TRENDING_WINDOW_HOURS);
        let velocity_cutoff = now - chrono::Duration::minutes(TRENDING_VELOCITY_WINDOW_MINS);

        let clusters = self
            .store
            .clusters_updated_since(window_cutoff, TRENDING_CLUSTER_LIMIT)
            .await?;

        let mut updated = 0usize;
        for cluster in &clusters {
            match self.rescore(cluster.id, now, velocity_cutoff).await {
                Ok(()) => updated += 1,
                Err(e) => {
                    warn!(cluster_id = %cluster.id, error = %e, "Cluster rescore failed");
                }
            }
        }

        info!(updated, considered = clusters.len(), "Trending pass complete");
        Ok(updated)
    }

    async fn rescore(
        &self,
        cluster_id: uuid::Uuid,
        now: chrono::DateTime<Utc>,
        velocity_cutoff: chrono::DateTime<Utc>,
    ) -> Result<()> {
        let sources = self.store.unique_source_count(cluster_id).await?;
        let newest = self.store.newest_member_published(cluster_id).await?;
        let velocity = self
            .store
            .members_fetched_since(cluster_id, velocity_cutoff)
            .await?;

        let age_minutes = newest.map(|t| (now - t).num_seconds() as f64 / 60.0);
        let score = trending_score(sources, age_minutes, velocity);
        self.store.set_cluster_score(cluster_id, score).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn more_sources_score_higher() {
        let one = trending_score(1, Some(60.0), 0);
        let three = trending_score(3, Some(60.0), 0);
        let ten = trending_score(10, Some(60.0), 0);
        assert!(three > one);
        assert!(ten > three);
    }

    #[test]
    fn fresher_clusters_score_higher() {
        let fresh = trending_score(3, Some(10.0), 0);
        let stale = trending_score(3, Some(600.0), 0);
        assert!(fresh > stale);
    }

    #[test]
    fn velocity_raises_the_score() {
        let quiet = trending_score(3, Some(60.0), 0);
        let busy = trending_score(3, Some(60.0), 5);
        assert!(busy > quiet);
    }

    #[test]
    fn zero_and_negative_ages_take_full_recency() {
        assert_eq!(
            trending_score(2, Some(0.0), 0),
            trending_score(2, Some(-15.0), 0)
        );
    }

    #[test]
    fn missing_age_is_penalized_as_a_day_old() {
        assert_eq!(
            trending_score(2, None, 0),
            trending_score(2, Some(24.0 * 60.0), 0)
        );
    }

    #[test]
    fn zero_sources_floors_to_one() {
        assert_eq!(trending_score(0, Some(60.0), 0), trending_score(1, Some(60.0), 0));
    }

    #[test]
    fn score_is_rounded_to_four_decimals() {
        let score = trending_score(3, Some(37.0), 2);
        assert_eq!(score, (score * 10_000.0).round() / 10_000.0);
    }

    #[test]
    fn known_value_matches_the_formula() {
        // sources=1, age=0, velocity=0: 3*ln(2) + 2 + 0
        let expected = ((3.0 * 2.0f64.ln() + 2.0) * 10_000.0).round() / 10_000.0;
        assert_eq!(trending_score(1, Some(0.0), 0), expected);
    }
}
