//! Per-provider circuit breaker.
//!
//! State lives in the shared cache (key `cb:{provider}`) so every worker
//! process observes one view. Updates are best-effort: a lost write or a
//! double trial during the half-open window is acceptable.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use newswire_common::constants::{CIRCUIT_BREAKER_COOLDOWN_SECS, CIRCUIT_BREAKER_THRESHOLD};
use newswire_store::{cache_get, cache_set, Cache};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakerStatus {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BreakerState {
    failures: u32,
    state: BreakerStatus,
    opened_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl Default for BreakerState {
    fn default() -> Self {
        Self {
            failures: 0,
            state: BreakerStatus::Closed,
            opened_at: None,
            last_error: None,
        }
    }
}

/// Externally visible breaker snapshot, reported alongside provider health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    pub status: BreakerStatus,
    pub failures: u32,
    pub last_error: Option<String>,
    pub cooldown_until: Option<DateTime<Utc>>,
    pub configured: bool,
}

pub struct CircuitBreaker {
    provider: &'static str,
    cache: Arc<dyn Cache>,
}

impl CircuitBreaker {
    pub fn new(provider: &'static str, cache: Arc<dyn Cache>) -> Self {
        Self { provider, cache }
    }

    fn key(&self) -> String {
        format!("cb:{}", self.provider)
    }

    async fn load(&self) -> BreakerState {
        cache_get(self.cache.as_ref(), &self.key())
            .await
            .unwrap_or_default()
    }

    async fn save(&self, state: &BreakerState) {
        // Kept well past the cooldown so half-open observations survive.
        let ttl = Duration::from_secs(CIRCUIT_BREAKER_COOLDOWN_SECS as u64 * 10);
        cache_set(self.cache.as_ref(), &self.key(), state, ttl).await;
    }

    /// Whether calls should be skipped. An open breaker whose cooldown has
    /// elapsed flips to half-open here and admits exactly the next caller.
    pub async fn is_open(&self) -> bool {
        let mut state = self.load().await;
        if state.state != BreakerStatus::Open {
            return false;
        }
        let cooled_down = state
            .opened_at
            .is_some_and(|t| Utc::now() - t > chrono::Duration::seconds(CIRCUIT_BREAKER_COOLDOWN_SECS));
        if cooled_down {
            state.state = BreakerStatus::HalfOpen;
            self.save(&state).await;
            return false;
        }
        true
    }

    /// Any success drives the breaker fully closed.
    pub async fn record_success(&self) {
        let mut state = self.load().await;
        state.failures = 0;
        state.state = BreakerStatus::Closed;
        state.opened_at = None;
        self.save(&state).await;
    }

    /// A failure increments the counter; reaching the threshold (or failing
    /// the half-open trial) opens the breaker and stamps the open time.
    pub async fn record_failure(&self, error: &str) {
        let mut state = self.load().await;
        state.failures += 1;
        state.last_error = Some(error.to_string());
        if state.failures >= CIRCUIT_BREAKER_THRESHOLD || state.state == BreakerStatus::HalfOpen {
            state.state = BreakerStatus::Open;
            state.opened_at = Some(Utc::now());
        }
        self.save(&state).await;
    }

    pub async fn status(&self, configured: bool) -> ProviderStatus {
        let state = self.load().await;
        let cooldown_until = match state.state {
            BreakerStatus::Open => state
                .opened_at
                .map(|t| t + chrono::Duration::seconds(CIRCUIT_BREAKER_COOLDOWN_SECS)),
            _ => None,
        };
        ProviderStatus {
            name: self.provider.to_string(),
            status: state.state,
            failures: state.failures,
            last_error: state.last_error,
            cooldown_until,
            configured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use newswire_store::MemoryCache;

    fn breaker(cache: &Arc<MemoryCache>) -> CircuitBreaker {
        CircuitBreaker::new("test-provider", cache.clone() as Arc<dyn Cache>)
    }

    #[tokio::test]
    async fn opens_after_threshold_failures() {
        let cache = Arc::new(MemoryCache::new());
        let cb = breaker(&cache);

        for _ in 0..CIRCUIT_BREAKER_THRESHOLD - 1 {
            cb.record_failure("timeout").await;
            assert!(!cb.is_open().await);
        }
        cb.record_failure("timeout").await;
        assert!(cb.is_open().await);

        let status = cb.status(true).await;
        assert_eq!(status.status, BreakerStatus::Open);
        assert_eq!(status.failures, CIRCUIT_BREAKER_THRESHOLD);
        assert_eq!(status.last_error.as_deref(), Some("timeout"));
        assert!(status.cooldown_until.is_some());
    }

    #[tokio::test]
    async fn success_resets_failure_count() {
        let cache = Arc::new(MemoryCache::new());
        let cb = breaker(&cache);

        cb.record_failure("500").await;
        cb.record_failure("500").await;
        cb.record_success().await;
        cb.record_failure("500").await;
        assert!(!cb.is_open().await, "counter should have reset on success");
    }

    #[tokio::test]
    async fn elapsed_cooldown_flips_to_half_open_and_admits_one_trial() {
        let cache = Arc::new(MemoryCache::new());
        let cb = breaker(&cache);

        for _ in 0..CIRCUIT_BREAKER_THRESHOLD {
            cb.record_failure("timeout").await;
        }
        assert!(cb.is_open().await);

        // Rewind the opened_at stamp past the cooldown.
        let mut state: BreakerState = cache_get(cache.as_ref(), "cb:test-provider").await.unwrap();
        state.opened_at =
            Some(Utc::now() - chrono::Duration::seconds(CIRCUIT_BREAKER_COOLDOWN_SECS + 1));
        cache_set(
            cache.as_ref(),
            "cb:test-provider",
            &state,
            Duration::from_secs(600),
        )
        .await;

        assert!(!cb.is_open().await, "cooled-down breaker admits a trial");
        assert_eq!(cb.status(true).await.status, BreakerStatus::HalfOpen);

        // A failed trial re-opens immediately with a fresh timestamp.
        cb.record_failure("still down").await;
        assert!(cb.is_open().await);

        // A successful trial would have closed it instead.
        cb.record_success().await;
        assert!(!cb.is_open().await);
        assert_eq!(cb.status(true).await.status, BreakerStatus::Closed);
    }

    #[tokio::test]
    async fn cache_absent_degrades_to_closed() {
        let cache: Arc<dyn Cache> = Arc::new(newswire_store::NoopCache::new());
        let cb = CircuitBreaker::new("test-provider", cache);
        cb.record_failure("timeout").await;
        cb.record_failure("timeout").await;
        cb.record_failure("timeout").await;
        // No state survives, so the breaker never opens.
        assert!(!cb.is_open().await);
    }
}
