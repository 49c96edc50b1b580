use std::env;

/// Application configuration loaded from environment variables.
///
/// Every key here is optional: a missing provider key means that provider is
/// skipped, and a missing embedding key means clustering falls back to title
/// similarity.
#[derive(Debug, Clone, Default)]
pub struct Config {
    // News providers
    pub newsapi_key: Option<String>,
    pub guardian_key: Option<String>,

    // Embedding provider
    pub openai_api_key: Option<String>,

    // Worker intervals
    pub ingest_interval_secs: u64,
    pub trending_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            newsapi_key: optional_env("NEWSAPI_KEY"),
            guardian_key: optional_env("GUARDIAN_KEY"),
            openai_api_key: optional_env("OPENAI_API_KEY"),
            ingest_interval_secs: env_or("INGEST_INTERVAL_SECS", 120),
            trending_interval_secs: env_or("TRENDING_INTERVAL_SECS", 60),
        }
    }

    /// Log which capabilities are present without leaking secrets.
    pub fn log_redacted(&self) {
        tracing::info!(
            newsapi = self.newsapi_key.is_some(),
            guardian = self.guardian_key.is_some(),
            embeddings = self.openai_api_key.is_some(),
            ingest_interval_secs = self.ingest_interval_secs,
            trending_interval_secs = self.trending_interval_secs,
            "Config loaded"
        );
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
