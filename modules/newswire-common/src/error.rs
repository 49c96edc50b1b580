use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewswireError {
    /// Provider HTTP/network failure. Recorded as a circuit breaker failure
    /// at the router boundary and never propagated past it.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Provider credentials missing. The provider is skipped, not failed.
    #[error("Provider not configured: {0}")]
    Misconfigured(String),

    /// Malformed upstream payload or embedding count mismatch. The unit of
    /// work is logged and skipped with no partial state committed.
    #[error("Data quality error: {0}")]
    DataQuality(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
