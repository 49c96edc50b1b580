//! Embedding client seam. Clustering degrades to title matching when no
//! embedder is configured, so the trait is an optional capability rather
//! than a hard dependency.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

use newswire_common::constants::{EMBEDDING_BATCH_SIZE, EMBEDDING_DIMENSIONS, EMBEDDING_MODEL};
use newswire_common::{NewswireError, Result};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

#[async_trait]
pub trait TextEmbedder: Send + Sync {
    fn is_configured(&self) -> bool;

    /// One vector per input text, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

pub struct OpenAiEmbedder {
    api_key: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

impl OpenAiEmbedder {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            http: reqwest::Client::new(),
            base_url: OPENAI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| NewswireError::Misconfigured("openai".to_string()))?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| NewswireError::Misconfigured(format!("openai key: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    async fn embed_chunk(&self, chunk: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: EMBEDDING_MODEL,
            input: chunk,
            dimensions: EMBEDDING_DIMENSIONS,
        };

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| NewswireError::Embedding(format!("openai: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(NewswireError::Embedding(format!(
                "openai ({status}): {error_text}"
            )));
        }

        let payload: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| NewswireError::Embedding(format!("openai payload: {e}")))?;

        // The API is not contractually ordered, so restore input order.
        let mut data = payload.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl TextEmbedder for OpenAiEmbedder {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(EMBEDDING_BATCH_SIZE) {
            let batch = self.embed_chunk(chunk).await?;
            debug!(requested = chunk.len(), received = batch.len(), "Embedded chunk");
            vectors.extend(batch);
        }
        Ok(vectors)
    }
}

/// Stand-in for deployments without an embedding key. Reports itself as
/// unconfigured so the clustering pass skips the embedding stage entirely.
#[derive(Default)]
pub struct NoopEmbedder;

impl NoopEmbedder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextEmbedder for NoopEmbedder {
    fn is_configured(&self) -> bool {
        false
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(Vec::new())
    }
}
