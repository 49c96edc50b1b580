//! Guardian Open Platform adapter (keyed, curated editorial).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use newswire_common::{ArticleDraft, NewswireError, Result};

use crate::base::NewsProvider;

const GUARDIAN_BASE: &str = "https://content.guardianapis.com";

/// Guardian organizes content by section, not category.
fn section_for(category: &str) -> &'static str {
    match category {
        "world" => "world",
        "politics" => "politics",
        "economy" | "business" | "finance" | "aviation" => "business",
        "technology" | "cybersecurity" | "startups" | "crypto" | "gaming" | "ai" | "automotive" => {
            "technology"
        }
        "science" | "space" => "science",
        "health" => "society",
        "education" => "education",
        "environment" | "energy" | "agriculture" => "environment",
        "crime" => "uk-news",
        "legal" => "law",
        "religion" | "defense" => "world",
        "sports" => "sport",
        "entertainment" => "culture",
        "lifestyle" => "lifeandstyle",
        "food" => "food",
        "travel" => "travel",
        "fashion" => "fashion",
        "art" => "artanddesign",
        "real-estate" => "money",
        "media" => "media",
        "opinion" => "commentisfree",
        _ => "news",
    }
}

#[derive(Debug, Deserialize)]
struct GuardianEnvelope {
    response: GuardianResponse,
}

#[derive(Debug, Deserialize)]
struct GuardianResponse {
    #[serde(default)]
    results: Vec<GuardianItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianItem {
    web_title: Option<String>,
    web_url: Option<String>,
    web_publication_date: Option<String>,
    #[serde(default)]
    fields: GuardianFields,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianFields {
    trail_text: Option<String>,
    thumbnail: Option<String>,
}

pub struct GuardianProvider {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl GuardianProvider {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self { api_key, client }
    }

    fn key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| NewswireError::Misconfigured("guardian".to_string()))
    }

    async fn search(&self, params: &[(&str, &str)]) -> Result<GuardianEnvelope> {
        let resp = self
            .client
            .get(format!("{GUARDIAN_BASE}/search"))
            .query(params)
            .send()
            .await
            .map_err(|e| NewswireError::Upstream(format!("guardian: {e}")))?
            .error_for_status()
            .map_err(|e| NewswireError::Upstream(format!("guardian: {e}")))?;
        resp.json()
            .await
            .map_err(|e| NewswireError::DataQuality(format!("guardian payload: {e}")))
    }

    fn convert(
        &self,
        envelope: GuardianEnvelope,
        country: &str,
        category: &str,
    ) -> Vec<ArticleDraft> {
        let mut drafts = Vec::new();
        for item in envelope.response.results {
            let Some(title) = item.web_title.filter(|t| !t.is_empty()) else {
                continue;
            };
            let mut draft = ArticleDraft::new(
                self.name(),
                "The Guardian".to_string(),
                title,
                item.web_url.unwrap_or_default(),
            );
            draft.published_at = item
                .web_publication_date
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc))
                .or_else(|| Some(Utc::now()));
            draft.country = country.to_uppercase();
            draft.category = category.to_string();
            draft.snippet = item.fields.trail_text.filter(|t| !t.is_empty());
            draft.image_url = item.fields.thumbnail;
            drafts.push(draft);
        }
        drafts
    }
}

#[async_trait]
impl NewsProvider for GuardianProvider {
    fn name(&self) -> &'static str {
        "guardian"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_top_headlines(
        &self,
        country: &str,
        category: &str,
        page_size: usize,
    ) -> Result<Vec<ArticleDraft>> {
        let key = self.key()?.to_string();
        let page_size = page_size.min(50).to_string();
        let section = section_for(category);

        let envelope = self
            .search(&[
                ("section", section),
                ("page-size", &page_size),
                ("order-by", "newest"),
                ("show-fields", "trailText,thumbnail"),
                ("api-key", &key),
            ])
            .await?;

        let drafts = self.convert(envelope, country, category);
        info!(count = drafts.len(), section, "Guardian headlines fetched");
        Ok(drafts)
    }

    async fn fetch_search(&self, query: &str, page_size: usize) -> Result<Vec<ArticleDraft>> {
        let key = self.key()?.to_string();
        let page_size = page_size.min(50).to_string();
        let envelope = self
            .search(&[
                ("q", query),
                ("page-size", &page_size),
                ("order-by", "relevance"),
                ("show-fields", "trailText,thumbnail"),
                ("api-key", &key),
            ])
            .await?;
        Ok(self.convert(envelope, "US", "general"))
    }
}
