//! NewsAPI adapter (keyed, general-purpose).
//!
//! Uses `/top-headlines` for the seven categories NewsAPI supports natively
//! and `/everything` with a keyword query for the rest.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;

use newswire_common::{ArticleDraft, NewswireError, Result};

use crate::base::NewsProvider;

const NEWSAPI_BASE: &str = "https://newsapi.org/v2";

/// Categories `/top-headlines` accepts directly.
const SUPPORTED_CATEGORIES: &[&str] = &[
    "general", "business", "entertainment", "health", "science", "sports", "technology",
];

/// Keyword query used on `/everything` for categories `/top-headlines`
/// does not know about.
fn search_keywords(category: &str) -> &str {
    match category {
        "politics" => "politics OR government OR election OR policy OR congress OR parliament",
        "world" => "international OR global OR world affairs OR geopolitics OR diplomacy",
        "economy" => "economy OR GDP OR inflation OR recession OR economic growth OR trade deficit",
        "finance" => "stock market OR Wall Street OR investment OR banking OR cryptocurrency OR IPO",
        "space" => "space OR NASA OR SpaceX OR satellite OR Mars OR astronaut OR rocket launch",
        "cybersecurity" => "cybersecurity OR hacking OR data breach OR ransomware OR cyber attack",
        "startups" => "startup OR venture capital OR funding OR YCombinator OR unicorn OR seed round",
        "crypto" => "cryptocurrency OR bitcoin OR ethereum OR blockchain OR DeFi OR NFT OR web3",
        "gaming" => "video game OR gaming OR PlayStation OR Xbox OR Nintendo OR esports OR Steam",
        "ai" => "artificial intelligence OR machine learning OR AI OR ChatGPT OR LLM OR deep learning",
        "education" => "education OR university OR school OR students OR teacher OR curriculum",
        "environment" => "climate change OR environment OR renewable energy OR pollution OR sustainability",
        "crime" => "crime OR murder OR robbery OR arrest OR police OR investigation OR fraud",
        "legal" => "court OR lawsuit OR judge OR verdict OR legal OR Supreme Court OR regulation",
        "religion" => "religion OR church OR mosque OR temple OR faith OR Pope OR spiritual",
        "lifestyle" => "lifestyle OR wellness OR self-care OR mindfulness OR work-life balance",
        "food" => "food OR restaurant OR recipe OR cooking OR chef OR cuisine OR dining",
        "travel" => "travel OR tourism OR airline OR hotel OR vacation OR destination OR flight",
        "fashion" => "fashion OR designer OR runway OR clothing OR style OR luxury brand",
        "art" => "art OR museum OR exhibition OR gallery OR painting OR sculpture OR artist",
        "automotive" => "car OR automotive OR electric vehicle OR Tesla OR EV OR self-driving",
        "energy" => "energy OR oil OR gas OR solar OR wind power OR nuclear OR OPEC",
        "real-estate" => "real estate OR housing OR mortgage OR property OR rent OR home prices",
        "defense" => "military OR defense OR army OR navy OR weapons OR NATO OR Pentagon",
        "agriculture" => "agriculture OR farming OR crop OR harvest OR food supply OR livestock",
        "aviation" => "aviation OR airline OR Boeing OR Airbus OR airport OR FAA OR flight",
        "media" => "media OR journalism OR press OR newspaper OR broadcasting OR social media",
        "opinion" => "opinion OR editorial OR commentary OR analysis OR perspective OR debate",
        "weather" => "weather OR storm OR hurricane OR tornado OR flood OR drought OR forecast",
        other => other,
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
struct NewsApiArticle {
    #[serde(default)]
    source: NewsApiSource,
    title: Option<String>,
    url: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    description: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NewsApiSource {
    name: Option<String>,
}

pub struct NewsApiProvider {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl NewsApiProvider {
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
            .ok_or_else(|| NewswireError::Misconfigured("newsapi".to_string()))
    }

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<NewsApiResponse> {
        let resp = self
            .client
            .get(format!("{NEWSAPI_BASE}{path}"))
            .query(params)
            .send()
            .await
            .map_err(|e| NewswireError::Upstream(format!("newsapi: {e}")))?
            .error_for_status()
            .map_err(|e| NewswireError::Upstream(format!("newsapi: {e}")))?;
        resp.json()
            .await
            .map_err(|e| NewswireError::DataQuality(format!("newsapi payload: {e}")))
    }

    fn convert(&self, payload: NewsApiResponse, country: &str, category: &str) -> Vec<ArticleDraft> {
        let mut drafts = Vec::new();
        for item in payload.articles {
            let Some(title) = item.title.filter(|t| !t.is_empty() && t != "[Removed]") else {
                continue;
            };
            let mut draft = ArticleDraft::new(
                self.name(),
                item.source.name.unwrap_or_else(|| "Unknown".to_string()),
                title,
                item.url.unwrap_or_default(),
            );
            draft.published_at = item
                .published_at
                .as_deref()
                .and_then(parse_iso8601)
                .or_else(|| Some(Utc::now()));
            draft.country = country.to_uppercase();
            draft.category = category.to_string();
            draft.snippet = item.description.filter(|d| !d.is_empty());
            draft.image_url = item.url_to_image;
            drafts.push(draft);
        }
        drafts
    }
}

fn parse_iso8601(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

#[async_trait]
impl NewsProvider for NewsApiProvider {
    fn name(&self) -> &'static str {
        "newsapi"
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
        let page_size = page_size.min(100).to_string();

        let payload = if SUPPORTED_CATEGORIES.contains(&category) {
            let country_param = country.to_lowercase();
            self.get(
                "/top-headlines",
                &[
                    ("country", country_param.as_str()),
                    ("category", category),
                    ("pageSize", &page_size),
                    ("apiKey", &key),
                ],
            )
            .await?
        } else {
            self.get(
                "/everything",
                &[
                    ("q", search_keywords(category)),
                    ("language", "en"),
                    ("sortBy", "publishedAt"),
                    ("pageSize", &page_size),
                    ("apiKey", &key),
                ],
            )
            .await?
        };

        let drafts = self.convert(payload, country, category);
        info!(count = drafts.len(), country, category, "NewsAPI headlines fetched");
        Ok(drafts)
    }

    async fn fetch_search(&self, query: &str, page_size: usize) -> Result<Vec<ArticleDraft>> {
        let key = self.key()?.to_string();
        let page_size = page_size.min(100).to_string();
        let payload = self
            .get(
                "/everything",
                &[
                    ("q", query),
                    ("sortBy", "relevancy"),
                    ("pageSize", &page_size),
                    ("apiKey", &key),
                ],
            )
            .await?;
        Ok(self.convert(payload, "US", "general"))
    }
}
