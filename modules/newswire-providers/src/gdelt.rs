//! GDELT DOC 2.0 adapter (keyless, broad coverage). Always configured, so it
//! anchors the coverage chain when the keyed providers are down or absent.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::info;

use newswire_common::{ArticleDraft, NewswireError, Result};

use crate::base::NewsProvider;

const GDELT_BASE: &str = "https://api.gdeltproject.org/api/v2/doc/doc";

/// GDELT filters by FIPS country codes, not ISO.
fn fips_country(iso: &str) -> &'static str {
    match iso {
        "NP" => "NP",
        "IN" => "IN",
        "PK" => "PK",
        "BD" => "BG",
        "LK" => "CE",
        "CN" => "CH",
        "JP" => "JA",
        "KR" => "KS",
        "TW" => "TW",
        "HK" => "HK",
        "SG" => "SN",
        "TH" => "TH",
        "MY" => "MY",
        "ID" => "ID",
        "PH" => "RP",
        "VN" => "VM",
        "AE" => "AE",
        "SA" => "SA",
        "IL" => "IS",
        "TR" => "TU",
        "QA" => "QA",
        "CA" => "CA",
        "MX" => "MX",
        "BR" => "BR",
        "AR" => "AR",
        "CO" => "CO",
        "CL" => "CI",
        "GB" => "UK",
        "DE" => "GM",
        "FR" => "FR",
        "IT" => "IT",
        "ES" => "SP",
        "NL" => "NL",
        "SE" => "SW",
        "NO" => "NO",
        "PL" => "PL",
        "CH" => "SZ",
        "IE" => "EI",
        "PT" => "PO",
        "BE" => "BE",
        "AU" => "AS",
        "NZ" => "NZ",
        "ZA" => "SF",
        "NG" => "NI",
        "KE" => "KE",
        "EG" => "EG",
        "GH" => "GH",
        _ => "US",
    }
}

/// Keyword clause per category. GDELT has no category facets, so coverage
/// comes from keyword queries.
fn category_keywords(category: &str) -> &'static str {
    match category {
        "world" => "(international OR global OR diplomacy OR United Nations OR geopolitics)",
        "politics" => "(politics OR election OR government OR congress OR parliament OR policy)",
        "economy" => "(economy OR GDP OR inflation OR recession OR trade OR economic)",
        "business" => "(business OR company OR corporate OR merger OR acquisition OR CEO)",
        "finance" => "(stock market OR investment OR banking OR Wall Street OR IPO OR bonds)",
        "technology" => "(technology OR AI OR software OR startup OR cyber OR tech OR digital)",
        "science" => "(science OR research OR discovery OR climate OR physics OR biology)",
        "space" => "(space OR NASA OR SpaceX OR satellite OR Mars OR astronaut OR rocket)",
        "cybersecurity" => "(cybersecurity OR hacking OR data breach OR ransomware OR malware)",
        "startups" => "(startup OR venture capital OR funding OR unicorn OR entrepreneur)",
        "crypto" => "(cryptocurrency OR bitcoin OR ethereum OR blockchain OR DeFi OR NFT)",
        "gaming" => "(video game OR gaming OR esports OR PlayStation OR Xbox OR Nintendo)",
        "ai" => "(artificial intelligence OR machine learning OR ChatGPT OR LLM OR neural network)",
        "health" => "(health OR medical OR hospital OR disease OR vaccine OR WHO OR doctor)",
        "education" => "(education OR university OR school OR students OR teacher OR campus)",
        "environment" => "(climate change OR environment OR renewable OR pollution OR sustainability)",
        "crime" => "(crime OR murder OR robbery OR arrest OR police OR investigation OR shooting)",
        "legal" => "(court OR lawsuit OR judge OR verdict OR legal OR Supreme Court OR trial)",
        "religion" => "(religion OR church OR mosque OR temple OR Pope OR faith OR spiritual)",
        "sports" => "(sports OR football OR soccer OR basketball OR tennis OR olympics OR cricket)",
        "entertainment" => "(entertainment OR movie OR music OR celebrity OR film OR TV show OR concert)",
        "lifestyle" => "(lifestyle OR wellness OR self-care OR mindfulness OR home OR family)",
        "food" => "(food OR restaurant OR recipe OR cooking OR chef OR cuisine OR vegan)",
        "travel" => "(travel OR tourism OR airline OR hotel OR vacation OR destination)",
        "fashion" => "(fashion OR designer OR runway OR clothing OR style OR luxury brand)",
        "art" => "(art OR museum OR exhibition OR gallery OR painting OR sculpture OR theater)",
        "automotive" => "(car OR automotive OR electric vehicle OR Tesla OR EV OR self-driving)",
        "energy" => "(energy OR oil OR gas OR solar OR wind power OR nuclear OR OPEC)",
        "real-estate" => "(real estate OR housing OR mortgage OR property OR rent OR construction)",
        "defense" => "(military OR defense OR army OR navy OR weapons OR NATO OR Pentagon)",
        "agriculture" => "(agriculture OR farming OR crop OR harvest OR food supply OR livestock)",
        "aviation" => "(aviation OR airline OR Boeing OR Airbus OR airport OR FAA OR pilot)",
        "media" => "(media OR journalism OR press OR newspaper OR broadcasting OR reporter)",
        "opinion" => "(opinion OR editorial OR commentary OR analysis OR debate OR column)",
        "weather" => "(weather OR storm OR hurricane OR tornado OR flood OR drought OR forecast)",
        _ => "",
    }
}

#[derive(Debug, Deserialize)]
struct GdeltResponse {
    #[serde(default)]
    articles: Vec<GdeltArticle>,
}

#[derive(Debug, Deserialize)]
struct GdeltArticle {
    title: Option<String>,
    url: Option<String>,
    domain: Option<String>,
    seendate: Option<String>,
    socialimage: Option<String>,
    language: Option<String>,
}

pub struct GdeltProvider {
    client: reqwest::Client,
}

impl Default for GdeltProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl GdeltProvider {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<GdeltResponse> {
        let resp = self
            .client
            .get(GDELT_BASE)
            .query(params)
            .send()
            .await
            .map_err(|e| NewswireError::Upstream(format!("gdelt: {e}")))?
            .error_for_status()
            .map_err(|e| NewswireError::Upstream(format!("gdelt: {e}")))?;
        resp.json()
            .await
            .map_err(|e| NewswireError::DataQuality(format!("gdelt payload: {e}")))
    }

    fn convert(&self, payload: GdeltResponse, country: &str, category: &str) -> Vec<ArticleDraft> {
        let mut drafts = Vec::new();
        for item in payload.articles {
            let Some(title) = item.title.filter(|t| !t.is_empty()) else {
                continue;
            };
            let snippet = title.clone(); // GDELT rarely carries snippets
            let mut draft = ArticleDraft::new(
                self.name(),
                item.domain.unwrap_or_else(|| "Unknown".to_string()),
                title,
                item.url.unwrap_or_default(),
            );
            draft.published_at = item
                .seendate
                .as_deref()
                .and_then(parse_seendate)
                .or_else(|| Some(Utc::now()));
            draft.country = country.to_uppercase();
            draft.category = category.to_string();
            draft.snippet = Some(snippet);
            draft.image_url = item.socialimage.filter(|u| !u.is_empty());
            if let Some(lang) = item.language {
                draft.language = lang.chars().take(20).collect();
            }
            drafts.push(draft);
        }
        drafts
    }
}

/// GDELT timestamps look like `20240131T120000Z`.
fn parse_seendate(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y%m%dT%H%M%SZ")
        .ok()
        .map(|t| t.and_utc())
}

#[async_trait]
impl NewsProvider for GdeltProvider {
    fn name(&self) -> &'static str {
        "gdelt"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn fetch_top_headlines(
        &self,
        country: &str,
        category: &str,
        page_size: usize,
    ) -> Result<Vec<ArticleDraft>> {
        let fips = fips_country(&country.to_uppercase());
        let keywords = category_keywords(category);
        let query = if keywords.is_empty() {
            format!("sourcecountry:{fips}")
        } else {
            format!("sourcecountry:{fips} {keywords}")
        };
        let max_records = page_size.min(75).to_string();

        let payload = self
            .get(&[
                ("query", query.as_str()),
                ("mode", "ArtList"),
                ("maxrecords", &max_records),
                ("format", "json"),
                ("sort", "DateDesc"),
                ("timespan", "24h"),
            ])
            .await?;

        let drafts = self.convert(payload, country, category);
        info!(count = drafts.len(), country, category, "GDELT headlines fetched");
        Ok(drafts)
    }

    async fn fetch_search(&self, query: &str, page_size: usize) -> Result<Vec<ArticleDraft>> {
        let max_records = page_size.min(75).to_string();
        let payload = self
            .get(&[
                ("query", query),
                ("mode", "ArtList"),
                ("maxrecords", &max_records),
                ("format", "json"),
                ("sort", "DateDesc"),
                ("timespan", "7d"),
            ])
            .await?;
        Ok(self.convert(payload, "US", "general"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seendate_parses_gdelt_format() {
        let t = parse_seendate("20240131T120000Z").unwrap();
        assert_eq!(t.to_rfc3339(), "2024-01-31T12:00:00+00:00");
    }

    #[test]
    fn seendate_rejects_garbage() {
        assert!(parse_seendate("not-a-date").is_none());
    }

    #[test]
    fn unknown_iso_codes_fall_back_to_us() {
        assert_eq!(fips_country("XX"), "US");
        assert_eq!(fips_country("GB"), "UK");
    }
}
