//! Pipeline tuning constants shared across crates.

// ── Circuit breaker ──────────────────────────────────────────────

/// Consecutive failures before a provider's breaker opens.
pub const CIRCUIT_BREAKER_THRESHOLD: u32 = 3;

/// Seconds an open breaker waits before allowing a half-open trial call.
pub const CIRCUIT_BREAKER_COOLDOWN_SECS: i64 = 60;

// ── Dedup / clustering ───────────────────────────────────────────

/// Trailing window for unclustered articles and candidate clusters.
pub const DEDUP_TIME_WINDOW_HOURS: i64 = 24;

/// Title-similarity ratio needed for the fallback match.
pub const TITLE_SIMILARITY_THRESHOLD: f64 = 0.75;

/// Cosine similarity needed for an embedding-vs-centroid match.
pub const EMBEDDING_SIMILARITY_THRESHOLD: f32 = 0.82;

pub const EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const EMBEDDING_DIMENSIONS: usize = 256;

/// Texts per request to the embedding API.
pub const EMBEDDING_BATCH_SIZE: usize = 50;

/// Most recent unclustered articles processed per clustering run.
pub const CLUSTER_BATCH_LIMIT: usize = 200;

/// Recently active clusters considered as match candidates per run.
pub const CLUSTER_CANDIDATE_LIMIT: usize = 100;

/// Member embeddings averaged into a cluster centroid.
pub const CENTROID_MEMBER_LIMIT: usize = 20;

/// Centroid cache TTL. Invalidated early when an embedded member joins.
pub const CENTROID_CACHE_TTL_SECS: u64 = 300;

// ── Trending ─────────────────────────────────────────────────────

pub const TRENDING_W_SOURCES: f64 = 3.0;
pub const TRENDING_W_RECENCY: f64 = 2.0;
pub const TRENDING_W_VELOCITY: f64 = 1.5;

/// Clusters updated within this window get rescored.
pub const TRENDING_WINDOW_HOURS: i64 = 48;

/// Articles fetched within this window count toward velocity.
pub const TRENDING_VELOCITY_WINDOW_MINS: i64 = 30;

pub const TRENDING_CLUSTER_LIMIT: usize = 500;

// ── Search ───────────────────────────────────────────────────────

pub const SUGGEST_CACHE_TTL_SECS: u64 = 120;
pub const SEARCH_CACHE_TTL_SECS: u64 = 180;
pub const MAX_SUGGESTIONS: usize = 8;
pub const MAX_SEARCH_RESULTS: usize = 30;

/// Candidate pools ranked for the suggestion list. Wider than the list
/// itself so an older exact match can outrank newer loose matches.
pub const SUGGEST_CLUSTER_CANDIDATES: usize = 20;
pub const SUGGEST_ARTICLE_CANDIDATES: usize = 50;

/// Candidates fetched for re-ranking before diversity capping.
pub const SEARCH_CANDIDATE_LIMIT: usize = 200;

/// Max results from one source name in a result list.
pub const SEARCH_SOURCE_CAP: usize = 3;

// ── Catalog ──────────────────────────────────────────────────────

/// ISO country codes covered by ingestion, rotated a few per cycle.
pub const COUNTRY_CODES: &[&str] = &[
    // South Asia
    "NP", "IN", "PK", "BD", "LK",
    // East Asia
    "CN", "JP", "KR", "TW", "HK",
    // Southeast Asia
    "SG", "TH", "MY", "ID", "PH", "VN",
    // Middle East
    "AE", "SA", "IL", "TR", "QA",
    // North America
    "US", "CA", "MX",
    // South America
    "BR", "AR", "CO", "CL",
    // Europe
    "GB", "DE", "FR", "IT", "ES", "NL", "SE", "NO", "PL", "CH", "IE", "PT", "BE",
    // Oceania
    "AU", "NZ",
    // Africa
    "ZA", "NG", "KE", "EG", "GH",
];

/// Category slugs. A cluster's category is fixed at creation and partitions
/// all similarity matching.
pub const CATEGORIES: &[&str] = &[
    // Core news
    "general", "world", "politics", "economy", "business", "finance",
    // Tech & science
    "technology", "science", "space", "cybersecurity", "startups", "crypto",
    "gaming", "ai",
    // Society
    "health", "education", "environment", "crime", "legal", "religion",
    // Lifestyle
    "sports", "entertainment", "lifestyle", "food", "travel", "fashion",
    "art", "automotive",
    // Industry
    "energy", "real-estate", "defense", "agriculture", "aviation",
    // Media
    "media", "opinion", "weather",
];
