pub mod clustering;
pub mod embedder;
pub mod search;
pub mod trending;

pub use clustering::ClusterEngine;
pub use embedder::{NoopEmbedder, OpenAiEmbedder, TextEmbedder};
pub use search::{SearchPage, SearchRanker, SearchResult, Suggestion, SuggestionKind};
pub use trending::{trending_score, TrendingScorer};
