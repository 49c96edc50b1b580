pub mod config;
pub mod constants;
pub mod error;
pub mod similarity;
pub mod types;

pub use config::Config;
pub use error::NewswireError;
pub use similarity::{
    article_fingerprint, centroid, cosine_similarity, normalize_title, title_similarity,
};
pub use types::*;

pub type Result<T> = std::result::Result<T, NewswireError>;
