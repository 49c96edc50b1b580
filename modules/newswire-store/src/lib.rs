pub mod cache;
pub mod memory;
pub mod store;

pub use cache::{cache_get, cache_set, Cache, MemoryCache, NoopCache};
pub use memory::MemoryStore;
pub use store::NewsStore;
