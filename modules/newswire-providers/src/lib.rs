pub mod base;
pub mod breaker;
pub mod gdelt;
pub mod guardian;
pub mod newsapi;
pub mod router;

pub use base::NewsProvider;
pub use breaker::{BreakerStatus, CircuitBreaker, ProviderStatus};
pub use gdelt::GdeltProvider;
pub use guardian::GuardianProvider;
pub use newsapi::NewsApiProvider;
pub use router::{FetchRequest, ProviderRouter};
