//! Query-result cache.
//!
//! One [`ResultCache`] is created at startup and shared (via `Arc`) by the
//! pipeline and the HTTP inspection endpoints.

pub mod lru;
pub mod types;


pub use lru::ResultCache;
pub use types::{CacheEntryDetail, CacheEntrySummary, CacheKey};
