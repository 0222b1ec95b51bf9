use serde::Serialize;

use crate::extraction::{NoAnswerStrategy, QueryResult};
use crate::hashing::fingerprint_hex;

/// Identity of a cached result: normalized schema value, query value and strategy.
///
/// Equal inputs always produce equal keys; the order of the parts matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    schema: String,
    query: String,
    strategy: NoAnswerStrategy,
}

impl CacheKey {
    pub fn new(schema: &str, query: &str, strategy: NoAnswerStrategy) -> Self {
        Self {
            schema: schema.to_string(),
            query: query.to_string(),
            strategy,
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn strategy(&self) -> NoAnswerStrategy {
        self.strategy
    }

    /// BLAKE3 fingerprint of the three parts, hex encoded.
    pub fn fingerprint(&self) -> String {
        fingerprint_hex(&self.schema, &self.query, self.strategy.as_str())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{'schema':'{}', 'query':'{}', 'strategy':'{}'}}",
            self.schema, self.query, self.strategy
        )
    }
}

/// Listing view of one cache entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntrySummary {
    /// Stable external identifier, independent of the key.
    pub id: String,
    /// Rendered [`CacheKey`].
    pub key: String,
    /// [`CacheKey::fingerprint`], for clients that match entries by hash.
    pub fingerprint: String,
    /// Access counter; the smallest value is evicted first.
    pub priority: u64,
    pub is_verbose: bool,
}

/// Full view of one cache entry, including a copy of the stored result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntryDetail {
    #[serde(flatten)]
    pub summary: CacheEntrySummary,
    pub data: QueryResult,
}
