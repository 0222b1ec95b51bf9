//! Bounded query-result cache with least-recently-used eviction.
//!
//! Every operation runs under one [`parking_lot::Mutex`], so the eviction choice in
//! [`ResultCache::store`] always sees a consistent snapshot of the access counters.
//! Results are cloned on the way in and on the way out; callers never share
//! state with the cache.

use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

use super::types::{CacheEntryDetail, CacheEntrySummary, CacheKey};
use crate::extraction::{NoAnswerStrategy, QueryResult};

#[derive(Debug)]
struct StoredResult {
    id: String,
    result: QueryResult,
    verbose: bool,
    access_counter: u64,
}

impl StoredResult {
    fn summary(&self, key: &CacheKey) -> CacheEntrySummary {
        CacheEntrySummary {
            id: self.id.clone(),
            key: key.to_string(),
            fingerprint: key.fingerprint(),
            priority: self.access_counter,
            is_verbose: self.verbose,
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    access_counter: u64,
    entries: HashMap<CacheKey, StoredResult>,
    ids: HashMap<String, CacheKey>,
}

impl CacheState {
    fn next_counter(&mut self) -> u64 {
        self.access_counter += 1;
        self.access_counter
    }

    fn satisfies(&self, key: &CacheKey, verbose: bool) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.verbose || !verbose)
    }

    fn load(&mut self, key: &CacheKey) -> Option<QueryResult> {
        if !self.entries.contains_key(key) {
            return None;
        }
        let counter = self.next_counter();
        let entry = self.entries.get_mut(key)?;
        entry.access_counter = counter;
        Some(entry.result.clone())
    }

    fn remove(&mut self, key: &CacheKey) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.ids.remove(&entry.id);
                true
            }
            None => false,
        }
    }

    fn least_recently_used(&self) -> Option<CacheKey> {
        self.entries
            .iter()
            .min_by_key(|(_, entry)| entry.access_counter)
            .map(|(key, _)| key.clone())
    }
}

/// Process-wide store of query results keyed by [`CacheKey`].
#[derive(Debug)]
pub struct ResultCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl ResultCache {
    /// Creates a cache holding at most `capacity` results.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            state: Mutex::new(CacheState::default()),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of cached results.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Returns `true` if an entry exists for the key and can serve the request.
    ///
    /// A non-verbose entry never satisfies a verbose request.
    pub fn has(&self, schema: &str, query: &str, strategy: NoAnswerStrategy, verbose: bool) -> bool {
        let key = CacheKey::new(schema, query, strategy);
        self.state.lock().satisfies(&key, verbose)
    }

    /// Returns a copy of the stored result and marks it most recently used.
    pub fn load(&self, schema: &str, query: &str, strategy: NoAnswerStrategy) -> Option<QueryResult> {
        let key = CacheKey::new(schema, query, strategy);
        let result = self.state.lock().load(&key);
        debug!(key = %key, hit = result.is_some(), "Cache load");
        result
    }

    /// [`has`](Self::has) followed by [`load`](Self::load) under a single lock.
    pub fn lookup(
        &self,
        schema: &str,
        query: &str,
        strategy: NoAnswerStrategy,
        verbose: bool,
    ) -> Option<QueryResult> {
        let key = CacheKey::new(schema, query, strategy);
        let mut state = self.state.lock();
        if !state.satisfies(&key, verbose) {
            return None;
        }
        state.load(&key)
    }

    /// Stores a copy of `result` and returns the entry's id.
    ///
    /// Inserting a new key into a full cache first evicts the entry with the
    /// smallest access counter. Replacing an existing key keeps its id.
    pub fn store(
        &self,
        schema: &str,
        query: &str,
        strategy: NoAnswerStrategy,
        result: &QueryResult,
        verbose: bool,
    ) -> Option<String> {
        if self.capacity == 0 {
            return None;
        }

        let key = CacheKey::new(schema, query, strategy);
        let mut state = self.state.lock();

        if !state.entries.contains_key(&key)
            && state.entries.len() >= self.capacity
            && let Some(victim) = state.least_recently_used()
        {
            debug!(key = %victim, "Evicting least recently used entry");
            state.remove(&victim);
        }

        let counter = state.next_counter();
        let id = state
            .entries
            .get(&key)
            .map(|entry| entry.id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        state.ids.insert(id.clone(), key.clone());
        state.entries.insert(
            key,
            StoredResult {
                id: id.clone(),
                result: result.clone(),
                verbose,
                access_counter: counter,
            },
        );

        debug!(id = %id, verbose, size = state.entries.len(), "Cache store");
        Some(id)
    }

    /// Removes the entry for a (schema, query, strategy) triple.
    pub fn evict_by_composite_key(
        &self,
        schema: &str,
        query: &str,
        strategy: NoAnswerStrategy,
    ) -> bool {
        self.evict_by_cache_key(&CacheKey::new(schema, query, strategy))
    }

    /// Removes the entry stored under `key`.
    pub fn evict_by_cache_key(&self, key: &CacheKey) -> bool {
        let removed = self.state.lock().remove(key);
        debug!(key = %key, removed, "Cache evict");
        removed
    }

    /// Removes the entry with external identifier `id`.
    pub fn evict_by_id(&self, id: &str) -> bool {
        let mut state = self.state.lock();
        match state.ids.get(id).cloned() {
            Some(key) => state.remove(&key),
            None => false,
        }
    }

    /// Removes every entry and resets the access counter.
    pub fn evict_all(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.ids.clear();
        state.access_counter = 0;
        debug!("Cache cleared");
    }

    /// Lists all entries, most recently used first.
    pub fn list_entries(&self) -> Vec<CacheEntrySummary> {
        let state = self.state.lock();
        let mut entries: Vec<CacheEntrySummary> = state
            .entries
            .iter()
            .map(|(key, entry)| entry.summary(key))
            .collect();
        entries.sort_by(|a, b| b.priority.cmp(&a.priority));
        entries
    }

    /// Returns an entry (with a copy of its result) by external identifier.
    ///
    /// Inspection does not count as a use and leaves recency untouched.
    pub fn get_entry_by_id(&self, id: &str) -> Option<CacheEntryDetail> {
        let state = self.state.lock();
        let key = state.ids.get(id)?;
        let entry = state.entries.get(key)?;
        Some(CacheEntryDetail {
            summary: entry.summary(key),
            data: entry.result.clone(),
        })
    }
}
