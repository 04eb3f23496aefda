//! Query result cache for `select`.
//!
//! Results are keyed by table name plus the normalized filter and are
//! shared out as `Arc`s, so a hit hands back the very same result object
//! that the first computation produced.
//!
//! There is no eviction and no per-table tracking. Filters are equality
//! predicates over rows that any write may change, so the only safe
//! response to a write is to drop everything: callers must invoke
//! [`QueryCache::invalidate`] after every insert, update, delete, and
//! drop-table.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use primdb_common::types::{Filter, Value};

use crate::stats::CacheStats;

/// Cache key for query results.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CacheKey {
    /// Table name.
    table: String,
    /// Predicates sorted by column, `None` when the query had no filter.
    filter: Option<Vec<(String, Value)>>,
}

impl CacheKey {
    /// Creates a key for a select on `table` with an optional filter.
    pub fn new(table: impl Into<String>, filter: Option<&Filter>) -> Self {
        Self {
            table: table.into(),
            filter: filter.map(|f| {
                f.iter()
                    .map(|(column, value)| (column.to_string(), value.clone()))
                    .collect()
            }),
        }
    }

    /// Returns the table name.
    pub fn table(&self) -> &str {
        &self.table
    }
}

/// A memoizing cache of query results.
///
/// # Example
///
/// ```rust
/// use primdb_cache::{CacheKey, QueryCache};
/// use primdb_common::types::Filter;
///
/// let cache: QueryCache<Vec<i64>> = QueryCache::new();
/// let filter = Filter::equals("name", "Ann");
///
/// let first = cache.get_or_compute(CacheKey::new("users", Some(&filter)), || vec![1]);
/// let again = cache.get_or_compute(CacheKey::new("users", Some(&filter)), || vec![2]);
/// assert_eq!(*again, vec![1]);
///
/// // A write happened.
/// cache.invalidate();
/// assert!(cache.is_empty());
/// ```
pub struct QueryCache<R> {
    /// Cached results.
    entries: RwLock<HashMap<CacheKey, Arc<R>>>,
    /// Access statistics.
    stats: CacheStats,
}

impl<R> QueryCache<R> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            stats: CacheStats::new(),
        }
    }

    /// Returns the cached result for `key`, computing and storing it first
    /// if it is not cached yet.
    ///
    /// `compute` runs at most once per key between invalidations.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Arc<R>
    where
        F: FnOnce() -> R,
    {
        match self.try_get_or_compute(key, || Ok::<R, std::convert::Infallible>(compute())) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    /// Like [`get_or_compute`](Self::get_or_compute), but for fallible
    /// computations. Failures are returned and nothing is cached.
    pub fn try_get_or_compute<F, E>(&self, key: CacheKey, compute: F) -> Result<Arc<R>, E>
    where
        F: FnOnce() -> Result<R, E>,
    {
        self.stats.record_access();

        if let Some(result) = self.entries.read().get(&key) {
            self.stats.record_hit();
            trace!(table = key.table(), "query cache hit");
            return Ok(Arc::clone(result));
        }

        self.stats.record_miss();
        trace!(table = key.table(), "query cache miss");

        // The lock is not held while computing.
        let result = Arc::new(compute()?);
        self.stats.record_insert();
        let mut entries = self.entries.write();
        Ok(Arc::clone(entries.entry(key).or_insert(result)))
    }

    /// Returns a cached result without computing.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<R>> {
        self.entries.read().get(key).cloned()
    }

    /// Discards every cached result.
    pub fn invalidate(&self) {
        let mut entries = self.entries.write();
        if !entries.is_empty() {
            trace!(entries = entries.len(), "query cache invalidated");
        }
        entries.clear();
        self.stats.record_invalidation();
    }

    /// Returns the number of cached results.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }
}

impl<R> Default for QueryCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_compute_runs_once_per_key() {
        let cache: QueryCache<Vec<i32>> = QueryCache::new();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            vec![1, 2, 3]
        };

        let first = cache.get_or_compute(CacheKey::new("users", None), compute);
        let second = cache.get_or_compute(CacheKey::new("users", None), || {
            calls.set(calls.get() + 1);
            vec![9]
        });

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*second, vec![1, 2, 3]);

        let stats = cache.stats();
        assert_eq!(stats.hits(), 1);
        assert_eq!(stats.misses(), 1);
    }

    #[test]
    fn test_key_distinguishes_table_and_filter() {
        let by_name = Filter::equals("name", "Ann");
        let by_id = Filter::equals("ID", 1);

        assert_eq!(
            CacheKey::new("users", Some(&by_name)),
            CacheKey::new("users", Some(&Filter::equals("name", "Ann")))
        );
        assert_ne!(
            CacheKey::new("users", Some(&by_name)),
            CacheKey::new("users", Some(&by_id))
        );
        assert_ne!(
            CacheKey::new("users", Some(&by_name)),
            CacheKey::new("orders", Some(&by_name))
        );
        assert_ne!(CacheKey::new("users", None), CacheKey::new("users", Some(&by_id)));
        // Integer 1 and boolean true are different filter values.
        assert_ne!(
            CacheKey::new("t", Some(&Filter::equals("flag", 1))),
            CacheKey::new("t", Some(&Filter::equals("flag", true)))
        );
    }

    #[test]
    fn test_key_is_order_insensitive() {
        let a = Filter::equals("a", 1).and("b", "x");
        let b = Filter::equals("b", "x").and("a", 1);
        assert_eq!(CacheKey::new("t", Some(&a)), CacheKey::new("t", Some(&b)));
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let cache: QueryCache<String> = QueryCache::new();
        let key = || CacheKey::new("users", Some(&Filter::equals("ID", 1)));

        cache.get_or_compute(key(), || "stale".to_string());
        cache.invalidate();
        assert!(cache.is_empty());

        let fresh = cache.get_or_compute(key(), || "fresh".to_string());
        assert_eq!(*fresh, "fresh");
        assert_eq!(cache.stats().invalidations(), 1);
    }

    #[test]
    fn test_invalidate_drops_every_table() {
        let cache: QueryCache<u32> = QueryCache::new();
        cache.get_or_compute(CacheKey::new("users", None), || 1);
        cache.get_or_compute(CacheKey::new("orders", None), || 2);
        assert_eq!(cache.len(), 2);

        cache.invalidate();
        assert!(cache.get(&CacheKey::new("users", None)).is_none());
        assert!(cache.get(&CacheKey::new("orders", None)).is_none());
    }

    #[test]
    fn test_failed_compute_is_not_cached() {
        let cache: QueryCache<u32> = QueryCache::new();
        let key = || CacheKey::new("users", None);

        let err = cache.try_get_or_compute(key(), || Err::<u32, _>("disk on fire"));
        assert_eq!(err.unwrap_err(), "disk on fire");
        assert!(cache.is_empty());

        let ok = cache.try_get_or_compute(key(), || Ok::<_, &str>(7)).unwrap();
        assert_eq!(*ok, 7);
    }
}
