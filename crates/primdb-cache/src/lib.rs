//! Query result caching for primdb.
//!
//! `select` results are memoized per `(table, filter)` and thrown away
//! wholesale on any write. See [`result_cache`] for the invalidation model.
//!
//! # Example
//!
//! ```rust
//! use primdb_cache::{CacheKey, QueryCache};
//!
//! let cache: QueryCache<Vec<&str>> = QueryCache::new();
//! let rows = cache.get_or_compute(CacheKey::new("users", None), || vec!["Ann"]);
//! assert_eq!(rows.len(), 1);
//! assert_eq!(cache.stats().misses(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod result_cache;
pub mod stats;

pub use result_cache::{CacheKey, QueryCache};
pub use stats::CacheStats;
