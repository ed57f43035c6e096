#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Session-scoped request cache.
//!
//! Every upstream fetch (boundary meshes, locality lists, alert series) is
//! memoized under a [`CacheKey`] built from the operation name and its
//! parameters. Entries are write-once and live as long as the cache: a
//! resolved key is never fetched again, and failed fetches are never
//! stored so the next call retries.
//!
//! [`RequestCache::clear`] is the one way to drop entries; the map uses it
//! to refetch municipality alerts after a disease switch.
//!
//! There is no in-flight de-duplication here. Two callers that miss on
//! the same key before either resolves will both run their producer; the
//! first result to land is kept and returned to both.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Composite cache key: an operation name plus its parameters.
///
/// Keys compare component-wise, so two keys are equal exactly when the
/// operation and every parameter are equal. The `|`-joined form is only
/// used for display.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    components: Vec<String>,
}

impl CacheKey {
    /// Builds a key from an operation name and its parameters.
    pub fn new<I, P>(operation: &str, params: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: ToString,
    {
        let mut components = vec![operation.to_string()];
        components.extend(params.into_iter().map(|p| p.to_string()));
        Self { components }
    }

    /// The operation component.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.components[0]
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.components.join("|"))
    }
}

/// Write-once memoization table for one result type.
///
/// Results are handed out as [`Arc`]s, so repeated hits return the very
/// same allocation.
#[derive(Debug)]
pub struct RequestCache<T> {
    entries: Mutex<BTreeMap<CacheKey, Arc<T>>>,
}

impl<T> Default for RequestCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestCache<T> {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    /// Returns the resolved entry for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<Arc<T>> {
        self.lock().get(key).cloned()
    }

    /// Returns the cached entry for `key`, or runs `producer` and stores
    /// its result.
    ///
    /// On a hit the producer is not invoked. On a miss the lock is
    /// released while the producer runs; if another caller stored a
    /// value for the same key in the meantime, that earlier value wins
    /// and is returned.
    ///
    /// # Errors
    ///
    /// Propagates the producer's error. Errors are not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: CacheKey, producer: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get(&key) {
            log::debug!("cache hit: {key}");
            return Ok(hit);
        }

        log::debug!("cache miss: {key}");
        let value = producer().await?;
        Ok(self.insert(key, value))
    }

    /// Stores `value` under `key` unless an entry is already there, and
    /// returns whichever entry ends up stored.
    #[must_use]
    pub fn insert(&self, key: CacheKey, value: T) -> Arc<T> {
        let mut entries = self.lock();
        Arc::clone(entries.entry(key).or_insert_with(|| Arc::new(value)))
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of resolved entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The lock is never held across an `.await`, and a poisoned map is
    /// still a consistent map.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<CacheKey, Arc<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
