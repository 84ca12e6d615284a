//! Async keyed collection of lazy cells.
//!
//! Mirrors [`Map`](super::Map) for store fetches that await. The option
//! semantics, statistics and logging are shared; only the fetch closure
//! returns a future.

use std::fmt::{Debug, Display};
use std::future::{Future, Ready};
use std::hash::Hash;

use super::async_value::AsyncValue;
use super::entries::{Entries, Load, Lookup};
use super::options::GetOptions;
use super::policy::ErrorPolicy;
use super::stats::CacheStats;
use crate::domain::errors::LazyError;

/// A map from key to an independent [`AsyncValue`] cell.
pub struct AsyncMap<K, T, E> {
    entries: Entries<K, AsyncValue<T, E>>,
}

impl<K: Eq + Hash, T, E> AsyncMap<K, T, E> {
    pub fn new() -> Self {
        Self::with_policy(ErrorPolicy::CacheErrors)
    }

    pub fn with_policy(policy: ErrorPolicy) -> Self {
        Self {
            entries: Entries::new(policy, "async"),
        }
    }

    pub const fn policy(&self) -> ErrorPolicy {
        self.entries.policy()
    }

    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the cell for `key`. An in-flight fetch on the removed cell
    /// still completes for its own awaiters but is no longer reachable.
    pub fn clear(&self, key: &K) -> bool {
        self.entries.clear(key)
    }

    pub fn clear_all(&self) -> usize {
        self.entries.clear_all()
    }
}

impl<K, T, E> AsyncMap<K, T, E>
where
    K: Eq + Hash + Clone + Debug,
    T: Clone + Default,
    E: Clone + Display,
{
    /// Look up `key`, awaiting `fetch` on a miss, as modified by `opts`.
    pub async fn get<F, Fut>(
        &self,
        key: K,
        fetch: F,
        opts: GetOptions<K, T>,
    ) -> Result<T, LazyError<E>>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.resolve(key, Some(fetch), opts).await
    }

    /// Lookup without a fetch closure. A miss that would fetch yields
    /// `T::default()`.
    pub async fn get_cached(&self, key: K, opts: GetOptions<K, T>) -> Result<T, LazyError<E>> {
        self.resolve(key, None::<fn(K) -> Ready<Result<T, E>>>, opts)
            .await
    }

    /// Prime `key` with `value` unless it is loaded or loading.
    pub fn set(&self, key: K, value: T) -> bool {
        self.entries.set(key, value)
    }

    pub fn peek(&self, key: &K) -> Option<Result<T, E>> {
        self.entries.peek(key)
    }

    pub fn is_loaded(&self, key: &K) -> bool {
        self.entries.is_loaded(key)
    }

    async fn resolve<F, Fut>(
        &self,
        key: K,
        fetch: Option<F>,
        opts: GetOptions<K, T>,
    ) -> Result<T, LazyError<E>>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Load {
            key,
            cell,
            fetch,
            settle,
        } = match self.entries.begin(key, fetch, opts) {
            Lookup::Done(result) => return result,
            Lookup::Load(load) => load,
        };

        let stats = self.entries.recorder();
        let result = cell
            .load(|| {
                stats.fetch();
                let pending = fetch(key.clone());
                async move {
                    let result = pending.await;
                    if result.is_err() {
                        stats.failure();
                    }
                    result
                }
            })
            .await;
        self.entries.settle(key, &cell, result, settle)
    }
}

impl<K: Eq + Hash, T, E> Default for AsyncMap<K, T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T, E> Debug for AsyncMap<K, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncMap")
            .field("policy", &self.entries.policy())
            .field("stats", &self.entries.stats())
            .finish_non_exhaustive()
    }
}
