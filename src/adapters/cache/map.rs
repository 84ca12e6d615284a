//! Blocking keyed collection of lazy cells.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use super::entries::{Entries, Load, Lookup};
use super::options::GetOptions;
use super::policy::ErrorPolicy;
use super::stats::CacheStats;
use super::value::Value;
use crate::domain::errors::LazyError;

/// A map from key to an independent [`Value`] cell.
///
/// Entry creation, replacement and removal go through one structural lock;
/// each cell's fetch runs outside it, so a slow fetch for one key never
/// blocks callers of another key.
pub struct Map<K, T, E> {
    entries: Entries<K, Value<T, E>>,
}

impl<K: Eq + Hash, T, E> Map<K, T, E> {
    pub fn new() -> Self {
        Self::with_policy(ErrorPolicy::CacheErrors)
    }

    /// Create a map whose cells use `policy` for failed fetches.
    pub fn with_policy(policy: ErrorPolicy) -> Self {
        Self {
            entries: Entries::new(policy, "blocking"),
        }
    }

    pub const fn policy(&self) -> ErrorPolicy {
        self.entries.policy()
    }

    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }

    /// Number of keys with a cell, loaded or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the cell for `key`. Returns whether one existed.
    pub fn clear(&self, key: &K) -> bool {
        self.entries.clear(key)
    }

    /// Remove every cell. Returns how many were removed.
    pub fn clear_all(&self) -> usize {
        self.entries.clear_all()
    }
}

impl<K, T, E> Map<K, T, E>
where
    K: Eq + Hash + Clone + Debug,
    T: Clone + Default,
    E: Clone + Display,
{
    /// Look up `key`, running `fetch` on a miss, as modified by `opts`.
    pub fn get<F>(&self, key: K, fetch: F, opts: GetOptions<K, T>) -> Result<T, LazyError<E>>
    where
        F: FnOnce(K) -> Result<T, E>,
    {
        self.resolve(key, Some(fetch), opts)
    }

    /// Same as [`get`](Self::get) without a fetch closure: a miss that would
    /// fetch yields `T::default()`.
    pub fn get_cached(&self, key: K, opts: GetOptions<K, T>) -> Result<T, LazyError<E>> {
        self.resolve(key, None::<fn(K) -> Result<T, E>>, opts)
    }

    /// Prime `key` with `value` unless it is already loaded.
    pub fn set(&self, key: K, value: T) -> bool {
        self.entries.set(key, value)
    }

    /// The cached result for `key` without fetching.
    pub fn peek(&self, key: &K) -> Option<Result<T, E>> {
        self.entries.peek(key)
    }

    pub fn is_loaded(&self, key: &K) -> bool {
        self.entries.is_loaded(key)
    }

    fn resolve<F>(&self, key: K, fetch: Option<F>, opts: GetOptions<K, T>) -> Result<T, LazyError<E>>
    where
        F: FnOnce(K) -> Result<T, E>,
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
        let result = cell.load(|| {
            stats.fetch();
            let result = fetch(key.clone());
            if result.is_err() {
                stats.failure();
            }
            result
        });
        self.entries.settle(key, &cell, result, settle)
    }
}

impl<K: Eq + Hash, T, E> Default for Map<K, T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T, E> Debug for Map<K, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("policy", &self.entries.policy())
            .field("stats", &self.entries.stats())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    type IntMap = Map<i32, i32, String>;

    fn doubled(id: i32) -> Result<i32, String> {
        Ok(id * 2)
    }

    fn failing(_: i32) -> Result<i32, String> {
        Err("bad".to_string())
    }

    #[test]
    fn test_fetch_caching() {
        let map = IntMap::new();
        let calls = Cell::new(0);
        let fetch = |id: i32| {
            calls.set(calls.get() + 1);
            doubled(id)
        };

        assert_eq!(map.get(1, fetch, GetOptions::new()), Ok(2));
        assert_eq!(map.get(1, fetch, GetOptions::new()), Ok(2));
        assert_eq!(calls.get(), 1);
        assert_eq!(map.stats().hits, 1);
        assert_eq!(map.stats().fetches, 1);
    }

    #[test]
    fn test_second_fetch_is_never_invoked() {
        let map = IntMap::new();
        assert_eq!(map.get(1, |_| Ok(10), GetOptions::new()), Ok(10));
        assert_eq!(map.get(1, |_| panic!("fetch b must not run"), GetOptions::new()), Ok(10));
    }

    #[test]
    fn test_sticky_failure_then_refresh() {
        let map = IntMap::new();

        assert_eq!(map.get(7, failing, GetOptions::new()), Err(LazyError::Fetch("bad".into())));
        assert_eq!(map.get(7, doubled, GetOptions::new()), Err(LazyError::Fetch("bad".into())));

        assert_eq!(map.get(7, doubled, GetOptions::new().refresh()), Ok(14));
        assert_eq!(map.get(7, failing, GetOptions::new()), Ok(14));
        assert_eq!(map.stats().evictions, 1);
    }

    #[test]
    fn test_retry_policy_refetches() {
        let map: IntMap = Map::with_policy(ErrorPolicy::RetryOnNextCall);

        assert!(map.get(7, failing, GetOptions::new()).is_err());
        assert!(!map.is_loaded(&7));
        assert_eq!(map.get(7, doubled, GetOptions::new()), Ok(14));
    }

    #[test]
    fn test_clear_then_refetch() {
        let map = IntMap::new();
        assert_eq!(map.get(1, |_| Ok(1), GetOptions::new()), Ok(1));

        assert_eq!(map.get(1, |_| panic!("clear must not fetch"), GetOptions::new().clear()), Ok(0));
        assert!(map.peek(&1).is_none());
        assert_eq!(map.len(), 0);

        assert_eq!(map.get(1, |_| Ok(2), GetOptions::new()), Ok(2));
    }

    #[test]
    fn test_clear_short_circuits_set_value() {
        let map = IntMap::new();
        assert_eq!(map.get_cached(1, GetOptions::new().clear().set_value(5)), Ok(0));
        assert!(map.is_empty());
    }

    #[test]
    fn test_set_value_bypasses_fetch() {
        let map: Map<i32, String, String> = Map::new();
        assert_eq!(map.get_cached(5, GetOptions::new().set_value("X".to_string())), Ok("X".to_string()));
        assert_eq!(
            map.get(5, |_| panic!("primed key must not fetch"), GetOptions::new()),
            Ok("X".to_string())
        );
        assert_eq!(map.peek(&5), Some(Ok("X".to_string())));
        assert_eq!(map.stats().primes, 1);
    }

    #[test]
    fn test_dont_fetch_must_be_cached() {
        let map: Map<i32, String, String> = Map::new();
        let probe = || GetOptions::new().dont_fetch().must_be_cached();

        assert_eq!(
            map.get(9, |_| panic!("probe must not fetch"), probe()),
            Err(LazyError::NotCached)
        );
        assert!(map.set(9, "Y".to_string()));
        assert_eq!(map.get(9, |_| panic!("probe must not fetch"), probe()), Ok("Y".to_string()));
    }

    #[test]
    fn test_dont_fetch_default_value_primes() {
        let map = IntMap::new();
        assert_eq!(map.get_cached(5, GetOptions::new().dont_fetch().default_value(42)), Ok(42));
        assert_eq!(map.peek(&5), Some(Ok(42)));
    }

    #[test]
    fn test_dont_fetch_returns_zero_when_unloaded() {
        let map = IntMap::new();
        assert_eq!(map.get(3, doubled, GetOptions::new().dont_fetch()), Ok(0));
        assert!(!map.is_loaded(&3));
    }

    #[test]
    fn test_must_wraps_error() {
        let map = IntMap::new();
        let err = map.get(1, failing, GetOptions::new().must()).unwrap_err();
        assert_eq!(err.to_string(), "fetch error: bad");
        assert!(err.is_wrapped());
    }

    #[test]
    fn test_must_wins_over_default_value() {
        let map = IntMap::new();
        let err = map
            .get(1, failing, GetOptions::new().must().default_value(5))
            .unwrap_err();
        assert_eq!(err, LazyError::WrappedFetch("bad".to_string()));
    }

    #[test]
    fn test_default_value_on_failure_is_sticky() {
        let map: Map<i32, String, String> = Map::new();
        let fails = |_: i32| -> Result<String, String> { Err("bad".to_string()) };

        assert_eq!(map.get(3, fails, GetOptions::new().default_value("D".to_string())), Ok("D".to_string()));
        assert_eq!(map.peek(&3), Some(Ok("D".to_string())));
        assert_eq!(map.get(3, fails, GetOptions::new()), Ok("D".to_string()));
    }

    #[test]
    fn test_default_value_replaces_cached_failure() {
        let map = IntMap::new();
        assert!(map.get(3, failing, GetOptions::new()).is_err());

        assert_eq!(map.get(3, failing, GetOptions::new().default_value(9)), Ok(9));
        assert_eq!(map.peek(&3), Some(Ok(9)));
    }

    #[test]
    fn test_set_id_rebinds_key() {
        let map = IntMap::new();
        let calls = Cell::new(0);
        let fetch = |id: i32| -> Result<i32, String> {
            calls.set(calls.get() + 1);
            Ok(id)
        };

        assert_eq!(map.get(1, fetch, GetOptions::new().set_id(2)), Ok(2));
        assert!(map.is_loaded(&2));
        assert!(!map.is_loaded(&1));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_missing_fetch_returns_default() {
        let map = IntMap::new();
        assert_eq!(map.get_cached(4, GetOptions::new()), Ok(0));
        assert!(!map.is_loaded(&4));
    }

    #[test]
    fn test_clear_all_counts_evictions() {
        let map = IntMap::new();
        for id in 0..5 {
            let _ = map.get(id, doubled, GetOptions::new());
        }
        assert_eq!(map.clear_all(), 5);
        assert_eq!(map.stats().evictions, 5);
        assert!(map.is_empty());
    }
}
