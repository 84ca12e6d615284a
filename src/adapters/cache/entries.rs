//! Per-key bookkeeping and option handling shared by [`Map`](super::Map)
//! and [`AsyncMap`](super::AsyncMap).
//!
//! The two maps differ only in how a cell runs its fetch. Everything else,
//! from `clear` through `set_value`, cache hits, `dont_fetch` and settling a
//! failed fetch, lives here so both follow one set of rules.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::async_value::AsyncValue;
use super::index::Index;
use super::options::GetOptions;
use super::policy::ErrorPolicy;
use super::stats::{CacheStats, StatsRecorder};
use super::value::Value;
use crate::domain::errors::LazyError;

/// The cell operations a map needs apart from loading.
pub(crate) trait LazySlot {
    type Output;
    type Error;

    fn with_policy(policy: ErrorPolicy) -> Self;
    fn primed(value: Self::Output, policy: ErrorPolicy) -> Self;
    fn set(&self, value: Self::Output) -> bool;
    fn peek(&self) -> Option<&Result<Self::Output, Self::Error>>;
}

impl<T, E> LazySlot for Value<T, E> {
    type Output = T;
    type Error = E;

    fn with_policy(policy: ErrorPolicy) -> Self {
        Value::with_policy(policy)
    }

    fn primed(value: T, policy: ErrorPolicy) -> Self {
        Value::primed(value, policy)
    }

    fn set(&self, value: T) -> bool {
        Value::set(self, value)
    }

    fn peek(&self) -> Option<&Result<T, E>> {
        Value::peek(self)
    }
}

impl<T, E> LazySlot for AsyncValue<T, E> {
    type Output = T;
    type Error = E;

    fn with_policy(policy: ErrorPolicy) -> Self {
        AsyncValue::with_policy(policy)
    }

    fn primed(value: T, policy: ErrorPolicy) -> Self {
        AsyncValue::primed(value, policy)
    }

    fn set(&self, value: T) -> bool {
        AsyncValue::set(self, value)
    }

    fn peek(&self) -> Option<&Result<T, E>> {
        AsyncValue::peek(self)
    }
}

type Outcome<C> = Result<<C as LazySlot>::Output, LazyError<<C as LazySlot>::Error>>;

/// How a lookup continues once its options have been applied.
pub(crate) enum Lookup<K, C: LazySlot, F> {
    /// Answered without fetching.
    Done(Outcome<C>),
    /// The cell is empty and `fetch` has to run.
    Load(Load<K, C, F>),
}

pub(crate) struct Load<K, C: LazySlot, F> {
    pub(crate) key: K,
    pub(crate) cell: Arc<C>,
    pub(crate) fetch: F,
    pub(crate) settle: Settle<C::Output>,
}

/// The options that still matter after a fetch returns.
pub(crate) struct Settle<T> {
    must: bool,
    default_value: Option<T>,
}

pub(crate) struct Entries<K, C> {
    index: Index<K, C>,
    policy: ErrorPolicy,
    stats: StatsRecorder,
    kind: &'static str,
}

impl<K, C> Entries<K, C> {
    pub(crate) const fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    pub(crate) fn recorder(&self) -> &StatsRecorder {
        &self.stats
    }
}

impl<K: Eq + Hash, C> Entries<K, C> {
    /// `kind` tags this map's log lines.
    pub(crate) fn new(policy: ErrorPolicy, kind: &'static str) -> Self {
        Self {
            index: Index::new(),
            policy,
            stats: StatsRecorder::default(),
            kind,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn clear(&self, key: &K) -> bool {
        let removed = self.index.remove(key).is_some();
        if removed {
            self.stats.eviction();
        }
        removed
    }

    pub(crate) fn clear_all(&self) -> usize {
        let removed = self.index.clear();
        self.stats.evict_many(removed as u64);
        removed
    }
}

impl<K, C> Entries<K, C>
where
    K: Eq + Hash + Clone + Debug,
    C: LazySlot,
    C::Output: Clone + Default,
    C::Error: Clone + Display,
{
    pub(crate) fn is_loaded(&self, key: &K) -> bool {
        self.index.get(key).is_some_and(|cell| cell.peek().is_some())
    }

    pub(crate) fn peek(&self, key: &K) -> Option<Result<C::Output, C::Error>> {
        self.index.get(key).and_then(|cell| cell.peek().cloned())
    }

    pub(crate) fn set(&self, key: K, value: C::Output) -> bool {
        let primed = self.cell(key).set(value);
        if primed {
            self.stats.prime();
        }
        primed
    }

    fn cell(&self, key: K) -> Arc<C> {
        self.index
            .get_or_insert_with(key, || C::with_policy(self.policy))
    }

    fn fresh_cell(&self, key: K) -> Arc<C> {
        debug!(?key, map = self.kind, "lazy map entry refreshed");
        let fresh = Arc::new(C::with_policy(self.policy));
        if self.index.replace(key, Arc::clone(&fresh)).is_some() {
            self.stats.eviction();
        }
        fresh
    }

    /// Apply `opts` to `key`. Returns [`Lookup::Load`] only when the cell is
    /// empty, fetching is allowed and there is a fetch to run.
    pub(crate) fn begin<F>(
        &self,
        key: K,
        fetch: Option<F>,
        opts: GetOptions<K, C::Output>,
    ) -> Lookup<K, C, F> {
        let GetOptions {
            dont_fetch,
            refresh,
            clear,
            must,
            must_be_cached,
            set_id,
            set_value,
            default_value,
        } = opts;
        let key = set_id.unwrap_or(key);

        if clear {
            if self.clear(&key) {
                debug!(?key, map = self.kind, "lazy map entry cleared");
            }
            return Lookup::Done(Ok(<C::Output as Default>::default()));
        }

        let cell = if refresh {
            self.fresh_cell(key.clone())
        } else {
            self.cell(key.clone())
        };

        if let Some(value) = set_value {
            if cell.set(value.clone()) {
                self.stats.prime();
            }
            return Lookup::Done(Ok(value));
        }

        let settle = Settle {
            must,
            default_value,
        };

        if let Some(cached) = cell.peek().cloned() {
            self.stats.hit();
            trace!(?key, map = self.kind, "lazy map hit");
            return Lookup::Done(self.settle(key, &cell, cached, settle));
        }

        if dont_fetch {
            if must_be_cached {
                return Lookup::Done(Err(LazyError::NotCached));
            }
            return Lookup::Done(Ok(settle.default_value.map_or_else(
                <C::Output as Default>::default,
                |default| {
                    if cell.set(default.clone()) {
                        self.stats.prime();
                    }
                    default
                },
            )));
        }

        let Some(fetch) = fetch else {
            return Lookup::Done(Ok(<C::Output as Default>::default()));
        };

        self.stats.miss();
        debug!(?key, map = self.kind, "lazy map miss");
        Lookup::Load(Load {
            key,
            cell,
            fetch,
            settle,
        })
    }

    /// Turn a fetch result into the caller's answer. A failure with a
    /// default value swaps the failed cell for one primed with the default.
    pub(crate) fn settle(
        &self,
        key: K,
        cell: &Arc<C>,
        result: Result<C::Output, C::Error>,
        settle: Settle<C::Output>,
    ) -> Outcome<C> {
        match (result, settle.default_value) {
            (Ok(value), _) => Ok(value),
            (Err(e), _) if settle.must => Err(LazyError::WrappedFetch(e)),
            (Err(e), None) => Err(LazyError::Fetch(e)),
            (Err(e), Some(default)) => {
                warn!(?key, map = self.kind, error = %e, "lazy map fetch failed, caching default value");
                // A published failure cannot be overwritten.
                let primed = Arc::new(C::primed(default.clone(), self.policy));
                if self.index.replace_if_current(key, cell, primed) {
                    self.stats.prime();
                }
                Ok(default)
            }
        }
    }
}
