//! Per-call modifiers for lazy map lookups.

/// Options that alter a single [`Map::get`](super::Map::get) or
/// [`AsyncMap::get`](super::AsyncMap::get) call.
///
/// Evaluation order: `set_id` rebinding, then `clear` (which short-circuits
/// everything else), then `refresh`, then `set_value`, then the cached-read /
/// `dont_fetch` / fetch path. When a fetch fails, `must` wins over
/// `default_value`.
///
/// ```
/// use sitecache::adapters::cache::GetOptions;
///
/// let opts: GetOptions<i32, String> = GetOptions::new().dont_fetch().must_be_cached();
/// assert!(opts.is_probe());
/// ```
#[derive(Debug, Clone)]
pub struct GetOptions<K, T> {
    pub(crate) dont_fetch: bool,
    pub(crate) refresh: bool,
    pub(crate) clear: bool,
    pub(crate) must: bool,
    pub(crate) must_be_cached: bool,
    pub(crate) set_id: Option<K>,
    pub(crate) set_value: Option<T>,
    pub(crate) default_value: Option<T>,
}

impl<K, T> GetOptions<K, T> {
    pub const fn new() -> Self {
        Self {
            dont_fetch: false,
            refresh: false,
            clear: false,
            must: false,
            must_be_cached: false,
            set_id: None,
            set_value: None,
            default_value: None,
        }
    }

    /// Never invoke the fetch closure, even on a miss.
    #[must_use]
    pub fn dont_fetch(mut self) -> Self {
        self.dont_fetch = true;
        self
    }

    /// Discard any existing cell for the key and load into a fresh one.
    #[must_use]
    pub fn refresh(mut self) -> Self {
        self.refresh = true;
        self
    }

    /// Remove the cell for the key without loading anything.
    #[must_use]
    pub fn clear(mut self) -> Self {
        self.clear = true;
        self
    }

    /// Wrap a fetch failure in [`LazyError::WrappedFetch`](crate::domain::errors::LazyError::WrappedFetch).
    #[must_use]
    pub fn must(mut self) -> Self {
        self.must = true;
        self
    }

    /// With `dont_fetch`, report an unloaded key as
    /// [`LazyError::NotCached`](crate::domain::errors::LazyError::NotCached).
    #[must_use]
    pub fn must_be_cached(mut self) -> Self {
        self.must_be_cached = true;
        self
    }

    /// Act on `key` instead of the key passed to `get`.
    #[must_use]
    pub fn set_id(mut self, key: K) -> Self {
        self.set_id = Some(key);
        self
    }

    /// Prime the key with `value`, bypassing the fetch.
    #[must_use]
    pub fn set_value(mut self, value: T) -> Self {
        self.set_value = Some(value);
        self
    }

    /// Cache and return `value` if the fetch fails, or if the key is
    /// unloaded under `dont_fetch`.
    #[must_use]
    pub fn default_value(mut self, value: T) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Whether this call only inspects the cache.
    pub const fn is_probe(&self) -> bool {
        self.dont_fetch
    }
}

impl<K, T> Default for GetOptions<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
