//! Domain errors for the site cache.

use thiserror::Error;

/// Errors produced by a lazy map or a cache-backed accessor.
///
/// `E` is the error type of the fetch closure. It must be `Clone` because a
/// failed fetch is cached and handed back to every later caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LazyError<E> {
    /// The raw fetch error, passed through untouched.
    #[error(transparent)]
    Fetch(E),

    /// `dont_fetch` + `must_be_cached` was requested against an unloaded key.
    #[error("value not cached")]
    NotCached,

    /// The registry backing the named slot is gone.
    #[error("lazy registry not initialised for slot {0}")]
    NilRegistry(&'static str),

    /// The fetch error re-wrapped because the caller asked for `must`.
    #[error("fetch error: {0}")]
    WrappedFetch(#[source] E),
}

impl<E> LazyError<E> {
    /// The underlying fetch error, if this error carries one.
    pub const fn fetch_error(&self) -> Option<&E> {
        match self {
            Self::Fetch(e) | Self::WrappedFetch(e) => Some(e),
            Self::NotCached | Self::NilRegistry(_) => None,
        }
    }

    /// Whether the caller asked for this failure to be treated as fatal.
    pub const fn is_wrapped(&self) -> bool {
        matches!(self, Self::WrappedFetch(_))
    }
}

/// Errors returned by the store behind the request facade.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of a cache-backed accessor on the request facade.
pub type CacheResult<T> = Result<T, LazyError<StoreError>>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_wrapped_fetch_message_and_source() {
        let err: LazyError<StoreError> = LazyError::WrappedFetch(StoreError::Query("bad".into()));
        assert_eq!(err.to_string(), "fetch error: Query failed: bad");
        assert!(err.source().is_some());
        assert!(err.is_wrapped());
    }

    #[test]
    fn test_fetch_is_transparent() {
        let err: LazyError<StoreError> = LazyError::Fetch(StoreError::not_found("thread", 7));
        assert_eq!(err.to_string(), "thread not found: 7");
        assert_eq!(err.fetch_error(), Some(&StoreError::not_found("thread", 7)));
    }

    #[test]
    fn test_not_cached_carries_no_fetch_error() {
        let err: LazyError<StoreError> = LazyError::NotCached;
        assert_eq!(err.to_string(), "value not cached");
        assert!(err.fetch_error().is_none());
    }
}
