//! Async single-flight cell.
//!
//! Same contract as [`Value`](super::Value) for fetches that await: the first
//! caller runs the future, every concurrent awaiter of the same cell receives
//! its result. Backed by `tokio::sync::OnceCell`.

use std::future::Future;

use tokio::sync::OnceCell;

use super::policy::ErrorPolicy;

/// A value that is loaded on demand by an async fetch, at most once.
pub struct AsyncValue<T, E> {
    cell: OnceCell<Result<T, E>>,
    policy: ErrorPolicy,
}

impl<T, E> AsyncValue<T, E> {
    /// Create an empty cell that caches failures.
    pub fn new() -> Self {
        Self::with_policy(ErrorPolicy::CacheErrors)
    }

    pub fn with_policy(policy: ErrorPolicy) -> Self {
        Self {
            cell: OnceCell::new(),
            policy,
        }
    }

    /// Create a cell that is already loaded with `value`.
    pub fn primed(value: T, policy: ErrorPolicy) -> Self {
        Self {
            cell: OnceCell::new_with(Some(Ok(value))),
            policy,
        }
    }

    pub const fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// The published result, or `None` while unloaded or still loading.
    pub fn peek(&self) -> Option<&Result<T, E>> {
        self.cell.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// Prime the cell with `value` unless it is loaded or loading.
    pub fn set(&self, value: T) -> bool {
        self.cell.set(Ok(value)).is_ok()
    }
}

impl<T: Clone, E: Clone> AsyncValue<T, E> {
    /// Return the cached result, awaiting `fetch` if nothing is cached yet.
    ///
    /// If the running fetch is cancelled (its caller dropped), the next
    /// waiter takes over the computation.
    pub async fn load<F, Fut>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if self.policy.caches_errors() {
            return self.cell.get_or_init(fetch).await.clone();
        }

        match self
            .cell
            .get_or_try_init(|| async move { fetch().await.map(Ok) })
            .await
        {
            Ok(published) => published.clone(),
            Err(e) => Err(e),
        }
    }
}

impl<T, E> Default for AsyncValue<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug, E: std::fmt::Debug> std::fmt::Debug for AsyncValue<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncValue")
            .field("result", &self.cell.get())
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_load_once_blocking_runtime() {
        let value: AsyncValue<i32, String> = AsyncValue::new();
        let first = tokio_test::block_on(value.load(|| async { Ok(42) }));
        let second = tokio_test::block_on(value.load(|| async { Ok(99) }));

        assert_eq!(first, Ok(42));
        assert_eq!(second, Ok(42));
    }

    #[tokio::test]
    async fn test_load_error_is_sticky() {
        let value: AsyncValue<i32, String> = AsyncValue::new();

        assert_eq!(value.load(|| async { Err("bad".to_string()) }).await, Err("bad".to_string()));
        assert_eq!(value.load(|| async { Ok(1) }).await, Err("bad".to_string()));
    }

    #[tokio::test]
    async fn test_retry_policy_refetches_after_failure() {
        let value: AsyncValue<i32, String> = AsyncValue::with_policy(ErrorPolicy::RetryOnNextCall);

        assert!(value.load(|| async { Err("bad".to_string()) }).await.is_err());
        assert!(!value.is_loaded());
        assert_eq!(value.load(|| async { Ok(1) }).await, Ok(1));
        assert_eq!(value.peek(), Some(&Ok(1)));
    }

    #[tokio::test]
    async fn test_set_and_peek() {
        let value: AsyncValue<&'static str, String> = AsyncValue::new();
        assert!(value.peek().is_none());
        assert!(value.set("hello"));
        assert!(!value.set("world"));
        assert_eq!(value.load(|| async { Ok("fetched") }).await, Ok("hello"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_awaiters_share_one_fetch() {
        let value: Arc<AsyncValue<usize, String>> = Arc::new(AsyncValue::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let value = Arc::clone(&value);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    value
                        .load(|| async {
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok(calls.fetch_add(1, Ordering::SeqCst) + 7)
                        })
                        .await
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok(7));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
