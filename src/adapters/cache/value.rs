//! Blocking compute-once cell.
//!
//! A [`Value`] publishes its result through a `OnceLock` so reads after the
//! first load never take a lock. The compute guard is a separate mutex held
//! only while the fetch runs; callers that arrive during the fetch wait on it
//! and then read the published result.

use std::sync::{Mutex, OnceLock, PoisonError};

use super::policy::ErrorPolicy;

/// A value that is loaded on demand, at most once.
pub struct Value<T, E> {
    slot: OnceLock<Result<T, E>>,
    guard: Mutex<()>,
    policy: ErrorPolicy,
}

impl<T, E> Value<T, E> {
    /// Create an empty cell that caches failures.
    pub const fn new() -> Self {
        Self::with_policy(ErrorPolicy::CacheErrors)
    }

    /// Create an empty cell with an explicit failure policy.
    pub const fn with_policy(policy: ErrorPolicy) -> Self {
        Self {
            slot: OnceLock::new(),
            guard: Mutex::new(()),
            policy,
        }
    }

    /// Create a cell that is already loaded with `value`.
    pub fn primed(value: T, policy: ErrorPolicy) -> Self {
        let cell = Self::with_policy(policy);
        let _ = cell.slot.set(Ok(value));
        cell
    }

    pub const fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    /// The published result, or `None` if nothing has been loaded yet.
    ///
    /// Never blocks and never triggers a fetch.
    pub fn peek(&self) -> Option<&Result<T, E>> {
        self.slot.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Prime the cell with `value` unless it is already loaded.
    ///
    /// Waits for an in-flight load to finish first, in which case the prime is
    /// a no-op. Returns whether `value` was installed.
    pub fn set(&self, value: T) -> bool {
        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        self.slot.set(Ok(value)).is_ok()
    }
}

impl<T: Clone, E: Clone> Value<T, E> {
    /// Return the cached result, running `fetch` if nothing is cached yet.
    ///
    /// Concurrent callers of an unloaded cell block until the single running
    /// fetch publishes, then all observe the same result. Under
    /// [`ErrorPolicy::RetryOnNextCall`] a failure is returned without being
    /// published, so the next caller fetches again.
    pub fn load<F>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(result) = self.slot.get() {
            return result.clone();
        }

        let _guard = self.guard.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(result) = self.slot.get() {
            return result.clone();
        }

        let result = fetch();
        if result.is_ok() || self.policy.caches_errors() {
            // The guard is held, so nothing else can have published.
            let _ = self.slot.set(result.clone());
        }
        result
    }
}

impl<T, E> Default for Value<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug, E: std::fmt::Debug> std::fmt::Debug for Value<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("result", &self.slot.get())
            .field("policy", &self.policy)
            .finish()
    }
}
