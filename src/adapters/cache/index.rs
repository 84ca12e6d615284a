//! Structural index shared by the blocking and async maps.
//!
//! The mutex here protects only insertion, lookup, replacement and removal of
//! cells. It is never held while a cell computes.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub(crate) struct Index<K, C> {
    entries: Mutex<HashMap<K, Arc<C>>>,
}

impl<K: Eq + Hash, C> Index<K, C> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Arc<C>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn get(&self, key: &K) -> Option<Arc<C>> {
        self.lock().get(key).cloned()
    }

    /// Find the cell for `key`, creating it with `make` if absent.
    pub(crate) fn get_or_insert_with(&self, key: K, make: impl FnOnce() -> C) -> Arc<C> {
        Arc::clone(self.lock().entry(key).or_insert_with(|| Arc::new(make())))
    }

    /// Install `cell` for `key`, returning the cell it displaced.
    pub(crate) fn replace(&self, key: K, cell: Arc<C>) -> Option<Arc<C>> {
        self.lock().insert(key, cell)
    }

    /// Install `next` only if `current` is still the cell for `key`.
    ///
    /// A key that was removed or replaced in the meantime is left alone.
    /// Returns whether `next` was installed.
    pub(crate) fn replace_if_current(&self, key: K, current: &Arc<C>, next: Arc<C>) -> bool {
        let mut entries = self.lock();
        let is_current = entries
            .get(&key)
            .is_some_and(|installed| Arc::ptr_eq(installed, current));
        if is_current {
            entries.insert(key, next);
        }
        is_current
    }

    pub(crate) fn remove(&self, key: &K) -> Option<Arc<C>> {
        self.lock().remove(key)
    }

    pub(crate) fn clear(&self) -> usize {
        let mut entries = self.lock();
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_insert_is_stable() {
        let index: Index<i32, String> = Index::new();
        let a = index.get_or_insert_with(1, || "a".to_string());
        let b = index.get_or_insert_with(1, || "b".to_string());

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, "a");
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_replace_if_current_respects_newer_cell() {
        let index: Index<i32, String> = Index::new();
        let stale = index.get_or_insert_with(1, || "stale".to_string());
        index.replace(1, Arc::new("newer".to_string()));

        assert!(!index.replace_if_current(1, &stale, Arc::new("default".to_string())));
        assert_eq!(*index.get(&1).unwrap(), "newer");
    }

    #[test]
    fn test_replace_if_current_installs_over_same_cell() {
        let index: Index<i32, String> = Index::new();
        let current = index.get_or_insert_with(1, || "failed".to_string());

        assert!(index.replace_if_current(1, &current, Arc::new("default".to_string())));
        assert_eq!(*index.get(&1).unwrap(), "default");
    }

    #[test]
    fn test_replace_if_current_skips_removed_key() {
        let index: Index<i32, String> = Index::new();
        let current = index.get_or_insert_with(1, || "failed".to_string());
        index.remove(&1);

        assert!(!index.replace_if_current(1, &current, Arc::new("default".to_string())));
        assert!(index.get(&1).is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let index: Index<i32, i32> = Index::new();
        index.get_or_insert_with(1, || 1);
        index.get_or_insert_with(2, || 2);

        assert!(index.remove(&1).is_some());
        assert!(index.remove(&1).is_none());
        assert_eq!(index.clear(), 1);
        assert_eq!(index.len(), 0);
    }
}
