//! Hit/miss accounting for lazy maps.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of a map's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Reads answered from an already loaded cell.
    pub hits: u64,
    /// Reads that went to load an unloaded cell.
    pub misses: u64,
    /// Fetch closures actually invoked.
    pub fetches: u64,
    /// Fetch closures that returned an error.
    pub failures: u64,
    /// Cells removed by clear or replaced by refresh.
    pub evictions: u64,
    /// Values installed without a fetch (set value, default value).
    pub primes: u64,
}

impl CacheStats {
    /// Sum two snapshots.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
            fetches: self.fetches + other.fetches,
            failures: self.failures + other.failures,
            evictions: self.evictions + other.evictions,
            primes: self.primes + other.primes,
        }
    }

    /// Fraction of reads served from cache, `0.0` when nothing was read.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let reads = self.hits + self.misses;
        if reads == 0 {
            0.0
        } else {
            self.hits as f64 / reads as f64
        }
    }
}

/// Lock-free counters shared by the blocking and async maps.
#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
    evictions: AtomicU64,
    primes: AtomicU64,
}

impl StatsRecorder {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn eviction(&self) {
        self.evict_many(1);
    }

    pub(crate) fn evict_many(&self, count: u64) {
        self.evictions.fetch_add(count, Ordering::Relaxed);
    }

    pub(crate) fn prime(&self) {
        self.primes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            primes: self.primes.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_and_merge() {
        let recorder = StatsRecorder::default();
        recorder.hit();
        recorder.hit();
        recorder.miss();
        recorder.fetch();

        let stats = recorder.snapshot();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);

        let merged = stats.merge(CacheStats {
            evictions: 3,
            ..CacheStats::default()
        });
        assert_eq!(merged.evictions, 3);
        assert_eq!(merged.fetches, 1);
    }

    #[test]
    fn test_hit_rate_without_reads() {
        assert!(CacheStats::default().hit_rate().abs() < f64::EPSILON);
    }
}
