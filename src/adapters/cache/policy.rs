//! Failure caching policy for lazy cells.

use serde::{Deserialize, Serialize};

/// What a cell does with a failed fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// The failure is published like a value and returned on every later
    /// read until the cell is replaced (refresh) or removed (clear).
    #[default]
    CacheErrors,
    /// The failure goes back to its caller only; the cell stays unloaded and
    /// the next load runs the fetch again.
    RetryOnNextCall,
}

impl ErrorPolicy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CacheErrors => "cache_errors",
            Self::RetryOnNextCall => "retry_on_next_call",
        }
    }

    /// Whether a failed result should be stored in the cell.
    pub const fn caches_errors(&self) -> bool {
        matches!(self, Self::CacheErrors)
    }
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
