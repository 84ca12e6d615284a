//! Port trait definitions (Hexagonal Architecture)
//!
//! - Querier: read-only store queries backing the cache registry

pub mod querier;

pub use querier::{Page, Querier};
