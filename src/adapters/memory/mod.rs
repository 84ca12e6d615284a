//! In-memory store adapter.
//!
//! Backs the [`Querier`](crate::domain::ports::Querier) port with plain
//! tables behind a `RwLock`. Records how often each query ran and can be told
//! to fail or slow down, which is what the cache tests need to observe.

pub mod querier;
pub mod tables;

pub use querier::InMemoryQuerier;
pub use tables::Tables;
