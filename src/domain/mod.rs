//! Domain layer for sitecache
//!
//! Row models, configuration, error types and the store port the request
//! facade reads through.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{CacheResult, LazyError, StoreError, StoreResult};
