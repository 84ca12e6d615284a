//! Sitecache - request-scoped lazy memoization for a community site
//!
//! Page handlers read through a [`RequestContext`], whose accessors load
//! each query result at most once per request and share it with every later
//! caller, concurrent callers included.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): row models, configuration, errors and the
//!   [`Querier`] store port
//! - **Adapters** (`adapters`): the cache engine (`Value`, `AsyncValue`,
//!   `Map`, `AsyncMap`, the [`CacheRegistry`]) and an in-memory store
//! - **Application Layer** (`application`): the per-request accessor facade
//! - **Infrastructure Layer** (`infrastructure`): configuration loading and
//!   logging setup
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sitecache::adapters::cache::GetOptions;
//! use sitecache::adapters::memory::InMemoryQuerier;
//! use sitecache::{ConfigLoader, RequestContext};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(ConfigLoader::load()?);
//!     let querier = Arc::new(InMemoryQuerier::new());
//!
//!     let mut ctx = RequestContext::new(querier, config, 0);
//!     let thread = ctx.forum_thread_by_id(1, GetOptions::new()).await;
//!     println!("{thread:?}");
//!     ctx.finish();
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use adapters::cache::{
    AsyncMap, AsyncValue, CacheRegistry, CacheStats, ErrorPolicy, GetOptions, Map, Value,
};
pub use application::{RequestContext, Selection};
pub use domain::errors::{CacheResult, LazyError, StoreError, StoreResult};
pub use domain::models::{CacheConfig, Config, LoggingConfig, PaginationConfig, SiteConfig};
pub use domain::ports::{Page, Querier};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::logging::{LogConfig, LoggerImpl};
