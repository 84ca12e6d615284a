//! Lazy memoization engine.
//!
//! Compute-once cells ([`Value`], [`AsyncValue`]) and keyed collections of
//! cells ([`Map`], [`AsyncMap`]) driven by per-call [`GetOptions`]. A cell
//! runs its fetch at most once and publishes the result to every waiter;
//! maps keep one cell per key behind a structural lock that is never held
//! while a fetch runs. [`CacheRegistry`] groups one slot per request-scoped
//! accessor.

pub mod async_map;
pub mod async_value;
mod entries;
mod index;
pub mod map;
pub mod options;
pub mod policy;
pub mod registry;
pub mod stats;
pub mod value;

pub use async_map::AsyncMap;
pub use async_value::AsyncValue;
pub use map::Map;
pub use options::GetOptions;
pub use policy::ErrorPolicy;
pub use registry::CacheRegistry;
pub use stats::CacheStats;
pub use value::Value;
