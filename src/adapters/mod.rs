//! Adapters: the lazy cache engine and the in-memory store.

pub mod cache;
pub mod memory;
