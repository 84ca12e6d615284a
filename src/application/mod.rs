//! Request-scoped use of the cache engine.

pub mod request_context;

pub use request_context::{BlogListParams, RequestContext, Selection};
