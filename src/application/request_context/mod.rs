//! Request-scoped accessor facade over the cache registry.
//!
//! A [`RequestContext`] lives for one request. Each accessor owns one
//! registry slot, supplies the store query that fills it, and exposes a typed
//! result. Repeated calls within the request are answered from the slot.
//!
//! Accessors are grouped by site section in the submodules; they all share
//! the plumbing defined here.

mod admin;
mod blogs;
mod faq;
mod forum;
mod imagebbs;
mod linker;
mod news;
mod user;
mod writings;

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::adapters::cache::{CacheRegistry, CacheStats};
use crate::domain::errors::{CacheResult, LazyError, StoreError, StoreResult};
use crate::domain::models::{Config, Preference};
use crate::domain::ports::{Page, Querier};

/// Ids selected by the current request, parsed from its route parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub thread_id: Option<i32>,
    pub topic_id: Option<i32>,
    pub comment_id: Option<i32>,
    pub news_id: Option<i32>,
    pub board_id: Option<i32>,
    pub image_post_id: Option<i32>,
    pub writing_id: Option<i32>,
    pub blog_id: Option<i32>,
    pub linker_item_id: Option<i32>,
    pub admin_request_id: Option<i32>,
}

impl Selection {
    /// Parse route parameters such as `("thread", "42")`.
    ///
    /// Unknown names are ignored; ids that are not numbers leave the
    /// selection empty.
    pub fn from_params<'a, I>(params: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut selection = Self::default();
        for (name, raw) in params {
            let slot = match name {
                "thread" => &mut selection.thread_id,
                "topic" => &mut selection.topic_id,
                "comment" => &mut selection.comment_id,
                "news" => &mut selection.news_id,
                "board" => &mut selection.board_id,
                "post" => &mut selection.image_post_id,
                "writing" => &mut selection.writing_id,
                "blog" => &mut selection.blog_id,
                "link" => &mut selection.linker_item_id,
                "request" => &mut selection.admin_request_id,
                _ => continue,
            };
            match raw.parse::<i32>() {
                Ok(id) => *slot = Some(id),
                Err(e) => debug!(name, raw, error = %e, "ignoring malformed route id"),
            }
        }
        selection
    }
}

/// Which author's blog entries the blog lists show, and from where.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlogListParams {
    /// Author listed by the by-author list.
    pub author_id: i32,
    pub offset: i32,
}

/// Per-request data facade.
pub struct RequestContext<Q: Querier> {
    registry: Option<CacheRegistry>,
    querier: Arc<Q>,
    config: Arc<Config>,
    user_id: i32,
    request_id: Uuid,
    selection: Selection,
    blog_list: BlogListParams,
    offset: i32,
}

impl<Q: Querier> RequestContext<Q> {
    /// Create a context for `user_id` (0 for an anonymous viewer).
    pub fn new(querier: Arc<Q>, config: Arc<Config>, user_id: i32) -> Self {
        let registry = CacheRegistry::new(&config.cache);
        let request_id = Uuid::new_v4();
        debug!(%request_id, user_id, "request context created");
        Self {
            registry: Some(registry),
            querier,
            config,
            user_id,
            request_id,
            selection: Selection::default(),
            blog_list: BlogListParams::default(),
            offset: 0,
        }
    }

    #[must_use]
    pub const fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    #[must_use]
    pub const fn with_blog_list(mut self, author_id: i32, offset: i32) -> Self {
        self.blog_list = BlogListParams { author_id, offset };
        self
    }

    /// Offset applied to the paged front-page listings.
    #[must_use]
    pub const fn with_offset(mut self, offset: i32) -> Self {
        self.offset = offset;
        self
    }

    /// Prime the viewer's preference, e.g. from a session that already
    /// loaded it.
    #[must_use]
    pub fn with_preference(self, preference: Preference) -> Self {
        if let Some(registry) = &self.registry {
            registry.pref.set(Some(Arc::new(preference)));
        }
        self
    }

    /// Prime the viewer's role names.
    #[must_use]
    pub fn with_roles(self, roles: Vec<String>) -> Self {
        if let Some(registry) = &self.registry {
            registry.user_roles.set(Arc::new(roles));
        }
        self
    }

    /// Prime the absolute URL base, e.g. from the request's host header.
    /// Trailing slashes are dropped.
    #[must_use]
    pub fn with_absolute_url_base(self, base: impl Into<String>) -> Self {
        if let Some(registry) = &self.registry {
            registry
                .absolute_url_base
                .set(base.into().trim_end_matches('/').to_string());
        }
        self
    }

    pub const fn user_id(&self) -> i32 {
        self.user_id
    }

    pub const fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub const fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub const fn is_signed_in(&self) -> bool {
        self.user_id != 0
    }

    pub const fn is_finished(&self) -> bool {
        self.registry.is_none()
    }

    /// Merged statistics of the keyed slots, `None` after [`finish`](Self::finish).
    pub fn stats(&self) -> Option<CacheStats> {
        self.registry.as_ref().map(CacheRegistry::stats)
    }

    /// Drop every keyed cache entry of this request.
    pub fn invalidate_all(&self) -> usize {
        self.registry.as_ref().map_or(0, CacheRegistry::invalidate_all)
    }

    /// Tear down the registry. Accessors called afterwards fail with
    /// [`LazyError::NilRegistry`].
    pub fn finish(&mut self) {
        if let Some(registry) = self.registry.take() {
            let stats = registry.stats();
            debug!(
                request_id = %self.request_id,
                hits = stats.hits,
                misses = stats.misses,
                fetches = stats.fetches,
                failures = stats.failures,
                loaded_cells = registry.loaded_cells(),
                "request cache finished"
            );
        }
    }

    /// Absolute URL base for links leaving the site, without a trailing
    /// slash. Falls back to the configured base unless primed.
    pub fn absolute_url_base(&self) -> CacheResult<String> {
        let configured = &self.config.site.absolute_url_base;
        let loaded = self
            .registry("absolute_url_base")?
            .absolute_url_base
            .load(|| Ok(configured.trim_end_matches('/').to_string()));
        match loaded {
            Ok(base) => Ok(base),
            Err(never) => match never {},
        }
    }

    /// Page size for listings: the viewer's preference clamped to the
    /// configured bounds, or the configured default.
    pub async fn page_size(&self) -> i32 {
        let bounds = &self.config.pagination;
        let preferred = match self.preference().await {
            Ok(Some(pref)) if pref.page_size > 0 => pref.page_size,
            _ => bounds.page_size_default,
        };
        preferred.max(bounds.page_size_min).min(bounds.page_size_max)
    }

    async fn page(&self, offset: i32) -> Page {
        Page::new(self.page_size().await, offset)
    }

    /// Page of the front-page listings at the request's offset.
    async fn listing_page(&self) -> Page {
        self.page(self.offset).await
    }

    fn registry(&self, slot: &'static str) -> CacheResult<&CacheRegistry> {
        self.registry.as_ref().ok_or(LazyError::NilRegistry(slot))
    }
}

/// Wrap a single-row query result for a registry slot.
fn one<T>(result: StoreResult<T>) -> StoreResult<Option<Arc<T>>> {
    result.map(|row| Some(Arc::new(row)))
}

/// Like [`one`], but a missing row is an empty result rather than an error.
fn optional<T>(result: StoreResult<T>) -> StoreResult<Option<Arc<T>>> {
    match result {
        Ok(row) => Ok(Some(Arc::new(row))),
        Err(StoreError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

fn many<T>(result: StoreResult<Vec<T>>) -> StoreResult<Arc<Vec<T>>> {
    result.map(Arc::new)
}

/// Collapse an accessor error into the store error a derived slot caches.
fn into_store_error(error: LazyError<StoreError>) -> StoreError {
    match error {
        LazyError::Fetch(e) | LazyError::WrappedFetch(e) => e,
        other => StoreError::Unavailable(other.to_string()),
    }
}
