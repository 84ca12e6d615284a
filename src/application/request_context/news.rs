//! News and announcement accessors.

use std::sync::Arc;

use tracing::{instrument, warn};

use super::{many, one, optional, RequestContext};
use crate::adapters::cache::GetOptions;
use crate::domain::errors::{CacheResult, LazyError};
use crate::domain::models::{Announcement, NewsPost, SiteAnnouncement};
use crate::domain::ports::{Page, Querier};

impl<Q: Querier> RequestContext<Q> {
    /// Front-page news at the request's offset.
    pub async fn latest_news(&self) -> CacheResult<Arc<Vec<NewsPost>>> {
        let registry = self.registry("latest_news")?;
        let page = self.listing_page().await;
        let (querier, viewer) = (&self.querier, self.user_id);
        registry
            .latest_news
            .load(|| async move { many(querier.latest_news(viewer, page).await) })
            .await
            .map_err(LazyError::Fetch)
    }

    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn news_post_by_id(
        &self,
        id: i32,
        opts: GetOptions<i32, Option<Arc<NewsPost>>>,
    ) -> CacheResult<Option<Arc<NewsPost>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("news_posts")?
            .news_posts
            .get(id, |id| async move { one(querier.news_post_by_id(viewer, id).await) }, opts)
            .await
    }

    pub async fn current_news_post(
        &self,
        opts: GetOptions<i32, Option<Arc<NewsPost>>>,
    ) -> CacheResult<Option<Arc<NewsPost>>> {
        match self.selection.news_id {
            Some(id) => self.news_post_by_id(id, opts).await,
            None => Ok(None),
        }
    }

    pub fn current_news_post_loaded(&self) -> Option<Arc<NewsPost>> {
        let id = self.selection.news_id?;
        self.registry.as_ref()?.news_posts.peek(&id)?.ok().flatten()
    }

    /// Announcement flag of a news post; `None` when it was never announced.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn news_announcement(
        &self,
        news_id: i32,
        opts: GetOptions<i32, Option<Arc<SiteAnnouncement>>>,
    ) -> CacheResult<Option<Arc<SiteAnnouncement>>> {
        let querier = &self.querier;
        self.registry("news_announcements")?
            .news_announcements
            .get(
                news_id,
                |id| async move { optional(querier.announcement_for_news(id).await) },
                opts,
            )
            .await
    }

    /// The active site announcement. Failures are logged and yield `None`.
    pub async fn announcement(&self) -> Option<Arc<Announcement>> {
        let registry = self.registry("announcement").ok()?;
        let (querier, viewer) = (&self.querier, self.user_id);
        let result = registry
            .announcement
            .load(|| async move { optional(querier.active_announcement(viewer).await) })
            .await;
        result.unwrap_or_else(|e| {
            warn!(request_id = %self.request_id, error = %e, "active announcement lookup failed");
            None
        })
    }

    /// Newest news for the administration pages, first page only.
    pub async fn admin_latest_news(&self) -> CacheResult<Arc<Vec<NewsPost>>> {
        let registry = self.registry("admin_latest_news")?;
        let page = Page::new(self.config.pagination.page_size_max, 0);
        let querier = &self.querier;
        registry
            .admin_latest_news
            .load(|| async move { many(querier.admin_latest_news(page).await) })
            .await
            .map_err(LazyError::Fetch)
    }
}
