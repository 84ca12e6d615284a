//! Blog accessors.

use std::sync::Arc;

use tracing::instrument;

use super::{many, one, RequestContext};
use crate::adapters::cache::GetOptions;
use crate::domain::errors::{CacheResult, LazyError};
use crate::domain::models::{BlogEntry, Blogger};
use crate::domain::ports::Querier;

impl<Q: Querier> RequestContext<Q> {
    pub async fn bloggers(&self) -> CacheResult<Arc<Vec<Blogger>>> {
        let registry = self.registry("bloggers")?;
        let page = self.listing_page().await;
        let (querier, viewer) = (&self.querier, self.user_id);
        registry
            .bloggers
            .load(|| async move { many(querier.bloggers(viewer, page).await) })
            .await
            .map_err(LazyError::Fetch)
    }

    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn blog_entry_by_id(
        &self,
        id: i32,
        opts: GetOptions<i32, Option<Arc<BlogEntry>>>,
    ) -> CacheResult<Option<Arc<BlogEntry>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("blog_entries")?
            .blog_entries
            .get(id, |id| async move { one(querier.blog_entry_by_id(viewer, id).await) }, opts)
            .await
    }

    pub async fn current_blog(
        &self,
        opts: GetOptions<i32, Option<Arc<BlogEntry>>>,
    ) -> CacheResult<Option<Arc<BlogEntry>>> {
        match self.selection.blog_id {
            Some(id) => self.blog_entry_by_id(id, opts).await,
            None => Ok(None),
        }
    }

    pub fn current_blog_loaded(&self) -> Option<Arc<BlogEntry>> {
        let id = self.selection.blog_id?;
        self.registry.as_ref()?.blog_entries.peek(&id)?.ok().flatten()
    }

    /// Entries of every author for the blog list page, from the offset set
    /// by [`with_blog_list`](Self::with_blog_list).
    pub async fn blog_list(&self) -> CacheResult<Arc<Vec<BlogEntry>>> {
        let registry = self.registry("blog_list_rows")?;
        let page = self.page(self.blog_list.offset).await;
        let (querier, viewer) = (&self.querier, self.user_id);
        registry
            .blog_list_rows
            .load(|| async move { many(querier.blog_entries(viewer, page).await) })
            .await
            .map_err(LazyError::Fetch)
    }

    /// Entries of the author set by [`with_blog_list`](Self::with_blog_list).
    pub async fn blog_list_by_author(&self) -> CacheResult<Arc<Vec<BlogEntry>>> {
        let registry = self.registry("blog_list_by_author_rows")?;
        let params = self.blog_list;
        let page = self.page(params.offset).await;
        let (querier, viewer) = (&self.querier, self.user_id);
        registry
            .blog_list_by_author_rows
            .load(|| async move {
                many(
                    querier
                        .blog_entries_by_author(viewer, params.author_id, page)
                        .await,
                )
            })
            .await
            .map_err(LazyError::Fetch)
    }
}
