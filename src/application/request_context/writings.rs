//! Writing accessors.

use std::sync::Arc;

use tracing::instrument;

use super::{many, one, RequestContext};
use crate::adapters::cache::GetOptions;
use crate::domain::errors::{CacheResult, LazyError};
use crate::domain::models::{Writer, Writing, WritingCategory};
use crate::domain::ports::Querier;

impl<Q: Querier> RequestContext<Q> {
    pub async fn latest_writings(&self) -> CacheResult<Arc<Vec<Writing>>> {
        let registry = self.registry("latest_writings")?;
        let page = self.listing_page().await;
        let (querier, viewer) = (&self.querier, self.user_id);
        registry
            .latest_writings
            .load(|| async move { many(querier.latest_writings(viewer, page).await) })
            .await
            .map_err(LazyError::Fetch)
    }

    pub async fn writers(&self) -> CacheResult<Arc<Vec<Writer>>> {
        let registry = self.registry("writers")?;
        let page = self.listing_page().await;
        let (querier, viewer) = (&self.querier, self.user_id);
        registry
            .writers
            .load(|| async move { many(querier.writers(viewer, page).await) })
            .await
            .map_err(LazyError::Fetch)
    }

    pub async fn writing_categories(&self) -> CacheResult<Arc<Vec<WritingCategory>>> {
        let registry = self.registry("writing_categories")?;
        let (querier, viewer) = (&self.querier, self.user_id);
        registry
            .writing_categories
            .load(|| async move { many(querier.writing_categories(viewer).await) })
            .await
            .map_err(LazyError::Fetch)
    }

    /// Writing categories the viewer is granted to see. A non-zero `user_id`
    /// keeps only categories holding that user's writings. Cached per user.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn visible_writing_categories(
        &self,
        user_id: i32,
        opts: GetOptions<i32, Arc<Vec<WritingCategory>>>,
    ) -> CacheResult<Arc<Vec<WritingCategory>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("visible_writing_categories")?
            .visible_writing_categories
            .get(
                user_id,
                |id| async move { many(querier.visible_writing_categories(viewer, id).await) },
                opts,
            )
            .await
    }

    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn writing_by_id(
        &self,
        id: i32,
        opts: GetOptions<i32, Option<Arc<Writing>>>,
    ) -> CacheResult<Option<Arc<Writing>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("writing_rows")?
            .writing_rows
            .get(id, |id| async move { one(querier.writing_by_id(viewer, id).await) }, opts)
            .await
    }

    pub async fn current_writing(
        &self,
        opts: GetOptions<i32, Option<Arc<Writing>>>,
    ) -> CacheResult<Option<Arc<Writing>>> {
        match self.selection.writing_id {
            Some(id) => self.writing_by_id(id, opts).await,
            None => Ok(None),
        }
    }

    pub fn current_writing_loaded(&self) -> Option<Arc<Writing>> {
        let id = self.selection.writing_id?;
        self.registry.as_ref()?.writing_rows.peek(&id)?.ok().flatten()
    }

    /// Writings by one writer visible to the viewer.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn writer_writings(
        &self,
        writer_id: i32,
        opts: GetOptions<i32, Arc<Vec<Writing>>>,
    ) -> CacheResult<Arc<Vec<Writing>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("writer_writings")?
            .writer_writings
            .get(
                writer_id,
                |id| async move { many(querier.writings_by_writer(viewer, id).await) },
                opts,
            )
            .await
    }

    /// Public writings in a category, one page from `offset`. Cached per
    /// category and offset.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn public_writings(
        &self,
        category_id: i32,
        offset: i32,
        opts: GetOptions<String, Arc<Vec<Writing>>>,
    ) -> CacheResult<Arc<Vec<Writing>>> {
        let page = self.page(offset).await;
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("public_writings")?
            .public_writings
            .get(
                format!("{category_id}:{offset}"),
                |_| async move {
                    many(
                        querier
                            .public_writings_in_category(viewer, category_id, page)
                            .await,
                    )
                },
                opts,
            )
            .await
    }
}
