//! Link directory and external link accessors.

use std::sync::Arc;

use tracing::{instrument, warn};

use super::{many, one, optional, RequestContext};
use crate::adapters::cache::GetOptions;
use crate::domain::errors::{CacheResult, LazyError};
use crate::domain::models::{ExternalLink, LinkerCategory, LinkerCategoryCount, LinkerItem};
use crate::domain::ports::Querier;

impl<Q: Querier> RequestContext<Q> {
    /// Categories with their listed link counts.
    pub async fn linker_categories(&self) -> CacheResult<Arc<Vec<LinkerCategoryCount>>> {
        let querier = &self.querier;
        self.registry("linker_categories")?
            .linker_categories
            .load(|| async move { many(querier.linker_category_counts().await) })
            .await
            .map_err(LazyError::Fetch)
    }

    /// Every category, in display order.
    pub async fn all_linker_categories(&self) -> CacheResult<Arc<Vec<LinkerCategory>>> {
        let querier = &self.querier;
        self.registry("linker_cats_all")?
            .linker_cats_all
            .load(|| async move { many(querier.linker_categories().await) })
            .await
            .map_err(LazyError::Fetch)
    }

    /// Categories the viewer is granted to see, in display order.
    pub async fn viewer_linker_categories(&self) -> CacheResult<Arc<Vec<LinkerCategory>>> {
        let (querier, viewer) = (&self.querier, self.user_id);
        self.registry("linker_cats_for_user")?
            .linker_cats_for_user
            .load(|| async move { many(querier.linker_categories_for_viewer(viewer).await) })
            .await
            .map_err(LazyError::Fetch)
    }

    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn linker_category_by_id(
        &self,
        id: i32,
        opts: GetOptions<i32, Option<Arc<LinkerCategory>>>,
    ) -> CacheResult<Option<Arc<LinkerCategory>>> {
        let querier = &self.querier;
        self.registry("linker_category_rows")?
            .linker_category_rows
            .get(id, |id| async move { one(querier.linker_category_by_id(id).await) }, opts)
            .await
    }

    /// Listed links of one category, newest first.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn linker_links_by_category(
        &self,
        category_id: i32,
        opts: GetOptions<i32, Arc<Vec<LinkerItem>>>,
    ) -> CacheResult<Arc<Vec<LinkerItem>>> {
        let querier = &self.querier;
        self.registry("linker_category_links")?
            .linker_category_links
            .get(
                category_id,
                |id| async move { many(querier.linker_items_by_category(id).await) },
                opts,
            )
            .await
    }

    /// Any link item, listed or queued, for the administration pages.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn admin_linker_item_by_id(
        &self,
        id: i32,
        opts: GetOptions<i32, Option<Arc<LinkerItem>>>,
    ) -> CacheResult<Option<Arc<LinkerItem>>> {
        let querier = &self.querier;
        self.registry("admin_linker_item_rows")?
            .admin_linker_item_rows
            .get(id, |id| async move { one(querier.linker_item_by_id(id).await) }, opts)
            .await
    }

    pub async fn selected_admin_linker_item(
        &self,
        opts: GetOptions<i32, Option<Arc<LinkerItem>>>,
    ) -> CacheResult<Option<Arc<LinkerItem>>> {
        match self.selection.linker_item_id {
            Some(id) => self.admin_linker_item_by_id(id, opts).await,
            None => Ok(None),
        }
    }

    /// Tracking row for an outbound URL. Failures are logged and yield `None`.
    pub async fn external_link(&self, url: &str) -> Option<Arc<ExternalLink>> {
        let registry = self.registry("external_links").ok()?;
        let querier = &self.querier;
        let result = registry
            .external_links
            .get(
                url.to_string(),
                |url| async move { optional(querier.external_link_by_url(&url).await) },
                GetOptions::new(),
            )
            .await;
        result.unwrap_or_else(|e| {
            warn!(request_id = %self.request_id, url, error = %e, "external link lookup failed");
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryQuerier;
    use crate::domain::errors::StoreError;
    use crate::domain::models::{Config, Grant};
    use chrono::Utc;

    fn item(id: i32, category_id: i32, listed: bool) -> LinkerItem {
        LinkerItem {
            id,
            category_id,
            category_title: format!("category {category_id}"),
            poster: "alice".into(),
            title: format!("link {id}"),
            url: format!("https://example.org/{id}"),
            description: String::new(),
            listed: listed.then(Utc::now),
        }
    }

    async fn seeded() -> Arc<InMemoryQuerier> {
        let querier = Arc::new(InMemoryQuerier::new());
        querier
            .update(|t| {
                t.linker_categories = vec![
                    LinkerCategory {
                        id: 1,
                        title: "Tools".into(),
                        sort_order: 2,
                    },
                    LinkerCategory {
                        id: 2,
                        title: "Games".into(),
                        sort_order: 1,
                    },
                ];
                t.linker_items = vec![item(1, 1, true), item(2, 1, false), item(3, 2, true)];
                t.grants.push(Grant {
                    id: 1,
                    user_id: Some(4),
                    role_id: None,
                    section: "linker".into(),
                    item: Some("category".into()),
                    item_id: Some(1),
                    action: "see".into(),
                    active: true,
                });
                t.external_links.push(ExternalLink {
                    id: 1,
                    url: "https://example.org/1".into(),
                    clicks: 3,
                    card_title: None,
                    card_image: None,
                });
            })
            .await;
        querier
    }

    fn context(querier: &Arc<InMemoryQuerier>) -> RequestContext<InMemoryQuerier> {
        viewer_context(querier, 0)
    }

    fn viewer_context(querier: &Arc<InMemoryQuerier>, user_id: i32) -> RequestContext<InMemoryQuerier> {
        RequestContext::new(Arc::clone(querier), Arc::new(Config::default()), user_id)
    }

    #[tokio::test]
    async fn test_category_counts_only_listed() {
        let querier = seeded().await;
        let counts = context(&querier).linker_categories().await.unwrap();

        assert_eq!(counts[0].title, "Games");
        assert_eq!(counts[1].link_count, 1);
    }

    #[tokio::test]
    async fn test_admin_item_sees_unlisted() {
        let querier = seeded().await;
        let ctx = context(&querier);

        assert_eq!(ctx.linker_links_by_category(1, GetOptions::new()).await.unwrap().len(), 1);
        assert!(ctx.admin_linker_item_by_id(2, GetOptions::new()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_external_link_lenient_and_cached() {
        let querier = seeded().await;
        let ctx = context(&querier);

        assert_eq!(ctx.external_link("https://example.org/1").await.map(|l| l.clicks), Some(3));
        assert!(ctx.external_link("https://unknown.example").await.is_none());
        ctx.external_link("https://example.org/1").await;
        assert_eq!(querier.calls("external_link_by_url"), 2);

        querier.fail("external_link_by_url", StoreError::Unavailable("down".into()));
        assert!(context(&querier).external_link("https://example.org/1").await.is_none());
    }

    #[tokio::test]
    async fn test_all_and_viewer_categories_are_separate_slots() {
        let querier = seeded().await;
        let ctx = viewer_context(&querier, 4);

        let all = ctx.all_linker_categories().await.unwrap();
        assert_eq!(all.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 1]);

        let visible = ctx.viewer_linker_categories().await.unwrap();
        assert_eq!(visible.iter().map(|c| c.title.as_str()).collect::<Vec<_>>(), vec!["Tools"]);
        assert!(context(&querier).viewer_linker_categories().await.unwrap().is_empty());

        ctx.all_linker_categories().await.unwrap();
        ctx.viewer_linker_categories().await.unwrap();
        assert_eq!(querier.calls("linker_categories"), 1);
        assert_eq!(querier.calls("linker_categories_for_viewer"), 2);
    }
}
