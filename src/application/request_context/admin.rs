//! Administration accessors.
//!
//! These read about arbitrary users rather than the viewer. Authorization is
//! the caller's concern.

use std::sync::Arc;

use tracing::instrument;

use super::{many, one, RequestContext};
use crate::adapters::cache::GetOptions;
use crate::domain::errors::{CacheResult, StoreError};
use crate::domain::models::{
    AdminRequest, AdminRequestComment, AdminUserComment, Grant, Permission, RequestStatus,
    UserEmail, UserPostCounts,
};
use crate::domain::ports::Querier;

impl<Q: Querier> RequestContext<Q> {
    /// Roles granted to `user_id`.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn admin_user_roles(
        &self,
        user_id: i32,
        opts: GetOptions<i32, Arc<Vec<Permission>>>,
    ) -> CacheResult<Arc<Vec<Permission>>> {
        let querier = &self.querier;
        self.registry("admin_user_roles")?
            .admin_user_roles
            .get(user_id, |id| async move { many(querier.permissions_by_user(id).await) }, opts)
            .await
    }

    /// Addresses of `user_id`, by notification priority.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn admin_user_emails(
        &self,
        user_id: i32,
        opts: GetOptions<i32, Arc<Vec<UserEmail>>>,
    ) -> CacheResult<Arc<Vec<UserEmail>>> {
        let querier = &self.querier;
        self.registry("admin_user_emails")?
            .admin_user_emails
            .get(user_id, |id| async move { many(querier.user_emails(id).await) }, opts)
            .await
    }

    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn admin_user_grants(
        &self,
        user_id: i32,
        opts: GetOptions<i32, Arc<Vec<Grant>>>,
    ) -> CacheResult<Arc<Vec<Grant>>> {
        let querier = &self.querier;
        self.registry("admin_user_grants")?
            .admin_user_grants
            .get(user_id, |id| async move { many(querier.user_grants(id).await) }, opts)
            .await
    }

    /// Content counts for `user_id`.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn admin_user_stats(
        &self,
        user_id: i32,
        opts: GetOptions<i32, UserPostCounts>,
    ) -> CacheResult<UserPostCounts> {
        let querier = &self.querier;
        self.registry("admin_user_stats")?
            .admin_user_stats
            .get(user_id, |id| async move { querier.user_post_counts(id).await }, opts)
            .await
    }

    /// Administrator notes on `user_id`, newest first.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn admin_user_comments(
        &self,
        user_id: i32,
        opts: GetOptions<i32, Arc<Vec<AdminUserComment>>>,
    ) -> CacheResult<Arc<Vec<AdminUserComment>>> {
        let querier = &self.querier;
        self.registry("admin_user_comments")?
            .admin_user_comments
            .get(user_id, |id| async move { many(querier.admin_user_comments(id).await) }, opts)
            .await
    }

    /// Size in bytes of the bookmark list of `user_id`; 0 when they have none.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn admin_user_bookmark_size(&self, user_id: i32, opts: GetOptions<i32, i64>) -> CacheResult<i64> {
        let querier = &self.querier;
        self.registry("admin_user_bookmark_size")?
            .admin_user_bookmark_size
            .get(
                user_id,
                |id| async move {
                    match querier.bookmark_size(id).await {
                        Err(StoreError::NotFound { .. }) => Ok(0),
                        other => other,
                    }
                },
                opts,
            )
            .await
    }

    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn admin_request_by_id(
        &self,
        id: i32,
        opts: GetOptions<i32, Option<Arc<AdminRequest>>>,
    ) -> CacheResult<Option<Arc<AdminRequest>>> {
        let querier = &self.querier;
        self.registry("admin_request")?
            .admin_request
            .get(id, |id| async move { one(querier.admin_request_by_id(id).await) }, opts)
            .await
    }

    pub async fn current_admin_request(
        &self,
        opts: GetOptions<i32, Option<Arc<AdminRequest>>>,
    ) -> CacheResult<Option<Arc<AdminRequest>>> {
        match self.selection.admin_request_id {
            Some(id) => self.admin_request_by_id(id, opts).await,
            None => Ok(None),
        }
    }

    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn admin_request_comments(
        &self,
        request_id: i32,
        opts: GetOptions<i32, Arc<Vec<AdminRequestComment>>>,
    ) -> CacheResult<Arc<Vec<AdminRequestComment>>> {
        let querier = &self.querier;
        self.registry("admin_request_comments")?
            .admin_request_comments
            .get(
                request_id,
                |id| async move { many(querier.admin_request_comments(id).await) },
                opts,
            )
            .await
    }

    /// Requests in one review state, cached per state.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn admin_requests(
        &self,
        status: RequestStatus,
        opts: GetOptions<String, Arc<Vec<AdminRequest>>>,
    ) -> CacheResult<Arc<Vec<AdminRequest>>> {
        let querier = &self.querier;
        self.registry("admin_requests")?
            .admin_requests
            .get(
                status.as_str().to_string(),
                |_| async move { many(querier.admin_requests_by_status(status).await) },
                opts,
            )
            .await
    }

    /// Stored override body for a notification template; empty when the
    /// built-in template applies.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn notification_template_override(
        &self,
        name: &str,
        opts: GetOptions<String, String>,
    ) -> CacheResult<String> {
        let querier = &self.querier;
        self.registry("notification_template_overrides")?
            .notification_template_overrides
            .get(
                name.to_string(),
                |name| async move {
                    match querier.notification_template_override(&name).await {
                        Err(StoreError::NotFound { .. }) => Ok(String::new()),
                        other => other,
                    }
                },
                opts,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryQuerier;
    use crate::domain::errors::LazyError;
    use crate::domain::models::{Bookmarks, Config, User};
    use chrono::{Duration, Utc};

    fn request(id: i32, status: RequestStatus) -> AdminRequest {
        AdminRequest {
            id,
            user_id: 1,
            change_table: "users".into(),
            change_field: "username".into(),
            change_row_id: 1,
            change_value: Some("alicia".into()),
            contact_options: None,
            status,
            created_at: Utc::now(),
        }
    }

    async fn seeded() -> Arc<InMemoryQuerier> {
        let querier = Arc::new(InMemoryQuerier::new());
        querier
            .update(|t| {
                t.users.push(User {
                    id: 1,
                    username: "alice".into(),
                    email: None,
                });
                t.admin_requests = vec![
                    request(1, RequestStatus::Pending),
                    request(2, RequestStatus::Pending),
                    request(3, RequestStatus::Accepted),
                ];
                t.admin_request_comments.push(AdminRequestComment {
                    id: 1,
                    request_id: 1,
                    comment: "checking".into(),
                    created_at: Utc::now(),
                });
                t.template_overrides
                    .insert("reply_email".into(), "Someone replied".into());
                t.bookmarks.push(Bookmarks {
                    id: 1,
                    user_id: 1,
                    list: "Category: Tools\nhttps://example.org Example\n".into(),
                });
                t.admin_user_comments = vec![
                    AdminUserComment {
                        id: 1,
                        user_id: 1,
                        comment: "email association requested".into(),
                        created_at: Utc::now() - Duration::days(1),
                    },
                    AdminUserComment {
                        id: 2,
                        user_id: 1,
                        comment: "verified by phone".into(),
                        created_at: Utc::now(),
                    },
                    AdminUserComment {
                        id: 3,
                        user_id: 2,
                        comment: "other account".into(),
                        created_at: Utc::now(),
                    },
                ];
            })
            .await;
        querier
    }

    fn context(querier: &Arc<InMemoryQuerier>) -> RequestContext<InMemoryQuerier> {
        RequestContext::new(Arc::clone(querier), Arc::new(Config::default()), 1)
    }

    #[tokio::test]
    async fn test_requests_cached_per_status() {
        let querier = seeded().await;
        let ctx = context(&querier);

        assert_eq!(ctx.admin_requests(RequestStatus::Pending, GetOptions::new()).await.unwrap().len(), 2);
        assert_eq!(ctx.admin_requests(RequestStatus::Accepted, GetOptions::new()).await.unwrap().len(), 1);
        assert_eq!(ctx.admin_requests(RequestStatus::Pending, GetOptions::new()).await.unwrap().len(), 2);
        assert_eq!(querier.calls("admin_requests_by_status"), 2);
        assert_eq!(ctx.admin_request_comments(1, GetOptions::new()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_template_override_defaults_to_empty() {
        let querier = seeded().await;
        let ctx = context(&querier);

        assert_eq!(
            ctx.notification_template_override("reply_email", GetOptions::new()).await,
            Ok("Someone replied".to_string())
        );
        assert_eq!(
            ctx.notification_template_override("missing", GetOptions::new()).await,
            Ok(String::new())
        );
    }

    #[tokio::test]
    async fn test_user_stats_and_nil_registry() {
        let querier = seeded().await;
        let mut ctx = context(&querier);

        assert_eq!(ctx.admin_user_stats(1, GetOptions::new()).await.unwrap().user_id, 1);
        ctx.finish();
        assert_eq!(
            ctx.admin_user_stats(1, GetOptions::new()).await,
            Err(LazyError::NilRegistry("admin_user_stats"))
        );
    }

    #[tokio::test]
    async fn test_user_comments_newest_first_per_user() {
        let querier = seeded().await;
        let ctx = context(&querier);

        let comments = ctx.admin_user_comments(1, GetOptions::new()).await.unwrap();
        assert_eq!(comments.iter().map(|c| c.id).collect::<Vec<_>>(), vec![2, 1]);
        assert!(ctx.admin_user_comments(3, GetOptions::new()).await.unwrap().is_empty());
        ctx.admin_user_comments(1, GetOptions::new()).await.unwrap();
        assert_eq!(querier.calls("admin_user_comments"), 2);
    }

    #[tokio::test]
    async fn test_bookmark_size_defaults_to_zero() {
        let querier = seeded().await;
        let ctx = context(&querier);

        let expected = i64::try_from("Category: Tools\nhttps://example.org Example\n".len()).unwrap();
        assert_eq!(ctx.admin_user_bookmark_size(1, GetOptions::new()).await, Ok(expected));
        assert_eq!(ctx.admin_user_bookmark_size(2, GetOptions::new()).await, Ok(0));

        querier.fail("bookmark_size", StoreError::Unavailable("down".into()));
        assert_eq!(
            context(&querier).admin_user_bookmark_size(1, GetOptions::new()).await,
            Err(LazyError::Fetch(StoreError::Unavailable("down".into())))
        );
    }
}
