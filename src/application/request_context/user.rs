//! Viewer, preference, role and notification accessors.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{instrument, warn};

use super::{into_store_error, many, one, optional, RequestContext};
use crate::adapters::cache::GetOptions;
use crate::domain::errors::{CacheResult, LazyError};
use crate::domain::models::{
    Bookmarks, Language, Notification, Permission, Preference, Role, Subscription, User,
    ANYONE_ROLE,
};
use crate::domain::ports::Querier;

impl<Q: Querier> RequestContext<Q> {
    /// The signed-in user, `None` for anonymous viewers.
    pub async fn current_user(&self) -> CacheResult<Option<Arc<User>>> {
        let registry = self.registry("user")?;
        let (querier, user_id) = (&self.querier, self.user_id);
        registry
            .user
            .load(|| async move {
                if user_id == 0 {
                    return Ok(None);
                }
                one(querier.user_by_id(user_id).await)
            })
            .await
            .map_err(LazyError::Fetch)
    }

    /// Any user by id.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn user_by_id(
        &self,
        id: i32,
        opts: GetOptions<i32, Option<Arc<User>>>,
    ) -> CacheResult<Option<Arc<User>>> {
        let querier = &self.querier;
        self.registry("users")?
            .users
            .get(id, |id| async move { one(querier.user_by_id(id).await) }, opts)
            .await
    }

    pub async fn permissions(&self) -> CacheResult<Arc<Vec<Permission>>> {
        let registry = self.registry("perms")?;
        let (querier, user_id) = (&self.querier, self.user_id);
        registry
            .perms
            .load(|| async move {
                if user_id == 0 {
                    return Ok(Arc::new(Vec::new()));
                }
                many(querier.permissions_by_user(user_id).await)
            })
            .await
            .map_err(LazyError::Fetch)
    }

    /// The viewer's preference row; `None` when they never saved one.
    pub async fn preference(&self) -> CacheResult<Option<Arc<Preference>>> {
        let registry = self.registry("pref")?;
        let (querier, user_id) = (&self.querier, self.user_id);
        registry
            .pref
            .load(|| async move {
                if user_id == 0 {
                    return Ok(None);
                }
                optional(querier.preference_by_user(user_id).await)
            })
            .await
            .map_err(LazyError::Fetch)
    }

    pub async fn languages(&self) -> CacheResult<Arc<Vec<Language>>> {
        let querier = &self.querier;
        self.registry("langs")?
            .langs
            .load(|| async move { many(querier.languages().await) })
            .await
            .map_err(LazyError::Fetch)
    }

    /// Language the viewer reads in: their preference, else the site default
    /// language, else 0. Failures are logged and yield 0.
    pub async fn preferred_language_id(&self) -> i32 {
        let Ok(registry) = self.registry("preferred_language_id") else {
            return 0;
        };
        let result = registry
            .preferred_language_id
            .load(|| async {
                if let Some(id) = self.preference().await.ok().flatten().and_then(|p| p.language_id) {
                    return Ok(id);
                }
                let default_name = &self.config.site.default_language;
                let langs = self.languages().await.map_err(into_store_error)?;
                Ok(langs
                    .iter()
                    .find(|l| &l.name == default_name)
                    .map_or(0, |l| l.id))
            })
            .await;
        result.unwrap_or_else(|e| {
            warn!(request_id = %self.request_id, error = %e, "preferred language lookup failed");
            0
        })
    }

    pub async fn all_roles(&self) -> CacheResult<Arc<Vec<Role>>> {
        let querier = &self.querier;
        self.registry("all_roles")?
            .all_roles
            .load(|| async move { many(querier.roles().await) })
            .await
            .map_err(LazyError::Fetch)
    }

    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn role_by_id(
        &self,
        id: i32,
        opts: GetOptions<i32, Option<Arc<Role>>>,
    ) -> CacheResult<Option<Arc<Role>>> {
        let querier = &self.querier;
        self.registry("role_rows")?
            .role_rows
            .get(id, |id| async move { one(querier.role_by_id(id).await) }, opts)
            .await
    }

    /// Role names the viewer holds, always including [`ANYONE_ROLE`].
    pub async fn user_roles(&self) -> CacheResult<Arc<Vec<String>>> {
        let registry = self.registry("user_roles")?;
        registry
            .user_roles
            .load(|| async {
                let perms = self.permissions().await.map_err(into_store_error)?;
                let mut roles = vec![ANYONE_ROLE.to_string()];
                for perm in perms.iter() {
                    if !roles.contains(&perm.role) {
                        roles.push(perm.role.clone());
                    }
                }
                Ok(Arc::new(roles))
            })
            .await
            .map_err(LazyError::Fetch)
    }

    /// Whether the viewer holds `role`. Lookup failures count as no.
    pub async fn has_role(&self, role: &str) -> bool {
        self.user_roles()
            .await
            .is_ok_and(|roles| roles.iter().any(|r| r == role))
    }

    pub async fn bookmarks(&self) -> CacheResult<Option<Arc<Bookmarks>>> {
        let registry = self.registry("bookmarks")?;
        let (querier, user_id) = (&self.querier, self.user_id);
        registry
            .bookmarks
            .load(|| async move {
                if user_id == 0 {
                    return Ok(None);
                }
                optional(querier.bookmarks_by_user(user_id).await)
            })
            .await
            .map_err(LazyError::Fetch)
    }

    pub async fn notification_count(&self) -> CacheResult<i32> {
        let registry = self.registry("notification_count")?;
        let (querier, user_id) = (&self.querier, self.user_id);
        registry
            .notification_count
            .load(|| async move {
                if user_id == 0 {
                    return Ok(0);
                }
                querier.notification_count(user_id).await
            })
            .await
            .map_err(LazyError::Fetch)
    }

    /// Unread notifications for the viewer. Failures are logged and yield 0.
    pub async fn unread_count(&self) -> i64 {
        let Ok(registry) = self.registry("unread_count") else {
            return 0;
        };
        let (querier, user_id) = (&self.querier, self.user_id);
        let result = registry
            .unread_count
            .load(|| async move {
                if user_id == 0 {
                    return Ok(0);
                }
                querier.unread_notification_count(user_id).await
            })
            .await;
        result.unwrap_or_else(|e| {
            warn!(request_id = %self.request_id, error = %e, "unread notification count failed");
            0
        })
    }

    /// One page of the viewer's notifications starting at `offset`.
    #[instrument(skip(self, opts), fields(request_id = %self.request_id))]
    pub async fn notifications(
        &self,
        offset: i32,
        opts: GetOptions<String, Arc<Vec<Notification>>>,
    ) -> CacheResult<Arc<Vec<Notification>>> {
        let page = self.page(offset).await;
        let (querier, user_id) = (&self.querier, self.user_id);
        self.registry("notifications")?
            .notifications
            .get(
                format!("{}:{}", page.limit, page.offset),
                |_| async move {
                    if user_id == 0 {
                        return Ok(Arc::new(Vec::new()));
                    }
                    many(querier.notifications_by_user(user_id, page).await)
                },
                opts,
            )
            .await
    }

    pub async fn subscription_rows(&self) -> CacheResult<Arc<Vec<Subscription>>> {
        let registry = self.registry("subscription_rows")?;
        let (querier, user_id) = (&self.querier, self.user_id);
        registry
            .subscription_rows
            .load(|| async move {
                if user_id == 0 {
                    return Ok(Arc::new(Vec::new()));
                }
                many(querier.subscriptions_by_user(user_id).await)
            })
            .await
            .map_err(LazyError::Fetch)
    }

    /// Subscription keys (`"{method}:{pattern}"`) of the viewer.
    pub async fn subscriptions(&self) -> CacheResult<Arc<HashSet<String>>> {
        let registry = self.registry("subscriptions")?;
        registry
            .subscriptions
            .load(|| async {
                let rows = self.subscription_rows().await.map_err(into_store_error)?;
                Ok(Arc::new(rows.iter().map(Subscription::key).collect()))
            })
            .await
            .map_err(LazyError::Fetch)
    }

    /// The viewer's subscriptions as listed on their settings page.
    pub async fn user_subscriptions(&self) -> CacheResult<Arc<Vec<Subscription>>> {
        let registry = self.registry("user_subscriptions")?;
        let (querier, user_id) = (&self.querier, self.user_id);
        registry
            .user_subscriptions
            .load(|| async move {
                if user_id == 0 {
                    return Ok(Arc::new(Vec::new()));
                }
                many(querier.subscriptions_by_user(user_id).await)
            })
            .await
            .map_err(LazyError::Fetch)
    }

    pub async fn is_subscribed(&self, method: &str, pattern: &str) -> bool {
        self.subscriptions()
            .await
            .is_ok_and(|subs| subs.contains(&format!("{method}:{pattern}")))
    }
}
