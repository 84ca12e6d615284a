use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::trace;

use super::tables::Tables;
use crate::domain::errors::{StoreError, StoreResult};
use crate::domain::models::{
    AdminRequest, AdminRequestComment, AdminUserComment, Announcement, BlogEntry, Blogger,
    Bookmarks, ExternalLink, Faq, FaqCategory, ForumCategory, ForumComment, ForumThread,
    ForumTopic, Grant, ImageBoard, ImagePost, Language, LinkerCategory, LinkerCategoryCount,
    LinkerItem, NewsPost, Notification, Permission, Preference, RequestStatus, Role,
    SiteAnnouncement, Subscription, User, UserEmail, UserPostCounts, Writer, Writing,
    WritingCategory, PRIVATE_FORUM_CATEGORY_ID,
};
use crate::domain::ports::{Page, Querier};

/// Store double over in-memory [`Tables`].
pub struct InMemoryQuerier {
    tables: RwLock<Tables>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failures: Mutex<HashMap<&'static str, StoreError>>,
    latency: Option<Duration>,
}

impl InMemoryQuerier {
    pub fn new() -> Self {
        Self::with_tables(Tables::default())
    }

    pub fn with_tables(tables: Tables) -> Self {
        Self {
            tables: RwLock::new(tables),
            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            latency: None,
        }
    }

    /// Delay every query by `latency` before it reads the tables.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Mutate the tables in place.
    pub async fn update(&self, f: impl FnOnce(&mut Tables)) {
        let mut tables = self.tables.write().await;
        f(&mut tables);
    }

    /// Make every call to `method` fail with `error` until [`recover`](Self::recover).
    pub fn fail(&self, method: &'static str, error: StoreError) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method, error);
    }

    pub fn recover(&self, method: &'static str) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(method);
    }

    /// How many times `method` was invoked, failed calls included.
    pub fn calls(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    async fn enter(&self, method: &'static str) -> StoreResult<()> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(method)
            .or_insert(0) += 1;
        trace!(method, "in-memory query");

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let injected = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .cloned();
        injected.map_or(Ok(()), Err)
    }
}

impl Default for InMemoryQuerier {
    fn default() -> Self {
        Self::new()
    }
}

fn find<T: Clone>(rows: &[T], entity: &'static str, id: impl ToString, pred: impl Fn(&T) -> bool) -> StoreResult<T> {
    rows.iter()
        .find(|row| pred(row))
        .cloned()
        .ok_or_else(|| StoreError::not_found(entity, id))
}

fn filter<T: Clone>(rows: &[T], pred: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().filter(|row| pred(row)).cloned().collect()
}

#[async_trait]
impl Querier for InMemoryQuerier {
    async fn user_by_id(&self, id: i32) -> StoreResult<User> {
        self.enter("user_by_id").await?;
        let tables = self.tables.read().await;
        find(&tables.users, "user", id, |u| u.id == id)
    }

    async fn permissions_by_user(&self, user_id: i32) -> StoreResult<Vec<Permission>> {
        self.enter("permissions_by_user").await?;
        let tables = self.tables.read().await;
        Ok(filter(&tables.permissions, |p| p.user_id == user_id))
    }

    async fn preference_by_user(&self, user_id: i32) -> StoreResult<Preference> {
        self.enter("preference_by_user").await?;
        let tables = self.tables.read().await;
        find(&tables.preferences, "preference", user_id, |p| p.user_id == user_id)
    }

    async fn languages(&self) -> StoreResult<Vec<Language>> {
        self.enter("languages").await?;
        Ok(self.tables.read().await.languages.clone())
    }

    async fn roles(&self) -> StoreResult<Vec<Role>> {
        self.enter("roles").await?;
        Ok(self.tables.read().await.roles.clone())
    }

    async fn role_by_id(&self, id: i32) -> StoreResult<Role> {
        self.enter("role_by_id").await?;
        let tables = self.tables.read().await;
        find(&tables.roles, "role", id, |r| r.id == id)
    }

    async fn bookmarks_by_user(&self, user_id: i32) -> StoreResult<Bookmarks> {
        self.enter("bookmarks_by_user").await?;
        let tables = self.tables.read().await;
        find(&tables.bookmarks, "bookmarks", user_id, |b| b.user_id == user_id)
    }

    async fn subscriptions_by_user(&self, user_id: i32) -> StoreResult<Vec<Subscription>> {
        self.enter("subscriptions_by_user").await?;
        let tables = self.tables.read().await;
        Ok(filter(&tables.subscriptions, |s| s.user_id == user_id))
    }

    async fn notifications_by_user(&self, user_id: i32, page: Page) -> StoreResult<Vec<Notification>> {
        self.enter("notifications_by_user").await?;
        let tables = self.tables.read().await;
        let mut rows = filter(&tables.notifications, |n| n.user_id == user_id);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page.slice(&rows))
    }

    async fn notification_count(&self, user_id: i32) -> StoreResult<i32> {
        self.enter("notification_count").await?;
        let tables = self.tables.read().await;
        let count = tables.notifications.iter().filter(|n| n.user_id == user_id).count();
        i32::try_from(count).map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn unread_notification_count(&self, user_id: i32) -> StoreResult<i64> {
        self.enter("unread_notification_count").await?;
        let tables = self.tables.read().await;
        let count = tables
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.read)
            .count();
        i64::try_from(count).map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn forum_categories(&self, _viewer: i32) -> StoreResult<Vec<ForumCategory>> {
        self.enter("forum_categories").await?;
        Ok(self.tables.read().await.forum_categories.clone())
    }

    async fn topic_by_id(&self, _viewer: i32, id: i32) -> StoreResult<ForumTopic> {
        self.enter("topic_by_id").await?;
        let tables = self.tables.read().await;
        find(&tables.forum_topics, "topic", id, |t| t.id == id)
    }

    async fn topics_by_category(&self, _viewer: i32, category_id: i32) -> StoreResult<Vec<ForumTopic>> {
        self.enter("topics_by_category").await?;
        let tables = self.tables.read().await;
        Ok(filter(&tables.forum_topics, |t| t.category_id == category_id))
    }

    async fn thread_by_id(&self, _viewer: i32, id: i32) -> StoreResult<ForumThread> {
        self.enter("thread_by_id").await?;
        let tables = self.tables.read().await;
        find(&tables.forum_threads, "thread", id, |t| t.id == id)
    }

    async fn threads_by_topic(&self, _viewer: i32, topic_id: i32) -> StoreResult<Vec<ForumThread>> {
        self.enter("threads_by_topic").await?;
        let tables = self.tables.read().await;
        let mut rows = filter(&tables.forum_threads, |t| t.topic_id == topic_id);
        rows.sort_by(|a, b| b.last_addition.cmp(&a.last_addition));
        Ok(rows)
    }

    async fn comment_by_id(&self, _viewer: i32, id: i32) -> StoreResult<ForumComment> {
        self.enter("comment_by_id").await?;
        let tables = self.tables.read().await;
        find(&tables.forum_comments, "comment", id, |c| c.id == id)
    }

    async fn comments_by_thread(&self, _viewer: i32, thread_id: i32) -> StoreResult<Vec<ForumComment>> {
        self.enter("comments_by_thread").await?;
        let tables = self.tables.read().await;
        let mut rows = filter(&tables.forum_comments, |c| c.thread_id == thread_id);
        rows.sort_by_key(|c| c.written);
        Ok(rows)
    }

    async fn private_topics_by_user(&self, user_id: i32) -> StoreResult<Vec<ForumTopic>> {
        self.enter("private_topics_by_user").await?;
        let tables = self.tables.read().await;
        let mut rows = filter(&tables.forum_topics, |t| {
            t.category_id == PRIVATE_FORUM_CATEGORY_ID
                && tables
                    .topic_participants
                    .iter()
                    .any(|p| p.topic_id == t.id && p.user_id == user_id)
        });
        rows.sort_by(|a, b| b.last_addition.cmp(&a.last_addition));
        Ok(rows)
    }

    async fn private_topic_participants(&self, _viewer: i32, topic_id: i32) -> StoreResult<Vec<User>> {
        self.enter("private_topic_participants").await?;
        let tables = self.tables.read().await;
        Ok(filter(&tables.users, |u| {
            tables
                .topic_participants
                .iter()
                .any(|p| p.topic_id == topic_id && p.user_id == u.id)
        }))
    }

    async fn latest_news(&self, _viewer: i32, page: Page) -> StoreResult<Vec<NewsPost>> {
        self.enter("latest_news").await?;
        let tables = self.tables.read().await;
        let mut rows = tables.news.clone();
        rows.sort_by(|a, b| b.occurred.cmp(&a.occurred));
        Ok(page.slice(&rows))
    }

    async fn news_post_by_id(&self, _viewer: i32, id: i32) -> StoreResult<NewsPost> {
        self.enter("news_post_by_id").await?;
        let tables = self.tables.read().await;
        find(&tables.news, "news post", id, |n| n.id == id)
    }

    async fn announcement_for_news(&self, news_id: i32) -> StoreResult<SiteAnnouncement> {
        self.enter("announcement_for_news").await?;
        let tables = self.tables.read().await;
        find(&tables.announcements, "announcement", news_id, |a| a.news_id == news_id)
    }

    async fn active_announcement(&self, _viewer: i32) -> StoreResult<Announcement> {
        self.enter("active_announcement").await?;
        let tables = self.tables.read().await;
        let latest = tables
            .announcements
            .iter()
            .filter(|a| a.active)
            .max_by_key(|a| a.created_at)
            .ok_or_else(|| StoreError::not_found("announcement", "active"))?;
        let news = find(&tables.news, "news post", latest.news_id, |n| n.id == latest.news_id)?;
        Ok(Announcement {
            id: latest.id,
            news_id: news.id,
            news_text: news.text,
        })
    }

    async fn bloggers(&self, _viewer: i32, page: Page) -> StoreResult<Vec<Blogger>> {
        self.enter("bloggers").await?;
        let tables = self.tables.read().await;
        let mut counts: BTreeMap<i32, i64> = BTreeMap::new();
        for entry in &tables.blog_entries {
            *counts.entry(entry.user_id).or_insert(0) += 1;
        }
        let rows: Vec<Blogger> = counts
            .into_iter()
            .map(|(user_id, entries)| Blogger {
                user_id,
                username: tables.username(user_id),
                entries,
            })
            .collect();
        Ok(page.slice(&rows))
    }

    async fn blog_entry_by_id(&self, _viewer: i32, id: i32) -> StoreResult<BlogEntry> {
        self.enter("blog_entry_by_id").await?;
        let tables = self.tables.read().await;
        find(&tables.blog_entries, "blog entry", id, |b| b.id == id)
    }

    async fn blog_entries(&self, _viewer: i32, page: Page) -> StoreResult<Vec<BlogEntry>> {
        self.enter("blog_entries").await?;
        let tables = self.tables.read().await;
        let mut rows = tables.blog_entries.clone();
        rows.sort_by(|a, b| b.written.cmp(&a.written));
        Ok(page.slice(&rows))
    }

    async fn blog_entries_by_author(
        &self,
        _viewer: i32,
        author_id: i32,
        page: Page,
    ) -> StoreResult<Vec<BlogEntry>> {
        self.enter("blog_entries_by_author").await?;
        let tables = self.tables.read().await;
        let mut rows = filter(&tables.blog_entries, |b| b.user_id == author_id);
        rows.sort_by(|a, b| b.written.cmp(&a.written));
        Ok(page.slice(&rows))
    }

    async fn latest_writings(&self, viewer: i32, page: Page) -> StoreResult<Vec<Writing>> {
        self.enter("latest_writings").await?;
        let tables = self.tables.read().await;
        let mut rows = filter(&tables.writings, |w| Tables::writing_visible(w, viewer));
        rows.sort_by(|a, b| b.published.cmp(&a.published));
        Ok(page.slice(&rows))
    }

    async fn writers(&self, viewer: i32, page: Page) -> StoreResult<Vec<Writer>> {
        self.enter("writers").await?;
        let tables = self.tables.read().await;
        let mut counts: BTreeMap<i32, i64> = BTreeMap::new();
        for writing in tables.writings.iter().filter(|w| Tables::writing_visible(w, viewer)) {
            *counts.entry(writing.user_id).or_insert(0) += 1;
        }
        let rows: Vec<Writer> = counts
            .into_iter()
            .map(|(user_id, writings)| Writer {
                user_id,
                username: tables.username(user_id),
                writings,
            })
            .collect();
        Ok(page.slice(&rows))
    }

    async fn writing_categories(&self, _viewer: i32) -> StoreResult<Vec<WritingCategory>> {
        self.enter("writing_categories").await?;
        Ok(self.tables.read().await.writing_categories.clone())
    }

    async fn visible_writing_categories(&self, viewer: i32, user_id: i32) -> StoreResult<Vec<WritingCategory>> {
        self.enter("visible_writing_categories").await?;
        let tables = self.tables.read().await;
        Ok(filter(&tables.writing_categories, |c| {
            tables.granted(viewer, "writing", "category", "see", c.id)
                && (user_id == 0
                    || tables.writings.iter().any(|w| {
                        w.category_id == c.id
                            && w.user_id == user_id
                            && Tables::writing_visible(w, viewer)
                    }))
        }))
    }

    async fn writing_by_id(&self, viewer: i32, id: i32) -> StoreResult<Writing> {
        self.enter("writing_by_id").await?;
        let tables = self.tables.read().await;
        find(&tables.writings, "writing", id, |w| {
            w.id == id && Tables::writing_visible(w, viewer)
        })
    }

    async fn writings_by_writer(&self, viewer: i32, writer_id: i32) -> StoreResult<Vec<Writing>> {
        self.enter("writings_by_writer").await?;
        let tables = self.tables.read().await;
        Ok(filter(&tables.writings, |w| {
            w.user_id == writer_id && Tables::writing_visible(w, viewer)
        }))
    }

    async fn public_writings_in_category(
        &self,
        _viewer: i32,
        category_id: i32,
        page: Page,
    ) -> StoreResult<Vec<Writing>> {
        self.enter("public_writings_in_category").await?;
        let tables = self.tables.read().await;
        let rows = filter(&tables.writings, |w| w.category_id == category_id && !w.private);
        Ok(page.slice(&rows))
    }

    async fn image_boards(&self) -> StoreResult<Vec<ImageBoard>> {
        self.enter("image_boards").await?;
        Ok(self.tables.read().await.image_boards.clone())
    }

    async fn sub_image_boards(&self, parent_id: i32) -> StoreResult<Vec<ImageBoard>> {
        self.enter("sub_image_boards").await?;
        let tables = self.tables.read().await;
        Ok(filter(&tables.image_boards, |b| b.parent_id == Some(parent_id)))
    }

    async fn image_posts_by_board(&self, _viewer: i32, board_id: i32) -> StoreResult<Vec<ImagePost>> {
        self.enter("image_posts_by_board").await?;
        let tables = self.tables.read().await;
        Ok(filter(&tables.image_posts, |p| p.board_id == board_id && p.approved))
    }

    async fn image_post_by_id(&self, _viewer: i32, id: i32) -> StoreResult<ImagePost> {
        self.enter("image_post_by_id").await?;
        let tables = self.tables.read().await;
        find(&tables.image_posts, "image post", id, |p| p.id == id)
    }

    async fn linker_category_counts(&self) -> StoreResult<Vec<LinkerCategoryCount>> {
        self.enter("linker_category_counts").await?;
        let tables = self.tables.read().await;
        let mut categories = tables.linker_categories.clone();
        categories.sort_by_key(|c| c.sort_order);
        Ok(categories
            .into_iter()
            .map(|c| {
                let listed = tables
                    .linker_items
                    .iter()
                    .filter(|i| i.category_id == c.id && i.listed.is_some())
                    .count();
                LinkerCategoryCount {
                    id: c.id,
                    title: c.title,
                    link_count: i64::try_from(listed).unwrap_or(i64::MAX),
                }
            })
            .collect())
    }

    async fn linker_categories(&self) -> StoreResult<Vec<LinkerCategory>> {
        self.enter("linker_categories").await?;
        let mut rows = self.tables.read().await.linker_categories.clone();
        rows.sort_by_key(|c| c.sort_order);
        Ok(rows)
    }

    async fn linker_categories_for_viewer(&self, viewer: i32) -> StoreResult<Vec<LinkerCategory>> {
        self.enter("linker_categories_for_viewer").await?;
        let tables = self.tables.read().await;
        let mut rows = filter(&tables.linker_categories, |c| {
            tables.granted(viewer, "linker", "category", "see", c.id)
        });
        rows.sort_by_key(|c| c.sort_order);
        Ok(rows)
    }

    async fn linker_category_by_id(&self, id: i32) -> StoreResult<LinkerCategory> {
        self.enter("linker_category_by_id").await?;
        let tables = self.tables.read().await;
        find(&tables.linker_categories, "linker category", id, |c| c.id == id)
    }

    async fn linker_items_by_category(&self, category_id: i32) -> StoreResult<Vec<LinkerItem>> {
        self.enter("linker_items_by_category").await?;
        let tables = self.tables.read().await;
        let mut rows = filter(&tables.linker_items, |i| {
            i.category_id == category_id && i.listed.is_some()
        });
        rows.sort_by(|a, b| b.listed.cmp(&a.listed));
        Ok(rows)
    }

    async fn linker_item_by_id(&self, id: i32) -> StoreResult<LinkerItem> {
        self.enter("linker_item_by_id").await?;
        let tables = self.tables.read().await;
        find(&tables.linker_items, "linker item", id, |i| i.id == id)
    }

    async fn external_link_by_url(&self, url: &str) -> StoreResult<ExternalLink> {
        self.enter("external_link_by_url").await?;
        let tables = self.tables.read().await;
        find(&tables.external_links, "external link", url, |l| l.url == url)
    }

    async fn faq_categories(&self) -> StoreResult<Vec<FaqCategory>> {
        self.enter("faq_categories").await?;
        Ok(self.tables.read().await.faq_categories.clone())
    }

    async fn answered_faqs(&self, _viewer: i32) -> StoreResult<Vec<Faq>> {
        self.enter("answered_faqs").await?;
        let tables = self.tables.read().await;
        Ok(filter(&tables.faqs, Faq::is_answered))
    }

    async fn admin_latest_news(&self, page: Page) -> StoreResult<Vec<NewsPost>> {
        self.enter("admin_latest_news").await?;
        let tables = self.tables.read().await;
        let mut rows = tables.news.clone();
        rows.sort_by(|a, b| b.occurred.cmp(&a.occurred));
        Ok(page.slice(&rows))
    }

    async fn user_emails(&self, user_id: i32) -> StoreResult<Vec<UserEmail>> {
        self.enter("user_emails").await?;
        let tables = self.tables.read().await;
        let mut rows = filter(&tables.user_emails, |e| e.user_id == user_id);
        rows.sort_by_key(|e| e.notification_priority);
        Ok(rows)
    }

    async fn user_grants(&self, user_id: i32) -> StoreResult<Vec<Grant>> {
        self.enter("user_grants").await?;
        let tables = self.tables.read().await;
        Ok(filter(&tables.grants, |g| g.user_id == Some(user_id)))
    }

    async fn user_post_counts(&self, user_id: i32) -> StoreResult<UserPostCounts> {
        self.enter("user_post_counts").await?;
        let tables = self.tables.read().await;
        let count = |n: usize| i64::try_from(n).unwrap_or(i64::MAX);
        Ok(UserPostCounts {
            user_id,
            blogs: count(tables.blog_entries.iter().filter(|b| b.user_id == user_id).count()),
            news: count(tables.news.iter().filter(|n| n.user_id == user_id).count()),
            comments: count(tables.forum_comments.iter().filter(|c| c.user_id == user_id).count()),
            images: count(tables.image_posts.iter().filter(|p| p.user_id == user_id).count()),
            links: {
                let username = tables.username(user_id);
                count(tables.linker_items.iter().filter(|i| i.poster == username).count())
            },
            writings: count(tables.writings.iter().filter(|w| w.user_id == user_id).count()),
        })
    }

    async fn admin_user_comments(&self, user_id: i32) -> StoreResult<Vec<AdminUserComment>> {
        self.enter("admin_user_comments").await?;
        let tables = self.tables.read().await;
        let mut rows = filter(&tables.admin_user_comments, |c| c.user_id == user_id);
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn bookmark_size(&self, user_id: i32) -> StoreResult<i64> {
        self.enter("bookmark_size").await?;
        let tables = self.tables.read().await;
        let bookmarks = find(&tables.bookmarks, "bookmarks", user_id, |b| b.user_id == user_id)?;
        i64::try_from(bookmarks.list.len()).map_err(|e| StoreError::Query(e.to_string()))
    }

    async fn admin_request_by_id(&self, id: i32) -> StoreResult<AdminRequest> {
        self.enter("admin_request_by_id").await?;
        let tables = self.tables.read().await;
        find(&tables.admin_requests, "admin request", id, |r| r.id == id)
    }

    async fn admin_request_comments(&self, request_id: i32) -> StoreResult<Vec<AdminRequestComment>> {
        self.enter("admin_request_comments").await?;
        let tables = self.tables.read().await;
        Ok(filter(&tables.admin_request_comments, |c| c.request_id == request_id))
    }

    async fn admin_requests_by_status(&self, status: RequestStatus) -> StoreResult<Vec<AdminRequest>> {
        self.enter("admin_requests_by_status").await?;
        let tables = self.tables.read().await;
        Ok(filter(&tables.admin_requests, |r| r.status == status))
    }

    async fn notification_template_override(&self, name: &str) -> StoreResult<String> {
        self.enter("notification_template_override").await?;
        let tables = self.tables.read().await;
        tables
            .template_overrides
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::not_found("template override", name))
    }
}
