use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::StoreResult;
use crate::domain::models::{
    AdminRequest, AdminRequestComment, AdminUserComment, Announcement, BlogEntry, Blogger,
    Bookmarks, ExternalLink, Faq, FaqCategory, ForumCategory, ForumComment, ForumThread,
    ForumTopic, Grant, ImageBoard, ImagePost, Language, LinkerCategory, LinkerCategoryCount,
    LinkerItem, NewsPost, Notification, Permission, Preference, RequestStatus, Role,
    SiteAnnouncement, Subscription, User, UserEmail, UserPostCounts, Writer, Writing,
    WritingCategory,
};

/// A window into an ordered listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    pub limit: i32,
    pub offset: i32,
}

impl Page {
    pub const fn new(limit: i32, offset: i32) -> Self {
        Self { limit, offset }
    }

    /// Apply this window to an already ordered listing.
    pub fn slice<T: Clone>(&self, rows: &[T]) -> Vec<T> {
        let offset = usize::try_from(self.offset).unwrap_or(0);
        let limit = usize::try_from(self.limit).unwrap_or(0);
        rows.iter().skip(offset).take(limit).cloned().collect()
    }
}

/// Store port for every query the request facade memoizes.
///
/// `viewer` is the id of the signed-in user (0 for anonymous) for queries
/// whose results depend on who is looking. Single-row lookups return
/// [`StoreError::NotFound`](crate::domain::errors::StoreError::NotFound)
/// when the row does not exist or is not visible.
#[async_trait]
pub trait Querier: Send + Sync {
    // Viewer
    async fn user_by_id(&self, id: i32) -> StoreResult<User>;

    async fn permissions_by_user(&self, user_id: i32) -> StoreResult<Vec<Permission>>;

    async fn preference_by_user(&self, user_id: i32) -> StoreResult<Preference>;

    async fn languages(&self) -> StoreResult<Vec<Language>>;

    async fn roles(&self) -> StoreResult<Vec<Role>>;

    async fn role_by_id(&self, id: i32) -> StoreResult<Role>;

    async fn bookmarks_by_user(&self, user_id: i32) -> StoreResult<Bookmarks>;

    async fn subscriptions_by_user(&self, user_id: i32) -> StoreResult<Vec<Subscription>>;

    async fn notifications_by_user(&self, user_id: i32, page: Page) -> StoreResult<Vec<Notification>>;

    async fn notification_count(&self, user_id: i32) -> StoreResult<i32>;

    async fn unread_notification_count(&self, user_id: i32) -> StoreResult<i64>;

    // Forum
    async fn forum_categories(&self, viewer: i32) -> StoreResult<Vec<ForumCategory>>;

    async fn topic_by_id(&self, viewer: i32, id: i32) -> StoreResult<ForumTopic>;

    async fn topics_by_category(&self, viewer: i32, category_id: i32) -> StoreResult<Vec<ForumTopic>>;

    async fn thread_by_id(&self, viewer: i32, id: i32) -> StoreResult<ForumThread>;

    async fn threads_by_topic(&self, viewer: i32, topic_id: i32) -> StoreResult<Vec<ForumThread>>;

    async fn comment_by_id(&self, viewer: i32, id: i32) -> StoreResult<ForumComment>;

    async fn comments_by_thread(&self, viewer: i32, thread_id: i32) -> StoreResult<Vec<ForumComment>>;

    /// Private topics `user_id` takes part in, most recently active first.
    async fn private_topics_by_user(&self, user_id: i32) -> StoreResult<Vec<ForumTopic>>;

    async fn private_topic_participants(&self, viewer: i32, topic_id: i32) -> StoreResult<Vec<User>>;

    // News
    async fn latest_news(&self, viewer: i32, page: Page) -> StoreResult<Vec<NewsPost>>;

    async fn news_post_by_id(&self, viewer: i32, id: i32) -> StoreResult<NewsPost>;

    async fn announcement_for_news(&self, news_id: i32) -> StoreResult<SiteAnnouncement>;

    async fn active_announcement(&self, viewer: i32) -> StoreResult<Announcement>;

    // Blogs
    async fn bloggers(&self, viewer: i32, page: Page) -> StoreResult<Vec<Blogger>>;

    async fn blog_entry_by_id(&self, viewer: i32, id: i32) -> StoreResult<BlogEntry>;

    /// Entries of every author, newest first.
    async fn blog_entries(&self, viewer: i32, page: Page) -> StoreResult<Vec<BlogEntry>>;

    async fn blog_entries_by_author(
        &self,
        viewer: i32,
        author_id: i32,
        page: Page,
    ) -> StoreResult<Vec<BlogEntry>>;

    // Writings
    async fn latest_writings(&self, viewer: i32, page: Page) -> StoreResult<Vec<Writing>>;

    async fn writers(&self, viewer: i32, page: Page) -> StoreResult<Vec<Writer>>;

    async fn writing_categories(&self, viewer: i32) -> StoreResult<Vec<WritingCategory>>;

    /// Categories `viewer` is granted to see. A non-zero `user_id` narrows
    /// them to categories holding that user's writings.
    async fn visible_writing_categories(&self, viewer: i32, user_id: i32) -> StoreResult<Vec<WritingCategory>>;

    async fn writing_by_id(&self, viewer: i32, id: i32) -> StoreResult<Writing>;

    async fn writings_by_writer(&self, viewer: i32, writer_id: i32) -> StoreResult<Vec<Writing>>;

    async fn public_writings_in_category(
        &self,
        viewer: i32,
        category_id: i32,
        page: Page,
    ) -> StoreResult<Vec<Writing>>;

    // Image boards
    async fn image_boards(&self) -> StoreResult<Vec<ImageBoard>>;

    async fn sub_image_boards(&self, parent_id: i32) -> StoreResult<Vec<ImageBoard>>;

    async fn image_posts_by_board(&self, viewer: i32, board_id: i32) -> StoreResult<Vec<ImagePost>>;

    async fn image_post_by_id(&self, viewer: i32, id: i32) -> StoreResult<ImagePost>;

    // Linker
    async fn linker_category_counts(&self) -> StoreResult<Vec<LinkerCategoryCount>>;

    async fn linker_categories(&self) -> StoreResult<Vec<LinkerCategory>>;

    async fn linker_categories_for_viewer(&self, viewer: i32) -> StoreResult<Vec<LinkerCategory>>;

    async fn linker_category_by_id(&self, id: i32) -> StoreResult<LinkerCategory>;

    async fn linker_items_by_category(&self, category_id: i32) -> StoreResult<Vec<LinkerItem>>;

    async fn linker_item_by_id(&self, id: i32) -> StoreResult<LinkerItem>;

    async fn external_link_by_url(&self, url: &str) -> StoreResult<ExternalLink>;

    // FAQ
    async fn faq_categories(&self) -> StoreResult<Vec<FaqCategory>>;

    async fn answered_faqs(&self, viewer: i32) -> StoreResult<Vec<Faq>>;

    // Administration
    async fn admin_latest_news(&self, page: Page) -> StoreResult<Vec<NewsPost>>;

    async fn user_emails(&self, user_id: i32) -> StoreResult<Vec<UserEmail>>;

    async fn user_grants(&self, user_id: i32) -> StoreResult<Vec<Grant>>;

    async fn user_post_counts(&self, user_id: i32) -> StoreResult<UserPostCounts>;

    /// Administrator notes on `user_id`, newest first.
    async fn admin_user_comments(&self, user_id: i32) -> StoreResult<Vec<AdminUserComment>>;

    /// Length in bytes of the user's bookmark list.
    async fn bookmark_size(&self, user_id: i32) -> StoreResult<i64>;

    async fn admin_request_by_id(&self, id: i32) -> StoreResult<AdminRequest>;

    async fn admin_request_comments(&self, request_id: i32) -> StoreResult<Vec<AdminRequestComment>>;

    async fn admin_requests_by_status(&self, status: RequestStatus) -> StoreResult<Vec<AdminRequest>>;

    async fn notification_template_override(&self, name: &str) -> StoreResult<String>;
}
