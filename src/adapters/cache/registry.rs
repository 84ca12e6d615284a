//! Request-scoped aggregate of cache slots.
//!
//! Every accessor on the request facade owns exactly one slot here. Slots
//! never share cells: sticky errors and refreshes are per slot.

use std::collections::HashSet;
use std::convert::Infallible;
use std::sync::Arc;

use super::{AsyncMap, AsyncValue, CacheStats, Value};
use crate::domain::errors::StoreError;
use crate::domain::models::{
    AdminRequest, AdminRequestComment, AdminUserComment, Announcement, BlogEntry, Blogger,
    Bookmarks, CacheConfig, CategoryFaqs, ExternalLink, FaqCategory, ForumCategory, ForumComment,
    ForumThread, ForumTopic, Grant, ImageBoard, ImagePost, Language, LinkerCategory,
    LinkerCategoryCount, LinkerItem, NewsPost, Notification, Permission, Preference, PrivateTopic,
    Role, SiteAnnouncement, Subscription, User, UserEmail, UserPostCounts, Writer, Writing,
    WritingCategory,
};

macro_rules! cache_registry {
    (
        cells { $( $cell:ident : $cell_ty:ty, )* }
        values { $( $value:ident : $value_ty:ty, )* }
        maps { $( $map:ident : $key_ty:ty => $map_ty:ty, )* }
    ) => {
        /// One lazy slot per facade accessor.
        ///
        /// Singleton cells load once per request; maps hold one cell per key.
        /// Store-backed slots fail with [`StoreError`]; in-process values
        /// cannot fail.
        #[derive(Debug)]
        pub struct CacheRegistry {
            $( pub $cell: AsyncValue<$cell_ty, StoreError>, )*
            $( pub $value: Value<$value_ty, Infallible>, )*
            $( pub $map: AsyncMap<$key_ty, $map_ty, StoreError>, )*
        }

        impl CacheRegistry {
            /// Names of every slot, as accepted in `policy_overrides`.
            pub const SLOT_NAMES: &'static [&'static str] = &[
                $( stringify!($cell), )*
                $( stringify!($value), )*
                $( stringify!($map), )*
            ];

            /// Build an empty registry, resolving each slot's error policy.
            pub fn new(config: &CacheConfig) -> Self {
                Self {
                    $( $cell: AsyncValue::with_policy(config.policy_for(stringify!($cell))), )*
                    $( $value: Value::with_policy(config.policy_for(stringify!($value))), )*
                    $( $map: AsyncMap::with_policy(config.policy_for(stringify!($map))), )*
                }
            }

            /// Merged statistics of every keyed slot.
            pub fn stats(&self) -> CacheStats {
                let stats = CacheStats::default();
                $( let stats = stats.merge(self.$map.stats()); )*
                stats
            }

            /// Drop every cell of every keyed slot. Returns how many were
            /// removed. Singleton cells keep their value until teardown.
            pub fn invalidate_all(&self) -> usize {
                0 $( + self.$map.clear_all() )*
            }

            /// Number of singleton slots that hold a result.
            pub fn loaded_cells(&self) -> usize {
                0 $( + usize::from(self.$cell.is_loaded()) )*
                  $( + usize::from(self.$value.is_loaded()) )*
            }
        }
    };
}

cache_registry! {
    cells {
        user: Option<Arc<User>>,
        perms: Arc<Vec<Permission>>,
        pref: Option<Arc<Preference>>,
        preferred_language_id: i32,
        langs: Arc<Vec<Language>>,
        all_roles: Arc<Vec<Role>>,
        user_roles: Arc<Vec<String>>,
        announcement: Option<Arc<Announcement>>,
        forum_categories: Arc<Vec<ForumCategory>>,
        private_forum_topics: Arc<Vec<PrivateTopic>>,
        image_boards: Arc<Vec<ImageBoard>>,
        latest_news: Arc<Vec<NewsPost>>,
        latest_writings: Arc<Vec<Writing>>,
        bloggers: Arc<Vec<Blogger>>,
        writers: Arc<Vec<Writer>>,
        writing_categories: Arc<Vec<WritingCategory>>,
        linker_categories: Arc<Vec<LinkerCategoryCount>>,
        linker_cats_all: Arc<Vec<LinkerCategory>>,
        linker_cats_for_user: Arc<Vec<LinkerCategory>>,
        faq_categories: Arc<Vec<FaqCategory>>,
        all_answered_faq: Arc<Vec<CategoryFaqs>>,
        bookmarks: Option<Arc<Bookmarks>>,
        notification_count: i32,
        unread_count: i64,
        subscription_rows: Arc<Vec<Subscription>>,
        subscriptions: Arc<HashSet<String>>,
        user_subscriptions: Arc<Vec<Subscription>>,
        admin_latest_news: Arc<Vec<NewsPost>>,
        selected_thread_can_reply: bool,
        blog_list_rows: Arc<Vec<BlogEntry>>,
        blog_list_by_author_rows: Arc<Vec<BlogEntry>>,
    }
    values {
        absolute_url_base: String,
    }
    maps {
        forum_thread_rows: i32 => Option<Arc<ForumThread>>,
        forum_topics: i32 => Option<Arc<ForumTopic>>,
        forum_topic_lists: i32 => Arc<Vec<ForumTopic>>,
        forum_threads: i32 => Arc<Vec<ForumThread>>,
        forum_comments: i32 => Option<Arc<ForumComment>>,
        thread_comments: i32 => Arc<Vec<ForumComment>>,
        news_posts: i32 => Option<Arc<NewsPost>>,
        news_announcements: i32 => Option<Arc<SiteAnnouncement>>,
        blog_entries: i32 => Option<Arc<BlogEntry>>,
        writing_rows: i32 => Option<Arc<Writing>>,
        writer_writings: i32 => Arc<Vec<Writing>>,
        public_writings: String => Arc<Vec<Writing>>,
        visible_writing_categories: i32 => Arc<Vec<WritingCategory>>,
        image_board_posts: i32 => Arc<Vec<ImagePost>>,
        image_post_rows: i32 => Option<Arc<ImagePost>>,
        sub_image_boards: i32 => Arc<Vec<ImageBoard>>,
        linker_category_rows: i32 => Option<Arc<LinkerCategory>>,
        linker_category_links: i32 => Arc<Vec<LinkerItem>>,
        admin_linker_item_rows: i32 => Option<Arc<LinkerItem>>,
        external_links: String => Option<Arc<ExternalLink>>,
        notifications: String => Arc<Vec<Notification>>,
        users: i32 => Option<Arc<User>>,
        role_rows: i32 => Option<Arc<Role>>,
        admin_user_roles: i32 => Arc<Vec<Permission>>,
        admin_user_emails: i32 => Arc<Vec<UserEmail>>,
        admin_user_grants: i32 => Arc<Vec<Grant>>,
        admin_user_stats: i32 => UserPostCounts,
        admin_user_comments: i32 => Arc<Vec<AdminUserComment>>,
        admin_user_bookmark_size: i32 => i64,
        admin_request: i32 => Option<Arc<AdminRequest>>,
        admin_request_comments: i32 => Arc<Vec<AdminRequestComment>>,
        admin_requests: String => Arc<Vec<AdminRequest>>,
        notification_template_overrides: String => String,
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::{ErrorPolicy, GetOptions};

    #[test]
    fn test_slot_names_are_unique() {
        let names: HashSet<_> = CacheRegistry::SLOT_NAMES.iter().collect();
        assert_eq!(names.len(), CacheRegistry::SLOT_NAMES.len());
        assert_eq!(CacheRegistry::SLOT_NAMES.len(), 65);
        assert!(names.contains(&"absolute_url_base"));
        assert!(names.contains(&"forum_thread_rows"));
        assert!(names.contains(&"blog_list_rows"));
        assert!(names.contains(&"blog_list_by_author_rows"));
    }

    #[test]
    fn test_policy_overrides_apply_per_slot() {
        let mut config = CacheConfig::default();
        config
            .policy_overrides
            .insert("unread_count".to_string(), ErrorPolicy::RetryOnNextCall);
        config
            .policy_overrides
            .insert("forum_topics".to_string(), ErrorPolicy::RetryOnNextCall);

        let registry = CacheRegistry::new(&config);
        assert_eq!(registry.unread_count.policy(), ErrorPolicy::RetryOnNextCall);
        assert_eq!(registry.forum_topics.policy(), ErrorPolicy::RetryOnNextCall);
        assert_eq!(registry.forum_threads.policy(), ErrorPolicy::CacheErrors);
        assert_eq!(registry.user.policy(), ErrorPolicy::CacheErrors);
    }

    #[tokio::test]
    async fn test_stats_and_invalidate_all() {
        let registry = CacheRegistry::default();
        for id in 1..=3 {
            registry
                .forum_topic_lists
                .get(id, |_| async { Ok(Arc::new(Vec::new())) }, GetOptions::new())
                .await
                .unwrap();
        }
        registry
            .users
            .get(1, |_| async { Err(StoreError::not_found("user", 1)) }, GetOptions::new())
            .await
            .unwrap_err();

        let stats = registry.stats();
        assert_eq!(stats.fetches, 4);
        assert_eq!(stats.failures, 1);

        assert_eq!(registry.invalidate_all(), 4);
        assert!(registry.forum_topic_lists.is_empty());
        assert_eq!(registry.stats().evictions, 4);
    }

    #[tokio::test]
    async fn test_loaded_cells_counts_singletons() {
        let registry = CacheRegistry::default();
        assert_eq!(registry.loaded_cells(), 0);

        registry.unread_count.set(3);
        let _ = registry
            .absolute_url_base
            .load(|| Ok("http://example.org".to_string()));
        assert_eq!(registry.loaded_cells(), 2);
    }
}
