use std::collections::HashMap;

use crate::domain::models::{
    AdminRequest, AdminRequestComment, AdminUserComment, BlogEntry, Bookmarks, ExternalLink, Faq,
    FaqCategory, ForumCategory, ForumComment, ForumThread, ForumTopic, Grant, ImageBoard,
    ImagePost, Language, LinkerCategory, LinkerItem, NewsPost, Notification, Permission,
    Preference, Role, SiteAnnouncement, Subscription, TopicParticipant, User, UserEmail, Writing,
    WritingCategory, ANYONE_ROLE,
};

/// Raw rows held by [`InMemoryQuerier`](super::InMemoryQuerier).
///
/// Aggregates (bloggers, writers, link counts, post counts) are derived from
/// these at query time.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub users: Vec<User>,
    pub permissions: Vec<Permission>,
    pub preferences: Vec<Preference>,
    pub languages: Vec<Language>,
    pub roles: Vec<Role>,
    pub bookmarks: Vec<Bookmarks>,
    pub subscriptions: Vec<Subscription>,
    pub notifications: Vec<Notification>,
    pub forum_categories: Vec<ForumCategory>,
    pub forum_topics: Vec<ForumTopic>,
    pub forum_threads: Vec<ForumThread>,
    pub forum_comments: Vec<ForumComment>,
    pub topic_participants: Vec<TopicParticipant>,
    pub news: Vec<NewsPost>,
    pub announcements: Vec<SiteAnnouncement>,
    pub blog_entries: Vec<BlogEntry>,
    pub writings: Vec<Writing>,
    pub writing_categories: Vec<WritingCategory>,
    pub image_boards: Vec<ImageBoard>,
    pub image_posts: Vec<ImagePost>,
    pub linker_categories: Vec<LinkerCategory>,
    pub linker_items: Vec<LinkerItem>,
    pub external_links: Vec<ExternalLink>,
    pub faq_categories: Vec<FaqCategory>,
    pub faqs: Vec<Faq>,
    pub user_emails: Vec<UserEmail>,
    pub grants: Vec<Grant>,
    pub admin_user_comments: Vec<AdminUserComment>,
    pub admin_requests: Vec<AdminRequest>,
    pub admin_request_comments: Vec<AdminRequestComment>,
    pub template_overrides: HashMap<String, String>,
}

impl Tables {
    /// Whether `viewer` may see `writing`.
    pub(crate) fn writing_visible(writing: &Writing, viewer: i32) -> bool {
        !writing.private || writing.user_id == viewer
    }

    /// Whether some active grant lets `viewer` perform `action` on row
    /// `item_id`. Grants name a user, a role, or nobody (everyone).
    pub(crate) fn granted(&self, viewer: i32, section: &str, item: &str, action: &str, item_id: i32) -> bool {
        let role_ids = self.role_ids(viewer);
        self.grants.iter().any(|g| {
            g.allows(section, item, action, item_id)
                && match (g.user_id, g.role_id) {
                    (Some(user_id), _) => viewer != 0 && user_id == viewer,
                    (None, Some(role_id)) => role_ids.contains(&role_id),
                    (None, None) => true,
                }
        })
    }

    fn role_ids(&self, viewer: i32) -> Vec<i32> {
        self.roles
            .iter()
            .filter(|role| {
                role.name == ANYONE_ROLE
                    || (viewer != 0
                        && self
                            .permissions
                            .iter()
                            .any(|p| p.user_id == viewer && p.role == role.name))
            })
            .map(|role| role.id)
            .collect()
    }

    pub(crate) fn username(&self, user_id: i32) -> String {
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.username.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(user_id: Option<i32>, role_id: Option<i32>, item_id: Option<i32>) -> Grant {
        Grant {
            id: 0,
            user_id,
            role_id,
            section: "linker".into(),
            item: Some("category".into()),
            item_id,
            action: "see".into(),
            active: true,
        }
    }

    fn tables(grants: Vec<Grant>) -> Tables {
        Tables {
            roles: vec![
                Role {
                    id: 1,
                    name: ANYONE_ROLE.into(),
                    can_login: false,
                    is_admin: false,
                },
                Role {
                    id: 2,
                    name: "moderator".into(),
                    can_login: true,
                    is_admin: false,
                },
            ],
            permissions: vec![Permission {
                id: 1,
                user_id: 5,
                role: "moderator".into(),
            }],
            grants,
            ..Tables::default()
        }
    }

    #[test]
    fn test_granted_by_user_role_or_everyone() {
        let by_user = tables(vec![grant(Some(7), None, Some(1))]);
        assert!(by_user.granted(7, "linker", "category", "see", 1));
        assert!(!by_user.granted(5, "linker", "category", "see", 1));

        let by_role = tables(vec![grant(None, Some(2), None)]);
        assert!(by_role.granted(5, "linker", "category", "see", 3));
        assert!(!by_role.granted(0, "linker", "category", "see", 3));

        let by_anyone_role = tables(vec![grant(None, Some(1), Some(3))]);
        assert!(by_anyone_role.granted(0, "linker", "category", "see", 3));

        let everyone = tables(vec![grant(None, None, Some(3))]);
        assert!(everyone.granted(0, "linker", "category", "see", 3));
        assert!(!everyone.granted(0, "linker", "category", "see", 4));
    }
}
