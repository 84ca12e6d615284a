pub mod admin;
pub mod config;
pub mod content;
pub mod faq;
pub mod forum;
pub mod imagebbs;
pub mod linker;
pub mod user;

pub use admin::{
    AdminRequest, AdminRequestComment, AdminUserComment, Grant, RequestStatus, UserEmail,
    UserPostCounts,
};
pub use config::{CacheConfig, Config, LoggingConfig, PaginationConfig, SiteConfig};
pub use content::{
    Announcement, BlogEntry, Blogger, NewsPost, SiteAnnouncement, Writer, Writing, WritingCategory,
};
pub use faq::{CategoryFaqs, Faq, FaqCategory};
pub use forum::{
    ForumCategory, ForumComment, ForumThread, ForumTopic, PrivateTopic, TopicParticipant,
    PRIVATE_FORUM_CATEGORY_ID,
};
pub use imagebbs::{ImageBoard, ImagePost};
pub use linker::{ExternalLink, LinkerCategory, LinkerCategoryCount, LinkerItem};
pub use user::{
    Bookmarks, Language, Notification, Permission, Preference, Role, Subscription, User,
    ANYONE_ROLE,
};
