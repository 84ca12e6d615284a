//! News, blog and writing rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news post and the forum thread carrying its comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsPost {
    pub id: i32,
    pub thread_id: Option<i32>,
    pub user_id: i32,
    pub writer: String,
    pub language_id: Option<i32>,
    pub text: String,
    pub occurred: DateTime<Utc>,
    pub comments: i32,
}

/// Announcement flag attached to a news post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteAnnouncement {
    pub id: i32,
    pub news_id: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// The active announcement joined with its news text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i32,
    pub news_id: i32,
    pub news_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogEntry {
    pub id: i32,
    pub user_id: i32,
    pub author: String,
    pub language_id: Option<i32>,
    pub text: String,
    pub written: DateTime<Utc>,
    pub thread_id: Option<i32>,
    pub comments: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blogger {
    pub user_id: i32,
    pub username: String,
    pub entries: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Writing {
    pub id: i32,
    pub user_id: i32,
    pub category_id: i32,
    pub writer: String,
    pub title: String,
    pub abstract_text: String,
    pub body: String,
    pub private: bool,
    pub published: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WritingCategory {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Writer {
    pub user_id: i32,
    pub username: String,
    pub writings: i64,
}
