//! Viewer and account rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role every viewer holds, signed in or not.
pub const ANYONE_ROLE: &str = "anyone";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
}

/// Per-user display preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub id: i32,
    pub user_id: i32,
    pub language_id: Option<i32>,
    pub page_size: i32,
    pub auto_subscribe_replies: bool,
}

/// A role granted to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: i32,
    pub user_id: i32,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub can_login: bool,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i32,
    pub user_id: i32,
    pub pattern: String,
    pub method: String,
}

impl Subscription {
    /// Lookup key used by the subscription set: `"{method}:{pattern}"`.
    pub fn key(&self) -> String {
        format!("{}:{}", self.method, self.pattern)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmarks {
    pub id: i32,
    pub user_id: i32,
    pub list: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i32,
    pub user_id: i32,
    pub link: Option<String>,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
