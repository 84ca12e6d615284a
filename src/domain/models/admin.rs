//! Rows only administrators read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEmail {
    pub id: i32,
    pub user_id: i32,
    pub email: String,
    pub verified_at: Option<DateTime<Utc>>,
    pub notification_priority: i32,
}

/// A section/action permission grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub id: i32,
    pub user_id: Option<i32>,
    pub role_id: Option<i32>,
    pub section: String,
    pub item: Option<String>,
    /// Row the grant is limited to; `None` covers every row of `item`.
    pub item_id: Option<i32>,
    pub action: String,
    pub active: bool,
}

impl Grant {
    /// Whether this grant allows `action` on row `item_id` of `section`/`item`,
    /// regardless of whom it is granted to.
    pub fn allows(&self, section: &str, item: &str, action: &str, item_id: i32) -> bool {
        self.active
            && self.section == section
            && self.item.as_deref() == Some(item)
            && self.action == action
            && self.item_id.is_none_or(|id| id == item_id)
    }
}

/// Content counts for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPostCounts {
    pub user_id: i32,
    pub blogs: i64,
    pub news: i64,
    pub comments: i64,
    pub images: i64,
    pub links: i64,
    pub writings: i64,
}

/// Review state of a change request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
    Query,
}

impl RequestStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Query => "query",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "query" => Some(Self::Query),
            _ => None,
        }
    }
}

/// A user's request for an administrator to change a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRequest {
    pub id: i32,
    pub user_id: i32,
    pub change_table: String,
    pub change_field: String,
    pub change_row_id: i32,
    pub change_value: Option<String>,
    pub contact_options: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRequestComment {
    pub id: i32,
    pub request_id: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A note an administrator left on a user's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUserComment {
    pub id: i32,
    pub user_id: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
