//! Link directory rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerCategory {
    pub id: i32,
    pub title: String,
    pub sort_order: i32,
}

/// A category with the number of listed links in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerCategoryCount {
    pub id: i32,
    pub title: String,
    pub link_count: i64,
}

/// A listed link with its poster and category title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkerItem {
    pub id: i32,
    pub category_id: i32,
    pub category_title: String,
    pub poster: String,
    pub title: String,
    pub url: String,
    pub description: String,
    pub listed: Option<DateTime<Utc>>,
}

/// An outbound link tracked for click counting and card previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLink {
    pub id: i32,
    pub url: String,
    pub clicks: i32,
    pub card_title: Option<String>,
    pub card_image: Option<String>,
}
