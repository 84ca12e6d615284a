//! Image board rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageBoard {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub title: String,
    pub description: String,
    pub approval_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePost {
    pub id: i32,
    pub board_id: i32,
    pub user_id: i32,
    pub username: String,
    pub description: String,
    pub thumbnail: String,
    pub full_image: String,
    pub approved: bool,
    pub posted: DateTime<Utc>,
}
