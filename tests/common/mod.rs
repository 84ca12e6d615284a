//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use sitecache::adapters::memory::{InMemoryQuerier, Tables};
use sitecache::domain::models::{
    Config, ForumCategory, ForumComment, ForumThread, ForumTopic, Language, NewsPost, Permission,
    Preference, User,
};
use tempfile::TempDir;

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn test_config() -> Arc<Config> {
    Arc::new(Config::default())
}

/// A small site: two users, one forum thread with three comments, two news
/// posts and a language table.
pub fn site_tables() -> Tables {
    let now = Utc::now();
    Tables {
        users: vec![
            User {
                id: 1,
                username: "alice".into(),
                email: Some("alice@example.org".into()),
            },
            User {
                id: 2,
                username: "bob".into(),
                email: None,
            },
        ],
        permissions: vec![Permission {
            id: 1,
            user_id: 1,
            role: "administrator".into(),
        }],
        preferences: vec![Preference {
            id: 1,
            user_id: 1,
            language_id: Some(2),
            page_size: 10,
            auto_subscribe_replies: true,
        }],
        languages: vec![
            Language {
                id: 1,
                name: "en".into(),
            },
            Language {
                id: 2,
                name: "fr".into(),
            },
        ],
        forum_categories: vec![ForumCategory {
            id: 1,
            parent_id: None,
            title: "General".into(),
            description: String::new(),
        }],
        forum_topics: vec![ForumTopic {
            id: 1,
            category_id: 1,
            title: "Introductions".into(),
            description: String::new(),
            threads: 1,
            comments: 3,
            last_addition: Some(now),
        }],
        forum_threads: vec![ForumThread {
            id: 1,
            topic_id: 1,
            first_post_id: 1,
            first_poster: "alice".into(),
            last_poster: Some("bob".into()),
            comments: 3,
            last_addition: Some(now),
            locked: false,
        }],
        forum_comments: (1..=3)
            .map(|id| ForumComment {
                id,
                thread_id: 1,
                user_id: if id == 2 { 2 } else { 1 },
                username: if id == 2 { "bob" } else { "alice" }.into(),
                text: format!("comment {id}"),
                written: now - Duration::minutes(i64::from(10 - id)),
            })
            .collect(),
        news: (1..=2)
            .map(|id| NewsPost {
                id,
                thread_id: None,
                user_id: 1,
                writer: "alice".into(),
                language_id: None,
                text: format!("news {id}"),
                occurred: now - Duration::hours(i64::from(id)),
                comments: 0,
            })
            .collect(),
        ..Tables::default()
    }
}

pub fn site_querier() -> Arc<InMemoryQuerier> {
    Arc::new(InMemoryQuerier::with_tables(site_tables()))
}
