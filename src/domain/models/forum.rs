//! Forum rows: categories, topics, threads and comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumCategory {
    pub id: i32,
    pub parent_id: Option<i32>,
    pub title: String,
    pub description: String,
}

/// A topic as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumTopic {
    pub id: i32,
    pub category_id: i32,
    pub title: String,
    pub description: String,
    pub threads: i32,
    pub comments: i32,
    pub last_addition: Option<DateTime<Utc>>,
}

/// A thread with its first and last poster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumThread {
    pub id: i32,
    pub topic_id: i32,
    pub first_post_id: i32,
    pub first_poster: String,
    pub last_poster: Option<String>,
    pub comments: i32,
    pub last_addition: Option<DateTime<Utc>>,
    pub locked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumComment {
    pub id: i32,
    pub thread_id: i32,
    pub user_id: i32,
    pub username: String,
    pub text: String,
    pub written: DateTime<Utc>,
}

/// Category that holds private conversations instead of public topics.
pub const PRIVATE_FORUM_CATEGORY_ID: i32 = 0;

/// Membership of a user in a private topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicParticipant {
    pub topic_id: i32,
    pub user_id: i32,
}

/// A private conversation titled after its other participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateTopic {
    pub topic: ForumTopic,
    pub display_title: String,
}

impl PrivateTopic {
    /// Title `topic` for `viewer`: the other participants' names, followed by
    /// the topic's own title in parentheses when more than one other person
    /// takes part.
    pub fn new(topic: ForumTopic, participants: &[User], viewer: i32) -> Self {
        let names: Vec<&str> = participants
            .iter()
            .filter(|p| p.id != viewer)
            .map(|p| p.username.as_str())
            .collect();
        let mut display_title = names.join(", ");
        if names.len() > 1 && !topic.title.is_empty() {
            display_title = format!("{display_title} ({})", topic.title);
        }
        Self {
            topic,
            display_title,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(title: &str) -> ForumTopic {
        ForumTopic {
            id: 9,
            category_id: PRIVATE_FORUM_CATEGORY_ID,
            title: title.into(),
            description: String::new(),
            threads: 1,
            comments: 2,
            last_addition: None,
        }
    }

    fn user(id: i32, username: &str) -> User {
        User {
            id,
            username: username.into(),
            email: None,
        }
    }

    #[test]
    fn test_private_topic_title_excludes_viewer() {
        let participants = [user(1, "alice"), user(2, "bob")];
        let private = PrivateTopic::new(topic("plans"), &participants, 1);
        assert_eq!(private.display_title, "bob");
    }

    #[test]
    fn test_group_conversation_appends_topic_title() {
        let participants = [user(1, "alice"), user(2, "bob"), user(3, "carol")];
        let private = PrivateTopic::new(topic("plans"), &participants, 1);
        assert_eq!(private.display_title, "bob, carol (plans)");

        let untitled = PrivateTopic::new(topic(""), &participants, 1);
        assert_eq!(untitled.display_title, "bob, carol");
    }
}
