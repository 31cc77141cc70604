//! Posts: the messages inside a thread. The first post holds the thread body.

use crate::board::types::{current_timestamp_millis, PostId, ThreadId, UserId};
use crate::board::validation::{required_text, MAX_POST_LENGTH};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier.
    pub id: PostId,
    /// Thread this post belongs to.
    pub thread_id: ThreadId,
    /// Author of the post.
    pub author_id: UserId,
    /// Post body.
    pub content: String,
    /// Set once the body has been changed after posting.
    pub is_edited: bool,
    /// Creation timestamp in milliseconds since Unix epoch.
    pub created_at: u64,
    /// Last modification timestamp.
    pub updated_at: u64,
}

impl Post {
    /// Creates a new post.
    ///
    /// # Errors
    /// Returns a validation error if the content is blank or longer than
    /// 100,000 characters.
    pub fn new(thread_id: ThreadId, author_id: UserId, content: &str) -> Result<Self> {
        let now = current_timestamp_millis();
        Ok(Self {
            id: PostId::new(),
            thread_id,
            author_id,
            content: required_text("Post content", content, MAX_POST_LENGTH)?,
            is_edited: false,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_post_rejected() {
        assert!(Post::new(ThreadId::new(), UserId::new(), " \n ").is_err());
    }

    #[test]
    fn test_new_post() {
        let post = Post::new(ThreadId::new(), UserId::new(), "First!").unwrap();
        assert_eq!(post.content, "First!");
        assert!(!post.is_edited);
    }
}
