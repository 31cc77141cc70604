//! Threads: a titled conversation inside a forum.

use crate::board::types::{current_timestamp_millis, ForumId, ThreadId, UserId};
use crate::board::validation::{required_text, MAX_TITLE_LENGTH};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A thread record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    /// Unique identifier.
    pub id: ThreadId,
    /// Forum this thread lives in.
    pub forum_id: ForumId,
    /// User who started the thread.
    pub author_id: UserId,
    /// Thread title.
    pub title: String,
    /// Pinned threads are listed before all others.
    pub is_pinned: bool,
    /// Locked threads reject replies from non-admins.
    pub is_locked: bool,
    /// Number of times the thread page was viewed.
    pub view_count: u64,
    /// Creation timestamp in milliseconds since Unix epoch.
    pub created_at: u64,
    /// Time of the last reply, used to order forum listings.
    pub updated_at: u64,
}

impl Thread {
    /// Creates a new thread.
    ///
    /// # Errors
    /// Returns a validation error if the title is blank or longer than
    /// 200 characters.
    pub fn new(forum_id: ForumId, author_id: UserId, title: &str) -> Result<Self> {
        let now = current_timestamp_millis();
        Ok(Self {
            id: ThreadId::new(),
            forum_id,
            author_id,
            title: required_text("Thread title", title, MAX_TITLE_LENGTH)?,
            is_pinned: false,
            is_locked: false,
            view_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Records activity, never moving `updated_at` backwards.
    pub fn touch(&mut self, at: u64) {
        self.updated_at = self.updated_at.max(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_thread_defaults() {
        let thread = Thread::new(ForumId::new(), UserId::new(), "Hello").unwrap();
        assert_eq!(thread.view_count, 0);
        assert_eq!(thread.created_at, thread.updated_at);
        assert!(!thread.is_pinned);
    }

    #[test]
    fn test_touch_is_monotonic() {
        let mut thread = Thread::new(ForumId::new(), UserId::new(), "Hello").unwrap();
        let later = thread.updated_at + 10;
        thread.touch(later);
        assert_eq!(thread.updated_at, later);
        thread.touch(later - 5);
        assert_eq!(thread.updated_at, later);
    }
}
