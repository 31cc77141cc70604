//! The data-access seam between board logic and persistence.
//!
//! [`BoardStore`] is implemented by [`MemoryStore`](crate::board::memory::MemoryStore)
//! and by the RocksDB-backed [`ForumStorage`](crate::board::storage::ForumStorage).
//! Both enforce the same write-time rules:
//!
//! - forum short codes are unique across the whole store (`Conflict`)
//! - usernames are unique (`Conflict`)
//! - a category with forums, or a forum with threads, cannot be deleted
//!   (`HasChildren`)
//! - children can only be written under an existing parent (`NotFound`)
//!
//! Read methods return `Ok(None)` or an empty list for missing records; only
//! backend failures are errors.

use crate::board::category::Category;
use crate::board::forum::Forum;
use crate::board::post::Post;
use crate::board::thread::Thread;
use crate::board::types::{CategoryId, ForumId, ThreadId, UserId};
use crate::board::user::UserProfile;
use crate::error::Result;

/// Persistent store of board records.
pub trait BoardStore: Send + Sync {
    // --- categories ---

    fn insert_category(&self, category: &Category) -> Result<()>;

    fn find_category_by_id(&self, id: &CategoryId) -> Result<Option<Category>>;

    /// All categories, in no particular order.
    fn list_categories(&self) -> Result<Vec<Category>>;

    fn delete_category(&self, id: &CategoryId) -> Result<()>;

    // --- forums ---

    /// Inserts a forum. Fails with `Conflict` if its short code is held by
    /// any other forum and with `NotFound` if its category does not exist.
    fn insert_forum(&self, forum: &Forum) -> Result<()>;

    /// Replaces an existing forum record, re-indexing its short code.
    fn update_forum(&self, forum: &Forum) -> Result<()>;

    fn find_forum_by_id(&self, id: &ForumId) -> Result<Option<Forum>>;

    /// All forums whose stored short code equals `code`, across every
    /// category.
    fn find_forums_by_short_code(&self, code: &str) -> Result<Vec<Forum>>;

    fn list_forums_in_category(&self, category_id: &CategoryId) -> Result<Vec<Forum>>;

    fn delete_forum(&self, id: &ForumId) -> Result<()>;

    // --- threads and posts ---

    /// Writes a thread together with its opening post, atomically.
    fn insert_thread(&self, thread: &Thread, first_post: &Post) -> Result<()>;

    fn find_thread_by_id(&self, id: &ThreadId) -> Result<Option<Thread>>;

    fn list_threads_in_forum(&self, forum_id: &ForumId) -> Result<Vec<Thread>>;

    /// Applies `change` to a thread as a single read-modify-write.
    ///
    /// Returns the updated thread, or `None` if it does not exist.
    fn modify_thread(
        &self,
        id: &ThreadId,
        change: &mut dyn FnMut(&mut Thread),
    ) -> Result<Option<Thread>>;

    /// Deletes a thread and all of its posts. Returns the number of posts
    /// removed.
    fn delete_thread(&self, id: &ThreadId) -> Result<usize>;

    fn insert_post(&self, post: &Post) -> Result<()>;

    /// Posts of a thread, oldest first.
    fn list_posts_in_thread(&self, thread_id: &ThreadId) -> Result<Vec<Post>>;

    fn count_posts_in_thread(&self, thread_id: &ThreadId) -> Result<usize> {
        Ok(self.list_posts_in_thread(thread_id)?.len())
    }

    // --- users ---

    /// Inserts a profile. Fails with `Conflict` if the username is taken.
    fn insert_user(&self, user: &UserProfile) -> Result<()>;

    fn find_user_by_id(&self, id: &UserId) -> Result<Option<UserProfile>>;

    fn find_user_by_username(&self, username: &str) -> Result<Option<UserProfile>>;
}
