//! In-process board store.
//!
//! Holds everything in hash maps behind one `RwLock`. Used by tests, the
//! short code preview path, and anywhere persistence is not wanted. Write
//! rules match the RocksDB store exactly.

use crate::board::category::Category;
use crate::board::forum::Forum;
use crate::board::post::Post;
use crate::board::store::BoardStore;
use crate::board::thread::Thread;
use crate::board::types::{CategoryId, ForumId, PostId, ThreadId, UserId};
use crate::board::user::UserProfile;
use crate::error::{BoardError, Result};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct MemoryState {
    categories: HashMap<CategoryId, Category>,
    forums: HashMap<ForumId, Forum>,
    /// short code -> holder
    short_codes: HashMap<String, ForumId>,
    threads: HashMap<ThreadId, Thread>,
    posts: HashMap<PostId, Post>,
    users: HashMap<UserId, UserProfile>,
    usernames: HashMap<String, UserId>,
}

impl MemoryState {
    fn claim_short_code(&self, forum: &Forum) -> Result<()> {
        if let Some(code) = &forum.short_code {
            match self.short_codes.get(code) {
                Some(holder) if holder != &forum.id => Err(BoardError::conflict(format!(
                    "Short code '{}' is already taken",
                    code
                ))),
                _ => Ok(()),
            }
        } else {
            Ok(())
        }
    }
}

/// `RwLock`-guarded in-memory implementation of [`BoardStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| BoardError::storage("Memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| BoardError::storage("Memory store lock poisoned"))
    }
}

impl BoardStore for MemoryStore {
    fn insert_category(&self, category: &Category) -> Result<()> {
        self.write()?
            .categories
            .insert(category.id, category.clone());
        Ok(())
    }

    fn find_category_by_id(&self, id: &CategoryId) -> Result<Option<Category>> {
        Ok(self.read()?.categories.get(id).cloned())
    }

    fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.read()?.categories.values().cloned().collect())
    }

    fn delete_category(&self, id: &CategoryId) -> Result<()> {
        let mut state = self.write()?;
        if !state.categories.contains_key(id) {
            return Err(BoardError::not_found(format!("Category {}", id)));
        }
        let forums = state
            .forums
            .values()
            .filter(|f| &f.category_id == id)
            .count();
        if forums > 0 {
            return Err(BoardError::has_children(format!(
                "Category {} still has {} forum(s)",
                id, forums
            )));
        }
        state.categories.remove(id);
        Ok(())
    }

    fn insert_forum(&self, forum: &Forum) -> Result<()> {
        let mut state = self.write()?;
        if !state.categories.contains_key(&forum.category_id) {
            return Err(BoardError::not_found(format!(
                "Category {}",
                forum.category_id
            )));
        }
        if state.forums.contains_key(&forum.id) {
            return Err(BoardError::conflict(format!(
                "Forum {} already exists",
                forum.id
            )));
        }
        state.claim_short_code(forum)?;

        if let Some(code) = &forum.short_code {
            state.short_codes.insert(code.clone(), forum.id);
        }
        state.forums.insert(forum.id, forum.clone());
        Ok(())
    }

    fn update_forum(&self, forum: &Forum) -> Result<()> {
        let mut state = self.write()?;
        let previous_code = match state.forums.get(&forum.id) {
            Some(existing) => existing.short_code.clone(),
            None => return Err(BoardError::not_found(format!("Forum {}", forum.id))),
        };
        if !state.categories.contains_key(&forum.category_id) {
            return Err(BoardError::not_found(format!(
                "Category {}",
                forum.category_id
            )));
        }
        state.claim_short_code(forum)?;

        if let Some(code) = previous_code {
            state.short_codes.remove(&code);
        }
        if let Some(code) = &forum.short_code {
            state.short_codes.insert(code.clone(), forum.id);
        }
        state.forums.insert(forum.id, forum.clone());
        Ok(())
    }

    fn find_forum_by_id(&self, id: &ForumId) -> Result<Option<Forum>> {
        Ok(self.read()?.forums.get(id).cloned())
    }

    fn find_forums_by_short_code(&self, code: &str) -> Result<Vec<Forum>> {
        let state = self.read()?;
        Ok(state
            .short_codes
            .get(code)
            .and_then(|id| state.forums.get(id))
            .cloned()
            .into_iter()
            .collect())
    }

    fn list_forums_in_category(&self, category_id: &CategoryId) -> Result<Vec<Forum>> {
        Ok(self
            .read()?
            .forums
            .values()
            .filter(|f| &f.category_id == category_id)
            .cloned()
            .collect())
    }

    fn delete_forum(&self, id: &ForumId) -> Result<()> {
        let mut state = self.write()?;
        let threads = state.threads.values().filter(|t| &t.forum_id == id).count();
        if threads > 0 {
            return Err(BoardError::has_children(format!(
                "Forum {} still has {} thread(s)",
                id, threads
            )));
        }
        let forum = state
            .forums
            .remove(id)
            .ok_or_else(|| BoardError::not_found(format!("Forum {}", id)))?;
        if let Some(code) = forum.short_code {
            state.short_codes.remove(&code);
        }
        Ok(())
    }

    fn insert_thread(&self, thread: &Thread, first_post: &Post) -> Result<()> {
        let mut state = self.write()?;
        if !state.forums.contains_key(&thread.forum_id) {
            return Err(BoardError::not_found(format!("Forum {}", thread.forum_id)));
        }
        if first_post.thread_id != thread.id {
            return Err(BoardError::validation(
                "Opening post does not belong to the thread",
            ));
        }
        state.threads.insert(thread.id, thread.clone());
        state.posts.insert(first_post.id, first_post.clone());
        Ok(())
    }

    fn find_thread_by_id(&self, id: &ThreadId) -> Result<Option<Thread>> {
        Ok(self.read()?.threads.get(id).cloned())
    }

    fn list_threads_in_forum(&self, forum_id: &ForumId) -> Result<Vec<Thread>> {
        Ok(self
            .read()?
            .threads
            .values()
            .filter(|t| &t.forum_id == forum_id)
            .cloned()
            .collect())
    }

    fn modify_thread(
        &self,
        id: &ThreadId,
        change: &mut dyn FnMut(&mut Thread),
    ) -> Result<Option<Thread>> {
        let mut state = self.write()?;
        Ok(state.threads.get_mut(id).map(|thread| {
            change(thread);
            thread.clone()
        }))
    }

    fn delete_thread(&self, id: &ThreadId) -> Result<usize> {
        let mut state = self.write()?;
        if state.threads.remove(id).is_none() {
            return Err(BoardError::not_found(format!("Thread {}", id)));
        }
        let before = state.posts.len();
        state.posts.retain(|_, p| &p.thread_id != id);
        Ok(before - state.posts.len())
    }

    fn insert_post(&self, post: &Post) -> Result<()> {
        let mut state = self.write()?;
        if !state.threads.contains_key(&post.thread_id) {
            return Err(BoardError::not_found(format!("Thread {}", post.thread_id)));
        }
        state.posts.insert(post.id, post.clone());
        Ok(())
    }

    fn list_posts_in_thread(&self, thread_id: &ThreadId) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = self
            .read()?
            .posts
            .values()
            .filter(|p| &p.thread_id == thread_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(posts)
    }

    fn insert_user(&self, user: &UserProfile) -> Result<()> {
        let mut state = self.write()?;
        if state.usernames.contains_key(&user.username) {
            return Err(BoardError::conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }
        state.usernames.insert(user.username.clone(), user.id);
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    fn find_user_by_id(&self, id: &UserId) -> Result<Option<UserProfile>> {
        Ok(self.read()?.users.get(id).cloned())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<UserProfile>> {
        let state = self.read()?;
        Ok(state
            .usernames
            .get(username)
            .and_then(|id| state.users.get(id))
            .cloned())
    }
}
