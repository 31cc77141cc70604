//! Board persistence using RocksDB.
//!
//! ## Storage Layout
//!
//! Records (bincode-serialized):
//! - `categories`: `{category_id}` -> Category
//! - `forums`: `{forum_id}` -> Forum
//! - `threads`: `{thread_id}` -> Thread
//! - `posts`: `{post_id}` -> Post
//! - `users`: `{user_id}` -> UserProfile
//!
//! Indexes (ids are the 16 raw UUID bytes, keys are plain concatenations):
//! - `idx_short_codes`: `{short_code}` -> forum_id
//! - `idx_category_forums`: `{category_id}{forum_id}` -> ()
//! - `idx_forum_threads`: `{forum_id}{thread_id}` -> ()
//! - `idx_thread_posts`: `{thread_id}{created_at BE u64}{post_id}` -> ()
//! - `idx_usernames`: `{username}` -> user_id
//!
//! Every mutation that checks an index before writing runs under one write
//! lock and commits its record and index changes in a single batch, so the
//! short code and username indexes act as unique constraints.

use crate::board::category::Category;
use crate::board::forum::Forum;
use crate::board::post::Post;
use crate::board::store::BoardStore;
use crate::board::thread::Thread;
use crate::board::types::{CategoryId, ForumId, PostId, ThreadId, UserId};
use crate::board::user::UserProfile;
use crate::error::{BoardError, Result};
use crate::storage::{index_key, RocksDbConfig, RocksDbHandle};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

/// Database subdirectory.
const DB_DIR: &str = "board_db";

/// Column family names.
const CF_CATEGORIES: &str = "categories";
const CF_FORUMS: &str = "forums";
const CF_THREADS: &str = "threads";
const CF_POSTS: &str = "posts";
const CF_USERS: &str = "users";

/// Index column families.
const CF_IDX_SHORT_CODES: &str = "idx_short_codes";
const CF_IDX_CATEGORY_FORUMS: &str = "idx_category_forums";
const CF_IDX_FORUM_THREADS: &str = "idx_forum_threads";
const CF_IDX_THREAD_POSTS: &str = "idx_thread_posts";
const CF_IDX_USERNAMES: &str = "idx_usernames";

/// Width of the timestamp segment in post index keys.
const TIMESTAMP_LEN: usize = 8;

/// RocksDB-backed board storage.
#[derive(Debug)]
pub struct ForumStorage {
    db: RocksDbHandle,
    write_lock: Mutex<()>,
}

impl ForumStorage {
    /// Opens (or creates) the board database under `data_dir`.
    pub fn open(data_dir: impl AsRef<Path>, config: &RocksDbConfig) -> Result<Self> {
        let db_path = data_dir.as_ref().join(DB_DIR);
        let column_families = &[
            CF_CATEGORIES,
            CF_FORUMS,
            CF_THREADS,
            CF_POSTS,
            CF_USERS,
            CF_IDX_SHORT_CODES,
            CF_IDX_CATEGORY_FORUMS,
            CF_IDX_FORUM_THREADS,
            CF_IDX_THREAD_POSTS,
            CF_IDX_USERNAMES,
        ];

        let db = RocksDbHandle::open(&db_path, config, column_families)?;
        info!("Opened board RocksDB at {:?}", db_path);

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| BoardError::storage("Board write lock poisoned"))
    }

    fn short_code_holder(&self, code: &str) -> Result<Option<ForumId>> {
        self.db
            .get_raw(CF_IDX_SHORT_CODES, code.as_bytes())?
            .map(|bytes| ForumId::from_slice(&bytes))
            .transpose()
    }

    fn claim_short_code(&self, forum: &Forum) -> Result<()> {
        if let Some(code) = &forum.short_code {
            if let Some(holder) = self.short_code_holder(code)? {
                if holder != forum.id {
                    return Err(BoardError::conflict(format!(
                        "Short code '{}' is already taken",
                        code
                    )));
                }
            }
        }
        Ok(())
    }

    /// Post id from an `idx_thread_posts` key with the thread prefix removed.
    fn post_id_from_suffix(suffix: &[u8]) -> Result<PostId> {
        let id = suffix.get(TIMESTAMP_LEN..).ok_or_else(|| {
            BoardError::storage(format!(
                "Corrupt post index key of {} bytes",
                suffix.len()
            ))
        })?;
        PostId::from_slice(id)
    }

    fn post_index_key(post: &Post) -> Vec<u8> {
        index_key(&[
            post.thread_id.as_bytes(),
            &post.created_at.to_be_bytes(),
            post.id.as_bytes(),
        ])
    }
}

impl BoardStore for ForumStorage {
    fn insert_category(&self, category: &Category) -> Result<()> {
        self.db
            .put(CF_CATEGORIES, category.id.as_bytes(), category)?;
        debug!(category = %category.id, "Stored category");
        Ok(())
    }

    fn find_category_by_id(&self, id: &CategoryId) -> Result<Option<Category>> {
        self.db.get(CF_CATEGORIES, id.as_bytes())
    }

    fn list_categories(&self) -> Result<Vec<Category>> {
        self.db.collect_all(CF_CATEGORIES)
    }

    fn delete_category(&self, id: &CategoryId) -> Result<()> {
        let _guard = self.lock()?;
        if !self.db.exists(CF_CATEGORIES, id.as_bytes())? {
            return Err(BoardError::not_found(format!("Category {}", id)));
        }
        let forums = self
            .db
            .prefix_suffixes(CF_IDX_CATEGORY_FORUMS, id.as_bytes())?
            .len();
        if forums > 0 {
            return Err(BoardError::has_children(format!(
                "Category {} still has {} forum(s)",
                id, forums
            )));
        }

        let mut batch = self.db.batch();
        batch.delete(CF_CATEGORIES, id.as_bytes())?;
        batch.commit()
    }

    fn insert_forum(&self, forum: &Forum) -> Result<()> {
        let _guard = self.lock()?;
        if !self.db.exists(CF_CATEGORIES, forum.category_id.as_bytes())? {
            return Err(BoardError::not_found(format!(
                "Category {}",
                forum.category_id
            )));
        }
        if self.db.exists(CF_FORUMS, forum.id.as_bytes())? {
            return Err(BoardError::conflict(format!(
                "Forum {} already exists",
                forum.id
            )));
        }
        self.claim_short_code(forum)?;

        let mut batch = self.db.batch();
        batch.put(CF_FORUMS, forum.id.as_bytes(), forum)?;
        batch.put_raw(
            CF_IDX_CATEGORY_FORUMS,
            &index_key(&[forum.category_id.as_bytes(), forum.id.as_bytes()]),
            &[],
        )?;
        if let Some(code) = &forum.short_code {
            batch.put_raw(CF_IDX_SHORT_CODES, code.as_bytes(), forum.id.as_bytes())?;
        }
        batch.commit()?;

        debug!(forum = %forum.id, short_code = ?forum.short_code, "Stored forum");
        Ok(())
    }

    fn update_forum(&self, forum: &Forum) -> Result<()> {
        let _guard = self.lock()?;
        let previous: Forum = self
            .db
            .get(CF_FORUMS, forum.id.as_bytes())?
            .ok_or_else(|| BoardError::not_found(format!("Forum {}", forum.id)))?;
        if !self.db.exists(CF_CATEGORIES, forum.category_id.as_bytes())? {
            return Err(BoardError::not_found(format!(
                "Category {}",
                forum.category_id
            )));
        }
        self.claim_short_code(forum)?;

        let mut batch = self.db.batch();
        if previous.short_code != forum.short_code {
            if let Some(old) = &previous.short_code {
                batch.delete(CF_IDX_SHORT_CODES, old.as_bytes())?;
            }
            if let Some(new) = &forum.short_code {
                batch.put_raw(CF_IDX_SHORT_CODES, new.as_bytes(), forum.id.as_bytes())?;
            }
        }
        if previous.category_id != forum.category_id {
            batch.delete(
                CF_IDX_CATEGORY_FORUMS,
                &index_key(&[previous.category_id.as_bytes(), forum.id.as_bytes()]),
            )?;
            batch.put_raw(
                CF_IDX_CATEGORY_FORUMS,
                &index_key(&[forum.category_id.as_bytes(), forum.id.as_bytes()]),
                &[],
            )?;
        }
        batch.put(CF_FORUMS, forum.id.as_bytes(), forum)?;
        batch.commit()
    }

    fn find_forum_by_id(&self, id: &ForumId) -> Result<Option<Forum>> {
        self.db.get(CF_FORUMS, id.as_bytes())
    }

    fn find_forums_by_short_code(&self, code: &str) -> Result<Vec<Forum>> {
        let Some(id) = self.short_code_holder(code)? else {
            return Ok(Vec::new());
        };
        Ok(self.find_forum_by_id(&id)?.into_iter().collect())
    }

    fn list_forums_in_category(&self, category_id: &CategoryId) -> Result<Vec<Forum>> {
        let mut forums = Vec::new();
        for suffix in self
            .db
            .prefix_suffixes(CF_IDX_CATEGORY_FORUMS, category_id.as_bytes())?
        {
            let id = ForumId::from_slice(&suffix)?;
            if let Some(forum) = self.find_forum_by_id(&id)? {
                forums.push(forum);
            }
        }
        Ok(forums)
    }

    fn delete_forum(&self, id: &ForumId) -> Result<()> {
        let _guard = self.lock()?;
        let forum: Forum = self
            .db
            .get(CF_FORUMS, id.as_bytes())?
            .ok_or_else(|| BoardError::not_found(format!("Forum {}", id)))?;
        let threads = self
            .db
            .prefix_suffixes(CF_IDX_FORUM_THREADS, id.as_bytes())?
            .len();
        if threads > 0 {
            return Err(BoardError::has_children(format!(
                "Forum {} still has {} thread(s)",
                id, threads
            )));
        }

        let mut batch = self.db.batch();
        batch.delete(CF_FORUMS, id.as_bytes())?;
        batch.delete(
            CF_IDX_CATEGORY_FORUMS,
            &index_key(&[forum.category_id.as_bytes(), id.as_bytes()]),
        )?;
        if let Some(code) = &forum.short_code {
            batch.delete(CF_IDX_SHORT_CODES, code.as_bytes())?;
        }
        batch.commit()
    }

    fn insert_thread(&self, thread: &Thread, first_post: &Post) -> Result<()> {
        if first_post.thread_id != thread.id {
            return Err(BoardError::validation(
                "Opening post does not belong to the thread",
            ));
        }
        let _guard = self.lock()?;
        if !self.db.exists(CF_FORUMS, thread.forum_id.as_bytes())? {
            return Err(BoardError::not_found(format!("Forum {}", thread.forum_id)));
        }

        let mut batch = self.db.batch();
        batch.put(CF_THREADS, thread.id.as_bytes(), thread)?;
        batch.put_raw(
            CF_IDX_FORUM_THREADS,
            &index_key(&[thread.forum_id.as_bytes(), thread.id.as_bytes()]),
            &[],
        )?;
        batch.put(CF_POSTS, first_post.id.as_bytes(), first_post)?;
        batch.put_raw(CF_IDX_THREAD_POSTS, &Self::post_index_key(first_post), &[])?;
        batch.commit()
    }

    fn find_thread_by_id(&self, id: &ThreadId) -> Result<Option<Thread>> {
        self.db.get(CF_THREADS, id.as_bytes())
    }

    fn list_threads_in_forum(&self, forum_id: &ForumId) -> Result<Vec<Thread>> {
        let mut threads = Vec::new();
        for suffix in self
            .db
            .prefix_suffixes(CF_IDX_FORUM_THREADS, forum_id.as_bytes())?
        {
            let id = ThreadId::from_slice(&suffix)?;
            if let Some(thread) = self.find_thread_by_id(&id)? {
                threads.push(thread);
            }
        }
        Ok(threads)
    }

    fn modify_thread(
        &self,
        id: &ThreadId,
        change: &mut dyn FnMut(&mut Thread),
    ) -> Result<Option<Thread>> {
        let _guard = self.lock()?;
        let Some(mut thread) = self.find_thread_by_id(id)? else {
            return Ok(None);
        };
        change(&mut thread);
        self.db.put(CF_THREADS, id.as_bytes(), &thread)?;
        Ok(Some(thread))
    }

    fn delete_thread(&self, id: &ThreadId) -> Result<usize> {
        let _guard = self.lock()?;
        let thread = self
            .find_thread_by_id(id)?
            .ok_or_else(|| BoardError::not_found(format!("Thread {}", id)))?;
        let post_keys = self.db.prefix_suffixes(CF_IDX_THREAD_POSTS, id.as_bytes())?;

        let mut batch = self.db.batch();
        for suffix in &post_keys {
            let post_id = Self::post_id_from_suffix(suffix)?;
            batch.delete(CF_POSTS, post_id.as_bytes())?;
            batch.delete(CF_IDX_THREAD_POSTS, &index_key(&[id.as_bytes(), suffix]))?;
        }
        batch.delete(CF_THREADS, id.as_bytes())?;
        batch.delete(
            CF_IDX_FORUM_THREADS,
            &index_key(&[thread.forum_id.as_bytes(), id.as_bytes()]),
        )?;
        batch.commit()?;

        debug!(thread = %id, posts = post_keys.len(), "Deleted thread");
        Ok(post_keys.len())
    }

    fn insert_post(&self, post: &Post) -> Result<()> {
        let _guard = self.lock()?;
        if !self.db.exists(CF_THREADS, post.thread_id.as_bytes())? {
            return Err(BoardError::not_found(format!("Thread {}", post.thread_id)));
        }

        let mut batch = self.db.batch();
        batch.put(CF_POSTS, post.id.as_bytes(), post)?;
        batch.put_raw(CF_IDX_THREAD_POSTS, &Self::post_index_key(post), &[])?;
        batch.commit()
    }

    fn list_posts_in_thread(&self, thread_id: &ThreadId) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for suffix in self
            .db
            .prefix_suffixes(CF_IDX_THREAD_POSTS, thread_id.as_bytes())?
        {
            let id = Self::post_id_from_suffix(&suffix)?;
            if let Some(post) = self.db.get::<Post>(CF_POSTS, id.as_bytes())? {
                posts.push(post);
            }
        }
        Ok(posts)
    }

    fn count_posts_in_thread(&self, thread_id: &ThreadId) -> Result<usize> {
        Ok(self
            .db
            .prefix_suffixes(CF_IDX_THREAD_POSTS, thread_id.as_bytes())?
            .len())
    }

    fn insert_user(&self, user: &UserProfile) -> Result<()> {
        let _guard = self.lock()?;
        if self.db.exists(CF_IDX_USERNAMES, user.username.as_bytes())? {
            return Err(BoardError::conflict(format!(
                "Username '{}' is already taken",
                user.username
            )));
        }

        let mut batch = self.db.batch();
        batch.put(CF_USERS, user.id.as_bytes(), user)?;
        batch.put_raw(CF_IDX_USERNAMES, user.username.as_bytes(), user.id.as_bytes())?;
        batch.commit()
    }

    fn find_user_by_id(&self, id: &UserId) -> Result<Option<UserProfile>> {
        self.db.get(CF_USERS, id.as_bytes())
    }

    fn find_user_by_username(&self, username: &str) -> Result<Option<UserProfile>> {
        match self.db.get_raw(CF_IDX_USERNAMES, username.as_bytes())? {
            Some(bytes) => self.find_user_by_id(&UserId::from_slice(&bytes)?),
            None => Ok(None),
        }
    }
}
