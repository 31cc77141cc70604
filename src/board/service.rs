//! Board operations: the actions behind the admin dashboard and the
//! thread/reply forms.
//!
//! [`BoardService`] wraps a [`BoardStore`] and adds role checks, short code
//! assignment, listing order and pagination. It holds no mutable state of its
//! own, so one instance can be shared across request handlers.

use crate::board::category::Category;
use crate::board::forum::Forum;
use crate::board::permissions::{require_admin, require_member, Actor};
use crate::board::post::Post;
use crate::board::shortcode::{find_forum_by_identifier, normalize, resolve_short_code};
use crate::board::store::BoardStore;
use crate::board::thread::Thread;
use crate::board::types::{CategoryId, ForumId, Role, ThreadId, UserId};
use crate::board::user::UserProfile;
use crate::board::validation::{required_text, MAX_NAME_LENGTH};
use crate::config::{BoardConfig, DEFAULT_PAGE_SIZE, DEFAULT_SHORT_CODE_ATTEMPTS};
use crate::error::{BoardError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use tracing::{debug, info, warn};

/// Cursor for forum thread pagination.
///
/// Encodes the listing position of the last thread on the previous page, so
/// pages stay stable while new replies reorder the forum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pinned: bool,
    updated_at: u64,
    thread_id: ThreadId,
}

impl Cursor {
    fn after(thread: &Thread) -> Self {
        Self {
            pinned: thread.is_pinned,
            updated_at: thread.updated_at,
            thread_id: thread.id,
        }
    }

    fn sort_key(&self) -> (bool, Reverse<u64>, ThreadId) {
        (!self.pinned, Reverse(self.updated_at), self.thread_id)
    }

    /// Encodes the cursor as a URL-safe base64 string.
    pub fn encode(&self) -> String {
        let bytes = bincode::serialize(self).unwrap_or_default();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Decodes a cursor produced by [`Cursor::encode`].
    pub fn decode(s: &str) -> Option<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(s)
            .ok()?;
        bincode::deserialize(&bytes).ok()
    }
}

/// Listing order for threads: pinned first, then most recently active.
fn thread_sort_key(thread: &Thread) -> (bool, Reverse<u64>, ThreadId) {
    (!thread.is_pinned, Reverse(thread.updated_at), thread.id)
}

/// One page of a paginated listing.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    /// Cursor for the next page, if there are more items.
    pub next_cursor: Option<Cursor>,
    pub total_count: usize,
}

impl<T> PaginatedResult<T> {
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// A category with its forums, as shown on the board index.
#[derive(Debug, Clone)]
pub struct CategoryListing {
    pub category: Category,
    pub forums: Vec<Forum>,
}

/// A thread with its post count, for forum listings.
#[derive(Debug, Clone)]
pub struct ThreadSummary {
    pub thread: Thread,
    pub post_count: usize,
}

/// Everything a forum page needs.
#[derive(Debug, Clone)]
pub struct ForumPage {
    pub forum: Forum,
    pub category: Option<Category>,
    pub threads: PaginatedResult<ThreadSummary>,
}

/// Everything a thread page needs.
#[derive(Debug, Clone)]
pub struct ThreadPage {
    pub forum: Forum,
    pub thread: Thread,
    pub posts: Vec<Post>,
}

/// Board operations over a store.
#[derive(Debug)]
pub struct BoardService<S> {
    store: S,
    page_size: usize,
    max_short_code_attempts: usize,
}

impl<S: BoardStore> BoardService<S> {
    /// Creates a service with default paging and retry settings.
    pub fn new(store: S) -> Self {
        Self {
            store,
            page_size: DEFAULT_PAGE_SIZE,
            max_short_code_attempts: DEFAULT_SHORT_CODE_ATTEMPTS,
        }
    }

    /// Creates a service using the paging and retry settings of `config`.
    pub fn with_config(store: S, config: &BoardConfig) -> Self {
        Self {
            store,
            page_size: config.page_size.max(1),
            max_short_code_attempts: config.max_short_code_attempts.max(1),
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Creates a user profile.
    pub fn register_user(&self, username: &str, role: Role) -> Result<UserProfile> {
        let user = UserProfile::new(username, role)?;
        self.store.insert_user(&user)?;
        info!(user = %user.id, username = %user.username, role = %user.role, "Registered user");
        Ok(user)
    }

    /// Turns the user id of a session into an [`Actor`]. Unknown ids and
    /// missing sessions are anonymous.
    pub fn resolve_actor(&self, session_user: Option<&UserId>) -> Result<Actor> {
        let Some(id) = session_user else {
            return Ok(Actor::Anonymous);
        };
        Ok(match self.store.find_user_by_id(id)? {
            Some(profile) => Actor::User(profile),
            None => {
                debug!(user = %id, "Session user has no profile");
                Actor::Anonymous
            }
        })
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Creates a category. Admin only.
    pub fn create_category(
        &self,
        actor: &Actor,
        name: &str,
        description: Option<String>,
        sort_order: i32,
    ) -> Result<Category> {
        require_admin(actor)?;
        let category = Category::new(name, description, sort_order)?;
        self.store.insert_category(&category)?;
        info!(category = %category.id, name = %category.name, by = %actor.label(), "Created category");
        Ok(category)
    }

    /// Deletes an empty category. Admin only.
    pub fn delete_category(&self, actor: &Actor, id: &CategoryId) -> Result<()> {
        require_admin(actor)?;
        self.store.delete_category(id)?;
        info!(category = %id, by = %actor.label(), "Deleted category");
        Ok(())
    }

    /// Categories with their forums, both ordered by sort order then name.
    pub fn board_index(&self) -> Result<Vec<CategoryListing>> {
        let mut categories = self.store.list_categories()?;
        categories.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });

        categories
            .into_iter()
            .map(|category| {
                let mut forums = self.store.list_forums_in_category(&category.id)?;
                forums.sort_by(|a, b| {
                    a.sort_order
                        .cmp(&b.sort_order)
                        .then_with(|| a.name.cmp(&b.name))
                });
                Ok(CategoryListing { category, forums })
            })
            .collect()
    }

    // =========================================================================
    // Forums
    // =========================================================================

    /// Looks a forum up by short code or raw id.
    pub fn find_forum(&self, identifier: &str) -> Result<Forum> {
        find_forum_by_identifier(&self.store, identifier)?
            .ok_or_else(|| BoardError::not_found(format!("Forum '{}'", identifier)))
    }

    /// Returns the short code a new forum with this name would receive,
    /// without writing anything. `None` means the name has no usable
    /// characters and the forum would be addressed by id.
    pub fn preview_short_code(&self, name: &str, category_id: &CategoryId) -> Result<Option<String>> {
        if normalize(name).is_empty() {
            return Ok(None);
        }
        resolve_short_code(&self.store, name, category_id, None).map(Some)
    }

    /// Creates a forum and assigns its short code. Admin only.
    ///
    /// A forum whose name normalizes to nothing is stored without a short
    /// code and addressed by id.
    pub fn create_forum(
        &self,
        actor: &Actor,
        category_id: &CategoryId,
        name: &str,
        description: Option<String>,
        sort_order: i32,
    ) -> Result<Forum> {
        require_admin(actor)?;
        let mut forum = Forum::new(*category_id, name, description, sort_order)?;
        if self.store.find_category_by_id(category_id)?.is_none() {
            return Err(BoardError::not_found(format!("Category {}", category_id)));
        }

        self.write_with_short_code(&mut forum, None, |store, forum| store.insert_forum(forum))?;
        info!(
            forum = %forum.id,
            short_code = ?forum.short_code,
            by = %actor.label(),
            "Created forum"
        );
        Ok(forum)
    }

    /// Renames a forum and re-resolves its short code. Admin only.
    ///
    /// The forum's own current code does not count as a conflict, so a
    /// rename that normalizes to the same code keeps it.
    pub fn rename_forum(&self, actor: &Actor, identifier: &str, new_name: &str) -> Result<Forum> {
        require_admin(actor)?;
        let mut forum = self.find_forum(identifier)?;
        forum.name = required_text("Forum name", new_name, MAX_NAME_LENGTH)?;

        let own_id = forum.id;
        self.write_with_short_code(&mut forum, Some(own_id), |store, forum| {
            store.update_forum(forum)
        })?;
        info!(forum = %forum.id, short_code = ?forum.short_code, "Renamed forum");
        Ok(forum)
    }

    /// Resolves a short code for `forum` and writes it with `write`.
    ///
    /// The store rejects a code another writer claimed in the meantime; the
    /// code is then resolved again, up to the configured number of attempts.
    fn write_with_short_code<W>(
        &self,
        forum: &mut Forum,
        exclude: Option<ForumId>,
        write: W,
    ) -> Result<()>
    where
        W: Fn(&S, &Forum) -> Result<()>,
    {
        if normalize(&forum.name).is_empty() {
            warn!(
                forum = %forum.id,
                name = %forum.name,
                "Forum name has no short code characters, addressing by id"
            );
            forum.short_code = None;
            return write(&self.store, forum);
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let code =
                resolve_short_code(&self.store, &forum.name, &forum.category_id, exclude.as_ref())?;
            forum.short_code = Some(code);

            match write(&self.store, forum) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_conflict() && attempt < self.max_short_code_attempts => {
                    warn!(
                        forum = %forum.id,
                        attempt,
                        "Short code claimed concurrently, resolving again: {}",
                        e
                    );
                }
                Err(e) if e.is_conflict() => {
                    return Err(BoardError::short_code(format!(
                        "could not generate identifier after {} attempts: {}",
                        attempt, e
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Locks or unlocks a forum. Admin only.
    pub fn set_forum_locked(&self, actor: &Actor, identifier: &str, locked: bool) -> Result<Forum> {
        require_admin(actor)?;
        let mut forum = self.find_forum(identifier)?;
        forum.is_locked = locked;
        self.store.update_forum(&forum)?;
        info!(forum = %forum.id, locked, "Updated forum lock");
        Ok(forum)
    }

    /// Deletes a forum that has no threads. Admin only.
    pub fn delete_forum(&self, actor: &Actor, identifier: &str) -> Result<()> {
        require_admin(actor)?;
        let forum = self.find_forum(identifier)?;
        self.store.delete_forum(&forum.id)?;
        info!(forum = %forum.id, by = %actor.label(), "Deleted forum");
        Ok(())
    }

    /// A forum with one page of its threads.
    ///
    /// `cursor` is the encoded cursor from the previous page, or `None` for
    /// the first page.
    pub fn forum_page(&self, identifier: &str, cursor: Option<&str>) -> Result<ForumPage> {
        let forum = self.find_forum(identifier)?;
        let category = self.store.find_category_by_id(&forum.category_id)?;

        let after = match cursor {
            Some(encoded) => Some(
                Cursor::decode(encoded)
                    .ok_or_else(|| BoardError::validation("Invalid page cursor"))?,
            ),
            None => None,
        };

        let mut threads = self.store.list_threads_in_forum(&forum.id)?;
        threads.sort_by_key(thread_sort_key);
        let total_count = threads.len();

        let remaining: Vec<Thread> = match &after {
            Some(cursor) => threads
                .into_iter()
                .filter(|t| thread_sort_key(t) > cursor.sort_key())
                .collect(),
            None => threads,
        };
        let has_more = remaining.len() > self.page_size;

        let mut items = Vec::with_capacity(self.page_size.min(remaining.len()));
        for thread in remaining.into_iter().take(self.page_size) {
            let post_count = self.store.count_posts_in_thread(&thread.id)?;
            items.push(ThreadSummary { thread, post_count });
        }
        let next_cursor = if has_more {
            items.last().map(|s| Cursor::after(&s.thread))
        } else {
            None
        };

        Ok(ForumPage {
            forum,
            category,
            threads: PaginatedResult {
                items,
                next_cursor,
                total_count,
            },
        })
    }

    // =========================================================================
    // Threads and posts
    // =========================================================================

    /// Starts a thread with its opening post. Requires a signed-in user;
    /// locked forums only accept threads from admins.
    pub fn create_thread(
        &self,
        actor: &Actor,
        forum_identifier: &str,
        title: &str,
        content: &str,
    ) -> Result<Thread> {
        let author = require_member(actor)?;
        let forum = self.find_forum(forum_identifier)?;
        if forum.is_locked && !actor.is_admin() {
            return Err(BoardError::locked(format!("Forum '{}' is locked", forum.name)));
        }

        let thread = Thread::new(forum.id, author, title)?;
        let opening = Post::new(thread.id, author, content)?;
        self.store.insert_thread(&thread, &opening)?;
        info!(thread = %thread.id, forum = %forum.id, author = %author, "Created thread");
        Ok(thread)
    }

    /// Posts a reply. Requires a signed-in user; locked threads only accept
    /// replies from admins.
    ///
    /// Bumping the thread's activity time is best-effort: the reply is kept
    /// even if that update fails.
    pub fn create_reply(&self, actor: &Actor, thread_id: &ThreadId, content: &str) -> Result<Post> {
        let author = require_member(actor)?;
        let thread = self
            .store
            .find_thread_by_id(thread_id)?
            .ok_or_else(|| BoardError::not_found(format!("Thread {}", thread_id)))?;
        if thread.is_locked && !actor.is_admin() {
            return Err(BoardError::locked(format!("Thread '{}' is locked", thread.title)));
        }

        let post = Post::new(thread.id, author, content)?;
        self.store.insert_post(&post)?;

        let at = post.created_at;
        if let Err(e) = self.store.modify_thread(thread_id, &mut |t| t.touch(at)) {
            warn!(thread = %thread_id, "Failed to update thread timestamp: {}", e);
        }
        info!(post = %post.id, thread = %thread_id, author = %author, "Created reply");
        Ok(post)
    }

    /// Counts a view of a thread. Failures are logged and swallowed.
    pub fn increment_view_count(&self, thread_id: &ThreadId) {
        match self
            .store
            .modify_thread(thread_id, &mut |t| t.view_count = t.view_count.saturating_add(1))
        {
            Ok(Some(_)) => {}
            Ok(None) => debug!(thread = %thread_id, "View counted for missing thread"),
            Err(e) => warn!(thread = %thread_id, "Failed to increment view count: {}", e),
        }
    }

    /// Pins or unpins a thread. Admin only.
    pub fn set_thread_pinned(&self, actor: &Actor, thread_id: &ThreadId, pinned: bool) -> Result<Thread> {
        require_admin(actor)?;
        self.modify_existing_thread(thread_id, |t| t.is_pinned = pinned)
    }

    /// Locks or unlocks a thread. Admin only.
    pub fn set_thread_locked(&self, actor: &Actor, thread_id: &ThreadId, locked: bool) -> Result<Thread> {
        require_admin(actor)?;
        self.modify_existing_thread(thread_id, |t| t.is_locked = locked)
    }

    fn modify_existing_thread<F>(&self, thread_id: &ThreadId, mut change: F) -> Result<Thread>
    where
        F: FnMut(&mut Thread),
    {
        self.store
            .modify_thread(thread_id, &mut change)?
            .ok_or_else(|| BoardError::not_found(format!("Thread {}", thread_id)))
    }

    /// Deletes a thread and its posts. Admin only. Returns the number of
    /// posts removed.
    pub fn delete_thread(&self, actor: &Actor, thread_id: &ThreadId) -> Result<usize> {
        require_admin(actor)?;
        let removed = self.store.delete_thread(thread_id)?;
        info!(thread = %thread_id, posts = removed, by = %actor.label(), "Deleted thread");
        Ok(removed)
    }

    /// A thread with its forum and posts, oldest post first.
    pub fn thread_page(&self, thread_id: &ThreadId) -> Result<ThreadPage> {
        let thread = self
            .store
            .find_thread_by_id(thread_id)?
            .ok_or_else(|| BoardError::not_found(format!("Thread {}", thread_id)))?;
        let forum = self
            .store
            .find_forum_by_id(&thread.forum_id)?
            .ok_or_else(|| BoardError::not_found(format!("Forum {}", thread.forum_id)))?;
        let posts = self.store.list_posts_in_thread(thread_id)?;
        Ok(ThreadPage {
            forum,
            thread,
            posts,
        })
    }
}
