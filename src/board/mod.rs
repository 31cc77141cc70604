//! Discussion board: categories contain forums, forums contain threads,
//! threads contain posts.
//!
//! ## Hierarchy
//!
//! ```text
//! Category
//!     └── Forum (addressed by short code or id)
//!             └── Thread
//!                     └── Post
//! ```
//!
//! Records live behind the [`BoardStore`] trait, with an in-memory and a
//! RocksDB implementation. [`BoardService`] carries the operations: role
//! checks, short code assignment, listings.

mod category;
mod forum;
pub mod memory;
pub mod permissions;
mod post;
pub mod service;
pub mod shortcode;
pub mod storage;
pub mod store;
mod thread;
pub mod types;
mod user;
pub mod validation;

pub use category::Category;
pub use forum::Forum;
pub use memory::MemoryStore;
pub use permissions::Actor;
pub use post::Post;
pub use service::{
    BoardService, CategoryListing, Cursor, ForumPage, PaginatedResult, ThreadPage, ThreadSummary,
};
pub use shortcode::{
    find_forum_by_identifier, is_canonical_identifier, normalize, resolve_short_code,
    url_identifier,
};
pub use storage::ForumStorage;
pub use store::BoardStore;
pub use thread::Thread;
pub use types::{CategoryId, ForumId, PostId, Role, ThreadId, UserId};
pub use user::UserProfile;
