//! # bbforum
//!
//! Core of a category/forum/thread/post discussion board: records, role
//! checks, RocksDB persistence, and collision-free forum short codes.
//!
//! ## Short codes
//!
//! Forums get a URL-friendly short code derived from their name. When the
//! plain code is taken in another category the category name is prefixed;
//! when it is taken in the same category (or the prefixed code is also
//! taken) a numeric suffix is appended.
//!
//! ```rust
//! use bbforum::board::{Actor, BoardService, MemoryStore};
//! # fn main() -> bbforum::Result<()> {
//! let board = BoardService::new(MemoryStore::new());
//! let gaming = board.create_category(&Actor::Operator, "Gaming", None, 0)?;
//! let music = board.create_category(&Actor::Operator, "Music", None, 1)?;
//!
//! let a = board.create_forum(&Actor::Operator, &gaming.id, "General", None, 0)?;
//! let b = board.create_forum(&Actor::Operator, &music.id, "General", None, 0)?;
//! let c = board.create_forum(&Actor::Operator, &music.id, "General", None, 1)?;
//!
//! assert_eq!(a.short_code.as_deref(), Some("general"));
//! assert_eq!(b.short_code.as_deref(), Some("music_general"));
//! assert_eq!(c.short_code.as_deref(), Some("music_general_1"));
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod cli;
pub mod config;
pub mod error;
pub mod storage;

pub use error::{BoardError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
