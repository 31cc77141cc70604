//! Forums: named discussion areas inside a category.

use crate::board::shortcode;
use crate::board::types::{current_timestamp_millis, CategoryId, ForumId};
use crate::board::validation::{optional_description, required_text, MAX_NAME_LENGTH};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A forum record.
///
/// `short_code` is `None` until one has been resolved and stored, and stays
/// `None` for forums whose name has no characters usable in a short code.
/// Such forums are addressed by their raw id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forum {
    /// Unique identifier.
    pub id: ForumId,
    /// Owning category.
    pub category_id: CategoryId,
    /// Display name.
    pub name: String,
    /// URL-friendly alternate identifier, unique across the store.
    pub short_code: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Position within the category, ascending.
    pub sort_order: i32,
    /// Locked forums reject new threads from non-admins.
    pub is_locked: bool,
    /// Creation timestamp in milliseconds since Unix epoch.
    pub created_at: u64,
}

impl Forum {
    /// Creates a new forum without a short code.
    ///
    /// # Errors
    /// Returns a validation error if the name is blank or longer than
    /// 100 characters, or if the description exceeds 5,000 characters.
    pub fn new(
        category_id: CategoryId,
        name: &str,
        description: Option<String>,
        sort_order: i32,
    ) -> Result<Self> {
        Ok(Self {
            id: ForumId::new(),
            category_id,
            name: required_text("Forum name", name, MAX_NAME_LENGTH)?,
            short_code: None,
            description: optional_description(description)?,
            sort_order,
            is_locked: false,
            created_at: current_timestamp_millis(),
        })
    }

    /// Returns the identifier to put in URLs for this forum.
    pub fn url_identifier(&self) -> String {
        shortcode::url_identifier(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_forum_has_no_short_code() {
        let forum = Forum::new(CategoryId::new(), "Announcements", None, 0).unwrap();
        assert!(forum.short_code.is_none());
        assert!(!forum.is_locked);
        assert_eq!(forum.url_identifier(), forum.id.to_string());
    }

    #[test]
    fn test_long_name_rejected() {
        let name = "n".repeat(MAX_NAME_LENGTH + 1);
        assert!(Forum::new(CategoryId::new(), &name, None, 0).is_err());
    }
}
