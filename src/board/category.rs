//! Categories: the top level of the board hierarchy.
//!
//! A category groups forums on the index page and scopes forum short codes.
//! Its normalized name is also the prefix used to disambiguate a forum whose
//! short code is already taken in another category.

use crate::board::types::{current_timestamp_millis, CategoryId};
use crate::board::validation::{optional_description, required_text, MAX_NAME_LENGTH};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A category record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Optional description shown under the name.
    pub description: Option<String>,
    /// Position on the index page, ascending.
    pub sort_order: i32,
    /// Creation timestamp in milliseconds since Unix epoch.
    pub created_at: u64,
}

impl Category {
    /// Creates a new category with a fresh identifier.
    ///
    /// # Errors
    /// Returns a validation error if the name is blank or longer than
    /// 100 characters, or if the description exceeds 5,000 characters.
    pub fn new(name: &str, description: Option<String>, sort_order: i32) -> Result<Self> {
        Ok(Self {
            id: CategoryId::new(),
            name: required_text("Category name", name, MAX_NAME_LENGTH)?,
            description: optional_description(description)?,
            sort_order,
            created_at: current_timestamp_millis(),
        })
    }
}
