//! Input limits shared by the record constructors.

use crate::error::{BoardError, Result};

/// Maximum length for category and forum names in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum length for category and forum descriptions in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 5_000;

/// Maximum length for thread titles in characters.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for post bodies in characters.
pub const MAX_POST_LENGTH: usize = 100_000;

/// Username length bounds in characters.
pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 32;

/// Trims and checks a required single-line field.
pub fn required_text(field: &str, value: &str, max_len: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BoardError::validation(format!("{} cannot be empty", field)));
    }
    if value.chars().count() > max_len {
        return Err(BoardError::validation(format!(
            "{} exceeds maximum length of {} characters",
            field, max_len
        )));
    }
    Ok(value.to_string())
}

/// Trims an optional description; blank input becomes `None`.
pub fn optional_description(value: Option<String>) -> Result<Option<String>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if value.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(BoardError::validation(format!(
            "Description exceeds maximum length of {} characters",
            MAX_DESCRIPTION_LENGTH
        )));
    }
    Ok(Some(value.to_string()))
}

/// Checks a username: ASCII letters, digits, `_` and `-` only.
pub fn username(value: &str) -> Result<String> {
    let value = value.trim();
    let len = value.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(BoardError::validation(format!(
            "Username must be {}-{} characters",
            MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH
        )));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(BoardError::validation(
            "Username may only contain letters, digits, '_' and '-'",
        ));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text("Name", "  General  ", 10).unwrap(), "General");
    }

    #[test]
    fn test_required_text_rejects_blank_and_long() {
        assert!(required_text("Name", "   ", 10).is_err());
        assert!(required_text("Name", "abcdefghijk", 10).is_err());
        // Limits count characters, not bytes
        assert!(required_text("Name", "éééééééééé", 10).is_ok());
    }

    #[test]
    fn test_optional_description() {
        assert_eq!(optional_description(None).unwrap(), None);
        assert_eq!(optional_description(Some("  ".into())).unwrap(), None);
        assert_eq!(
            optional_description(Some(" about ".into())).unwrap(),
            Some("about".to_string())
        );
        let long = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert!(optional_description(Some(long)).is_err());
    }

    #[test]
    fn test_username_rules() {
        assert_eq!(username("alice_01").unwrap(), "alice_01");
        assert!(username("al").is_err());
        assert!(username("alice smith").is_err());
        assert!(username(&"a".repeat(33)).is_err());
    }
}
