//! Error types for board operations.

use thiserror::Error;

/// Result type alias for board operations.
pub type Result<T> = std::result::Result<T, BoardError>;

/// Main error type for board operations.
#[derive(Error, Debug)]
pub enum BoardError {
    /// Underlying key-value store failures (open, read, write)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The acting user lacks the required role
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A uniqueness constraint was violated at write time
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A record cannot be deleted while it still owns children
    #[error("Has children: {0}")]
    HasChildren(String),

    /// The target forum or thread is locked
    #[error("Locked: {0}")]
    Locked(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Short code generation failed
    #[error("Short code error: {0}")]
    ShortCode(String),
}

impl BoardError {
    /// Creates a new storage error.
    pub fn storage<T: ToString>(msg: T) -> Self {
        Self::Storage(msg.to_string())
    }

    /// Creates a new serialization error.
    pub fn serialization<T: ToString>(msg: T) -> Self {
        Self::Serialization(msg.to_string())
    }

    /// Creates a new validation error.
    pub fn validation<T: ToString>(msg: T) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Creates a new not-found error.
    pub fn not_found<T: ToString>(msg: T) -> Self {
        Self::NotFound(msg.to_string())
    }

    /// Creates a new unauthorized error.
    pub fn unauthorized<T: ToString>(msg: T) -> Self {
        Self::Unauthorized(msg.to_string())
    }

    /// Creates a new conflict error.
    pub fn conflict<T: ToString>(msg: T) -> Self {
        Self::Conflict(msg.to_string())
    }

    /// Creates a new has-children error.
    pub fn has_children<T: ToString>(msg: T) -> Self {
        Self::HasChildren(msg.to_string())
    }

    /// Creates a new locked error.
    pub fn locked<T: ToString>(msg: T) -> Self {
        Self::Locked(msg.to_string())
    }

    /// Creates a new configuration error.
    pub fn config<T: ToString>(msg: T) -> Self {
        Self::Config(msg.to_string())
    }

    /// Creates a new short code error.
    pub fn short_code<T: ToString>(msg: T) -> Self {
        Self::ShortCode(msg.to_string())
    }

    /// Returns true if this error is a write-time uniqueness violation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_category() {
        let err = BoardError::not_found("forum abc");
        assert_eq!(err.to_string(), "Not found: forum abc");

        let err = BoardError::short_code("could not generate identifier");
        assert_eq!(
            err.to_string(),
            "Short code error: could not generate identifier"
        );
    }

    #[test]
    fn test_is_conflict() {
        assert!(BoardError::conflict("taken").is_conflict());
        assert!(!BoardError::storage("down").is_conflict());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err: BoardError = io.into();
        assert!(matches!(err, BoardError::Io(_)));
    }
}
