//! Error types for item selection

use thiserror::Error;

/// Selection errors
#[derive(Debug, Error)]
pub enum SelectionError {
    /// Favorite ratio outside the open interval (0, 1)
    #[error("Favorite ratio must be between 0 and 1 (exclusive), got {0}")]
    InvalidFavoriteRatio(f64),

    /// Rating outside 0..=5
    #[error("Invalid rating: {0}")]
    InvalidRating(u8),

    /// No item with this id in the library
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// Remote rating/favorite store rejected a write
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Result type for selection operations
pub type Result<T> = std::result::Result<T, SelectionError>;
