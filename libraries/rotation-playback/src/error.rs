//! Error types for playback management

use thiserror::Error;

/// Failures reported by a transport
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    /// The transport refused to start playback (e.g. autoplay policy)
    #[error("Playback rejected: {0}")]
    Rejected(String),

    /// The source could not be loaded
    #[error("Failed to load source {url}: {reason}")]
    Load { url: String, reason: String },

    /// The transport could not seek to the requested position
    #[error("Seek to {0:.1}s failed")]
    Seek(f64),
}

/// Failures reported by the key-value store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored value could not be decoded
    #[error("Corrupt value for {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Transport rejected an operation
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Track index outside the list
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Persistence error
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Selection error (invalid favorite ratio, ...)
    #[error("Selection error: {0}")]
    Selection(#[from] rotation_selection::SelectionError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
