/// Simulator error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Playback error: {0}")]
    Playback(#[from] rotation_playback::PlaybackError),

    #[error("Selection error: {0}")]
    Selection(#[from] rotation_selection::SelectionError),
}
