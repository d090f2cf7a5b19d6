//! Media session stand-in
//!
//! There are no system media keys in a headless run; bindings are logged
//! and every now-playing update is recorded for the session report.

use rotation_playback::{MediaAction, MediaControls};
use rotation_selection::RatedItem;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// One now-playing update
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRecord {
    pub id: String,
    pub rating: u8,
    pub is_favorite: bool,
}

/// Logs media session updates and keeps a play history
#[derive(Debug, Clone, Default)]
pub struct LogMediaControls {
    history: Arc<Mutex<Vec<PlayRecord>>>,
    bound: Arc<Mutex<Vec<MediaAction>>>,
}

impl LogMediaControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Items shown as now playing, oldest first
    pub fn history(&self) -> Vec<PlayRecord> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Actions currently bound
    pub fn bound(&self) -> Vec<MediaAction> {
        self.bound.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

impl MediaControls for LogMediaControls {
    fn bind(&mut self, actions: &[MediaAction]) {
        debug!(?actions, "Bound media actions");
        if let Ok(mut bound) = self.bound.lock() {
            *bound = actions.to_vec();
        }
    }

    fn unbind(&mut self) {
        if let Ok(mut bound) = self.bound.lock() {
            bound.clear();
        }
    }

    fn set_now_playing(&mut self, item: &RatedItem) {
        info!(
            id = %item.id,
            title = %item.title,
            artist = item.artist.as_deref().unwrap_or("-"),
            rating = item.rating,
            favorite = item.is_favorite,
            "Now playing"
        );
        if let Ok(mut history) = self.history.lock() {
            history.push(PlayRecord {
                id: item.id.clone(),
                rating: item.rating,
                is_favorite: item.is_favorite,
            });
        }
    }
}
