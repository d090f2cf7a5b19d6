//! Persisted player state
//!
//! The engine reads and writes a handful of values through this trait: the
//! last volume and mute flag, and a resume point per playlist/item id.
//! Callers that shuffle their playlists also keep the item ids of the last
//! queue next to its resume point. The backend belongs to the platform.

use crate::error::StoreError;
use crate::types::{TrackPosition, VolumeSettings};
use std::collections::HashMap;
use std::sync::Mutex;

/// Key-value persistence used by the engine
pub trait PlayerStore: Send + Sync {
    /// Last saved volume settings, if any
    fn load_volume(&self) -> Result<Option<VolumeSettings>, StoreError>;

    fn save_volume(&self, settings: VolumeSettings) -> Result<(), StoreError>;

    /// Last saved resume point for `id`, if any
    fn load_position(&self, id: &str) -> Result<Option<TrackPosition>, StoreError>;

    fn save_position(&self, id: &str, position: TrackPosition) -> Result<(), StoreError>;

    /// Item ids of the last queue saved under `id`, in queue order
    fn load_queue(&self, id: &str) -> Result<Option<Vec<String>>, StoreError>;

    fn save_queue(&self, id: &str, item_ids: &[String]) -> Result<(), StoreError>;
}

/// In-memory store (tests, platforms without persistence)
#[derive(Debug, Default)]
pub struct MemoryStore {
    volume: Mutex<Option<VolumeSettings>>,
    positions: Mutex<HashMap<String, TrackPosition>>,
    queues: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(key: &str) -> StoreError {
    StoreError::Corrupt {
        key: key.to_string(),
        reason: "lock poisoned".to_string(),
    }
}

impl PlayerStore for MemoryStore {
    fn load_volume(&self) -> Result<Option<VolumeSettings>, StoreError> {
        self.volume
            .lock()
            .map(|v| *v)
            .map_err(|_| poisoned("volume"))
    }

    fn save_volume(&self, settings: VolumeSettings) -> Result<(), StoreError> {
        *self.volume.lock().map_err(|_| poisoned("volume"))? = Some(settings);
        Ok(())
    }

    fn load_position(&self, id: &str) -> Result<Option<TrackPosition>, StoreError> {
        self.positions
            .lock()
            .map(|p| p.get(id).copied())
            .map_err(|_| poisoned(id))
    }

    fn save_position(&self, id: &str, position: TrackPosition) -> Result<(), StoreError> {
        self.positions
            .lock()
            .map_err(|_| poisoned(id))?
            .insert(id.to_string(), position);
        Ok(())
    }

    fn load_queue(&self, id: &str) -> Result<Option<Vec<String>>, StoreError> {
        self.queues
            .lock()
            .map(|q| q.get(id).cloned())
            .map_err(|_| poisoned(id))
    }

    fn save_queue(&self, id: &str, item_ids: &[String]) -> Result<(), StoreError> {
        self.queues
            .lock()
            .map_err(|_| poisoned(id))?
            .insert(id.to_string(), item_ids.to_vec());
        Ok(())
    }
}
