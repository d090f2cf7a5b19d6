//! JSON file backend for the player store
//!
//! The whole state lives in one small document that is read, modified and
//! rewritten on every save:
//! ```json
//! { "volume": { "volume": 80, "mute": false },
//!   "positions": { "rotation": { "track": 3, "position": 41.5 } },
//!   "queues": { "rotation": ["s1", "s7", "s4"] } }
//! ```

use rotation_playback::{PlayerStore, StoreError, TrackPosition, VolumeSettings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    volume: Option<VolumeSettings>,

    #[serde(default)]
    positions: BTreeMap<String, TrackPosition>,

    #[serde(default)]
    queues: BTreeMap<String, Vec<String>>,
}

/// `PlayerStore` persisted to a JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StateDocument, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StateDocument::default()),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
            key: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn write(&self, document: &StateDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let contents =
            serde_json::to_string_pretty(document).map_err(|e| StoreError::Corrupt {
                key: self.path.display().to_string(),
                reason: e.to_string(),
            })?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    fn update(&self, key: &str, apply: impl FnOnce(&mut StateDocument)) -> Result<(), StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Corrupt {
            key: key.to_string(),
            reason: "lock poisoned".to_string(),
        })?;

        let mut document = self.read()?;
        apply(&mut document);
        self.write(&document)
    }
}

impl PlayerStore for JsonFileStore {
    fn load_volume(&self) -> Result<Option<VolumeSettings>, StoreError> {
        Ok(self.read()?.volume)
    }

    fn save_volume(&self, settings: VolumeSettings) -> Result<(), StoreError> {
        self.update("volume", |doc| doc.volume = Some(settings))
    }

    fn load_position(&self, id: &str) -> Result<Option<TrackPosition>, StoreError> {
        Ok(self.read()?.positions.get(id).copied())
    }

    fn save_position(&self, id: &str, position: TrackPosition) -> Result<(), StoreError> {
        self.update(id, |doc| {
            doc.positions.insert(id.to_string(), position);
        })
    }

    fn load_queue(&self, id: &str) -> Result<Option<Vec<String>>, StoreError> {
        Ok(self.read()?.queues.get(id).cloned())
    }

    fn save_queue(&self, id: &str, item_ids: &[String]) -> Result<(), StoreError> {
        self.update(id, |doc| {
            doc.queues.insert(id.to_string(), item_ids.to_vec());
        })
    }
}
