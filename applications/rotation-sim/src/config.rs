/// Simulator configuration
use crate::error::{Result, SimError};
use rotation_playback::{PlaybackConfig, QueueConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "rotation.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SimConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default = "default_library")]
    pub library: LibrarySettings,

    #[serde(default = "default_simulation")]
    pub simulation: SimulationSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// JSON array of rated items
    #[serde(default = "default_catalog_path")]
    pub catalog_path: PathBuf,

    /// JSON file holding volume and resume points
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationSettings {
    /// Length of one simulated step
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Total simulated time
    #[serde(default = "default_duration_secs")]
    pub duration_secs: u64,

    /// Length of every simulated resource
    #[serde(default = "default_track_secs")]
    pub track_secs: f64,

    /// Press "next track" every this many seconds (0 disables)
    #[serde(default)]
    pub skip_every_secs: u64,

    /// Fixed sampler seed; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SimConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `rotation.toml` is read
    /// when present. `ROTATION_`-prefixed variables override both, with
    /// `__` between section and key (`ROTATION_QUEUE__LIST_LENGTH=10`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(SimError::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ROTATION")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| SimError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| SimError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.queue
            .favorite_ratio()
            .map_err(|e| SimError::Config(e.to_string()))?;

        if self.queue.list_length == 0 {
            return Err(SimError::Config(
                "queue.list_length must be at least 1".to_string(),
            ));
        }

        if self.playback.volume > 100 {
            return Err(SimError::Config(format!(
                "playback.volume must be 0-100, got {}",
                self.playback.volume
            )));
        }

        if self.simulation.tick_ms == 0 {
            return Err(SimError::Config(
                "simulation.tick_ms must be positive".to_string(),
            ));
        }

        if !(self.simulation.track_secs.is_finite() && self.simulation.track_secs > 0.0) {
            return Err(SimError::Config(format!(
                "simulation.track_secs must be positive, got {}",
                self.simulation.track_secs
            )));
        }

        Ok(())
    }
}

// Default values
fn default_library() -> LibrarySettings {
    LibrarySettings {
        catalog_path: default_catalog_path(),
        state_path: default_state_path(),
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("./data/library.json")
}

fn default_state_path() -> PathBuf {
    PathBuf::from("./data/player-state.json")
}

fn default_simulation() -> SimulationSettings {
    SimulationSettings {
        tick_ms: default_tick_ms(),
        duration_secs: default_duration_secs(),
        track_secs: default_track_secs(),
        skip_every_secs: 0,
        seed: None,
    }
}

fn default_tick_ms() -> u64 {
    250
}

fn default_duration_secs() -> u64 {
    3600
}

fn default_track_secs() -> f64 {
    180.0
}

impl Default for LibrarySettings {
    fn default() -> Self {
        default_library()
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        default_simulation()
    }
}
