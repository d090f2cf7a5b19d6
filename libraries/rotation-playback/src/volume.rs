//! Volume control
//!
//! Volume range is 0-100%, applied linearly: the transport receives
//! `level / 100`, or 0 while muted.

use crate::types::VolumeSettings;

/// Volume controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Volume {
    /// Volume level (0-100)
    level: u8,

    /// Mute state (preserves volume level)
    muted: bool,
}

impl Volume {
    /// Unmuted at `level`, clamped to 100
    pub fn new(level: u8) -> Self {
        Self {
            level: level.min(100),
            muted: false,
        }
    }

    /// Set volume level (0-100)
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Gain handed to the transport
    ///
    /// Returns 0.0 if muted, otherwise `level / 100`
    pub fn gain(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            f32::from(self.level) / 100.0
        }
    }

    pub fn settings(&self) -> VolumeSettings {
        VolumeSettings {
            volume: self.level,
            mute: self.muted,
        }
    }
}

impl From<VolumeSettings> for Volume {
    fn from(settings: VolumeSettings) -> Self {
        Self {
            level: settings.volume.min(100),
            muted: settings.mute,
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(100)
    }
}
