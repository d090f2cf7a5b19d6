//! Core types for playback management

use rotation_selection::{FavoriteRatio, RatedItem, SelectionError, TimeRange};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One logical track in the engine's list
///
/// With a `time_range` only that slice of the resource at `url` is played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Resource handed to the transport
    pub url: String,

    /// Display title
    pub title: String,

    /// Clip inside the resource (None = whole resource)
    #[serde(default)]
    pub time_range: Option<TimeRange>,
}

impl Track {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            time_range: None,
        }
    }

    pub fn clipped(url: impl Into<String>, title: impl Into<String>, range: TimeRange) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            time_range: Some(range),
        }
    }

    /// Absolute resource time where this track starts
    pub fn start_seconds(&self) -> f64 {
        self.time_range.map_or(0.0, |r| r.start_seconds)
    }

    /// Absolute resource time where this track ends (None = natural end)
    pub fn end_seconds(&self) -> Option<f64> {
        self.time_range.map(|r| r.end_seconds())
    }

    /// URL handed to the transport
    ///
    /// Clipped tracks carry a media fragment (`#t=start,end`) so transports
    /// that understand it only buffer the clip.
    pub fn source_url(&self) -> String {
        match self.time_range {
            Some(range) => format!(
                "{}#t={},{}",
                self.url,
                range.start_seconds,
                range.end_seconds()
            ),
            None => self.url.clone(),
        }
    }
}

impl From<&RatedItem> for Track {
    fn from(item: &RatedItem) -> Self {
        Self {
            url: item.url.clone(),
            title: item.title.clone(),
            time_range: item.time_range,
        }
    }
}

/// Resumable playback checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackPosition {
    /// Index into the track list
    pub track: usize,

    /// Seconds from the track's (clipped) start
    pub position: f64,
}

impl TrackPosition {
    pub fn new(track: usize, position: f64) -> Self {
        Self { track, position }
    }
}

/// Persisted volume settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSettings {
    /// Volume level (0-100)
    pub volume: u8,

    /// Mute flag (volume level is preserved)
    pub mute: bool,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            volume: 100,
            mute: false,
        }
    }
}

/// Normalized player state
///
/// Owned by the engine and only ever read by observers. `position` is
/// measured from the current track's clipped start. `current_track_index`
/// is `None` when no track is active; after the queue ran out `has_ended`
/// is set as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// A seek was requested and has not been acknowledged yet
    pub is_seeking: bool,

    /// Transport reported playing
    pub is_playing: bool,

    /// Transport is loading a source
    pub is_busy: bool,

    /// Playback advanced past the last track
    pub has_ended: bool,

    /// Seconds into the current track
    pub position: f64,

    /// Length of the current track in seconds (0 = unknown)
    pub duration: f64,

    /// Index of the active track
    pub current_track_index: Option<usize>,

    /// Track list
    pub tracks: Vec<Track>,

    /// Volume level (0-100)
    pub volume: u8,

    /// Mute flag
    pub mute: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            is_seeking: false,
            is_playing: false,
            is_busy: false,
            has_ended: false,
            position: 0.0,
            duration: 0.0,
            current_track_index: None,
            tracks: Vec::new(),
            volume: 100,
            mute: false,
        }
    }
}

impl PlayerState {
    /// Currently active track, if any
    pub fn current_track(&self) -> Option<&Track> {
        self.current_track_index.and_then(|i| self.tracks.get(i))
    }
}

/// Configuration for the playback engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Quiet period before a seek reaches the transport (default: 200)
    pub seek_debounce_ms: u64,

    /// "Previous" restarts the current track at or past this position (default: 5.0)
    pub rewind_threshold_secs: f64,

    /// Initial volume when nothing is persisted (0-100, default: 100)
    pub volume: u8,

    /// Step for media-key seek forward/backward (default: 30.0)
    pub media_seek_step_secs: f64,
}

impl PlaybackConfig {
    pub fn seek_debounce(&self) -> Duration {
        Duration::from_millis(self.seek_debounce_ms)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            seek_debounce_ms: 200,
            rewind_threshold_secs: 5.0,
            volume: 100,
            media_seek_step_secs: 30.0,
        }
    }
}

/// Configuration for queue generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Target number of items per reroll (default: 25)
    pub list_length: usize,

    /// Share of sampling mass held by favorites, in (0, 1) (default: 0.5)
    pub favorite_ratio: f64,
}

impl QueueConfig {
    /// Validated favorite ratio
    pub fn favorite_ratio(&self) -> Result<FavoriteRatio, SelectionError> {
        FavoriteRatio::new(self.favorite_ratio)
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            list_length: 25,
            favorite_ratio: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlaybackConfig::default();
        assert_eq!(config.seek_debounce(), Duration::from_millis(200));
        assert_eq!(config.rewind_threshold_secs, 5.0);
        assert_eq!(config.volume, 100);

        let queue = QueueConfig::default();
        assert_eq!(queue.list_length, 25);
        assert_eq!(queue.favorite_ratio().unwrap().value(), 0.5);
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: PlaybackConfig = serde_json::from_str(r#"{"rewind_threshold_secs": 3.0}"#).unwrap();
        assert_eq!(config.rewind_threshold_secs, 3.0);
        assert_eq!(config.seek_debounce_ms, 200);
    }

    #[test]
    fn invalid_ratio_rejected() {
        let queue = QueueConfig {
            favorite_ratio: 1.5,
            ..QueueConfig::default()
        };
        assert!(queue.favorite_ratio().is_err());
    }

    #[test]
    fn track_from_item_keeps_clip() {
        let item = RatedItem::new("1", "Song", "http://music/1").with_time_range(TimeRange::new(10.0, 5.0));
        let track = Track::from(&item);
        assert_eq!(track.url, "http://music/1");
        assert_eq!(track.start_seconds(), 10.0);
        assert_eq!(track.end_seconds(), Some(15.0));
        assert_eq!(track.source_url(), "http://music/1#t=10,15");
    }

    #[test]
    fn unclipped_source_url_is_plain() {
        let track = Track::new("http://music/2", "Other");
        assert_eq!(track.source_url(), "http://music/2");
        assert_eq!(track.end_seconds(), None);
    }

    #[test]
    fn current_track_lookup() {
        let mut state = PlayerState::default();
        assert!(state.current_track().is_none());

        state.tracks = vec![Track::new("a", "A"), Track::new("b", "B")];
        state.current_track_index = Some(1);
        assert_eq!(state.current_track().unwrap().title, "B");
    }
}
