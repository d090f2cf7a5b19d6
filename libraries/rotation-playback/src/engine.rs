//! Playback engine - core orchestration
//!
//! Drives a single `Transport` through a list of (optionally clipped)
//! tracks and republishes what the transport reports as a normalized
//! `PlayerState`.
//!
//! The engine is synchronous. The platform forwards transport notifications
//! to `handle_transport_event` and calls `tick` periodically so debounced
//! seeks reach the transport.

use crate::{
    clock::{Clock, SystemClock},
    error::{PlaybackError, Result},
    events::{EventBus, PlayerEvent, SubscriptionId},
    seek::SeekDebouncer,
    store::PlayerStore,
    transport::{Transport, TransportEvent},
    types::{PlaybackConfig, PlayerState, Track, TrackPosition},
    volume::Volume,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Playback engine
///
/// Owns the track list, the current index and the transport. Everything
/// observers see goes through `state()` and the event bus.
///
/// Operations invoked while no transport is attached are accepted and
/// ignored, so callers can run during the platform's startup window.
/// Volume changes are the exception: they are recorded and applied once a
/// transport attaches.
pub struct PlaybackEngine {
    config: PlaybackConfig,
    state: PlayerState,

    transport: Option<Box<dyn Transport>>,
    clock: Arc<dyn Clock>,
    store: Option<Arc<dyn PlayerStore>>,

    volume: Volume,
    seek: SeekDebouncer,

    // Absolute resource time to jump to on the next `Playing` event
    pending_start: Option<f64>,

    // Absolute resource time where the current clip ends
    expected_end: Option<f64>,

    events: EventBus,
}

impl PlaybackEngine {
    /// Create an engine reading time from the system clock
    pub fn new(config: PlaybackConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create an engine with an explicit time source
    pub fn with_clock(config: PlaybackConfig, clock: Arc<dyn Clock>) -> Self {
        let volume = Volume::new(config.volume);
        let state = PlayerState {
            volume: volume.level(),
            mute: volume.is_muted(),
            ..PlayerState::default()
        };

        Self {
            seek: SeekDebouncer::new(config.seek_debounce()),
            config,
            state,
            transport: None,
            clock,
            store: None,
            volume,
            pending_start: None,
            expected_end: None,
            events: EventBus::new(),
        }
    }

    /// Persist volume changes and resume points to `store`
    pub fn with_store(mut self, store: Arc<dyn PlayerStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    // ===== Transport binding =====

    /// Bind a transport, replacing any previous one
    ///
    /// The last known volume is applied before the transport sees any other
    /// command.
    pub fn attach_transport(&mut self, mut transport: Box<dyn Transport>) {
        transport.set_volume(self.volume.gain());
        self.transport = Some(transport);
        debug!(volume = self.volume.level(), muted = self.volume.is_muted(), "Transport attached");
    }

    /// Release the transport. Pending seeks stay parked until a transport
    /// is attached again.
    pub fn detach_transport(&mut self) -> Option<Box<dyn Transport>> {
        let transport = self.transport.take();
        if transport.is_some() {
            debug!("Transport detached");
        }
        transport
    }

    pub fn is_attached(&self) -> bool {
        self.transport.is_some()
    }

    /// Whether the transport is paused (true while detached)
    pub fn is_paused(&self) -> bool {
        match &self.transport {
            Some(transport) => transport.is_paused(),
            None => true,
        }
    }

    // ===== Observers =====

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PlayerEvent) + Send + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unsubscribe(id)
    }

    // ===== Track list =====

    /// Replace the track list
    ///
    /// The current index resolves to `start.track` (or 0). With `play_now`
    /// the resolved track is loaded and started, and `start.position` is
    /// applied once the transport reports `Playing`. Without it the
    /// transport is left alone: whatever it is playing keeps playing.
    pub fn load_tracks(
        &mut self,
        tracks: Vec<Track>,
        play_now: bool,
        start: Option<TrackPosition>,
    ) -> Result<()> {
        if self.transport.is_none() {
            debug!(tracks = tracks.len(), "No transport attached, ignoring load");
            return Ok(());
        }

        self.seek.cancel();
        self.state.is_seeking = false;

        let previous = self.state.current_track_index;
        let mut start = start.unwrap_or_default();
        if !tracks.is_empty() && start.track >= tracks.len() {
            warn!(
                track = start.track,
                len = tracks.len(),
                "Start position outside track list, starting from the top"
            );
            start = TrackPosition::default();
        }

        self.state.tracks = tracks;

        if self.state.tracks.is_empty() {
            self.state.current_track_index = None;
            self.state.has_ended = true;
            self.state.position = 0.0;
            self.state.duration = 0.0;
            self.expected_end = None;
            self.pending_start = None;
            self.emit(PlayerEvent::TrackChanged {
                index: None,
                previous,
            });
            if play_now {
                self.pause_transport();
            }
            return Ok(());
        }

        debug!(
            tracks = self.state.tracks.len(),
            start = start.track,
            play_now,
            "Loading tracks"
        );

        if play_now {
            return self.start_track(start.track, start.position, previous);
        }

        let index = start.track;
        let track = &self.state.tracks[index];
        self.expected_end = track.end_seconds();
        self.state.current_track_index = Some(index);
        self.state.has_ended = false;
        self.state.position = start.position.max(0.0);
        if let Some(range) = track.time_range {
            self.state.duration = range.duration_seconds;
        }
        self.emit(PlayerEvent::TrackChanged {
            index: Some(index),
            previous,
        });
        Ok(())
    }

    // ===== Playback control =====

    /// Toggle the transport between playing and paused
    ///
    /// Play/pause state is never tracked locally; `is_playing` follows the
    /// transport's `Playing`/`Paused` events.
    pub fn play_pause(&mut self) -> Result<()> {
        let Some(transport) = self.transport.as_mut() else {
            return Ok(());
        };

        if transport.is_paused() {
            transport.play()?;
        } else {
            transport.pause()?;
        }
        Ok(())
    }

    /// Resume if paused
    pub fn play(&mut self) -> Result<()> {
        if self.is_paused() {
            self.play_pause()?;
        }
        Ok(())
    }

    /// Pause if playing
    pub fn pause(&mut self) -> Result<()> {
        if !self.is_paused() {
            self.play_pause()?;
        }
        Ok(())
    }

    /// Advance to the next track, or end the queue after the last one
    pub fn skip_to_next(&mut self) -> Result<()> {
        if self.transport.is_none() {
            return Ok(());
        }
        self.advance()
    }

    /// Go back
    ///
    /// At or past the rewind threshold the current track restarts.
    /// Otherwise the previous track starts.
    ///
    /// The first track has nothing before it, so it restarts regardless of
    /// the threshold.
    pub fn skip_to_previous(&mut self) -> Result<()> {
        if self.transport.is_none() {
            return Ok(());
        }
        let Some(index) = self.state.current_track_index else {
            return Ok(());
        };

        if self.state.position >= self.config.rewind_threshold_secs || index == 0 {
            debug!(index, position = self.state.position, "Rewinding current track");
            return self.seek_absolute(0.0);
        }

        self.start_track(index - 1, 0.0, Some(index))
    }

    /// Jump to `index`
    pub fn skip_to_track(&mut self, index: usize) -> Result<()> {
        if self.transport.is_none() {
            return Ok(());
        }
        if index >= self.state.tracks.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }

        let previous = self.state.current_track_index;
        self.start_track(index, 0.0, previous)
    }

    // ===== Seek =====

    /// Seek by `delta` seconds relative to the current (possibly pending)
    /// position
    pub fn seek_relative(&mut self, delta: f64) -> Result<()> {
        let target = self.state.position + delta;
        self.seek_absolute(target)
    }

    /// Seek to `seconds` from the current track's start
    ///
    /// `position` changes immediately; the transport is told once no
    /// further seek arrived for the debounce window (see `tick`).
    pub fn seek_absolute(&mut self, seconds: f64) -> Result<()> {
        if self.transport.is_none() || self.state.current_track_index.is_none() {
            return Ok(());
        }

        let mut target = seconds.max(0.0);
        if self.state.duration > 0.0 {
            target = target.min(self.state.duration);
        }

        self.state.position = target;
        self.state.is_seeking = true;
        self.seek.request(target, self.clock.now());
        debug!(target, "Seek requested");
        Ok(())
    }

    /// Run timers
    ///
    /// Issues the pending seek once its quiescence window elapsed.
    pub fn tick(&mut self) -> Result<()> {
        if self.transport.is_none() {
            return Ok(());
        }
        let Some(target) = self.seek.poll(self.clock.now()) else {
            return Ok(());
        };

        let absolute = (self.current_start() + target).max(0.0);
        let result = match self.transport.as_mut() {
            Some(transport) => transport.seek(absolute),
            None => Ok(()),
        };
        self.state.is_seeking = false;
        result?;

        debug!(target, absolute, "Seek issued");
        self.emit(PlayerEvent::SeekCompleted { position: target });
        Ok(())
    }

    /// Deadline of the pending seek, for platforms that schedule `tick`
    pub fn next_deadline(&self) -> Option<std::time::Instant> {
        self.seek.deadline()
    }

    // ===== Transport events =====

    /// Apply a notification from the transport
    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Result<()> {
        if self.transport.is_none() {
            return Ok(());
        }

        match event {
            TransportEvent::Paused => {
                self.state.is_playing = false;
                self.emit(PlayerEvent::Paused);
            }
            TransportEvent::Playing => {
                if let Some(offset) = self.pending_start.take() {
                    if let Some(transport) = self.transport.as_mut() {
                        transport.seek(offset)?;
                    }
                }
                self.state.is_playing = true;
                self.state.is_busy = false;
                if self.state.current_track_index.is_some() {
                    self.state.has_ended = false;
                }
                self.emit(PlayerEvent::Playing);
            }
            TransportEvent::LoadStart => {
                self.state.is_busy = true;
                self.emit(PlayerEvent::Busy);
            }
            TransportEvent::DurationChanged(duration) => {
                let duration = match self.state.current_track().and_then(|t| t.time_range) {
                    Some(range) => range.duration_seconds,
                    None => duration,
                };
                if duration.is_finite() {
                    self.state.duration = duration;
                    self.emit(PlayerEvent::DurationChanged { duration });
                }
            }
            TransportEvent::TimeAdvanced(absolute) => {
                self.time_advanced(absolute)?;
            }
            TransportEvent::Ended => {
                if self.state.current_track_index.is_some() {
                    debug!("Transport reached end of media");
                    self.advance()?;
                }
            }
            TransportEvent::Ready => {
                self.apply_volume();
            }
        }
        Ok(())
    }

    fn time_advanced(&mut self, absolute: f64) -> Result<()> {
        if self.state.current_track_index.is_none() {
            return Ok(());
        }

        if !self.state.is_seeking {
            let position = (absolute - self.current_start()).max(0.0);
            self.state.position = position;
            self.emit(PlayerEvent::TimeAdvanced { position });
        }

        if let Some(end) = self.expected_end {
            if absolute >= end {
                debug!(absolute, end, "Clip end reached");
                self.advance()?;
            }
        }
        Ok(())
    }

    // ===== Volume =====

    /// Set volume (0-100)
    pub fn set_volume(&mut self, level: u8) {
        self.volume.set_level(level);
        self.volume_changed();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.volume.set_muted(muted);
        self.volume_changed();
    }

    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.volume_changed();
    }

    pub fn volume(&self) -> u8 {
        self.volume.level()
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// Load the persisted volume and mute flag
    ///
    /// Keeps the configured defaults when nothing was stored or the store
    /// fails.
    pub fn restore_volume(&mut self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };

        match store.load_volume() {
            Ok(Some(settings)) => {
                self.volume = Volume::from(settings);
                self.apply_volume();
                debug!(volume = settings.volume, muted = settings.mute, "Volume restored");
            }
            Ok(None) => {}
            Err(e) => warn!("Failed to load volume settings: {}", e),
        }
    }

    fn volume_changed(&mut self) {
        self.apply_volume();

        if let Some(store) = self.store.as_ref() {
            if let Err(e) = store.save_volume(self.volume.settings()) {
                warn!("Failed to persist volume settings: {}", e);
            }
        }

        self.emit(PlayerEvent::VolumeChanged {
            level: self.volume.level(),
            is_muted: self.volume.is_muted(),
        });
    }

    fn apply_volume(&mut self) {
        self.state.volume = self.volume.level();
        self.state.mute = self.volume.is_muted();
        if let Some(transport) = self.transport.as_mut() {
            transport.set_volume(self.volume.gain());
        }
    }

    // ===== Resume points =====

    /// Last saved resume point for `id` (track 0, position 0 if none)
    pub fn load_latest_position(&self, id: &str) -> TrackPosition {
        let Some(store) = self.store.as_ref() else {
            return TrackPosition::default();
        };

        match store.load_position(id) {
            Ok(position) => position.unwrap_or_default(),
            Err(e) => {
                warn!(id, "Failed to load resume point: {}", e);
                TrackPosition::default()
            }
        }
    }

    /// Store a resume point for `id`
    pub fn save_position(&self, id: &str, position: TrackPosition) {
        if let Some(store) = self.store.as_ref() {
            if let Err(e) = store.save_position(id, position) {
                warn!(id, "Failed to persist resume point: {}", e);
            }
        }
    }

    /// Current track and position as a resume point
    pub fn current_position(&self) -> Option<TrackPosition> {
        self.state
            .current_track_index
            .map(|track| TrackPosition::new(track, self.state.position))
    }

    // ===== Internal =====

    /// Move to the next track or end the queue
    fn advance(&mut self) -> Result<()> {
        let previous = self.state.current_track_index;
        let next = previous.map_or(0, |i| i + 1);

        if previous.is_some() && next < self.state.tracks.len() {
            return self.start_track(next, 0.0, previous);
        }

        if previous.is_none() {
            return Ok(());
        }

        debug!("Queue exhausted");
        self.seek.cancel();
        self.state.is_seeking = false;
        self.state.current_track_index = None;
        self.state.has_ended = true;
        self.state.position = 0.0;
        self.expected_end = None;
        self.pending_start = None;
        self.pause_transport();

        self.emit(PlayerEvent::TrackChanged {
            index: None,
            previous,
        });
        self.emit(PlayerEvent::Ended);
        Ok(())
    }

    /// Load and play `index`, starting `offset` seconds into the track
    fn start_track(&mut self, index: usize, offset: f64, previous: Option<usize>) -> Result<()> {
        let track = self.state.tracks[index].clone();

        self.seek.cancel();
        self.state.is_seeking = false;
        self.state.current_track_index = Some(index);
        self.state.has_ended = false;
        self.state.position = offset.max(0.0);
        self.state.duration = track.time_range.map_or(0.0, |r| r.duration_seconds);
        self.expected_end = track.end_seconds();

        let start = track.start_seconds() + offset.max(0.0);
        self.pending_start = (start > 0.0).then_some(start);

        debug!(index, title = %track.title, start, "Starting track");
        self.emit(PlayerEvent::TrackChanged {
            index: Some(index),
            previous,
        });

        if let Some(transport) = self.transport.as_mut() {
            transport.load_source(&track.source_url())?;
            transport.play()?;
        }
        Ok(())
    }

    fn pause_transport(&mut self) {
        if let Some(transport) = self.transport.as_mut() {
            if !transport.is_paused() {
                if let Err(e) = transport.pause() {
                    warn!("Failed to pause transport: {}", e);
                }
            }
        }
    }

    fn current_start(&self) -> f64 {
        self.state.current_track().map_or(0.0, Track::start_seconds)
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.events.publish(&event);
    }
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new(PlaybackConfig::default())
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("state", &self.state)
            .field("attached", &self.transport.is_some())
            .field("seek", &self.seek)
            .field("events", &self.events)
            .finish()
    }
}
