//! Queue orchestration
//!
//! Keeps the engine fed with randomly drawn items:
//! ```text
//! ItemPicker ──pick()──▶ QueueOrchestrator ──load_tracks()──▶ PlaybackEngine
//!                              ▲                                  │
//!                              └──── TrackChanged / Ended ────────┘
//! ```
//! When the engine runs past its last track the orchestrator draws a fresh
//! queue and starts it from the top. System media keys are routed through
//! `handle_media_action`.

use crate::{
    engine::PlaybackEngine,
    error::Result,
    events::PlayerEvent,
    media::{MediaAction, MediaControls},
    transport::TransportEvent,
    types::{QueueConfig, Track, TrackPosition},
};
use rotation_selection::{ItemPicker, RatedItem};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Engine notifications the orchestrator reacts to, collected by its
/// subscription and consumed after every forwarded engine call
#[derive(Debug, Default)]
struct Signals {
    ended: bool,
    track_changed: Option<Option<usize>>,
}

/// Builds queues from an `ItemPicker` and hands them to the engine
pub struct QueueOrchestrator<P: ItemPicker> {
    config: QueueConfig,
    engine: PlaybackEngine,
    picker: P,
    media: Box<dyn MediaControls>,

    /// Items behind the engine's tracks, same order
    playlist: Vec<RatedItem>,

    /// Item behind the engine's current track
    current_item: Option<RatedItem>,

    signals: Arc<Mutex<Signals>>,
}

impl<P: ItemPicker> QueueOrchestrator<P> {
    pub fn new(
        mut engine: PlaybackEngine,
        picker: P,
        media: Box<dyn MediaControls>,
        config: QueueConfig,
    ) -> Self {
        let signals = Arc::new(Mutex::new(Signals::default()));
        let sink = Arc::clone(&signals);
        engine.subscribe(move |event| {
            let Ok(mut signals) = sink.lock() else {
                return;
            };
            match event {
                PlayerEvent::Ended => signals.ended = true,
                PlayerEvent::TrackChanged { index, .. } => signals.track_changed = Some(*index),
                _ => {}
            }
        });

        Self {
            config,
            engine,
            picker,
            media,
            playlist: Vec::new(),
            current_item: None,
            signals,
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    /// Direct engine access
    ///
    /// Calls made through this handle bypass the end-of-queue check; use
    /// the forwarding methods below for anything that can advance tracks.
    pub fn engine_mut(&mut self) -> &mut PlaybackEngine {
        &mut self.engine
    }

    pub fn picker(&self) -> &P {
        &self.picker
    }

    pub fn picker_mut(&mut self) -> &mut P {
        &mut self.picker
    }

    pub fn playlist(&self) -> &[RatedItem] {
        &self.playlist
    }

    pub fn current_item(&self) -> Option<&RatedItem> {
        self.current_item.as_ref()
    }

    // ===== Queue generation =====

    /// Draw a new queue
    ///
    /// `first_item` occupies slot 0 and the rest is sampled (with
    /// replacement) up to `list_length`. A picker that runs dry truncates
    /// the queue. If `first_item` is the item playing right now it keeps
    /// playing undisturbed; otherwise the new queue starts at slot 0.
    pub fn reroll(&mut self, first_item: Option<RatedItem>) -> Result<()> {
        let target = self.config.list_length;
        let keep_current = match (&first_item, &self.current_item) {
            (Some(first), Some(current)) => first.id == current.id,
            _ => false,
        };

        let mut items = Vec::with_capacity(target);
        if let Some(first) = first_item {
            items.push(first);
        }
        while items.len() < target {
            match self.picker.pick() {
                Some(item) => items.push(item),
                None => break,
            }
        }

        if items.is_empty() {
            warn!("No candidates available, loading an empty queue");
        } else if items.len() < target {
            warn!(len = items.len(), target, "Candidate pool ran dry, queue truncated");
        }
        info!(len = items.len(), keep_current, "Rerolled queue");

        self.update_playlist(items, keep_current)
    }

    /// Replace the playlist
    ///
    /// With `try_keep_current` (and something playing) slot 0 is assumed to
    /// be the current item: the engine keeps it playing at its current
    /// position, now as track 0. Otherwise playback starts at slot 0.
    pub fn update_playlist(&mut self, items: Vec<RatedItem>, try_keep_current: bool) -> Result<()> {
        if !self.engine.is_attached() {
            debug!(len = items.len(), "No transport attached, ignoring playlist update");
            return Ok(());
        }

        let keep_current = try_keep_current && self.current_item.is_some();
        let start = keep_current.then(|| TrackPosition::new(0, self.engine.state().position));
        self.install(items, !keep_current, start)
    }

    /// Load a previously saved queue and continue at `position`
    pub fn resume(&mut self, items: Vec<RatedItem>, position: TrackPosition) -> Result<()> {
        if !self.engine.is_attached() {
            debug!(len = items.len(), "No transport attached, ignoring resume");
            return Ok(());
        }

        info!(
            len = items.len(),
            track = position.track,
            position = position.position,
            "Resuming saved queue"
        );
        self.install(items, true, Some(position))
    }

    // ===== Forwarded engine calls =====

    pub fn handle_transport_event(&mut self, event: TransportEvent) -> Result<()> {
        let result = self.engine.handle_transport_event(event);
        self.sync()?;
        result
    }

    pub fn tick(&mut self) -> Result<()> {
        let result = self.engine.tick();
        self.sync()?;
        result
    }

    pub fn play_pause(&mut self) -> Result<()> {
        let result = self.engine.play_pause();
        self.sync()?;
        result
    }

    pub fn skip_to_next(&mut self) -> Result<()> {
        let result = self.engine.skip_to_next();
        self.sync()?;
        result
    }

    pub fn skip_to_previous(&mut self) -> Result<()> {
        let result = self.engine.skip_to_previous();
        self.sync()?;
        result
    }

    pub fn skip_to_track(&mut self, index: usize) -> Result<()> {
        let result = self.engine.skip_to_track(index);
        self.sync()?;
        result
    }

    pub fn seek_relative(&mut self, delta: f64) -> Result<()> {
        self.engine.seek_relative(delta)
    }

    pub fn seek_absolute(&mut self, seconds: f64) -> Result<()> {
        self.engine.seek_absolute(seconds)
    }

    // ===== Media controls =====

    /// Route a system media-control request to the engine
    pub fn handle_media_action(&mut self, action: MediaAction) -> Result<()> {
        let step = self.engine.config().media_seek_step_secs;
        debug!(?action, "Media action");

        let result = match action {
            MediaAction::Play => self.engine.play(),
            MediaAction::Pause | MediaAction::Stop => self.engine.pause(),
            MediaAction::SeekBackward => self.engine.seek_relative(-step),
            MediaAction::SeekForward => self.engine.seek_relative(step),
            MediaAction::PreviousTrack => self.engine.skip_to_previous(),
            MediaAction::NextTrack => self.engine.skip_to_next(),
        };
        self.sync()?;
        result
    }

    // ===== Internal =====

    fn install(
        &mut self,
        items: Vec<RatedItem>,
        play_now: bool,
        start: Option<TrackPosition>,
    ) -> Result<()> {
        let tracks: Vec<Track> = items.iter().map(Track::from).collect();
        self.playlist = items;

        let result = self.engine.load_tracks(tracks, play_now, start);

        self.rebind_media();
        self.apply_track_change();
        result
    }

    fn rebind_media(&mut self) {
        self.media.unbind();
        self.media.bind(&MediaAction::ALL);
    }

    /// React to what the engine published since the last call
    fn sync(&mut self) -> Result<()> {
        self.apply_track_change();

        let ended = self
            .signals
            .lock()
            .map(|mut signals| std::mem::take(&mut signals.ended))
            .unwrap_or(false);

        if ended {
            info!("Queue exhausted, drawing a new one");
            self.reroll(None)?;
        }
        Ok(())
    }

    fn apply_track_change(&mut self) {
        let changed = self
            .signals
            .lock()
            .ok()
            .and_then(|mut signals| signals.track_changed.take());

        let Some(index) = changed else {
            return;
        };

        self.current_item = index.and_then(|i| self.playlist.get(i)).cloned();
        if let Some(item) = &self.current_item {
            debug!(id = %item.id, title = %item.title, "Now playing");
            self.media.set_now_playing(item);
        }
    }
}

impl<P: ItemPicker> std::fmt::Debug for QueueOrchestrator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueOrchestrator")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("playlist", &self.playlist.len())
            .field("current_item", &self.current_item.as_ref().map(|i| &i.id))
            .finish()
    }
}
