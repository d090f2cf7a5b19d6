//! Headless session driver
//!
//! Owns the whole player stack and plays it against the simulated
//! transport on a manual clock, so an hour of listening runs in
//! milliseconds:
//! ```text
//! step ─▶ clock.advance ─▶ transport.advance ─▶ events ─▶ orchestrator
//!                                                           │
//!                                            tick() ◀───────┘
//! ```

use crate::config::SimConfig;
use crate::error::Result;
use crate::media::LogMediaControls;
use crate::transport::SimTransport;
use rotation_playback::{
    ManualClock, MediaAction, PlaybackEngine, PlayerStore, QueueOrchestrator, TrackPosition,
};
use rotation_selection::{ItemLibrary, RatedItem};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Store key for the session's resume point and queue
pub const POSITION_KEY: &str = "rotation";

/// Resume point is written this often (simulated time)
const SAVE_INTERVAL_MS: u64 = 10_000;

/// Upper bound on transport events handled per step
const MAX_EVENTS_PER_STEP: usize = 256;

/// Summary of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub simulated_secs: f64,
    pub tracks_started: usize,
    pub favorite_plays: usize,
    pub plays_by_rating: BTreeMap<u8, usize>,
    pub plays_by_item: BTreeMap<String, usize>,
    pub last_position: Option<TrackPosition>,
}

pub struct Simulation {
    config: SimConfig,
    queue: QueueOrchestrator<ItemLibrary>,
    transport: SimTransport,
    clock: ManualClock,
    media: LogMediaControls,
    store: Arc<dyn PlayerStore>,
    elapsed_ms: u64,
}

impl Simulation {
    pub fn new(config: SimConfig, items: Vec<RatedItem>, store: Arc<dyn PlayerStore>) -> Result<Self> {
        let ratio = config.queue.favorite_ratio()?;
        let mut library = match config.simulation.seed {
            Some(seed) => ItemLibrary::with_seed(ratio, seed),
            None => ItemLibrary::new(ratio),
        };
        library.set_items(items);

        let clock = ManualClock::new();
        let mut engine = PlaybackEngine::with_clock(config.playback.clone(), Arc::new(clock.clone()))
            .with_store(store.clone());
        engine.restore_volume();

        let transport = SimTransport::new(config.simulation.track_secs);
        engine.attach_transport(transport.boxed());

        let media = LogMediaControls::new();
        let queue = QueueOrchestrator::new(
            engine,
            library,
            Box::new(media.clone()),
            config.queue.clone(),
        );

        Ok(Self {
            config,
            queue,
            transport,
            clock,
            media,
            store,
            elapsed_ms: 0,
        })
    }

    pub fn queue(&self) -> &QueueOrchestrator<ItemLibrary> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut QueueOrchestrator<ItemLibrary> {
        &mut self.queue
    }

    pub fn transport(&self) -> &SimTransport {
        &self.transport
    }

    pub fn media(&self) -> &LogMediaControls {
        &self.media
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    /// Pick up the saved queue at its resume point, or draw a fresh one
    pub fn start(&mut self) -> Result<()> {
        let previous = self.queue.engine().load_latest_position(POSITION_KEY);
        let saved = self.saved_queue();
        info!(
            items = self.queue.picker().len(),
            volume = self.queue.engine().volume(),
            muted = self.queue.engine().is_muted(),
            resuming = saved.is_some(),
            "Starting rotation session"
        );

        match saved {
            Some(items) => self.queue.resume(items, previous)?,
            None => self.queue.reroll(None)?,
        }
        self.pump()
    }

    /// Advance the session by one tick
    pub fn step(&mut self) -> Result<()> {
        let tick_ms = self.config.simulation.tick_ms;
        self.elapsed_ms += tick_ms;

        self.clock.advance(Duration::from_millis(tick_ms));
        self.transport.advance(tick_ms as f64 / 1000.0);
        self.pump()?;

        self.queue.tick()?;
        self.pump()?;

        let skip_every_ms = self.config.simulation.skip_every_secs * 1000;
        if skip_every_ms > 0 && self.elapsed_ms % skip_every_ms < tick_ms {
            debug!(elapsed_ms = self.elapsed_ms, "Pressing next track");
            self.queue.handle_media_action(MediaAction::NextTrack)?;
            self.pump()?;
        }

        if self.elapsed_ms % SAVE_INTERVAL_MS < tick_ms {
            self.save_session();
        }
        Ok(())
    }

    /// Play the configured duration and report
    pub fn run(&mut self) -> Result<SimReport> {
        self.start()?;

        let total_ms = self.config.simulation.duration_secs * 1000;
        while self.elapsed_ms < total_ms {
            self.step()?;
        }

        self.save_session();
        let report = self.report();
        info!(
            simulated_secs = report.simulated_secs,
            tracks_started = report.tracks_started,
            favorite_plays = report.favorite_plays,
            "Session finished"
        );
        Ok(report)
    }

    pub fn report(&self) -> SimReport {
        let history = self.media.history();
        let mut plays_by_rating = BTreeMap::new();
        let mut plays_by_item = BTreeMap::new();
        for record in &history {
            *plays_by_rating.entry(record.rating).or_insert(0) += 1;
            *plays_by_item.entry(record.id.clone()).or_insert(0) += 1;
        }

        SimReport {
            simulated_secs: self.elapsed_ms as f64 / 1000.0,
            tracks_started: history.len(),
            favorite_plays: history.iter().filter(|r| r.is_favorite).count(),
            plays_by_rating,
            plays_by_item,
            last_position: self.queue.engine().current_position(),
        }
    }

    /// Feed queued transport notifications to the orchestrator
    fn pump(&mut self) -> Result<()> {
        for _ in 0..MAX_EVENTS_PER_STEP {
            let Some(event) = self.transport.next_event() else {
                return Ok(());
            };
            self.queue.handle_transport_event(event)?;
        }
        warn!("Transport event backlog exceeded {} per step", MAX_EVENTS_PER_STEP);
        Ok(())
    }

    /// Items of the last saved queue, if the catalog still has all of them
    fn saved_queue(&self) -> Option<Vec<RatedItem>> {
        let ids = match self.store.load_queue(POSITION_KEY) {
            Ok(ids) => ids?,
            Err(e) => {
                warn!("Failed to load saved queue: {}", e);
                return None;
            }
        };

        let picker = self.queue.picker();
        let items: Option<Vec<RatedItem>> = ids.iter().map(|id| picker.get(id).cloned()).collect();
        match items {
            Some(items) if !items.is_empty() => Some(items),
            _ => {
                debug!(saved = ids.len(), "Saved queue no longer matches the catalog");
                None
            }
        }
    }

    fn save_session(&self) {
        let engine = self.queue.engine();
        let Some(position) = engine.current_position() else {
            return;
        };

        let ids: Vec<String> = self.queue.playlist().iter().map(|i| i.id.clone()).collect();
        if let Err(e) = self.store.save_queue(POSITION_KEY, &ids) {
            warn!("Failed to persist queue: {}", e);
        }
        engine.save_position(POSITION_KEY, position);
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("queue", &self.queue)
            .field("elapsed_ms", &self.elapsed_ms)
            .finish()
    }
}
