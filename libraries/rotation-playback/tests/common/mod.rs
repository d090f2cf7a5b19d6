//! Shared test doubles for playback integration tests

use rotation_playback::{
    MediaAction, MediaControls, PlaybackConfig, PlaybackEngine, PlayerEvent, Transport,
    TransportError,
};
use rotation_selection::RatedItem;
use std::sync::{Arc, Mutex};

/// Command received by the recording transport
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Load(String),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
}

#[derive(Debug)]
struct TransportLog {
    commands: Vec<Command>,
    paused: bool,
    reject_play: bool,
}

/// Transport that records every command
///
/// Clones share the same log, so a test keeps one handle and gives the
/// engine another.
#[derive(Debug, Clone)]
pub struct RecordingTransport {
    log: Arc<Mutex<TransportLog>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(TransportLog {
                commands: Vec::new(),
                paused: true,
                reject_play: false,
            })),
        }
    }

    pub fn boxed(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }

    pub fn commands(&self) -> Vec<Command> {
        self.log.lock().unwrap().commands.clone()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Seek(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn loads(&self) -> Vec<String> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::Load(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    pub fn volumes(&self) -> Vec<f32> {
        self.commands()
            .into_iter()
            .filter_map(|c| match c {
                Command::SetVolume(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap().commands.clear();
    }

    /// Make `play` fail like a browser blocking autoplay
    pub fn reject_play(&self, reject: bool) {
        self.log.lock().unwrap().reject_play = reject;
    }

    pub fn paused(&self) -> bool {
        self.log.lock().unwrap().paused
    }
}

impl Default for RecordingTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for RecordingTransport {
    fn load_source(&mut self, url: &str) -> Result<(), TransportError> {
        self.log
            .lock()
            .unwrap()
            .commands
            .push(Command::Load(url.to_string()));
        Ok(())
    }

    fn play(&mut self) -> Result<(), TransportError> {
        let mut log = self.log.lock().unwrap();
        if log.reject_play {
            return Err(TransportError::Rejected("autoplay blocked".to_string()));
        }
        log.paused = false;
        log.commands.push(Command::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), TransportError> {
        let mut log = self.log.lock().unwrap();
        log.paused = true;
        log.commands.push(Command::Pause);
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> Result<(), TransportError> {
        self.log.lock().unwrap().commands.push(Command::Seek(seconds));
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.log
            .lock()
            .unwrap()
            .commands
            .push(Command::SetVolume(volume));
    }

    fn is_paused(&self) -> bool {
        self.log.lock().unwrap().paused
    }
}

#[derive(Debug, Default)]
pub struct MediaLog {
    pub binds: usize,
    pub unbinds: usize,
    pub actions: Vec<MediaAction>,
    pub now_playing: Vec<String>,
}

/// Media controls that record registrations and metadata
#[derive(Debug, Clone, Default)]
pub struct RecordingMediaControls {
    pub log: Arc<Mutex<MediaLog>>,
}

impl MediaControls for RecordingMediaControls {
    fn bind(&mut self, actions: &[MediaAction]) {
        let mut log = self.log.lock().unwrap();
        log.binds += 1;
        log.actions = actions.to_vec();
    }

    fn unbind(&mut self) {
        self.log.lock().unwrap().unbinds += 1;
    }

    fn set_now_playing(&mut self, item: &RatedItem) {
        self.log.lock().unwrap().now_playing.push(item.id.clone());
    }
}

/// Record every event the engine publishes
pub fn record_events(engine: &mut PlaybackEngine) -> Arc<Mutex<Vec<PlayerEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    engine.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

pub fn attached_engine(config: PlaybackConfig) -> (PlaybackEngine, RecordingTransport) {
    let transport = RecordingTransport::new();
    let mut engine = PlaybackEngine::new(config);
    engine.attach_transport(transport.boxed());
    (engine, transport)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
