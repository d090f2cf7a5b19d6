//! Heavy Rotation - Playback
//!
//! Platform-agnostic playback engine for Heavy Rotation.
//!
//! This crate provides:
//! - A `Transport` trait wrapping the platform's single media element
//! - The playback engine (clipped tracks, debounced seeking, track advance)
//! - Volume control (linear, 0-100%, mute/unmute) with persistence
//! - Typed player events with ordered, synchronous subscribers
//! - Queue orchestration: weighted rerolls and media-key routing
//!
//! # Architecture
//!
//! `rotation-playback` does no I/O of its own. The platform provides:
//! - a `Transport` and forwards its notifications to
//!   `handle_transport_event`
//! - a periodic `tick` call (drives the seek debounce window)
//! - optionally a `PlayerStore` and `MediaControls`
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use rotation_playback::{
//!     PlaybackConfig, PlaybackEngine, Track, Transport, TransportError, TransportEvent,
//! };
//!
//! struct Element {
//!     paused: bool,
//! }
//!
//! impl Transport for Element {
//!     fn load_source(&mut self, _url: &str) -> Result<(), TransportError> {
//!         Ok(())
//!     }
//!     fn play(&mut self) -> Result<(), TransportError> {
//!         self.paused = false;
//!         Ok(())
//!     }
//!     fn pause(&mut self) -> Result<(), TransportError> {
//!         self.paused = true;
//!         Ok(())
//!     }
//!     fn seek(&mut self, _seconds: f64) -> Result<(), TransportError> {
//!         Ok(())
//!     }
//!     fn set_volume(&mut self, _volume: f32) {}
//!     fn is_paused(&self) -> bool {
//!         self.paused
//!     }
//! }
//!
//! let mut engine = PlaybackEngine::new(PlaybackConfig::default());
//! engine.attach_transport(Box::new(Element { paused: true }));
//!
//! engine
//!     .load_tracks(vec![Track::new("http://music/1", "Song")], true, None)
//!     .unwrap();
//! engine.handle_transport_event(TransportEvent::Playing).unwrap();
//! engine.handle_transport_event(TransportEvent::TimeAdvanced(12.0)).unwrap();
//!
//! assert!(engine.state().is_playing);
//! assert_eq!(engine.state().position, 12.0);
//! ```
//!
//! # Example: Endless Queue
//!
//! ```rust,no_run
//! use rotation_playback::{
//!     NoopMediaControls, PlaybackConfig, PlaybackEngine, QueueConfig, QueueOrchestrator,
//! };
//! use rotation_selection::{FavoriteRatio, ItemLibrary};
//!
//! # fn transport() -> Box<dyn rotation_playback::Transport> { unimplemented!() }
//! let mut engine = PlaybackEngine::new(PlaybackConfig::default());
//! engine.attach_transport(transport());
//!
//! let library = ItemLibrary::new(FavoriteRatio::default());
//! let mut queue = QueueOrchestrator::new(
//!     engine,
//!     library,
//!     Box::new(NoopMediaControls),
//!     QueueConfig::default(),
//! );
//!
//! // Draws 25 items and starts playing; rerolls whenever the queue runs out
//! queue.reroll(None).unwrap();
//! ```

pub mod clock;
mod engine;
mod error;
mod events;
mod media;
mod queue;
mod seek;
mod store;
mod transport;
pub mod types;
mod volume;

// Public exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result, StoreError, TransportError};
pub use events::{EventBus, PlayerEvent, SubscriptionId};
pub use media::{MediaAction, MediaControls, NoopMediaControls};
pub use queue::QueueOrchestrator;
pub use seek::SeekDebouncer;
pub use store::{MemoryStore, PlayerStore};
pub use transport::{Transport, TransportEvent};
pub use types::{PlaybackConfig, PlayerState, QueueConfig, Track, TrackPosition, VolumeSettings};
pub use volume::Volume;
