//! Platform-agnostic transport trait
//!
//! Abstracts the single physical media element (HTML audio element, native
//! player, simulated clock) the engine drives.

use crate::error::TransportError;

/// Notifications coming out of a transport
///
/// The platform forwards these to `PlaybackEngine::handle_transport_event`
/// in the order the transport produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportEvent {
    /// Playback paused
    Paused,

    /// Playback started or resumed
    Playing,

    /// A new source started loading
    LoadStart,

    /// Resource duration became known or changed (seconds)
    DurationChanged(f64),

    /// Playhead moved (absolute resource time in seconds)
    TimeAdvanced(f64),

    /// Resource played to its natural end
    Ended,

    /// Transport is bound and ready to accept commands
    Ready,
}

/// Single playable media resource
///
/// Implementors wrap the platform's player. Commands are imperative; their
/// effects come back as `TransportEvent`s. `seek` and `play` return once
/// the transport acknowledged the request.
pub trait Transport: Send {
    /// Replace the current source
    fn load_source(&mut self, url: &str) -> Result<(), TransportError>;

    /// Start or resume playback
    fn play(&mut self) -> Result<(), TransportError>;

    /// Pause playback
    fn pause(&mut self) -> Result<(), TransportError>;

    /// Move the playhead to an absolute resource time
    fn seek(&mut self, seconds: f64) -> Result<(), TransportError>;

    /// Set output gain in `[0.0, 1.0]`
    fn set_volume(&mut self, volume: f32);

    /// Whether the transport is currently paused
    fn is_paused(&self) -> bool;
}
