//! System media-control bridge
//!
//! Hardware keys, lock-screen widgets and OS media sessions deliver
//! play/pause/seek/skip requests as `MediaAction`s. The platform implements
//! `MediaControls` to register handlers and show now-playing metadata.

use rotation_selection::RatedItem;
use serde::{Deserialize, Serialize};

/// Action requested by a system media control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaAction {
    Play,
    Pause,
    Stop,
    SeekBackward,
    SeekForward,
    PreviousTrack,
    NextTrack,
}

impl MediaAction {
    /// Every action the queue orchestrator handles
    pub const ALL: [MediaAction; 7] = [
        MediaAction::Play,
        MediaAction::Pause,
        MediaAction::Stop,
        MediaAction::SeekBackward,
        MediaAction::SeekForward,
        MediaAction::PreviousTrack,
        MediaAction::NextTrack,
    ];
}

/// Platform side of the media-control bridge
pub trait MediaControls: Send {
    /// Register handlers for `actions`; they are routed back through
    /// `QueueOrchestrator::handle_media_action`
    fn bind(&mut self, actions: &[MediaAction]);

    /// Drop all registered handlers
    fn unbind(&mut self);

    /// Publish metadata for the item now playing
    fn set_now_playing(&mut self, item: &RatedItem);
}

/// Media controls for platforms without a media session
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMediaControls;

impl MediaControls for NoopMediaControls {
    fn bind(&mut self, _actions: &[MediaAction]) {}

    fn unbind(&mut self) {}

    fn set_now_playing(&mut self, _item: &RatedItem) {}
}
