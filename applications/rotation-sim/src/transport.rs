//! Simulated media element
//!
//! Behaves like a browser audio element with a virtual playhead: commands
//! update the element immediately and queue the notifications a real
//! element would fire. The simulation loop moves the playhead with
//! `advance` and feeds queued events back to the engine.

use rotation_playback::{Transport, TransportError, TransportEvent};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

#[derive(Debug)]
struct SimMedia {
    source: Option<String>,
    position: f64,
    duration: f64,
    // Media fragment end; playback pauses here instead of ending
    stop_at: Option<f64>,
    paused: bool,
    volume: f32,
    track_secs: f64,
    pending: VecDeque<TransportEvent>,
}

impl SimMedia {
    fn emit(&mut self, event: TransportEvent) {
        trace!(?event, "Simulated transport event");
        self.pending.push_back(event);
    }
}

/// Transport with a virtual playhead
///
/// Clones share the same element, so one clone can be boxed into the
/// engine while the loop keeps another.
#[derive(Debug, Clone)]
pub struct SimTransport {
    media: Arc<Mutex<SimMedia>>,
}

impl SimTransport {
    /// Every loaded resource is `track_secs` long unless its media
    /// fragment ends later
    pub fn new(track_secs: f64) -> Self {
        let mut media = SimMedia {
            source: None,
            position: 0.0,
            duration: 0.0,
            stop_at: None,
            paused: true,
            volume: 1.0,
            track_secs,
            pending: VecDeque::new(),
        };
        media.emit(TransportEvent::Ready);

        Self {
            media: Arc::new(Mutex::new(media)),
        }
    }

    pub fn boxed(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }

    fn media(&self) -> MutexGuard<'_, SimMedia> {
        self.media.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Move the playhead forward by `seconds` of playback
    ///
    /// Queues a time update, plus `Ended` when the resource runs out or
    /// `Paused` when a media fragment ends.
    pub fn advance(&self, seconds: f64) {
        let mut media = self.media();
        if media.paused || media.source.is_none() {
            return;
        }

        let limit = media.stop_at.unwrap_or(media.duration);
        media.position = (media.position + seconds).min(limit);
        let position = media.position;
        media.emit(TransportEvent::TimeAdvanced(position));

        if position >= limit {
            media.paused = true;
            if media.stop_at.is_some() {
                media.emit(TransportEvent::Paused);
            } else {
                media.emit(TransportEvent::Ended);
            }
        }
    }

    /// Next queued notification, oldest first
    pub fn next_event(&self) -> Option<TransportEvent> {
        self.media().pending.pop_front()
    }

    /// Current source without its media fragment
    pub fn source(&self) -> Option<String> {
        self.media().source.clone()
    }

    pub fn position(&self) -> f64 {
        self.media().position
    }

    pub fn volume(&self) -> f32 {
        self.media().volume
    }
}

/// Split `url#t=start,end` into the base URL and the fragment bounds
fn parse_media_fragment(url: &str) -> (&str, Option<f64>, Option<f64>) {
    let Some((base, fragment)) = url.split_once("#t=") else {
        return (url, None, None);
    };

    let (start, end) = match fragment.split_once(',') {
        Some((start, end)) => (start, Some(end)),
        None => (fragment, None),
    };
    (
        base,
        start.parse().ok(),
        end.and_then(|end| end.parse().ok()),
    )
}

impl Transport for SimTransport {
    fn load_source(&mut self, url: &str) -> Result<(), TransportError> {
        let (base, start, end) = parse_media_fragment(url);
        if base.is_empty() {
            return Err(TransportError::Load {
                url: url.to_string(),
                reason: "empty URL".to_string(),
            });
        }

        let mut media = self.media();
        let duration = media.track_secs.max(end.unwrap_or(0.0));
        media.source = Some(base.to_string());
        media.duration = duration;
        media.stop_at = end.map(|end| end.min(duration));
        media.position = start.unwrap_or(0.0).clamp(0.0, duration);
        media.paused = true;
        media.emit(TransportEvent::LoadStart);
        media.emit(TransportEvent::DurationChanged(duration));
        Ok(())
    }

    fn play(&mut self) -> Result<(), TransportError> {
        let mut media = self.media();
        if media.source.is_none() {
            return Err(TransportError::Rejected("no source loaded".to_string()));
        }
        if media.position >= media.duration {
            media.position = 0.0;
        }
        media.paused = false;
        media.emit(TransportEvent::Playing);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), TransportError> {
        let mut media = self.media();
        if !media.paused {
            media.paused = true;
            media.emit(TransportEvent::Paused);
        }
        Ok(())
    }

    fn seek(&mut self, seconds: f64) -> Result<(), TransportError> {
        let mut media = self.media();
        if media.source.is_none() || !seconds.is_finite() {
            return Err(TransportError::Seek(seconds));
        }
        media.position = seconds.clamp(0.0, media.duration);
        let position = media.position;
        media.emit(TransportEvent::TimeAdvanced(position));
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.media().volume = volume.clamp(0.0, 1.0);
    }

    fn is_paused(&self) -> bool {
        self.media().paused
    }
}
