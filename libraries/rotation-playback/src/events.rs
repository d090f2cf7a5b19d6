//! Player Events
//!
//! Typed notifications published by the engine after it has applied a
//! transport event or a command to its state. Subscribers are called
//! synchronously, in registration order, on the thread that changed the
//! state; by the time a subscriber runs, `PlaybackEngine::state()` already
//! reflects the change.

use serde::{Deserialize, Serialize};

/// Events emitted by the playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Transport paused
    Paused,

    /// Transport started playing
    Playing,

    /// A source started loading
    Busy,

    /// Current track duration changed (seconds)
    DurationChanged { duration: f64 },

    /// Track-relative position moved (seconds)
    TimeAdvanced { position: f64 },

    /// Active track changed
    TrackChanged {
        /// New index (None = no active track)
        index: Option<usize>,
        /// Index that was active before
        previous: Option<usize>,
    },

    /// Playback advanced past the last track
    Ended,

    /// Volume or mute changed
    VolumeChanged { level: u8, is_muted: bool },

    /// A debounced seek reached the transport
    SeekCompleted { position: f64 },
}

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&PlayerEvent) + Send>;

/// Ordered list of event listeners
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it runs after every listener registered before it
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PlayerEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn publish(&mut self, event: &PlayerEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn dispatch_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();

        for name in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            bus.subscribe(move |event| {
                log.lock().unwrap().push(format!("{}:{:?}", name, event));
            });
        }

        bus.publish(&PlayerEvent::Playing);

        let log = log.lock().unwrap();
        assert_eq!(
            *log,
            vec!["first:Playing", "second:Playing", "third:Playing"]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();

        let counter = Arc::clone(&count);
        let id = bus.subscribe(move |_| *counter.lock().unwrap() += 1);

        bus.publish(&PlayerEvent::Ended);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&PlayerEvent::Ended);

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(bus.is_empty());
    }
}
