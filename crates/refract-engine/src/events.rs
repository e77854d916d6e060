//! Notifications for the host UI.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use refract_catalog::TransformId;
use serde::Serialize;

use crate::capture::Termination;

/// Per-subscriber queue depth. Events beyond it are dropped for that
/// subscriber until it catches up.
pub const EVENT_CAPACITY: usize = 256;

/// Something the host may want to reflect in its UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A track was loaded.
    TrackLoaded {
        /// Track file name.
        name: String,
        /// Length in seconds.
        duration_secs: f64,
    },
    /// The session was disposed.
    TrackUnloaded,
    /// Suspended engine is now running.
    Resumed,
    /// Playback started.
    PlaybackStarted,
    /// Playback paused by the user or by an export finishing.
    PlaybackPaused,
    /// The track played to its end.
    PlaybackEnded,
    /// Playhead moved by a seek.
    Position {
        /// Position in track seconds.
        secs: f64,
    },
    /// The graph was rebuilt.
    GraphRebuilt {
        /// Active stages, in chain order.
        stages: Vec<TransformId>,
        /// Resolved playback rate.
        rate: f32,
    },
    /// A rebuild was aborted and the fallback graph installed.
    StageConstructionFailed {
        /// Transform whose constructor failed.
        id: TransformId,
        /// Error text.
        reason: String,
    },
    /// An export began recording.
    ExportStarted {
        /// Name the artifact will be delivered under.
        filename: String,
    },
    /// An export was delivered.
    ExportFinished {
        /// Delivered file name.
        filename: String,
        /// Captured frames.
        frames: usize,
        /// Why recording stopped.
        termination: Termination,
    },
    /// An export could not be finished.
    ExportFailed {
        /// Error text.
        reason: String,
    },
    /// An export was abandoned by a load or dispose.
    ExportCancelled,
}

/// Fan-out of [`EngineEvent`]s to any number of subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<EngineEvent>>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber.
    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        let (tx, rx) = bounded(EVENT_CAPACITY);
        self.subscribers.push(tx);
        rx
    }

    /// Number of connected subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Sends `event` to every subscriber, forgetting disconnected ones.
    pub fn emit(&mut self, event: EngineEvent) {
        tracing::trace!("event: {event:?}");
        self.subscribers
            .retain(|tx| match tx.try_send(event.clone()) {
                Ok(()) | Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Disconnected(_)) => false,
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_subscriber_receives() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.emit(EngineEvent::Resumed);
        assert_eq!(a.try_recv().unwrap(), EngineEvent::Resumed);
        assert_eq!(b.try_recv().unwrap(), EngineEvent::Resumed);
    }

    #[test]
    fn test_dropped_subscribers_are_forgotten() {
        let mut bus = EventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        bus.emit(EngineEvent::PlaybackStarted);
        assert_eq!(bus.subscriber_count(), 1);
        assert!(keep.try_recv().is_ok());
    }

    #[test]
    fn test_full_queue_drops_instead_of_blocking() {
        let mut bus = EventBus::new();
        let rx = bus.subscribe();
        for _ in 0..EVENT_CAPACITY + 10 {
            bus.emit(EngineEvent::PlaybackEnded);
        }
        assert_eq!(rx.len(), EVENT_CAPACITY);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_serializes_tagged() {
        let json = serde_json::to_value(EngineEvent::Position { secs: 1.5 }).unwrap();
        assert_eq!(json["event"], "position");
        assert_eq!(json["secs"], 1.5);
    }
}
