//! # Playback Event Bus
//!
//! Defines the [`PlaybackEvent`] vocabulary the controller emits and an
//! [`EventBus`] that fans those events out to asynchronous subscribers using
//! `tokio::sync::broadcast`.
//!
//! ## Overview
//!
//! The controller notifies its registered listeners synchronously. Consumers
//! that live on other tasks (UI bindings, analytics, tests) subscribe to the
//! bus instead; the runtime forwards every controller event onto it.
//!
//! ```text
//! ┌────────────┐  notify   ┌──────────────┐  emit   ┌──────────┐  recv   ┌────────────┐
//! │ Controller ├──────────>│ Bus listener ├────────>│ EventBus ├────────>│ Subscriber │
//! └────────────┘           └──────────────┘         └──────────┘         └────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(64);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(PlaybackEvent::Started).ok();
//! assert_eq!(rx.recv().await.unwrap(), PlaybackEvent::Started);
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: the subscriber missed `n` events. Time
//!   updates are the usual casualty; keep receiving.
//! - **`RecvError::Closed`**: every sender is gone; the runtime shut down.

use bridge_traits::media::MediaTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Time updates arrive at tick granularity, so the buffer is sized to absorb
/// a few seconds of them for a subscriber that stalls briefly.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 256;

// ============================================================================
// Playback Events
// ============================================================================

/// Lifecycle notifications emitted by the playback controller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Periodic playback position report.
    TimeUpdate {
        /// Current position of the active item.
        time: MediaTime,
    },
    /// Playback started from a stopped state.
    Started,
    /// Playback stopped by an explicit pause.
    Paused,
    /// The active item played to its end.
    Ended,
    /// The item looped back to its start and kept playing.
    Restarted,
    /// Engine, item and surface all became ready.
    ReadyForPlay,
}

impl PlaybackEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &'static str {
        match self {
            PlaybackEvent::TimeUpdate { .. } => "Playback position changed",
            PlaybackEvent::Started => "Playback started",
            PlaybackEvent::Paused => "Playback paused",
            PlaybackEvent::Ended => "Item ended",
            PlaybackEvent::Restarted => "Item restarted",
            PlaybackEvent::ReadyForPlay => "Ready for playback",
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            PlaybackEvent::TimeUpdate { .. } => EventSeverity::Trace,
            PlaybackEvent::ReadyForPlay | PlaybackEvent::Ended => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }

    /// `true` for transport changes (everything except time updates).
    pub fn is_transport(&self) -> bool {
        !matches!(self, PlaybackEvent::TimeUpdate { .. })
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// High-frequency events (time updates)
    Trace,
    /// Transport changes
    Debug,
    /// Milestones worth surfacing
    Info,
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast channel for [`PlaybackEvent`]s.
///
/// Cloning the bus clones the sender; every [`EventBus::subscribe`] call
/// creates an independent receiver that sees all future events.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PlaybackEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// A subscriber that falls more than `capacity` events behind receives
    /// `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an
    /// error if there are none.
    pub fn emit(&self, event: PlaybackEvent) -> Result<usize, SendError<PlaybackEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber. Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<PlaybackEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&PlaybackEvent) -> bool + Send + Sync>;

/// A `broadcast::Receiver` with optional filtering.
///
/// ```rust
/// use core_runtime::events::{EventBus, EventStream};
///
/// let bus = EventBus::new(16);
/// let transport_only = EventStream::new(bus.subscribe()).filter(|e| e.is_transport());
/// ```
pub struct EventStream {
    receiver: Receiver<PlaybackEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<PlaybackEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` are returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&PlaybackEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &PlaybackEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Receives the next event that passes the filter.
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<PlaybackEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching event is currently available.
    pub fn try_recv(&mut self) -> Option<Result<PlaybackEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
