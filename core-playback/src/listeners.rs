//! # Listener Registry
//!
//! Listeners are held weakly: the controller never keeps an observer alive,
//! and an observer that is dropped without unregistering simply disappears
//! from the set on the next notification.

use bridge_traits::platform::PlatformSendSync;
use core_runtime::events::PlaybackEvent;
use std::sync::{Arc, Weak};

/// Synchronous receiver of controller events.
///
/// Called on the controller's owner context. Implementations must not block;
/// anything slow belongs on an [`EventBus`](core_runtime::events::EventBus)
/// subscriber instead.
pub trait PlaybackListener: PlatformSendSync {
    fn on_event(&self, event: PlaybackEvent);
}

impl<F> PlaybackListener for F
where
    F: Fn(PlaybackEvent) + PlatformSendSync,
{
    fn on_event(&self, event: PlaybackEvent) {
        self(event)
    }
}

/// Identity-keyed set of weakly held listeners.
#[derive(Default)]
pub struct ListenerSet {
    entries: Vec<Weak<dyn PlaybackListener>>,
}

fn identity<T: ?Sized>(ptr: *const T) -> *const () {
    ptr.cast::<()>()
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. Returns `false` if it was already registered.
    pub fn add(&mut self, listener: Arc<dyn PlaybackListener>) -> bool {
        let id = identity(Arc::as_ptr(&listener));
        if self.position(id).is_some() {
            return false;
        }
        self.entries.push(Arc::downgrade(&listener));
        true
    }

    /// Unregister `listener`. Returns `false` if it was not registered.
    pub fn remove(&mut self, listener: &Arc<dyn PlaybackListener>) -> bool {
        match self.position(identity(Arc::as_ptr(listener))) {
            Some(index) => {
                self.entries.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// Deliver `event` to every live listener, pruning dead entries.
    pub fn notify(&mut self, event: PlaybackEvent) {
        let mut live = Vec::with_capacity(self.entries.len());
        self.entries.retain(|entry| match entry.upgrade() {
            Some(listener) => {
                live.push(listener);
                true
            }
            None => false,
        });

        for listener in live {
            listener.on_event(event);
        }
    }

    /// Number of registrations whose listener is still alive.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn position(&self, id: *const ()) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| identity(Weak::as_ptr(entry)) == id)
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("live", &self.len())
            .field("entries", &self.entries.len())
            .finish()
    }
}
