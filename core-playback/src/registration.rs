//! Scoped backend registrations.
//!
//! Every observer the controller installs on the backend is owned by one of
//! these guards and removed when the guard drops, so replacing an item or
//! tearing the controller down cannot leave stale observers behind.

use bridge_traits::backend::{MediaBackend, ObserverToken};
use bridge_traits::error::Result;
use bridge_traits::media::{ItemId, MediaTime};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Periodic time observer, removed on drop.
pub struct TimeObserver {
    backend: Arc<dyn MediaBackend>,
    token: ObserverToken,
}

impl TimeObserver {
    pub fn attach(backend: &Arc<dyn MediaBackend>, interval: MediaTime) -> Self {
        let token = backend.add_periodic_time_observer(interval);
        trace!(token = token.0, %interval, "Attached time observer");
        Self {
            backend: Arc::clone(backend),
            token,
        }
    }

    pub fn token(&self) -> ObserverToken {
        self.token
    }
}

impl Drop for TimeObserver {
    fn drop(&mut self) {
        self.backend.remove_periodic_time_observer(self.token);
        trace!(token = self.token.0, "Detached time observer");
    }
}

impl fmt::Debug for TimeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeObserver").field("token", &self.token).finish()
    }
}

/// End-of-item notification registration, removed on drop.
pub struct EndObserver {
    backend: Arc<dyn MediaBackend>,
    item: ItemId,
}

impl EndObserver {
    pub fn attach(backend: &Arc<dyn MediaBackend>, item: ItemId) -> Result<Self> {
        backend.observe_item_end(item)?;
        Ok(Self {
            backend: Arc::clone(backend),
            item,
        })
    }

    pub fn item(&self) -> ItemId {
        self.item
    }
}

impl Drop for EndObserver {
    fn drop(&mut self) {
        self.backend.stop_observing_item_end(self.item);
        trace!(item = %self.item, "Removed end-of-item observer");
    }
}

impl fmt::Debug for EndObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndObserver").field("item", &self.item).finish()
    }
}
