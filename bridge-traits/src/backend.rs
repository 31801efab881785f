//! Media backend bridge.
//!
//! The backend is the platform's playback session: it loads assets, decodes,
//! renders and keeps the clock. The core never waits on it. Requests are
//! fire-and-forget calls on [`MediaBackend`], and everything the backend
//! learns later (a load finished, a seek landed, the item reached its end,
//! a sub-resource became ready) comes back as a [`BackendSignal`] pushed into
//! the [`SignalSink`] the host wired it to.
//!
//! ## Threading Model
//!
//! Backends may call [`SignalSink::deliver`] from any thread. The sink
//! serializes signals onto the controller's owner context, so implementations
//! never need to coordinate with the core themselves.
//!
//! ## Example
//!
//! ```ignore
//! use bridge_traits::backend::{BackendSignal, Resource, ResourceStatus, SignalSink};
//!
//! fn on_native_status_change(sink: &dyn SignalSink, ready: bool) {
//!     let status = if ready { ResourceStatus::ReadyToPlay } else { ResourceStatus::Unknown };
//!     sink.deliver(BackendSignal::StatusChanged { resource: Resource::Engine, status });
//! }
//! ```

use crate::{
    error::Result,
    media::{AssetInfo, AudioMix, ItemId, MediaSource, MediaTime},
    platform::PlatformSendSync,
    surface::RenderSurface,
};
use std::sync::Arc;

/// The three independently-readied sub-resources of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// The decoding/timing engine.
    Engine,
    /// The currently installed item.
    Item(ItemId),
    /// The render surface output.
    Surface,
}

/// Readiness reported for a [`Resource`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResourceStatus {
    #[default]
    Unknown,
    ReadyToPlay,
    Failed { reason: String },
}

impl ResourceStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, ResourceStatus::ReadyToPlay)
    }
}

/// Handle of a registered periodic time observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverToken(pub u64);

/// Asynchronous asset resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// Echoed back in [`BackendSignal::AssetLoaded`].
    pub generation: u64,
    pub source: MediaSource,
}

/// Result of resolving an asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(AssetInfo),
    Failed { reason: String },
}

/// Asynchronous seek request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeekRequest {
    /// Echoed back in [`BackendSignal::SeekFinished`].
    pub generation: u64,
    pub target: MediaTime,
    pub tolerance_before: MediaTime,
    pub tolerance_after: MediaTime,
}

/// Notifications a backend reports back to the core.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendSignal {
    /// Readiness of one sub-resource changed.
    StatusChanged {
        resource: Resource,
        status: ResourceStatus,
    },
    /// An asset requested through [`MediaBackend::load_asset`] resolved.
    AssetLoaded { generation: u64, outcome: LoadOutcome },
    /// A seek requested through [`MediaBackend::seek`] completed.
    ///
    /// `finished` is `false` when the seek was interrupted by a newer one.
    SeekFinished { generation: u64, finished: bool },
    /// A periodic time observer fired.
    TimeTick { token: ObserverToken, time: MediaTime },
    /// The item reached its end while end notifications were registered.
    ItemReachedEnd { item: ItemId },
}

/// Receiver of [`BackendSignal`]s.
pub trait SignalSink: PlatformSendSync {
    /// Queue a signal for the owner context. Returns `false` once the owner
    /// has gone away.
    fn deliver(&self, signal: BackendSignal) -> bool;
}

/// Platform playback session.
///
/// All methods take `&self`; implementations use interior mutability so the
/// core can hand clones of the session to registration guards that release
/// themselves on drop.
pub trait MediaBackend: PlatformSendSync {
    /// Resolve duration and track metadata for `request.source`.
    ///
    /// Completion is reported as [`BackendSignal::AssetLoaded`].
    fn load_asset(&self, request: LoadRequest);

    /// Make `item` the session's current item, replacing any previous one.
    fn replace_current_item(&self, item: ItemId, source: &MediaSource) -> Result<()>;

    /// Remove the current item, if any.
    fn clear_current_item(&self);

    /// Start reporting [`BackendSignal::ItemReachedEnd`] for `item`.
    fn observe_item_end(&self, item: ItemId) -> Result<()>;

    /// Stop reporting end-of-item for `item`.
    fn stop_observing_item_end(&self, item: ItemId);

    /// Apply an audio mix to the item's audio tracks.
    fn attach_audio_mix(&self, item: ItemId, mix: AudioMix) -> Result<()>;

    /// Route video output to `surface`.
    fn attach_surface(&self, surface: Arc<dyn RenderSurface>) -> Result<()>;

    /// Current playback rate; 0.0 means stopped.
    fn rate(&self) -> f32;

    fn set_rate(&self, rate: f32);

    /// Error reported by the session, if any.
    fn error(&self) -> Option<String>;

    fn current_time(&self) -> MediaTime;

    /// Completion is reported as [`BackendSignal::SeekFinished`].
    fn seek(&self, request: SeekRequest);

    /// Register a periodic observer firing every `interval` of playback.
    fn add_periodic_time_observer(&self, interval: MediaTime) -> ObserverToken;

    fn remove_periodic_time_observer(&self, token: ObserverToken);

    /// Hint the session to buffer ahead of playback at `rate`.
    fn preroll(&self, rate: f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ready_to_play_counts_as_ready() {
        assert!(!ResourceStatus::Unknown.is_ready());
        assert!(ResourceStatus::ReadyToPlay.is_ready());
        assert!(!ResourceStatus::Failed {
            reason: "decoder".into()
        }
        .is_ready());
    }

    #[test]
    fn item_resources_are_distinguished_by_id() {
        let a = ItemId::new();
        let b = ItemId::new();
        assert_ne!(Resource::Item(a), Resource::Item(b));
        assert_eq!(Resource::Item(a), Resource::Item(a));
    }
}
