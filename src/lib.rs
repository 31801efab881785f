//! Workspace facade crate.
//!
//! Re-exports the playback shim crates so host applications can depend on a
//! single package. The `desktop-shims` feature (on by default) pulls in the
//! desktop adapters from `bridge-desktop`.

pub use bridge_traits;
pub use core_playback;
pub use core_runtime;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

pub use core_playback::{PlaybackController, PlaybackHandle, PlaybackRuntime, PlaybackView};
pub use core_runtime::events::PlaybackEvent;
