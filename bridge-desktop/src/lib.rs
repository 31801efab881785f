//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux) and headless hosts.
//!
//! ## Overview
//!
//! - `HeadlessBackend`: clock-driven `MediaBackend` with a registered asset
//!   catalog; no decoding, deterministic under a paused Tokio clock
//! - `DesktopLifecycleObserver`: `LifecycleObserver` driven by the host's
//!   window events
//! - `OffscreenSurface`: `RenderSurface` that only tracks its frame
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopLifecycleObserver, HeadlessBackend, OffscreenSurface};
//! use core_playback::DispatchQueue;
//!
//! #[tokio::main]
//! async fn main() {
//!     let queue = DispatchQueue::new();
//!     let backend = HeadlessBackend::new(queue.sink());
//!     backend.register_asset(&source, AssetInfo::new(MediaTime::from_secs(12)));
//!
//!     // Use in core configuration
//! }
//! ```

mod headless;
mod lifecycle;
mod surface;

pub use headless::{HeadlessBackend, DEFAULT_LOAD_LATENCY, DEFAULT_SEEK_LATENCY};
pub use lifecycle::DesktopLifecycleObserver;
pub use surface::OffscreenSurface;
