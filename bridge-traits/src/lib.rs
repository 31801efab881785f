//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the playback core and the
//! platform pieces it orchestrates but never implements itself: the media
//! session that decodes and renders, the surface frames are presented on,
//! the app lifecycle, and the host's logging pipeline.
//!
//! ## Traits
//!
//! ### Playback
//! - [`MediaBackend`](backend::MediaBackend) - Load, seek, rate control, time observers, preroll
//! - [`SignalSink`](backend::SignalSink) - Where a backend reports asynchronous results
//! - [`RenderSurface`](surface::RenderSurface) - Output layer sized by the view
//!
//! ### Platform Integration
//! - [`LifecycleObserver`](lifecycle::LifecycleObserver) - App foreground/background transitions
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Headless backend |
//! | iOS      | TBD                 | 📋 Planned |
//! | Android  | TBD                 | 📋 Planned |
//! | Web      | TBD                 | 📋 Planned |
//!
//! ## Error Handling
//!
//! Fallible bridge calls return [`BridgeError`](error::BridgeError). Most
//! backend work is asynchronous and reports its outcome through
//! [`BackendSignal`](backend::BackendSignal) instead.

pub mod backend;
pub mod error;
pub mod lifecycle;
pub mod log;
pub mod media;
pub mod platform;
pub mod surface;

pub use error::BridgeError;

// Re-export commonly used types
pub use backend::{
    BackendSignal, LoadOutcome, LoadRequest, MediaBackend, ObserverToken, Resource,
    ResourceStatus, SeekRequest, SignalSink,
};
pub use lifecycle::{LifecycleChangeStream, LifecycleObserver, LifecycleState};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use media::{AssetInfo, AudioMix, ItemId, MediaSource, MediaTime, TimeRange, TIMESCALE};
pub use surface::{Rect, RenderSurface, SurfaceId};
