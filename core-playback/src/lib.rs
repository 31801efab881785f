//! # Playback Orchestration
//!
//! State machine and plumbing that turn a platform media session into a
//! looping, seekable, lifecycle-aware video player.
//!
//! ## Overview
//!
//! This crate handles:
//! - Readiness tracking across engine, item and render surface
//! - Transport (play/pause/seek) with deferred auto-start
//! - End-of-item handling with optional looping
//! - Background interruption and foreground resume
//! - Weakly-held listener notification and event-bus fan-out
//!
//! Decoding, rendering and asset loading stay in the backend behind
//! [`bridge_traits::MediaBackend`].

pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod item;
pub mod listeners;
pub mod readiness;
pub mod registration;
pub mod runtime;
pub mod view;

pub use config::PlaybackSettings;
pub use controller::{PlaybackController, PlaybackSnapshot, SeekOutcome};
pub use dispatch::{DispatchQueue, QueueSink};
pub use error::{PlaybackError, Result};
pub use item::MediaItem;
pub use listeners::{ListenerSet, PlaybackListener};
pub use runtime::{PlaybackHandle, PlaybackRuntime};
pub use view::PlaybackView;
