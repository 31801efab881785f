//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playback core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Playback event vocabulary and broadcast bus
//!
//! ## Overview
//!
//! `core-playback` depends on this crate for its event type, its error
//! conventions and the bridge bundle it is constructed from. Hosts use it
//! directly to initialize logging and to subscribe to playback events.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
