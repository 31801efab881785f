//! # Playback Error Types
//!
//! The controller itself has no error taxonomy: backend trouble degrades to
//! "not ready" or "not playing". These errors cover the plumbing around it,
//! namely settings validation and talking to a runtime that has shut down.

use thiserror::Error;

/// Errors that can occur around playback orchestration.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// Settings failed validation.
    #[error("Invalid playback settings: {0}")]
    InvalidSettings(String),

    /// The runtime task is no longer draining commands.
    #[error("Playback runtime has stopped")]
    RuntimeStopped,

    /// A bridge call failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::BridgeError),

    /// Runtime configuration or logging failed.
    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),
}

impl PlaybackError {
    /// Returns `true` if the handle can no longer reach a runtime.
    pub fn is_stopped(&self) -> bool {
        matches!(self, PlaybackError::RuntimeStopped)
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
