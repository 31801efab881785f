//! # Core Configuration Module
//!
//! Collects the host bridges the playback runtime needs and validates them
//! before anything starts.
//!
//! ## Required Dependencies
//!
//! - `MediaBackend` - the platform playback session
//!
//! ## Optional Dependencies
//!
//! - `LifecycleObserver` - foreground/background transitions; without it the
//!   player never interrupts itself when the app is hidden
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .media_backend(Arc::new(MyBackend::new(sink)))
//!     .lifecycle_observer(Arc::new(MyLifecycle))
//!     .event_buffer_size(512)
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! Missing bridges fail fast with [`Error::CapabilityMissing`] and a message
//! describing what the host has to inject.

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{LifecycleObserver, MediaBackend};
use std::sync::Arc;

/// Bridges and runtime-level settings for the playback core.
#[derive(Clone)]
pub struct CoreConfig {
    /// Platform playback session (required)
    pub media_backend: Arc<dyn MediaBackend>,

    /// App lifecycle observer (optional)
    pub lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,

    /// Capacity of the broadcast channel carrying playback events
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("media_backend", &"MediaBackend { ... }")
            .field(
                "lifecycle_observer",
                &self
                    .lifecycle_observer
                    .as_ref()
                    .map(|_| "LifecycleObserver { ... }"),
            )
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "event_buffer_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    media_backend: Option<Arc<dyn MediaBackend>>,
    lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Set the platform playback session.
    pub fn media_backend(mut self, backend: Arc<dyn MediaBackend>) -> Self {
        self.media_backend = Some(backend);
        self
    }

    /// Set the lifecycle observer used for background interruption.
    pub fn lifecycle_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.lifecycle_observer = Some(observer);
        self
    }

    /// Override the event bus capacity (default: [`DEFAULT_EVENT_BUFFER_SIZE`]).
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when no media backend was provided
    /// - [`Error::Config`] when a setting is out of range
    pub fn build(self) -> Result<CoreConfig> {
        let media_backend = self.media_backend.ok_or_else(|| Error::CapabilityMissing {
            capability: "MediaBackend".to_string(),
            message: "No media backend provided. Desktop: enable the desktop-shims feature \
                      and inject bridge_desktop::HeadlessBackend. Mobile: inject the \
                      platform-native session adapter."
                .to_string(),
        })?;

        let config = CoreConfig {
            media_backend,
            lifecycle_observer: self.lifecycle_observer,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };
        config.validate()?;
        Ok(config)
    }
}
