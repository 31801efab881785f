//! # Playback View
//!
//! Host-facing wrapper owning the render surface. The view keeps no playback
//! state of its own; it forwards configuration and transport to the runtime
//! and sizes the surface during layout.

use crate::error::Result;
use crate::runtime::PlaybackHandle;
use bridge_traits::media::MediaSource;
use bridge_traits::surface::{Rect, RenderSurface};
use std::sync::Arc;
use tracing::debug;

/// A render surface bound to a playback runtime.
pub struct PlaybackView {
    handle: PlaybackHandle,
    surface: Arc<dyn RenderSurface>,
}

impl PlaybackView {
    /// Bind `surface` to the runtime behind `handle`.
    ///
    /// The surface is handed to the backend immediately; readiness follows
    /// once the backend reports it.
    pub async fn new(handle: PlaybackHandle, surface: Arc<dyn RenderSurface>) -> Result<Self> {
        handle.attach_surface(Arc::clone(&surface)).await?;
        Ok(Self { handle, surface })
    }

    /// Show `source` (a path or URL).
    pub fn configure(&self, source: &str) -> Result<()> {
        let source: MediaSource = source.parse()?;
        self.configure_source(source)
    }

    pub fn configure_source(&self, source: MediaSource) -> Result<()> {
        self.handle.replace_item(source)
    }

    pub fn play(&self) -> Result<()> {
        self.handle.play()
    }

    pub fn pause(&self) -> Result<()> {
        self.handle.pause()
    }

    /// Size the surface to `bounds`. No-op when the frame is unchanged.
    pub fn layout(&self, bounds: Rect) {
        if self.surface.frame() != bounds {
            debug!(width = bounds.width, height = bounds.height, "Laying out surface");
            self.surface.set_frame(bounds);
        }
    }

    pub fn surface(&self) -> &Arc<dyn RenderSurface> {
        &self.surface
    }

    pub fn handle(&self) -> &PlaybackHandle {
        &self.handle
    }
}

impl std::fmt::Debug for PlaybackView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackView")
            .field("surface", &self.surface.id())
            .field("handle", &self.handle)
            .finish()
    }
}
