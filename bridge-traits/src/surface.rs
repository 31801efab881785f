//! Render surface bridge.
//!
//! A render surface is the host-owned layer decoded frames are presented to:
//! a `CALayer`, a `SurfaceView`, a `<video>` element or an offscreen texture.
//! The core only sizes it and hands it to the backend.

use crate::platform::PlatformSendSync;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Axis-aligned rectangle in host layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Identifier of a render surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Host-provided output layer.
pub trait RenderSurface: PlatformSendSync {
    fn id(&self) -> SurfaceId;

    /// Resize/reposition the layer.
    fn set_frame(&self, frame: Rect);

    fn frame(&self) -> Rect;
}
