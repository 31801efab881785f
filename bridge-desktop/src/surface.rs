//! In-memory render surface.

use bridge_traits::surface::{Rect, RenderSurface, SurfaceId};
use parking_lot::Mutex;

/// A surface that only remembers its frame. Useful for headless hosts and
/// tests.
#[derive(Debug, Default)]
pub struct OffscreenSurface {
    id: SurfaceId,
    frame: Mutex<Rect>,
}

impl OffscreenSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame(frame: Rect) -> Self {
        Self {
            id: SurfaceId::new(),
            frame: Mutex::new(frame),
        }
    }
}

impl RenderSurface for OffscreenSurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn set_frame(&self, frame: Rect) {
        *self.frame.lock() = frame;
    }

    fn frame(&self) -> Rect {
        *self.frame.lock()
    }
}
