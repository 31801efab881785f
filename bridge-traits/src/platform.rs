//! Platform-specific marker traits that keep trait bounds aligned with the
//! threading guarantees of each target.
//!
//! Native hosts deliver backend callbacks from arbitrary threads, so bridge
//! implementations must be `Send + Sync` there. WebAssembly hosts run on a
//! single thread and hand out objects that are not thread-safe; on that
//! target the markers collapse to no-ops.

/// `Send + Sync` on native targets, nothing on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync + ?Sized {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> PlatformSendSync for T {}

/// `Send` on native targets, nothing on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSend: Send {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSend for T where T: Send + ?Sized {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSend {}

#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> PlatformSend for T {}
