//! Application Lifecycle Signals
//!
//! Reports foreground/background transitions so playback can be interrupted
//! when the app leaves the screen and resumed when it returns.

use crate::{
    error::Result,
    platform::{PlatformSend, PlatformSendSync},
};

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Application is in the foreground and active
    Foreground,
    /// Application is in the background
    Background,
    /// Application is being suspended
    Suspended,
}

impl LifecycleState {
    /// `true` for every state in which the app is not visible.
    pub fn is_backgrounded(self) -> bool {
        matches!(self, LifecycleState::Background | LifecycleState::Suspended)
    }
}

/// Lifecycle observer trait
///
/// # Platform Support
///
/// - **iOS**: `UIApplication` will-resign-active / did-become-active
/// - **Android**: Activity `onPause` / `onResume`
/// - **Desktop**: Window minimize/restore
/// - **Web**: Page Visibility API
///
/// # Example
///
/// ```ignore
/// use bridge_traits::lifecycle::{LifecycleObserver, LifecycleState};
///
/// async fn watch(observer: &dyn LifecycleObserver) -> Result<()> {
///     let mut stream = observer.subscribe_changes().await?;
///     while let Some(state) = stream.next().await {
///         if state.is_backgrounded() {
///             pause_video();
///         }
///     }
///     Ok(())
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LifecycleObserver: PlatformSendSync {
    /// Get current lifecycle state
    async fn get_state(&self) -> Result<LifecycleState>;

    /// Subscribe to lifecycle state changes
    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>>;
}

/// Stream of lifecycle state changes
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait LifecycleChangeStream: PlatformSend {
    /// Get the next lifecycle state update
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<LifecycleState>;
}
