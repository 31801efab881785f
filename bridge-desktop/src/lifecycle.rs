//! Desktop Lifecycle Observer
//!
//! Desktop apps have no OS-driven suspension, so the state is pushed by the
//! host (window minimized/restored) through [`DesktopLifecycleObserver::set_state`].

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    lifecycle::{LifecycleChangeStream, LifecycleObserver, LifecycleState},
};
use tokio::sync::watch;
use tracing::debug;

/// Host-driven lifecycle source. Starts in the foreground.
#[derive(Clone)]
pub struct DesktopLifecycleObserver {
    state: watch::Sender<LifecycleState>,
}

impl DesktopLifecycleObserver {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LifecycleState::Foreground);
        Self { state }
    }

    /// Publish a transition. Repeating the current state is not a change.
    pub fn set_state(&self, next: LifecycleState) {
        let changed = self.state.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            debug!(state = ?next, "Lifecycle state changed");
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }
}

impl Default for DesktopLifecycleObserver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LifecycleObserver for DesktopLifecycleObserver {
    async fn get_state(&self) -> Result<LifecycleState> {
        Ok(self.state())
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>> {
        Ok(Box::new(DesktopLifecycleChangeStream {
            receiver: self.state.subscribe(),
        }))
    }
}

/// Yields every state published after subscription.
struct DesktopLifecycleChangeStream {
    receiver: watch::Receiver<LifecycleState>,
}

#[async_trait]
impl LifecycleChangeStream for DesktopLifecycleChangeStream {
    async fn next(&mut self) -> Option<LifecycleState> {
        self.receiver.changed().await.ok()?;
        let state = *self.receiver.borrow_and_update();
        Some(state)
    }
}
