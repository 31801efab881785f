//! # Dispatch Queue
//!
//! The single queue through which everything that mutates a controller
//! travels: backend signals (pushed by the backend from any thread through a
//! [`QueueSink`]) and commands from [`PlaybackHandle`](crate::runtime::PlaybackHandle)s.
//! The runtime drains it on one task, so the controller only ever sees one
//! input at a time.
//!
//! ```ignore
//! let queue = DispatchQueue::new();
//! let backend = Arc::new(HeadlessBackend::new(queue.sink()));
//! let config = CoreConfig::builder().media_backend(backend).build()?;
//! let runtime = PlaybackRuntime::new(config, PlaybackSettings::default(), queue)?;
//! ```

use crate::controller::{PlaybackSnapshot, SeekOutcome};
use crate::error::Result;
use crate::listeners::PlaybackListener;
use bridge_traits::backend::{BackendSignal, SignalSink};
use bridge_traits::media::{MediaSource, MediaTime};
use bridge_traits::surface::RenderSurface;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Requests issued through a playback handle.
pub(crate) enum Command {
    Play,
    Pause,
    Seek {
        to: MediaTime,
        reply: oneshot::Sender<SeekOutcome>,
    },
    SeekToStart {
        reply: oneshot::Sender<SeekOutcome>,
    },
    ReplaceItem(MediaSource),
    SetLooping(bool),
    AttachSurface {
        surface: Arc<dyn RenderSurface>,
        reply: oneshot::Sender<Result<()>>,
    },
    AddListener {
        listener: Arc<dyn PlaybackListener>,
        reply: oneshot::Sender<bool>,
    },
    RemoveListener {
        listener: Arc<dyn PlaybackListener>,
        reply: oneshot::Sender<bool>,
    },
    Snapshot(oneshot::Sender<PlaybackSnapshot>),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::Play => "Play",
            Command::Pause => "Pause",
            Command::Seek { .. } => "Seek",
            Command::SeekToStart { .. } => "SeekToStart",
            Command::ReplaceItem(_) => "ReplaceItem",
            Command::SetLooping(_) => "SetLooping",
            Command::AttachSurface { .. } => "AttachSurface",
            Command::AddListener { .. } => "AddListener",
            Command::RemoveListener { .. } => "RemoveListener",
            Command::Snapshot(_) => "Snapshot",
        };
        f.write_str(name)
    }
}

/// One queued controller input.
#[derive(Debug)]
pub(crate) enum Dispatch {
    Signal(BackendSignal),
    Command(Command),
}

/// Unbounded multi-producer queue owned by a [`PlaybackRuntime`](crate::runtime::PlaybackRuntime).
pub struct DispatchQueue {
    sender: mpsc::UnboundedSender<Dispatch>,
    receiver: mpsc::UnboundedReceiver<Dispatch>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self { sender, receiver }
    }

    /// Sink to hand to the backend.
    pub fn sink(&self) -> Arc<QueueSink> {
        Arc::new(QueueSink {
            sender: self.sender.clone(),
        })
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        mpsc::UnboundedSender<Dispatch>,
        mpsc::UnboundedReceiver<Dispatch>,
    ) {
        (self.sender, self.receiver)
    }
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

/// [`SignalSink`] feeding a [`DispatchQueue`].
#[derive(Clone)]
pub struct QueueSink {
    sender: mpsc::UnboundedSender<Dispatch>,
}

impl SignalSink for QueueSink {
    fn deliver(&self, signal: BackendSignal) -> bool {
        self.sender.send(Dispatch::Signal(signal)).is_ok()
    }
}

impl fmt::Debug for QueueSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueSink")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::backend::ObserverToken;

    #[tokio::test]
    async fn sink_feeds_the_queue_in_order() {
        let queue = DispatchQueue::new();
        let sink = queue.sink();
        let (_sender, mut receiver) = queue.into_parts();

        for generation in 1..=3 {
            assert!(sink.deliver(BackendSignal::SeekFinished {
                generation,
                finished: true,
            }));
        }

        for expected in 1..=3 {
            match receiver.recv().await {
                Some(Dispatch::Signal(BackendSignal::SeekFinished { generation, .. })) => {
                    assert_eq!(generation, expected)
                }
                other => panic!("unexpected dispatch {other:?}"),
            }
        }
    }

    #[test]
    fn sink_reports_closed_queue() {
        let queue = DispatchQueue::new();
        let sink = queue.sink();
        drop(queue);

        assert!(!sink.deliver(BackendSignal::TimeTick {
            token: ObserverToken(1),
            time: MediaTime::ZERO,
        }));
    }
}
