//! # Playback Runtime
//!
//! Owns a [`PlaybackController`] and drives it from a single task.
//!
//! ## Architecture
//!
//! ```text
//!  backend threads ──deliver()──┐
//!                               ▼
//!  PlaybackHandle ──command──> DispatchQueue ──> PlaybackRuntime::run ──> PlaybackController
//!                               ▲                        │                       │
//!  LifecycleObserver ─stream────┘ (selected alongside)   │                  listeners
//!                                                        ▼                       │
//!                                                    EventBus <── BusForwarder <─┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let runtime = PlaybackRuntime::new(config, PlaybackSettings::ambient_loop(), queue)?;
//! let handle = runtime.handle();
//! tokio::spawn(runtime.run());
//!
//! handle.attach_surface(surface).await?;
//! handle.replace_item("https://cdn.example.com/intro.mp4".parse()?)?;
//! let mut events = handle.subscribe();
//! ```
//!
//! ## Shutdown
//!
//! The backend holds a [`QueueSink`](crate::dispatch::QueueSink), so the
//! queue never closes on its own. [`PlaybackHandle::shutdown`] cancels the
//! runtime's token; `run` returns and drops the controller, which releases
//! every backend registration.

use crate::config::PlaybackSettings;
use crate::controller::{PlaybackController, PlaybackSnapshot, SeekOutcome};
use crate::dispatch::{Command, Dispatch, DispatchQueue};
use crate::error::{PlaybackError, Result};
use crate::listeners::PlaybackListener;
use bridge_traits::lifecycle::{LifecycleChangeStream, LifecycleObserver, LifecycleState};
use bridge_traits::media::{MediaSource, MediaTime};
use bridge_traits::surface::RenderSurface;
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream, PlaybackEvent};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Forwards controller events onto the event bus.
struct BusForwarder {
    bus: EventBus,
}

impl PlaybackListener for BusForwarder {
    fn on_event(&self, event: PlaybackEvent) {
        // No subscribers is not an error
        let _ = self.bus.emit(event);
    }
}

enum Wake {
    Dispatch(Dispatch),
    Lifecycle(Option<LifecycleState>),
    Shutdown,
}

/// Single-task driver for a [`PlaybackController`].
pub struct PlaybackRuntime {
    controller: PlaybackController,
    receiver: mpsc::UnboundedReceiver<Dispatch>,
    lifecycle: Option<Arc<dyn LifecycleObserver>>,
    handle: PlaybackHandle,
    // Listeners are held weakly; this keeps the bus registration alive
    _forwarder: Arc<BusForwarder>,
}

impl PlaybackRuntime {
    /// Build a runtime from the host bridges in `config`.
    ///
    /// `queue` must be the queue whose sink the configured backend delivers
    /// its signals to.
    pub fn new(config: CoreConfig, settings: PlaybackSettings, queue: DispatchQueue) -> Result<Self> {
        config.validate()?;

        let mut controller = PlaybackController::new(Arc::clone(&config.media_backend), settings)?;
        let bus = EventBus::new(config.event_buffer_size);
        let forwarder = Arc::new(BusForwarder { bus: bus.clone() });
        controller.add_listener(forwarder.clone());

        let (sender, receiver) = queue.into_parts();
        let handle = PlaybackHandle {
            sender,
            bus,
            cancel: CancellationToken::new(),
        };

        Ok(Self {
            controller,
            receiver,
            lifecycle: config.lifecycle_observer,
            handle,
            _forwarder: forwarder,
        })
    }

    pub fn handle(&self) -> PlaybackHandle {
        self.handle.clone()
    }

    /// Drain the dispatch queue until [`PlaybackHandle::shutdown`] is called.
    pub async fn run(mut self) {
        let mut lifecycle = self.subscribe_lifecycle().await;
        let cancel = self.handle.cancel.clone();
        info!("Playback runtime started");

        loop {
            let wake = tokio::select! {
                biased;
                _ = cancel.cancelled() => Wake::Shutdown,
                dispatch = self.receiver.recv() => match dispatch {
                    Some(dispatch) => Wake::Dispatch(dispatch),
                    None => Wake::Shutdown,
                },
                state = next_lifecycle_state(&mut lifecycle) => Wake::Lifecycle(state),
            };

            match wake {
                Wake::Dispatch(Dispatch::Signal(signal)) => self.controller.handle_signal(signal),
                Wake::Dispatch(Dispatch::Command(command)) => self.execute(command),
                Wake::Lifecycle(Some(state)) => self.controller.handle_lifecycle(state),
                Wake::Lifecycle(None) => {
                    debug!("Lifecycle stream closed");
                    lifecycle = None;
                }
                Wake::Shutdown => break,
            }
        }

        info!("Playback runtime stopped");
    }

    async fn subscribe_lifecycle(&mut self) -> Option<Box<dyn LifecycleChangeStream>> {
        let observer = Arc::clone(self.lifecycle.as_ref()?);

        match observer.get_state().await {
            Ok(state) => {
                debug!(state = ?state, "Initial lifecycle state");
                self.controller.handle_lifecycle(state);
            }
            Err(err) => warn!(error = %err, "Lifecycle state unavailable"),
        }

        match observer.subscribe_changes().await {
            Ok(stream) => Some(stream),
            Err(err) => {
                warn!(error = %err, "Lifecycle subscription failed; background interruption disabled");
                None
            }
        }
    }

    fn execute(&mut self, command: Command) {
        match command {
            Command::Play => self.controller.play(),
            Command::Pause => self.controller.pause(),
            Command::Seek { to, reply } => self.controller.seek(to, move |outcome| {
                let _ = reply.send(outcome);
            }),
            Command::SeekToStart { reply } => self.controller.seek_to_start(move |outcome| {
                let _ = reply.send(outcome);
            }),
            Command::ReplaceItem(source) => self.controller.replace_item(source),
            Command::SetLooping(looping) => self.controller.set_looping(looping),
            Command::AttachSurface { surface, reply } => {
                let _ = reply.send(self.controller.attach_surface(surface));
            }
            Command::AddListener { listener, reply } => {
                let _ = reply.send(self.controller.add_listener(listener));
            }
            Command::RemoveListener { listener, reply } => {
                let _ = reply.send(self.controller.remove_listener(&listener));
            }
            Command::Snapshot(reply) => {
                let _ = reply.send(self.controller.snapshot());
            }
        }
    }
}

async fn next_lifecycle_state(
    stream: &mut Option<Box<dyn LifecycleChangeStream>>,
) -> Option<LifecycleState> {
    match stream {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}

impl fmt::Debug for PlaybackRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackRuntime")
            .field("controller", &self.controller)
            .field("lifecycle", &self.lifecycle.is_some())
            .finish()
    }
}

/// Cloneable front door to a running [`PlaybackRuntime`].
///
/// Transport calls are queued and return immediately; calls that produce a
/// value wait for the runtime to process them.
#[derive(Clone)]
pub struct PlaybackHandle {
    sender: mpsc::UnboundedSender<Dispatch>,
    bus: EventBus,
    cancel: CancellationToken,
}

impl PlaybackHandle {
    fn send(&self, command: Command) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(PlaybackError::RuntimeStopped);
        }
        self.sender
            .send(Dispatch::Command(command))
            .map_err(|_| PlaybackError::RuntimeStopped)
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.send(build(reply))?;
        response.await.map_err(|_| PlaybackError::RuntimeStopped)
    }

    pub fn play(&self) -> Result<()> {
        self.send(Command::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(Command::Pause)
    }

    /// Load `source` and make it the active item once it resolves.
    pub fn replace_item(&self, source: MediaSource) -> Result<()> {
        self.send(Command::ReplaceItem(source))
    }

    pub fn set_looping(&self, looping: bool) -> Result<()> {
        self.send(Command::SetLooping(looping))
    }

    /// Seek and wait for the backend to finish (or abandon) it.
    pub async fn seek(&self, to: MediaTime) -> Result<SeekOutcome> {
        self.request(|reply| Command::Seek { to, reply }).await
    }

    pub async fn seek_to_start(&self) -> Result<SeekOutcome> {
        self.request(|reply| Command::SeekToStart { reply }).await
    }

    pub async fn attach_surface(&self, surface: Arc<dyn RenderSurface>) -> Result<()> {
        self.request(|reply| Command::AttachSurface { surface, reply })
            .await?
    }

    /// Register a synchronous listener. Held weakly: keep your `Arc`.
    pub async fn add_listener(&self, listener: Arc<dyn PlaybackListener>) -> Result<bool> {
        self.request(|reply| Command::AddListener { listener, reply })
            .await
    }

    pub async fn remove_listener(&self, listener: Arc<dyn PlaybackListener>) -> Result<bool> {
        self.request(|reply| Command::RemoveListener { listener, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<PlaybackSnapshot> {
        self.request(Command::Snapshot).await
    }

    /// Stream of every event the controller emits from now on.
    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.bus.subscribe())
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    /// Stop the runtime. Pending requests fail with
    /// [`PlaybackError::RuntimeStopped`].
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.sender.is_closed()
    }
}

impl fmt::Debug for PlaybackHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackHandle")
            .field("running", &self.is_running())
            .field("bus", &self.bus)
            .finish()
    }
}
