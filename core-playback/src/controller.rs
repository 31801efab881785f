//! # Playback Controller
//!
//! The readiness/transport state machine sitting between a host view and the
//! platform [`MediaBackend`].
//!
//! ## Overview
//!
//! The controller never blocks on the backend. Requests (load, seek, rate
//! changes) go out as calls on the backend; results come back as
//! [`BackendSignal`]s fed to [`PlaybackController::handle_signal`] by
//! whoever owns the controller (normally the
//! [`PlaybackRuntime`](crate::runtime::PlaybackRuntime)). Every input is
//! handled to completion before the next one, which is what makes the
//! end-of-item sequence atomic.
//!
//! ## Readiness
//!
//! The player is READY when the engine, the current item and the render
//! surface all report [`ResourceStatus::ReadyToPlay`]. `play()` before that
//! point is remembered and honoured on the next false→true transition.
//!
//! ## Seeks
//!
//! Each seek gets a generation number. Only the newest seek's completion
//! re-attaches the periodic time observer and may issue a preroll hint;
//! superseded completions still receive their callback.

use crate::config::PlaybackSettings;
use crate::error::Result;
use crate::item::MediaItem;
use crate::listeners::{ListenerSet, PlaybackListener};
use crate::readiness::{Readiness, Transition};
use crate::registration::{EndObserver, TimeObserver};
use bridge_traits::backend::{
    BackendSignal, LoadOutcome, LoadRequest, MediaBackend, ObserverToken, Resource,
    ResourceStatus, SeekRequest,
};
use bridge_traits::lifecycle::LifecycleState;
use bridge_traits::media::{AssetInfo, ItemId, MediaSource, MediaTime};
use bridge_traits::surface::RenderSurface;
use core_runtime::events::PlaybackEvent;
use core_runtime::logging::redact_location;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Result delivered to a seek completion callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeekOutcome {
    /// Position the seek was clamped to.
    pub target: MediaTime,
    /// `false` if the seek was interrupted or could not run.
    pub finished: bool,
}

type SeekCompletion = Box<dyn FnOnce(SeekOutcome) + Send>;

struct PendingSeek {
    target: MediaTime,
    completion: SeekCompletion,
}

/// Point-in-time view of the controller state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub ready: bool,
    pub playing: bool,
    pub needs_auto_start: bool,
    pub interrupted: bool,
    pub looping: bool,
    pub current_segment_index: usize,
    pub current_time: MediaTime,
    pub duration: Option<MediaTime>,
    pub item: Option<ItemId>,
}

/// Playback state machine over one backend session.
pub struct PlaybackController {
    backend: Arc<dyn MediaBackend>,
    settings: PlaybackSettings,
    readiness: Readiness,
    listeners: ListenerSet,

    item: Option<MediaItem>,
    end_observer: Option<EndObserver>,
    time_observer: Option<TimeObserver>,
    surface: Option<Arc<dyn RenderSurface>>,

    pending_load: Option<MediaSource>,
    load_generation: u64,
    seek_generation: u64,
    pending_seeks: BTreeMap<u64, PendingSeek>,

    needs_auto_start: bool,
    interrupted: bool,
    looping: bool,
    current_segment_index: usize,
}

impl PlaybackController {
    /// Create a controller for `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError::InvalidSettings`](crate::PlaybackError::InvalidSettings)
    /// if `settings` fail validation.
    pub fn new(backend: Arc<dyn MediaBackend>, settings: PlaybackSettings) -> Result<Self> {
        settings.validate()?;

        Ok(Self {
            backend,
            looping: settings.looping,
            settings,
            readiness: Readiness::default(),
            listeners: ListenerSet::new(),
            item: None,
            end_observer: None,
            time_observer: None,
            surface: None,
            pending_load: None,
            load_generation: 0,
            seek_generation: 0,
            pending_seeks: BTreeMap::new(),
            needs_auto_start: false,
            interrupted: false,
            current_segment_index: 0,
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    /// Backend is advancing and has not reported an error.
    pub fn is_playing(&self) -> bool {
        self.backend.rate() != 0.0 && self.backend.error().is_none()
    }

    pub fn needs_auto_start(&self) -> bool {
        self.needs_auto_start
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn current_segment_index(&self) -> usize {
        self.current_segment_index
    }

    pub fn current_item(&self) -> Option<&MediaItem> {
        self.item.as_ref()
    }

    pub fn surface(&self) -> Option<&Arc<dyn RenderSurface>> {
        self.surface.as_ref()
    }

    /// Token of the attached periodic observer, if one is attached.
    pub fn time_observer_token(&self) -> Option<ObserverToken> {
        self.time_observer.as_ref().map(TimeObserver::token)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            ready: self.is_ready(),
            playing: self.is_playing(),
            needs_auto_start: self.needs_auto_start,
            interrupted: self.interrupted,
            looping: self.looping,
            current_segment_index: self.current_segment_index,
            current_time: self.backend.current_time(),
            duration: self.item.as_ref().map(MediaItem::duration),
            item: self.item.as_ref().map(MediaItem::id),
        }
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Register a listener (held weakly). Returns `false` if already present.
    pub fn add_listener(&mut self, listener: Arc<dyn PlaybackListener>) -> bool {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, listener: &Arc<dyn PlaybackListener>) -> bool {
        self.listeners.remove(listener)
    }

    fn notify(&mut self, event: PlaybackEvent) {
        if event.is_transport() {
            debug!(event = ?event, "{}", event.description());
        }
        self.listeners.notify(event);
    }

    // ------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------

    /// Start playback, or remember the request until the player is ready.
    pub fn play(&mut self) {
        if !self.readiness.is_ready() {
            debug!("Play requested before ready; deferring");
            self.needs_auto_start = true;
            return;
        }

        let rate = self.settings.playback_rate;
        let previous = self.backend.rate();
        if previous < rate {
            self.backend.set_rate(rate);
            if previous == 0.0 {
                self.notify(PlaybackEvent::Started);
            }
        }
    }

    /// Stop playback and drop any deferred play request.
    pub fn pause(&mut self) {
        self.needs_auto_start = false;
        if self.backend.rate() > 0.0 {
            self.backend.set_rate(0.0);
            self.notify(PlaybackEvent::Paused);
        }
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Seek to `to`, clamped into `[initial_start, duration]`.
    ///
    /// With no active item the completion runs immediately with
    /// `finished == false`.
    pub fn seek<F>(&mut self, to: MediaTime, completion: F)
    where
        F: FnOnce(SeekOutcome) + Send + 'static,
    {
        let lower = self.settings.initial_start;
        let Some(duration) = self.item.as_ref().map(MediaItem::duration) else {
            debug!(target_time = %to, "Seek without an active item");
            completion(SeekOutcome {
                target: to.clamp_to(lower, lower),
                finished: false,
            });
            return;
        };

        self.time_observer = None;

        let target = to.clamp_to(lower, duration);
        self.seek_generation += 1;
        let generation = self.seek_generation;
        self.pending_seeks.insert(
            generation,
            PendingSeek {
                target,
                completion: Box::new(completion),
            },
        );

        trace!(generation, position = %target, "Seeking");
        let tolerance = self.settings.seek_tolerance;
        self.backend.seek(SeekRequest {
            generation,
            target,
            tolerance_before: tolerance,
            tolerance_after: tolerance,
        });
    }

    pub fn seek_to_start<F>(&mut self, completion: F)
    where
        F: FnOnce(SeekOutcome) + Send + 'static,
    {
        self.seek(self.settings.initial_start, completion);
    }

    // ------------------------------------------------------------------
    // Item and surface
    // ------------------------------------------------------------------

    /// Request `source` as the next item.
    ///
    /// The current item keeps playing until the asset resolves. A newer call
    /// supersedes any load still in flight.
    pub fn replace_item(&mut self, source: MediaSource) {
        self.load_generation += 1;
        let generation = self.load_generation;
        debug!(
            generation,
            source = %redact_location(&source.location()),
            "Loading asset"
        );
        self.pending_load = Some(source.clone());
        self.backend.load_asset(LoadRequest { generation, source });
    }

    /// Route output to `surface`. Readiness waits for the backend to report
    /// the new surface.
    pub fn attach_surface(&mut self, surface: Arc<dyn RenderSurface>) -> Result<()> {
        let transition = self.readiness.reset_surface();
        self.apply_transition(transition);
        self.backend.attach_surface(Arc::clone(&surface))?;
        debug!(surface = %surface.id(), "Attached render surface");
        self.surface = Some(surface);
        Ok(())
    }

    fn install_item(&mut self, source: MediaSource, asset: AssetInfo) {
        let item = MediaItem::new(source, asset);
        let id = item.id();

        // Old registrations go before anything of the new item is installed
        self.time_observer = None;
        self.end_observer = None;
        self.cancel_pending_seeks();

        let transition = self.readiness.track_item(id);
        self.apply_transition(transition);

        if let Err(err) = self.backend.replace_current_item(id, item.source()) {
            warn!(
                error = %err,
                source = %redact_location(&item.source().location()),
                "Backend rejected item"
            );
            // The old item's registrations are gone; nothing may keep playing it
            let was_playing = self.backend.rate() > 0.0;
            self.backend.set_rate(0.0);
            if self.item.take().is_some() {
                self.backend.clear_current_item();
            }
            if was_playing {
                self.notify(PlaybackEvent::Paused);
            }
            let transition = self.readiness.clear_item();
            self.apply_transition(transition);
            return;
        }

        match EndObserver::attach(&self.backend, id) {
            Ok(observer) => self.end_observer = Some(observer),
            Err(err) => warn!(error = %err, item = %id, "End-of-item registration failed"),
        }

        if let (true, Some(mix)) = (item.has_audio(), self.settings.audio_mix) {
            if let Err(err) = self.backend.attach_audio_mix(id, mix) {
                warn!(error = %err, item = %id, "Audio mix not applied");
            }
        }

        debug!(
            item = %id,
            duration = %item.duration(),
            segments = item.segments().len(),
            "Installed item"
        );
        self.current_segment_index = 0;
        self.item = Some(item);
        self.seek_to_start(|_| {});

        if self.settings.auto_play {
            self.play();
        }
    }

    fn cancel_pending_seeks(&mut self) {
        self.seek_generation += 1;
        for (_, pending) in std::mem::take(&mut self.pending_seeks) {
            (pending.completion)(SeekOutcome {
                target: pending.target,
                finished: false,
            });
        }
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Apply one backend notification.
    pub fn handle_signal(&mut self, signal: BackendSignal) {
        match signal {
            BackendSignal::StatusChanged { resource, status } => {
                self.handle_status(resource, status)
            }
            BackendSignal::AssetLoaded {
                generation,
                outcome,
            } => self.handle_asset_loaded(generation, outcome),
            BackendSignal::SeekFinished {
                generation,
                finished,
            } => self.handle_seek_finished(generation, finished),
            BackendSignal::TimeTick { token, time } => {
                if self.time_observer_token() == Some(token) {
                    self.notify(PlaybackEvent::TimeUpdate { time });
                } else {
                    trace!(token = token.0, "Dropping tick from detached observer");
                }
            }
            BackendSignal::ItemReachedEnd { item } => self.handle_item_end(item),
        }
    }

    /// Apply an app lifecycle transition.
    pub fn handle_lifecycle(&mut self, state: LifecycleState) {
        if state.is_backgrounded() {
            if self.is_playing() {
                debug!(state = ?state, "Interrupting playback");
                self.interrupted = true;
                self.pause();
            }
        } else if self.interrupted {
            debug!("Resuming interrupted playback");
            self.interrupted = false;
            self.play();
        }
    }

    fn handle_status(&mut self, resource: Resource, status: ResourceStatus) {
        if let ResourceStatus::Failed { reason } = &status {
            warn!(resource = ?resource, %reason, "Backend resource failed");
        }
        let transition = self.readiness.update(resource, status);
        self.apply_transition(transition);
    }

    fn apply_transition(&mut self, transition: Transition) {
        match transition {
            Transition::BecameReady => {
                self.notify(PlaybackEvent::ReadyForPlay);
                if self.needs_auto_start {
                    self.needs_auto_start = false;
                    self.play();
                }
            }
            Transition::BecameUnready => debug!("Player no longer ready"),
            Transition::Unchanged => {}
        }
    }

    fn handle_asset_loaded(&mut self, generation: u64, outcome: LoadOutcome) {
        if generation != self.load_generation {
            trace!(generation, current = self.load_generation, "Ignoring superseded load");
            return;
        }
        let Some(source) = self.pending_load.take() else {
            return;
        };

        match outcome {
            LoadOutcome::Loaded(asset) => self.install_item(source, asset),
            LoadOutcome::Failed { reason } => warn!(
                source = %redact_location(&source.location()),
                %reason,
                "Asset failed to load"
            ),
        }
    }

    fn handle_seek_finished(&mut self, generation: u64, finished: bool) {
        let Some(pending) = self.pending_seeks.remove(&generation) else {
            trace!(generation, "Ignoring completion of a cancelled seek");
            return;
        };

        if generation == self.seek_generation {
            self.maybe_preroll(pending.target, finished);
            if self.item.is_some() && self.time_observer.is_none() {
                self.time_observer = Some(TimeObserver::attach(
                    &self.backend,
                    self.settings.time_update_interval,
                ));
            }
        }

        (pending.completion)(SeekOutcome {
            target: pending.target,
            finished,
        });
    }

    fn maybe_preroll(&mut self, target: MediaTime, finished: bool) {
        if !finished || !self.readiness.is_ready() || self.backend.rate() != 0.0 {
            return;
        }
        let Some(item) = &self.item else {
            return;
        };

        let index = item.segment_index_at(target);
        if index != self.current_segment_index {
            trace!(from = self.current_segment_index, to = index, "Prerolling new segment");
            self.backend.preroll(self.settings.playback_rate);
            self.current_segment_index = index;
        }
    }

    fn handle_item_end(&mut self, item: ItemId) {
        if self.end_observer.as_ref().map(EndObserver::item) != Some(item) {
            trace!(item = %item, "Ignoring end of inactive item");
            return;
        }

        // Silent stop: the end is reported as Ended, not Paused
        self.backend.set_rate(0.0);
        self.notify(PlaybackEvent::Ended);
        self.seek_to_start(|_| {});

        if self.looping {
            if self.readiness.is_ready() {
                self.backend.set_rate(self.settings.playback_rate);
            } else {
                debug!("Loop restart deferred until ready");
                self.needs_auto_start = true;
            }
            self.notify(PlaybackEvent::Restarted);
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.time_observer = None;
        self.end_observer = None;
        if self.item.take().is_some() {
            self.backend.clear_current_item();
        }
    }
}

impl fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackController")
            .field("ready", &self.readiness.is_ready())
            .field("item", &self.item.as_ref().map(MediaItem::id))
            .field("needs_auto_start", &self.needs_auto_start)
            .field("interrupted", &self.interrupted)
            .field("looping", &self.looping)
            .field("current_segment_index", &self.current_segment_index)
            .field("listeners", &self.listeners)
            .finish()
    }
}
