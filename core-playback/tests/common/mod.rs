//! Shared fixtures: a recording backend and a controller harness that feeds
//! it signals by hand.

#![allow(dead_code)]

use bridge_traits::backend::{
    BackendSignal, LoadOutcome, LoadRequest, MediaBackend, ObserverToken, Resource,
    ResourceStatus, SeekRequest,
};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::media::{AssetInfo, AudioMix, ItemId, MediaSource, MediaTime, TimeRange};
use bridge_traits::surface::RenderSurface;
use core_playback::{PlaybackController, PlaybackListener, PlaybackSettings, SeekOutcome};
use core_runtime::events::PlaybackEvent;
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Default)]
pub struct FakeState {
    pub rate: f32,
    pub error: Option<String>,
    pub time: MediaTime,
    pub current: Option<ItemId>,
    pub cleared: usize,
    pub loads: Vec<LoadRequest>,
    pub seeks: Vec<SeekRequest>,
    pub rate_calls: Vec<f32>,
    pub prerolls: Vec<f32>,
    pub end_observed: HashSet<ItemId>,
    pub observers: HashSet<u64>,
    pub next_token: u64,
    pub audio_mixes: Vec<(ItemId, AudioMix)>,
    pub surfaces: usize,
    pub reject_items: bool,
}

/// Backend that records every call and never talks back on its own.
#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

impl FakeBackend {
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock()
    }

    pub fn last_load(&self) -> LoadRequest {
        self.state().loads.last().cloned().expect("no load requested")
    }

    pub fn last_seek(&self) -> SeekRequest {
        *self.state().seeks.last().expect("no seek requested")
    }

    pub fn current(&self) -> ItemId {
        self.state().current.expect("no current item")
    }
}

impl MediaBackend for FakeBackend {
    fn load_asset(&self, request: LoadRequest) {
        self.state().loads.push(request);
    }

    fn replace_current_item(&self, item: ItemId, _source: &MediaSource) -> BridgeResult<()> {
        let mut state = self.state();
        if state.reject_items {
            return Err(BridgeError::OperationFailed("rejected".into()));
        }
        state.current = Some(item);
        state.time = MediaTime::ZERO;
        Ok(())
    }

    fn clear_current_item(&self) {
        let mut state = self.state();
        state.current = None;
        state.cleared += 1;
    }

    fn observe_item_end(&self, item: ItemId) -> BridgeResult<()> {
        self.state().end_observed.insert(item);
        Ok(())
    }

    fn stop_observing_item_end(&self, item: ItemId) {
        self.state().end_observed.remove(&item);
    }

    fn attach_audio_mix(&self, item: ItemId, mix: AudioMix) -> BridgeResult<()> {
        self.state().audio_mixes.push((item, mix));
        Ok(())
    }

    fn attach_surface(&self, _surface: Arc<dyn RenderSurface>) -> BridgeResult<()> {
        self.state().surfaces += 1;
        Ok(())
    }

    fn rate(&self) -> f32 {
        self.state().rate
    }

    fn set_rate(&self, rate: f32) {
        let mut state = self.state();
        state.rate = rate;
        state.rate_calls.push(rate);
    }

    fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    fn current_time(&self) -> MediaTime {
        self.state().time
    }

    fn seek(&self, request: SeekRequest) {
        let mut state = self.state();
        state.time = request.target;
        state.seeks.push(request);
    }

    fn add_periodic_time_observer(&self, _interval: MediaTime) -> ObserverToken {
        let mut state = self.state();
        state.next_token += 1;
        let token = state.next_token;
        state.observers.insert(token);
        ObserverToken(token)
    }

    fn remove_periodic_time_observer(&self, token: ObserverToken) {
        self.state().observers.remove(&token.0);
    }

    fn preroll(&self, rate: f32) {
        self.state().prerolls.push(rate);
    }
}

/// Listener recording everything it hears.
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<PlaybackEvent>>,
}

impl EventLog {
    pub fn take(&self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl PlaybackListener for EventLog {
    fn on_event(&self, event: PlaybackEvent) {
        self.events.lock().push(event);
    }
}

pub fn secs(s: i64) -> MediaTime {
    MediaTime::from_secs(s)
}

pub fn clip() -> MediaSource {
    MediaSource::local("/media/clip.mp4")
}

/// Two five-second segments.
pub fn segmented_asset() -> AssetInfo {
    AssetInfo::new(secs(10)).with_segments(vec![
        TimeRange::new(secs(0), secs(5)),
        TimeRange::new(secs(5), secs(5)),
    ])
}

/// Captures a seek completion.
#[derive(Clone, Default)]
pub struct SeekProbe(Arc<Mutex<Option<SeekOutcome>>>);

impl SeekProbe {
    pub fn callback(&self) -> impl FnOnce(SeekOutcome) + Send + 'static {
        let slot = self.0.clone();
        move |outcome| *slot.lock() = Some(outcome)
    }

    pub fn outcome(&self) -> Option<SeekOutcome> {
        *self.0.lock()
    }
}

pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub controller: PlaybackController,
    pub events: Arc<EventLog>,
}

impl Harness {
    pub fn new(settings: PlaybackSettings) -> Self {
        let backend = Arc::new(FakeBackend::default());
        let mut controller = PlaybackController::new(backend.clone(), settings).unwrap();
        let events = Arc::new(EventLog::default());
        controller.add_listener(events.clone());
        Self {
            backend,
            controller,
            events,
        }
    }

    pub fn signal(&mut self, signal: BackendSignal) {
        self.controller.handle_signal(signal);
    }

    pub fn status(&mut self, resource: Resource, status: ResourceStatus) {
        self.signal(BackendSignal::StatusChanged { resource, status });
    }

    pub fn engine_and_surface_ready(&mut self) {
        self.status(Resource::Engine, ResourceStatus::ReadyToPlay);
        self.status(Resource::Surface, ResourceStatus::ReadyToPlay);
    }

    /// Request a load and resolve it with `asset`. Returns the installed id.
    pub fn load(&mut self, asset: AssetInfo) -> ItemId {
        self.controller.replace_item(clip());
        let generation = self.backend.last_load().generation;
        self.signal(BackendSignal::AssetLoaded {
            generation,
            outcome: LoadOutcome::Loaded(asset),
        });
        self.backend.current()
    }

    pub fn finish_last_seek(&mut self, finished: bool) {
        let generation = self.backend.last_seek().generation;
        self.signal(BackendSignal::SeekFinished {
            generation,
            finished,
        });
    }

    /// Engine, surface and `asset` all ready, initial seek landed.
    pub fn ready_with(&mut self, asset: AssetInfo) -> ItemId {
        self.engine_and_surface_ready();
        let item = self.load(asset);
        self.status(Resource::Item(item), ResourceStatus::ReadyToPlay);
        self.finish_last_seek(true);
        item
    }

    pub fn ready(&mut self) -> ItemId {
        self.ready_with(AssetInfo::new(secs(10)))
    }

    pub fn take_events(&self) -> Vec<PlaybackEvent> {
        self.events.take()
    }
}
