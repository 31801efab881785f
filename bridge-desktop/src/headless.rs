//! Headless Media Backend
//!
//! A clock-driven stand-in for a platform media session. Nothing is decoded:
//! assets are looked up in a catalog registered up front, the playhead is a
//! linear function of the Tokio clock and the playback rate, and every
//! asynchronous result is reported through the [`SignalSink`] like a real
//! session would. With a paused Tokio clock the whole thing is
//! deterministic, which is what the integration tests rely on.

use bridge_traits::{
    backend::{
        BackendSignal, LoadOutcome, LoadRequest, MediaBackend, ObserverToken, Resource,
        ResourceStatus, SeekRequest, SignalSink,
    },
    error::{BridgeError, Result},
    media::{AssetInfo, AudioMix, ItemId, MediaSource, MediaTime},
    surface::RenderSurface,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Delay between `load_asset` and the matching `AssetLoaded` signal.
pub const DEFAULT_LOAD_LATENCY: Duration = Duration::from_millis(50);

/// Delay between `seek` and the matching `SeekFinished` signal.
pub const DEFAULT_SEEK_LATENCY: Duration = Duration::from_millis(10);

/// Simulated playback session.
pub struct HeadlessBackend {
    inner: Arc<Inner>,
}

struct Inner {
    sink: Arc<dyn SignalSink>,
    load_latency: Duration,
    seek_latency: Duration,
    state: Mutex<State>,
}

struct CurrentItem {
    id: ItemId,
    duration: MediaTime,
}

struct State {
    catalog: HashMap<String, AssetInfo>,
    current: Option<CurrentItem>,
    end_observed: HashSet<ItemId>,
    rate: f32,
    anchor: MediaTime,
    anchor_at: Instant,
    // Bumped whenever a scheduled end-of-item check may have gone stale
    epoch: u64,
    observers: HashMap<u64, JoinHandle<()>>,
    next_token: u64,
    seek_in_flight: Option<(u64, JoinHandle<()>)>,
    error: Option<String>,
    audio_mixes: HashMap<ItemId, AudioMix>,
    surface: Option<Arc<dyn RenderSurface>>,
    prerolls: Vec<f32>,
}

impl State {
    fn position(&self, now: Instant) -> MediaTime {
        let Some(item) = &self.current else {
            return MediaTime::ZERO;
        };
        let elapsed = now.saturating_duration_since(self.anchor_at);
        let advanced = MediaTime::from_secs_f64(elapsed.as_secs_f64() * f64::from(self.rate));
        (self.anchor + advanced).clamp_to(MediaTime::ZERO, item.duration)
    }

    fn rebase(&mut self, now: Instant) {
        self.anchor = self.position(now);
        self.anchor_at = now;
    }

    /// Forget the current item along with its mix and end registration.
    fn release_current(&mut self) {
        if let Some(previous) = self.current.take() {
            self.audio_mixes.remove(&previous.id);
            self.end_observed.remove(&previous.id);
        }
    }

    fn take_seek(&mut self) -> Option<u64> {
        self.seek_in_flight.take().map(|(generation, task)| {
            task.abort();
            generation
        })
    }
}

impl HeadlessBackend {
    /// Create a session reporting to `sink`, with default latencies.
    ///
    /// The engine reports ready immediately.
    pub fn new(sink: Arc<dyn SignalSink>) -> Self {
        Self::with_latency(sink, DEFAULT_LOAD_LATENCY, DEFAULT_SEEK_LATENCY)
    }

    pub fn with_latency(
        sink: Arc<dyn SignalSink>,
        load_latency: Duration,
        seek_latency: Duration,
    ) -> Self {
        let inner = Arc::new(Inner {
            sink,
            load_latency,
            seek_latency,
            state: Mutex::new(State {
                catalog: HashMap::new(),
                current: None,
                end_observed: HashSet::new(),
                rate: 0.0,
                anchor: MediaTime::ZERO,
                anchor_at: Instant::now(),
                epoch: 0,
                observers: HashMap::new(),
                next_token: 0,
                seek_in_flight: None,
                error: None,
                audio_mixes: HashMap::new(),
                surface: None,
                prerolls: Vec::new(),
            }),
        });

        inner.deliver(BackendSignal::StatusChanged {
            resource: Resource::Engine,
            status: ResourceStatus::ReadyToPlay,
        });
        Self { inner }
    }

    /// Make `source` loadable with the given metadata.
    pub fn register_asset(&self, source: &MediaSource, asset: AssetInfo) {
        debug!(source = %source.location(), duration = %asset.duration, "Registered asset");
        self.inner
            .state
            .lock()
            .catalog
            .insert(source.location(), asset);
    }

    /// Simulate a session-level error (or clear it).
    pub fn set_error(&self, error: Option<String>) {
        self.inner.state.lock().error = error;
    }

    /// Push an arbitrary status change, e.g. a surface losing its output.
    pub fn report_status(&self, resource: Resource, status: ResourceStatus) {
        self.inner
            .deliver(BackendSignal::StatusChanged { resource, status });
    }

    pub fn current_item(&self) -> Option<ItemId> {
        self.inner.state.lock().current.as_ref().map(|item| item.id)
    }

    pub fn active_time_observers(&self) -> usize {
        self.inner.state.lock().observers.len()
    }

    pub fn observed_items(&self) -> usize {
        self.inner.state.lock().end_observed.len()
    }

    pub fn audio_mix(&self, item: ItemId) -> Option<AudioMix> {
        self.inner.state.lock().audio_mixes.get(&item).copied()
    }

    /// Rates passed to every preroll hint so far.
    pub fn prerolls(&self) -> Vec<f32> {
        self.inner.state.lock().prerolls.clone()
    }

    pub fn has_surface(&self) -> bool {
        self.inner.state.lock().surface.is_some()
    }
}

impl Inner {
    fn deliver(&self, signal: BackendSignal) {
        if !self.sink.deliver(signal) {
            trace!("Signal sink closed; dropping signal");
        }
    }

    /// Re-arm the end-of-item timer for the current position and rate.
    fn schedule_end(self: &Arc<Self>, state: &mut State) {
        state.epoch += 1;
        let epoch = state.epoch;

        let Some(item) = &state.current else {
            return;
        };
        if state.rate <= 0.0
            || state.seek_in_flight.is_some()
            || !state.end_observed.contains(&item.id)
        {
            return;
        }

        let id = item.id;
        let remaining = item.duration.saturating_sub(state.position(Instant::now()));
        let wait = remaining.as_duration().div_f32(state.rate);
        let weak = Arc::downgrade(self);

        tokio::spawn(async move {
            time::sleep(wait).await;
            if let Some(inner) = weak.upgrade() {
                inner.reach_end(epoch, id);
            }
        });
    }

    fn reach_end(&self, epoch: u64, id: ItemId) {
        {
            let mut state = self.state.lock();
            if state.epoch != epoch {
                return;
            }
            let Some(duration) = state.current.as_ref().map(|item| item.duration) else {
                return;
            };
            state.anchor = duration;
            state.anchor_at = Instant::now();
        }
        trace!(item = %id, "Item reached end");
        self.deliver(BackendSignal::ItemReachedEnd { item: id });
    }

    fn finish_seek(self: &Arc<Self>, generation: u64, target: MediaTime) {
        {
            let mut state = self.state.lock();
            match &state.seek_in_flight {
                Some((current, _)) if *current == generation => {}
                _ => return,
            }
            state.seek_in_flight = None;

            let duration = state
                .current
                .as_ref()
                .map_or(MediaTime::ZERO, |item| item.duration);
            state.anchor = target.clamp_to(MediaTime::ZERO, duration);
            state.anchor_at = Instant::now();
            self.schedule_end(&mut state);
        }
        self.deliver(BackendSignal::SeekFinished {
            generation,
            finished: true,
        });
    }

    fn tick(&self, token: ObserverToken) {
        let time = {
            let state = self.state.lock();
            if state.rate <= 0.0 || state.current.is_none() {
                return;
            }
            state.position(Instant::now())
        };
        self.deliver(BackendSignal::TimeTick { token, time });
    }
}

impl MediaBackend for HeadlessBackend {
    fn load_asset(&self, request: LoadRequest) {
        let outcome = match self.inner.state.lock().catalog.get(&request.source.location()) {
            Some(asset) => LoadOutcome::Loaded(asset.clone()),
            None => LoadOutcome::Failed {
                reason: format!("no asset registered for {}", request.source.location()),
            },
        };

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let latency = self.inner.load_latency;
        let generation = request.generation;
        tokio::spawn(async move {
            time::sleep(latency).await;
            if let Some(inner) = weak.upgrade() {
                inner.deliver(BackendSignal::AssetLoaded {
                    generation,
                    outcome,
                });
            }
        });
    }

    fn replace_current_item(&self, item: ItemId, source: &MediaSource) -> Result<()> {
        let interrupted = {
            let mut state = self.inner.state.lock();
            let duration = state
                .catalog
                .get(&source.location())
                .map(|asset| asset.duration)
                .ok_or_else(|| BridgeError::UnknownItem(source.location()))?;

            let interrupted = state.take_seek();
            state.release_current();
            state.current = Some(CurrentItem { id: item, duration });
            state.anchor = MediaTime::ZERO;
            state.anchor_at = Instant::now();
            self.inner.schedule_end(&mut state);
            interrupted
        };

        if let Some(generation) = interrupted {
            self.inner.deliver(BackendSignal::SeekFinished {
                generation,
                finished: false,
            });
        }
        self.inner.deliver(BackendSignal::StatusChanged {
            resource: Resource::Item(item),
            status: ResourceStatus::ReadyToPlay,
        });
        Ok(())
    }

    fn clear_current_item(&self) {
        let mut state = self.inner.state.lock();
        state.release_current();
        state.epoch += 1;
    }

    fn observe_item_end(&self, item: ItemId) -> Result<()> {
        let mut state = self.inner.state.lock();
        if state.current.as_ref().map(|current| current.id) != Some(item) {
            return Err(BridgeError::UnknownItem(item.to_string()));
        }
        state.end_observed.insert(item);
        self.inner.schedule_end(&mut state);
        Ok(())
    }

    fn stop_observing_item_end(&self, item: ItemId) {
        let mut state = self.inner.state.lock();
        state.end_observed.remove(&item);
        self.inner.schedule_end(&mut state);
    }

    fn attach_audio_mix(&self, item: ItemId, mix: AudioMix) -> Result<()> {
        let mut state = self.inner.state.lock();
        if state.current.as_ref().map(|current| current.id) != Some(item) {
            return Err(BridgeError::UnknownItem(item.to_string()));
        }
        state.audio_mixes.insert(item, mix);
        Ok(())
    }

    fn attach_surface(&self, surface: Arc<dyn RenderSurface>) -> Result<()> {
        debug!(surface = %surface.id(), "Surface attached");
        self.inner.state.lock().surface = Some(surface);
        self.inner.deliver(BackendSignal::StatusChanged {
            resource: Resource::Surface,
            status: ResourceStatus::ReadyToPlay,
        });
        Ok(())
    }

    fn rate(&self) -> f32 {
        self.inner.state.lock().rate
    }

    fn set_rate(&self, rate: f32) {
        let mut state = self.inner.state.lock();
        state.rebase(Instant::now());
        state.rate = rate.max(0.0);
        self.inner.schedule_end(&mut state);
    }

    fn error(&self) -> Option<String> {
        self.inner.state.lock().error.clone()
    }

    fn current_time(&self) -> MediaTime {
        self.inner.state.lock().position(Instant::now())
    }

    fn seek(&self, request: SeekRequest) {
        let SeekRequest {
            generation, target, ..
        } = request;

        let interrupted = {
            let mut state = self.inner.state.lock();
            if state.current.is_none() {
                drop(state);
                self.inner.deliver(BackendSignal::SeekFinished {
                    generation,
                    finished: false,
                });
                return;
            }

            let interrupted = state.take_seek();
            // Invalidate any pending end-of-item timer until the seek lands
            state.epoch += 1;

            let weak = Arc::downgrade(&self.inner);
            let latency = self.inner.seek_latency;
            let task = tokio::spawn(async move {
                time::sleep(latency).await;
                if let Some(inner) = weak.upgrade() {
                    inner.finish_seek(generation, target);
                }
            });
            state.seek_in_flight = Some((generation, task));
            interrupted
        };

        if let Some(previous) = interrupted {
            self.inner.deliver(BackendSignal::SeekFinished {
                generation: previous,
                finished: false,
            });
        }
    }

    fn add_periodic_time_observer(&self, interval: MediaTime) -> ObserverToken {
        let mut state = self.inner.state.lock();
        state.next_token += 1;
        let token = ObserverToken(state.next_token);

        let period = interval.as_duration().max(Duration::from_millis(1));
        let weak = Arc::downgrade(&self.inner);
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match weak.upgrade() {
                    Some(inner) => inner.tick(token),
                    None => break,
                }
            }
        });

        state.observers.insert(token.0, task);
        token
    }

    fn remove_periodic_time_observer(&self, token: ObserverToken) {
        if let Some(task) = self.inner.state.lock().observers.remove(&token.0) {
            task.abort();
        }
    }

    fn preroll(&self, rate: f32) {
        trace!(rate, "Preroll requested");
        self.inner.state.lock().prerolls.push(rate);
    }
}

impl Drop for HeadlessBackend {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        for (_, task) in state.observers.drain() {
            task.abort();
        }
        state.take_seek();
    }
}
