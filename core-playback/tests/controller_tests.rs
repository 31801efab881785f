//! Controller state-machine tests against a recording backend.
//!
//! Every backend signal is delivered by hand, so each test controls exactly
//! when loads, seeks and status changes complete.

mod common;

use bridge_traits::backend::{BackendSignal, LoadOutcome, ObserverToken, Resource, ResourceStatus};
use bridge_traits::lifecycle::LifecycleState;
use bridge_traits::media::{AssetInfo, AudioMix, MediaTime};
use common::{secs, segmented_asset, EventLog, Harness, SeekProbe};
use core_playback::{PlaybackController, PlaybackError, PlaybackListener, PlaybackSettings};
use core_runtime::events::PlaybackEvent;
use std::sync::Arc;

fn looping() -> PlaybackSettings {
    PlaybackSettings {
        looping: true,
        ..Default::default()
    }
}

// ============================================================================
// Transport
// ============================================================================

#[test]
fn play_and_pause_are_idempotent() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();
    h.take_events();

    h.controller.play();
    h.controller.play();
    assert!(h.controller.is_playing());
    assert_eq!(h.take_events(), vec![PlaybackEvent::Started]);

    h.controller.pause();
    h.controller.pause();
    assert!(!h.controller.is_playing());
    assert_eq!(h.take_events(), vec![PlaybackEvent::Paused]);

    h.controller.play();
    h.controller.pause();
    h.controller.play();
    assert!(h.controller.is_playing());
    assert_eq!(
        h.take_events(),
        vec![PlaybackEvent::Started, PlaybackEvent::Paused, PlaybackEvent::Started]
    );
}

#[test]
fn play_before_ready_starts_exactly_once() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.controller.play();
    assert!(h.controller.needs_auto_start());
    assert!(!h.controller.is_playing());
    assert!(h.take_events().is_empty());

    h.ready();
    assert!(h.controller.is_playing());
    assert!(!h.controller.needs_auto_start());
    assert_eq!(
        h.take_events(),
        vec![PlaybackEvent::ReadyForPlay, PlaybackEvent::Started]
    );
    assert_eq!(h.backend.state().rate_calls, vec![1.0]);

    // Losing and regaining readiness does not start again
    h.status(Resource::Surface, ResourceStatus::Unknown);
    h.status(Resource::Surface, ResourceStatus::ReadyToPlay);
    assert_eq!(h.take_events(), vec![PlaybackEvent::ReadyForPlay]);
    assert_eq!(h.backend.state().rate_calls, vec![1.0]);
}

#[test]
fn pause_cancels_deferred_play() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.controller.play();
    h.controller.pause();
    assert!(!h.controller.needs_auto_start());

    h.ready();
    assert!(!h.controller.is_playing());
    assert_eq!(h.take_events(), vec![PlaybackEvent::ReadyForPlay]);
}

#[test]
fn backend_error_means_not_playing() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();
    h.controller.play();
    assert!(h.controller.is_playing());

    h.backend.state().error = Some("decoder crashed".into());
    assert!(!h.controller.is_playing());
    assert!(!h.controller.snapshot().playing);
}

#[test]
fn custom_playback_rate_is_applied() {
    let mut h = Harness::new(PlaybackSettings {
        playback_rate: 2.0,
        ..Default::default()
    });
    h.ready();
    h.controller.play();
    assert_eq!(h.backend.state().rate, 2.0);
}

#[test]
fn raising_a_slow_rate_is_not_a_new_start() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();
    h.backend.state().rate = 0.5;
    h.take_events();

    h.controller.play();
    assert_eq!(h.backend.state().rate, 1.0);
    assert!(h.take_events().is_empty());
}

#[test]
fn invalid_settings_are_rejected() {
    let backend = Arc::new(common::FakeBackend::default());
    let err = PlaybackController::new(
        backend,
        PlaybackSettings {
            playback_rate: 0.0,
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, PlaybackError::InvalidSettings(_)));
}

// ============================================================================
// Readiness
// ============================================================================

#[test]
fn ready_requires_engine_item_and_surface() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.status(Resource::Engine, ResourceStatus::ReadyToPlay);
    let item = h.load(AssetInfo::new(secs(10)));
    h.status(Resource::Item(item), ResourceStatus::ReadyToPlay);
    assert!(!h.controller.is_ready());

    h.status(Resource::Surface, ResourceStatus::ReadyToPlay);
    assert!(h.controller.is_ready());
    assert_eq!(h.take_events(), vec![PlaybackEvent::ReadyForPlay]);

    h.status(
        Resource::Engine,
        ResourceStatus::Failed {
            reason: "lost".into(),
        },
    );
    assert!(!h.controller.is_ready());
}

#[test]
fn status_of_replaced_item_is_ignored() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.engine_and_surface_ready();
    let first = h.load(AssetInfo::new(secs(10)));
    let second = h.load(AssetInfo::new(secs(20)));
    assert_ne!(first, second);

    h.status(Resource::Item(first), ResourceStatus::ReadyToPlay);
    assert!(!h.controller.is_ready());
    h.status(Resource::Item(second), ResourceStatus::ReadyToPlay);
    assert!(h.controller.is_ready());
}

// ============================================================================
// Items
// ============================================================================

#[test]
fn superseded_load_is_ignored() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.controller.replace_item(common::clip());
    let stale = h.backend.last_load().generation;
    h.controller.replace_item("https://cdn.example.com/b.mp4".parse().unwrap());
    let fresh = h.backend.last_load().generation;

    h.signal(BackendSignal::AssetLoaded {
        generation: stale,
        outcome: LoadOutcome::Loaded(AssetInfo::new(secs(5))),
    });
    assert!(h.controller.current_item().is_none());

    h.signal(BackendSignal::AssetLoaded {
        generation: fresh,
        outcome: LoadOutcome::Loaded(AssetInfo::new(secs(8))),
    });
    let item = h.controller.current_item().unwrap();
    assert_eq!(item.duration(), secs(8));
    assert!(item.source().is_remote());
}

#[test]
fn failed_load_leaves_player_not_ready() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.engine_and_surface_ready();
    h.controller.replace_item(common::clip());
    let generation = h.backend.last_load().generation;
    h.signal(BackendSignal::AssetLoaded {
        generation,
        outcome: LoadOutcome::Failed {
            reason: "404".into(),
        },
    });

    assert!(h.controller.current_item().is_none());
    assert!(!h.controller.is_ready());
    assert!(h.backend.state().current.is_none());
}

#[test]
fn rejected_item_is_not_installed() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.backend.state().reject_items = true;
    h.controller.replace_item(common::clip());
    let generation = h.backend.last_load().generation;
    h.signal(BackendSignal::AssetLoaded {
        generation,
        outcome: LoadOutcome::Loaded(AssetInfo::new(secs(5))),
    });

    assert!(h.controller.current_item().is_none());
    assert!(h.backend.state().end_observed.is_empty());
}

#[test]
fn rejected_item_stops_the_previous_one() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();
    h.controller.play();
    h.take_events();

    h.backend.state().reject_items = true;
    h.controller.replace_item(common::clip());
    let generation = h.backend.last_load().generation;
    h.signal(BackendSignal::AssetLoaded {
        generation,
        outcome: LoadOutcome::Loaded(AssetInfo::new(secs(5))),
    });

    assert_eq!(h.take_events(), vec![PlaybackEvent::Paused]);
    let snapshot = h.controller.snapshot();
    assert!(!snapshot.playing);
    assert!(!snapshot.ready);
    assert!(snapshot.item.is_none());

    let state = h.backend.state();
    assert!(state.current.is_none());
    assert_eq!(state.cleared, 1);
    assert!(state.end_observed.is_empty());
    assert!(state.observers.is_empty());
}

#[test]
fn replacing_item_keeps_one_registration_of_each_kind() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();
    assert_eq!(h.backend.state().observers.len(), 1);
    assert_eq!(h.backend.state().end_observed.len(), 1);

    for duration in [20, 30, 40] {
        let item = h.load(AssetInfo::new(secs(duration)));
        h.status(Resource::Item(item), ResourceStatus::ReadyToPlay);
        h.finish_last_seek(true);

        let state = h.backend.state();
        assert_eq!(state.observers.len(), 1);
        assert_eq!(state.end_observed.len(), 1);
        assert!(state.end_observed.contains(&item));
    }
}

#[test]
fn dropping_controller_releases_registrations() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();
    let backend = h.backend.clone();
    drop(h);

    let state = backend.state();
    assert!(state.observers.is_empty());
    assert!(state.end_observed.is_empty());
    assert_eq!(state.cleared, 1);
}

#[test]
fn install_drains_pending_seeks() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();
    let probe = SeekProbe::default();
    h.controller.seek(secs(4), probe.callback());
    assert!(probe.outcome().is_none());

    h.load(AssetInfo::new(secs(20)));
    assert_eq!(
        probe.outcome().map(|outcome| outcome.finished),
        Some(false)
    );
}

#[test]
fn audio_mix_attached_only_for_audio_assets() {
    let mix = AudioMix::new(0.25);
    let mut h = Harness::new(PlaybackSettings {
        audio_mix: Some(mix),
        ..Default::default()
    });

    h.load(AssetInfo::new(secs(5)));
    assert!(h.backend.state().audio_mixes.is_empty());

    let item = h.load(AssetInfo::new(secs(5)).with_audio(true));
    assert_eq!(h.backend.state().audio_mixes, vec![(item, mix)]);
}

#[test]
fn auto_play_starts_each_new_item() {
    let mut h = Harness::new(PlaybackSettings {
        auto_play: true,
        ..Default::default()
    });
    h.ready();
    assert!(h.controller.is_playing());
    assert_eq!(
        h.take_events(),
        vec![PlaybackEvent::ReadyForPlay, PlaybackEvent::Started]
    );
}

// ============================================================================
// Seeking
// ============================================================================

#[test]
fn seek_clamps_into_playable_range() {
    let mut h = Harness::new(PlaybackSettings {
        initial_start: secs(2),
        ..Default::default()
    });
    h.ready();

    for (requested, expected) in [(-5, 2), (0, 2), (5, 5), (10, 10), (50, 10)] {
        let probe = SeekProbe::default();
        h.controller.seek(secs(requested), probe.callback());
        assert_eq!(h.backend.last_seek().target, secs(expected));

        h.finish_last_seek(true);
        let outcome = probe.outcome().unwrap();
        assert_eq!(outcome.target, secs(expected));
        assert!(outcome.finished);
    }
}

#[test]
fn seek_uses_configured_tolerance() {
    let mut h = Harness::new(PlaybackSettings::coarse_seeking());
    h.ready();
    h.controller.seek(secs(3), |_| {});

    let request = h.backend.last_seek();
    assert_eq!(request.tolerance_before, MediaTime::from_millis(500));
    assert_eq!(request.tolerance_after, MediaTime::from_millis(500));
}

#[test]
fn seek_without_item_completes_unfinished() {
    let mut h = Harness::new(PlaybackSettings::default());
    let probe = SeekProbe::default();
    h.controller.seek(secs(3), probe.callback());

    assert!(!probe.outcome().unwrap().finished);
    assert!(h.backend.state().seeks.is_empty());
}

#[test]
fn only_latest_seek_reattaches_time_observer() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();
    assert!(h.controller.time_observer_token().is_some());

    let first = SeekProbe::default();
    let second = SeekProbe::default();
    h.controller.seek(secs(3), first.callback());
    let first_generation = h.backend.last_seek().generation;
    assert!(h.controller.time_observer_token().is_none());
    h.controller.seek(secs(6), second.callback());

    h.signal(BackendSignal::SeekFinished {
        generation: first_generation,
        finished: false,
    });
    assert!(!first.outcome().unwrap().finished);
    assert!(h.controller.time_observer_token().is_none());

    h.finish_last_seek(true);
    assert!(second.outcome().unwrap().finished);
    assert!(h.controller.time_observer_token().is_some());
    assert_eq!(h.backend.state().observers.len(), 1);
}

#[test]
fn seek_into_new_segment_prerolls_while_stopped() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready_with(segmented_asset());
    assert_eq!(h.controller.current_segment_index(), 0);

    h.controller.seek(secs(2), |_| {});
    h.finish_last_seek(true);
    assert!(h.backend.state().prerolls.is_empty());

    h.controller.seek(secs(7), |_| {});
    h.finish_last_seek(true);
    assert_eq!(h.backend.state().prerolls, vec![1.0]);
    assert_eq!(h.controller.current_segment_index(), 1);

    // No preroll while playing or when the seek did not finish
    h.controller.play();
    h.controller.seek(secs(1), |_| {});
    h.finish_last_seek(true);
    h.controller.pause();
    h.controller.seek(secs(1), |_| {});
    h.finish_last_seek(false);
    assert_eq!(h.backend.state().prerolls.len(), 1);
    assert_eq!(h.controller.current_segment_index(), 1);
}

// ============================================================================
// Time updates
// ============================================================================

#[test]
fn ticks_from_attached_observer_become_time_updates() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();
    h.take_events();
    let token = h.controller.time_observer_token().unwrap();

    h.signal(BackendSignal::TimeTick {
        token,
        time: secs(1),
    });
    h.signal(BackendSignal::TimeTick {
        token: ObserverToken(token.0 + 100),
        time: secs(2),
    });
    assert_eq!(
        h.take_events(),
        vec![PlaybackEvent::TimeUpdate { time: secs(1) }]
    );

    // Detached during a seek
    h.controller.seek(secs(5), |_| {});
    h.signal(BackendSignal::TimeTick {
        token,
        time: secs(3),
    });
    assert!(h.take_events().is_empty());
}

// ============================================================================
// End of item
// ============================================================================

#[test]
fn end_with_looping_restarts() {
    let mut h = Harness::new(looping());
    let item = h.ready();
    h.controller.play();
    h.take_events();

    h.signal(BackendSignal::ItemReachedEnd { item });
    assert_eq!(
        h.take_events(),
        vec![PlaybackEvent::Ended, PlaybackEvent::Restarted]
    );
    assert!(h.controller.is_playing());
    assert_eq!(h.backend.last_seek().target, MediaTime::ZERO);
}

#[test]
fn loop_restart_waits_for_readiness() {
    let mut h = Harness::new(looping());
    let item = h.ready();
    h.controller.play();
    h.status(Resource::Surface, ResourceStatus::Unknown);
    h.take_events();

    h.signal(BackendSignal::ItemReachedEnd { item });
    assert_eq!(
        h.take_events(),
        vec![PlaybackEvent::Ended, PlaybackEvent::Restarted]
    );
    assert!(!h.controller.is_playing());
    assert!(h.controller.needs_auto_start());
    assert_eq!(h.backend.state().rate, 0.0);

    h.status(Resource::Surface, ResourceStatus::ReadyToPlay);
    assert_eq!(
        h.take_events(),
        vec![PlaybackEvent::ReadyForPlay, PlaybackEvent::Started]
    );
    assert!(h.controller.is_playing());
    assert!(!h.controller.needs_auto_start());
}

#[test]
fn end_without_looping_stops_at_start() {
    let mut h = Harness::new(PlaybackSettings {
        initial_start: secs(1),
        ..Default::default()
    });
    let item = h.ready();
    h.controller.play();
    h.take_events();

    h.signal(BackendSignal::ItemReachedEnd { item });
    assert_eq!(h.take_events(), vec![PlaybackEvent::Ended]);
    assert!(!h.controller.is_playing());
    assert_eq!(h.backend.state().time, secs(1));
}

#[test]
fn looping_can_be_toggled_at_runtime() {
    let mut h = Harness::new(PlaybackSettings::default());
    let item = h.ready();
    h.controller.set_looping(true);
    h.controller.play();
    h.take_events();

    h.signal(BackendSignal::ItemReachedEnd { item });
    assert_eq!(
        h.take_events(),
        vec![PlaybackEvent::Ended, PlaybackEvent::Restarted]
    );

    h.controller.set_looping(false);
    h.signal(BackendSignal::ItemReachedEnd { item });
    assert_eq!(h.take_events(), vec![PlaybackEvent::Ended]);
}

#[test]
fn end_of_replaced_item_is_ignored() {
    let mut h = Harness::new(looping());
    let old = h.ready();
    h.load(AssetInfo::new(secs(20)));
    h.take_events();

    h.signal(BackendSignal::ItemReachedEnd { item: old });
    assert!(h.take_events().is_empty());
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn background_interrupts_and_foreground_resumes() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();
    h.controller.play();
    h.take_events();

    h.controller.handle_lifecycle(LifecycleState::Background);
    assert!(h.controller.is_interrupted());
    assert!(!h.controller.is_playing());
    assert_eq!(h.take_events(), vec![PlaybackEvent::Paused]);

    h.controller.handle_lifecycle(LifecycleState::Foreground);
    assert!(!h.controller.is_interrupted());
    assert!(h.controller.is_playing());
    assert_eq!(h.take_events(), vec![PlaybackEvent::Started]);
}

#[test]
fn lifecycle_is_inert_when_not_playing() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();
    h.take_events();

    h.controller.handle_lifecycle(LifecycleState::Suspended);
    assert!(!h.controller.is_interrupted());
    h.controller.handle_lifecycle(LifecycleState::Foreground);
    assert!(!h.controller.is_playing());
    assert!(h.take_events().is_empty());
}

#[test]
fn suspension_counts_as_background() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();
    h.controller.play();

    h.controller.handle_lifecycle(LifecycleState::Suspended);
    assert!(h.controller.is_interrupted());
    h.controller.handle_lifecycle(LifecycleState::Foreground);
    assert!(h.controller.is_playing());
}

// ============================================================================
// Listeners
// ============================================================================

#[test]
fn dropped_listener_stops_receiving() {
    let mut h = Harness::new(PlaybackSettings::default());
    h.ready();

    let extra = Arc::new(EventLog::default());
    assert!(h.controller.add_listener(extra.clone()));
    assert!(!h.controller.add_listener(extra.clone()));

    h.controller.play();
    assert_eq!(extra.take(), vec![PlaybackEvent::Started]);

    let as_dyn: Arc<dyn PlaybackListener> = extra.clone();
    assert!(h.controller.remove_listener(&as_dyn));
    h.controller.pause();
    assert!(extra.take().is_empty());

    drop(as_dyn);
    drop(extra);
    h.controller.play();
    assert_eq!(
        h.take_events().last(),
        Some(&PlaybackEvent::Started)
    );
}

#[test]
fn snapshot_reflects_state() {
    let mut h = Harness::new(looping());
    let item = h.ready_with(segmented_asset());
    h.controller.play();

    let snapshot = h.controller.snapshot();
    assert!(snapshot.ready);
    assert!(snapshot.playing);
    assert!(snapshot.looping);
    assert!(!snapshot.interrupted);
    assert_eq!(snapshot.item, Some(item));
    assert_eq!(snapshot.duration, Some(secs(10)));
    assert_eq!(snapshot.current_segment_index, 0);
}
