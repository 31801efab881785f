//! # Ambient Loop Demo
//!
//! Plays a simulated clip on the headless desktop backend: the view is
//! configured, auto-play kicks in once everything is ready, the clip loops
//! twice, the app is backgrounded and foregrounded, and the runtime shuts
//! down.
//!
//! Run with: `cargo run --example playback_demo --package core-playback`

use anyhow::{Context, Result};
use bridge_desktop::{DesktopLifecycleObserver, HeadlessBackend, OffscreenSurface};
use bridge_traits::lifecycle::LifecycleState;
use bridge_traits::media::{AssetInfo, MediaSource, MediaTime, TimeRange};
use bridge_traits::surface::Rect;
use bridge_traits::{ConsoleLogger, LogLevel};
use core_playback::{DispatchQueue, PlaybackRuntime, PlaybackSettings, PlaybackView};
use core_runtime::config::CoreConfig;
use core_runtime::events::PlaybackEvent;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::sync::Arc;
use std::time::Duration;

const CLIP: &str = "https://cdn.example.com/ambient/hero.mp4?token=secret";

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug)
            .with_logger_sink(Arc::new(ConsoleLogger {
                min_level: LogLevel::Warn,
            })),
    )
    .context("failed to initialize logging")?;

    println!("=== Ambient loop demo ===\n");

    let queue = DispatchQueue::new();
    let backend = Arc::new(HeadlessBackend::new(queue.sink()));
    let source: MediaSource = CLIP.parse()?;
    backend.register_asset(
        &source,
        AssetInfo::new(MediaTime::from_secs(3)).with_segments(vec![
            TimeRange::new(MediaTime::ZERO, MediaTime::from_millis(1500)),
            TimeRange::new(MediaTime::from_millis(1500), MediaTime::from_millis(1500)),
        ]),
    );
    let lifecycle = DesktopLifecycleObserver::new();

    let config = CoreConfig::builder()
        .media_backend(backend.clone())
        .lifecycle_observer(Arc::new(lifecycle.clone()))
        .build()?;
    let runtime = PlaybackRuntime::new(config, PlaybackSettings::ambient_loop(), queue)?;
    let handle = runtime.handle();
    let task = tokio::spawn(runtime.run());

    let mut events = handle.subscribe();
    let view = PlaybackView::new(handle.clone(), Arc::new(OffscreenSurface::new())).await?;
    view.layout(Rect::new(0.0, 0.0, 1280.0, 720.0));
    view.configure(CLIP)?;

    let mut restarts = 0;
    while restarts < 2 {
        match events.recv().await? {
            PlaybackEvent::TimeUpdate { time } => println!("  position {time}"),
            PlaybackEvent::Restarted => {
                restarts += 1;
                println!("→ {} (loop {restarts})", PlaybackEvent::Restarted.description());
            }
            event => println!("→ {}", event.description()),
        }
    }

    println!("\nBackgrounding the app...");
    lifecycle.set_state(LifecycleState::Background);
    tokio::time::sleep(Duration::from_millis(200)).await;
    let snapshot = handle.snapshot().await?;
    println!("  playing={} interrupted={}", snapshot.playing, snapshot.interrupted);

    println!("Returning to the foreground...");
    lifecycle.set_state(LifecycleState::Foreground);
    tokio::time::sleep(Duration::from_millis(200)).await;
    let snapshot = handle.snapshot().await?;
    println!("  playing={} interrupted={}", snapshot.playing, snapshot.interrupted);
    println!("\n{}", serde_json::to_string_pretty(&snapshot)?);

    handle.shutdown();
    task.await?;
    println!(
        "\nRuntime stopped; {} time observer(s) left on the backend",
        backend.active_time_observers()
    );

    Ok(())
}
