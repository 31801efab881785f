//! # Playback Settings
//!
//! Tunables for the playback controller. Every field has a serde default so
//! hosts can ship partial settings documents.

use crate::error::{PlaybackError, Result};
use bridge_traits::media::{AudioMix, MediaTime};
use serde::{Deserialize, Serialize};

/// Playback controller settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSettings {
    /// Lower bound for every seek, and the position `seek_to_start` targets.
    ///
    /// Default: zero.
    #[serde(default)]
    pub initial_start: MediaTime,

    /// Restart from `initial_start` when the item reaches its end.
    ///
    /// Default: false.
    #[serde(default)]
    pub looping: bool,

    /// Request playback every time a new item is configured.
    ///
    /// The request is deferred until the player is ready.
    ///
    /// Default: false.
    #[serde(default)]
    pub auto_play: bool,

    /// Period of `TimeUpdate` events while playing.
    ///
    /// Default: one tick (1/600 s).
    #[serde(default = "default_time_update_interval")]
    pub time_update_interval: MediaTime,

    /// Allowed distance before/after the target when seeking.
    ///
    /// Zero requests frame-accurate seeks.
    ///
    /// Default: zero.
    #[serde(default)]
    pub seek_tolerance: MediaTime,

    /// Rate applied when playback starts.
    ///
    /// Default: 1.0.
    #[serde(default = "default_playback_rate")]
    pub playback_rate: f32,

    /// Audio mix attached to items that carry audio.
    ///
    /// Default: none (backend default mix).
    #[serde(default)]
    pub audio_mix: Option<AudioMix>,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            initial_start: MediaTime::ZERO,
            looping: false,
            auto_play: false,
            time_update_interval: default_time_update_interval(),
            seek_tolerance: MediaTime::ZERO,
            playback_rate: default_playback_rate(),
            audio_mix: None,
        }
    }
}

impl PlaybackSettings {
    /// Muted, looping, auto-playing: the usual background-video setup.
    pub fn ambient_loop() -> Self {
        Self {
            looping: true,
            auto_play: true,
            audio_mix: Some(AudioMix::new(0.0)),
            // Nobody renders a scrubber for ambient video
            time_update_interval: MediaTime::from_millis(500),
            ..Default::default()
        }
    }

    /// Trades seek accuracy for latency (half a second either side).
    pub fn coarse_seeking() -> Self {
        Self {
            seek_tolerance: MediaTime::from_millis(500),
            ..Default::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.initial_start.is_negative() {
            return Err(PlaybackError::InvalidSettings(
                "initial_start cannot be negative".to_string(),
            ));
        }

        if self.time_update_interval <= MediaTime::ZERO {
            return Err(PlaybackError::InvalidSettings(
                "time_update_interval must be > 0".to_string(),
            ));
        }

        if self.seek_tolerance.is_negative() {
            return Err(PlaybackError::InvalidSettings(
                "seek_tolerance cannot be negative".to_string(),
            ));
        }

        if !self.playback_rate.is_finite() || self.playback_rate <= 0.0 {
            return Err(PlaybackError::InvalidSettings(
                "playback_rate must be a positive number".to_string(),
            ));
        }

        if let Some(mix) = self.audio_mix {
            if !(0.0..=1.0).contains(&mix.volume) {
                return Err(PlaybackError::InvalidSettings(
                    "audio_mix volume must be between 0.0 and 1.0".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn default_time_update_interval() -> MediaTime {
    MediaTime::from_ticks(1)
}

fn default_playback_rate() -> f32 {
    1.0
}
