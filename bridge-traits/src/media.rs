//! Media value types shared between the core and backend adapters.
//!
//! Time is tracked in integer ticks of [`TIMESCALE`] per second so that
//! clamping, segment lookup and tick comparison never suffer from float
//! rounding. Adapters convert to their native representation at the edge.

use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, Sub};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Ticks per second for [`MediaTime`].
pub const TIMESCALE: i64 = 600;

/// A point on (or length of) a media timeline, in 1/600 s ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaTime(i64);

impl MediaTime {
    pub const ZERO: MediaTime = MediaTime(0);

    pub const fn from_ticks(ticks: i64) -> Self {
        Self(ticks)
    }

    pub const fn ticks(self) -> i64 {
        self.0
    }

    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * TIMESCALE)
    }

    pub const fn from_millis(millis: i64) -> Self {
        Self(millis * TIMESCALE / 1000)
    }

    /// Rounds to the nearest tick.
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * TIMESCALE as f64).round() as i64)
    }

    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / TIMESCALE as f64
    }

    pub fn from_duration(duration: Duration) -> Self {
        Self::from_secs_f64(duration.as_secs_f64())
    }

    /// Negative times saturate to zero.
    pub fn as_duration(self) -> Duration {
        Duration::from_secs_f64(self.as_secs_f64().max(0.0))
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn saturating_sub(self, other: MediaTime) -> MediaTime {
        MediaTime(self.0.saturating_sub(other.0))
    }

    /// Clamp into `[lower, upper]`.
    ///
    /// Unlike [`Ord::clamp`] this never panics: when `upper < lower` the
    /// lower bound wins.
    pub fn clamp_to(self, lower: MediaTime, upper: MediaTime) -> MediaTime {
        if self <= lower || upper < lower {
            lower
        } else if self >= upper {
            upper
        } else {
            self
        }
    }
}

impl Add for MediaTime {
    type Output = MediaTime;

    fn add(self, rhs: MediaTime) -> MediaTime {
        MediaTime(self.0.saturating_add(rhs.0))
    }
}

impl Sub for MediaTime {
    type Output = MediaTime;

    fn sub(self, rhs: MediaTime) -> MediaTime {
        MediaTime(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for MediaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_secs_f64())
    }
}

/// Half-open interval `[start, start + duration)` on an item timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: MediaTime,
    pub duration: MediaTime,
}

impl TimeRange {
    pub fn new(start: MediaTime, duration: MediaTime) -> Self {
        Self { start, duration }
    }

    pub fn end(&self) -> MediaTime {
        self.start + self.duration
    }

    pub fn contains(&self, time: MediaTime) -> bool {
        time >= self.start && time < self.end()
    }
}

/// Identifier of one installed media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a media item comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaSource {
    /// File accessible to the host runtime.
    LocalFile { path: PathBuf },
    /// Network resource fetched by the backend.
    Remote {
        url: String,
        #[serde(default)]
        headers: HashMap<String, String>,
    },
}

impl MediaSource {
    pub fn local(path: impl Into<PathBuf>) -> Self {
        MediaSource::LocalFile { path: path.into() }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        MediaSource::Remote {
            url: url.into(),
            headers: HashMap::new(),
        }
    }

    /// Attach a request header. No effect on local files.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let MediaSource::Remote { headers, .. } = &mut self {
            headers.insert(name.into(), value.into());
        }
        self
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, MediaSource::Remote { .. })
    }

    /// Human readable location, used in logs.
    pub fn location(&self) -> String {
        match self {
            MediaSource::LocalFile { path } => path.display().to_string(),
            MediaSource::Remote { url, .. } => url.clone(),
        }
    }
}

impl FromStr for MediaSource {
    type Err = BridgeError;

    /// Accepts `file://` URLs, plain paths and any other `scheme://` URL.
    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BridgeError::InvalidSource("empty source".to_string()));
        }

        if let Some(path) = trimmed.strip_prefix("file://") {
            if path.is_empty() {
                return Err(BridgeError::InvalidSource(raw.to_string()));
            }
            return Ok(MediaSource::local(path));
        }

        match trimmed.split_once("://") {
            Some((scheme, rest)) if !scheme.is_empty() && !rest.is_empty() => {
                Ok(MediaSource::remote(trimmed))
            }
            Some(_) => Err(BridgeError::InvalidSource(raw.to_string())),
            None => Ok(MediaSource::local(trimmed)),
        }
    }
}

/// Metadata resolved by the backend when an asset finishes loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub duration: MediaTime,
    /// Ordered ranges partitioning the item; empty means one segment.
    #[serde(default)]
    pub segments: Vec<TimeRange>,
    #[serde(default)]
    pub has_audio: bool,
    #[serde(default)]
    pub has_video: bool,
}

impl AssetInfo {
    pub fn new(duration: MediaTime) -> Self {
        Self {
            duration,
            segments: Vec::new(),
            has_audio: false,
            has_video: true,
        }
    }

    pub fn with_segments(mut self, segments: Vec<TimeRange>) -> Self {
        self.segments = segments;
        self
    }

    pub fn with_audio(mut self, has_audio: bool) -> Self {
        self.has_audio = has_audio;
        self
    }
}

/// Volume ramp applied to an item's audio tracks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioMix {
    /// 0.0 = muted, 1.0 = unity gain.
    pub volume: f32,
}

impl AudioMix {
    pub fn new(volume: f32) -> Self {
        Self { volume }
    }
}

impl Default for AudioMix {
    fn default() -> Self {
        Self { volume: 1.0 }
    }
}
