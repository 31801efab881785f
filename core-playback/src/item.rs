//! The active media item and its segment map.

use bridge_traits::media::{AssetInfo, ItemId, MediaSource, MediaTime, TimeRange};

/// One loaded, playable source.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    id: ItemId,
    source: MediaSource,
    duration: MediaTime,
    segments: Vec<TimeRange>,
    has_audio: bool,
}

impl MediaItem {
    /// Build an item from resolved asset metadata.
    ///
    /// Segments are sorted by start time. An asset that reports none is
    /// treated as a single segment spanning its whole duration.
    pub fn new(source: MediaSource, asset: AssetInfo) -> Self {
        let mut segments = asset.segments;
        if segments.is_empty() {
            segments.push(TimeRange::new(MediaTime::ZERO, asset.duration));
        }
        segments.sort_by_key(|range| range.start);

        Self {
            id: ItemId::new(),
            source,
            duration: asset.duration,
            segments,
            has_audio: asset.has_audio,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn source(&self) -> &MediaSource {
        &self.source
    }

    pub fn duration(&self) -> MediaTime {
        self.duration
    }

    pub fn segments(&self) -> &[TimeRange] {
        &self.segments
    }

    pub fn has_audio(&self) -> bool {
        self.has_audio
    }

    /// Index of the segment containing `time`.
    ///
    /// Times at or past the end of the last segment (a seek to the very end
    /// of the item) map to the last segment; times before the first segment
    /// map to the first.
    pub fn segment_index_at(&self, time: MediaTime) -> usize {
        if let Some(index) = self.segments.iter().position(|range| range.contains(time)) {
            return index;
        }

        match self.segments.first() {
            Some(first) if time < first.start => 0,
            _ => self
                .segments
                .iter()
                .rposition(|range| range.start <= time)
                .unwrap_or(0),
        }
    }
}
