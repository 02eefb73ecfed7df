use crate::error::InputError;
use crate::resolve::VideoRecord;
use crate::util::{decode_unicode_escapes, raw_number_to_time, time_string_to_seconds};

/// Metadata for one video, as the player works with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMetadata {
    pub id: String,
    pub source_url: String,
    pub audio_url: String,
    pub thumbnail_url: String,
    pub title: String,
    pub duration_seconds: u32,
    /// Missing on records saved by older versions until backfilled.
    pub author: Option<String>,
    pub description: Option<String>,
}

impl VideoMetadata {
    pub fn from_record(record: VideoRecord) -> Result<Self, InputError> {
        let duration_seconds = time_string_to_seconds(&record.duration)?;
        Ok(Self {
            id: record.id,
            source_url: record.url,
            audio_url: record.audio,
            thumbnail_url: record.thumb,
            title: decode_unicode_escapes(&record.title),
            duration_seconds,
            author: record.author,
            description: record.description,
        })
    }

    pub fn to_record(&self) -> VideoRecord {
        VideoRecord {
            id: self.id.clone(),
            url: self.source_url.clone(),
            audio: self.audio_url.clone(),
            thumb: self.thumbnail_url.clone(),
            title: self.title.clone(),
            duration: raw_number_to_time(f64::from(self.duration_seconds)),
            author: self.author.clone(),
            description: self.description.clone(),
        }
    }

    pub fn needs_backfill(&self) -> bool {
        self.author.is_none() || self.description.is_none()
    }

    /// Take author and description from a fresh resolution.
    pub fn backfill(&mut self, fresh: &VideoRecord) {
        self.author = fresh.author.clone();
        self.description = fresh.description.clone();
    }
}

/// The user-editable part of a track; this is what gets persisted next to the
/// metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSettings {
    /// Percent, `0..=100`.
    pub volume: u8,
    pub start: f64,
    pub end: f64,
}

impl TrackSettings {
    /// Full volume, whole track.
    pub fn full(length: f64) -> Self {
        Self {
            volume: 100,
            start: 0.0,
            end: length,
        }
    }

    /// Pull values back into `0 <= start < end <= length`, volume into `0..=100`.
    pub fn repaired(self, length: f64) -> Self {
        let volume = self.volume.min(100);
        let end = if self.end.is_finite() && self.end > 0.0 {
            self.end.min(length)
        } else {
            length
        };
        let start = if self.start.is_finite() && self.start >= 0.0 && self.start < end {
            self.start
        } else {
            0.0
        };
        Self { volume, start, end }
    }
}
