//! Saved form of a track.
//!
//! `{"video": {...}, "vol": 100, "startTime": 0, "endTime": 212}`. Records
//! written before trimming existed have no `endTime`; those (and any other
//! missing field) fall back to the defaults in [`TrackSettings::full`].

use serde::{Deserialize, Serialize};

use crate::config::ServiceSettings;
use crate::error::CodecError;
use crate::resolve::VideoRecord;

use super::model::{TrackSettings, VideoMetadata};
use super::playback::{Track, TrackContext};

fn default_vol() -> f64 {
    100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedTrack {
    pub video: VideoRecord,
    #[serde(default = "default_vol")]
    pub vol: f64,
    #[serde(rename = "startTime", default)]
    pub start_time: f64,
    #[serde(rename = "endTime", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
}

/// Where audio lives now, and where it used to live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioUrls {
    pub base: String,
    pub legacy_prefixes: Vec<String>,
}

impl AudioUrls {
    pub fn from_settings(settings: &ServiceSettings) -> Self {
        Self {
            base: settings.audio_base_url.trim_end_matches('/').to_string(),
            legacy_prefixes: settings.legacy_audio_prefixes.clone(),
        }
    }

    /// Point audio from a retired host at the current one.
    pub fn migrate(&self, video: &mut VideoMetadata) -> bool {
        let legacy = self
            .legacy_prefixes
            .iter()
            .any(|p| !p.is_empty() && video.audio_url.starts_with(p.as_str()));
        if !legacy {
            return false;
        }
        let migrated = format!("{}/{}", self.base, video.id);
        log::info!("audio url {} -> {migrated}", video.audio_url);
        video.audio_url = migrated;
        true
    }
}

pub fn encode_parts(video: &VideoMetadata, settings: &TrackSettings) -> PersistedTrack {
    PersistedTrack {
        video: video.to_record(),
        vol: f64::from(settings.volume),
        start_time: settings.start,
        end_time: Some(settings.end),
    }
}

pub fn encode(track: &Track) -> PersistedTrack {
    encode_parts(track.video(), &track.settings())
}

/// Decode without building a track. Out-of-range values are repaired.
pub fn decode_parts(
    persisted: PersistedTrack,
    urls: &AudioUrls,
) -> Result<(VideoMetadata, TrackSettings), CodecError> {
    let mut video = VideoMetadata::from_record(persisted.video)?;
    urls.migrate(&mut video);

    let length = f64::from(video.duration_seconds);
    let volume = if persisted.vol.is_finite() {
        persisted.vol.round().clamp(0.0, 100.0) as u8
    } else {
        100
    };
    let settings = TrackSettings {
        volume,
        start: persisted.start_time,
        end: persisted.end_time.unwrap_or(length),
    }
    .repaired(length);

    Ok((video, settings))
}

pub fn decode(persisted: PersistedTrack, ctx: &TrackContext) -> Result<Track, CodecError> {
    let (video, settings) = decode_parts(persisted, &ctx.audio_urls)?;
    Ok(Track::new(video, settings, ctx))
}
