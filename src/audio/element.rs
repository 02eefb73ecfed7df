//! The playback capability a track needs from an audio backend.
//!
//! Tracks layer their trim window on top of this; the element itself only
//! knows one continuous piece of media from `0` to its natural end.

use crate::error::MediaError;

use super::types::Blob;

pub trait MediaElement {
    /// Attach the audio bytes. The element is paused afterwards.
    fn bind(&mut self, blob: Blob) -> Result<(), MediaError>;
    /// Start or continue advancing. Without bound audio this does nothing.
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    /// Jump to `secs`. Seeking to (or past) the natural end ends playback.
    fn seek(&mut self, secs: f64);
    /// Current position in seconds.
    fn position(&self) -> f64;
    /// `0.0..=1.0`.
    fn set_volume(&mut self, volume: f32);
    /// True once playback reached the natural end and has not restarted.
    fn ended(&self) -> bool;
}

/// Creates one element per track; elements are never shared.
pub trait ElementFactory {
    fn create(&self, length: f64) -> Box<dyn MediaElement>;
}
