//! Error types shared across the player.
//!
//! Range violations on trim/volume updates are deliberately absent: those
//! setters return `false` and leave state untouched.

use std::time::Duration;

use thiserror::Error;

/// Malformed user input (links, ids, time strings).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Not a watch URL and not a bare 11-character video id.
    #[error("not a video link or video id: {0:?}")]
    InvalidLink(String),

    /// Time text that is not exactly `HH:MM:SS`.
    #[error("time formatted incorrectly, must be in form HH:MM:SS: {0:?}")]
    InvalidTime(String),
}

/// Failures while fetching an audio byte stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(String),

    #[error("read error: {0}")]
    Io(String),

    /// The fetch stayed in flight longer than the stall timeout.
    #[error("fetch stalled for more than {0:?}")]
    Timeout(Duration),

    /// The loader shut down before the request was served.
    #[error("audio loader closed")]
    Closed,
}

impl From<ureq::Error> for FetchError {
    fn from(err: ureq::Error) -> Self {
        Self::Http(err.to_string())
    }
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Failures from the video resolution service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("http error: {0}")]
    Http(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl From<ureq::Error> for ResolveError {
    fn from(err: ureq::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Failures reading or writing the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),

    /// A writer panicked while holding the in-memory map.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A persisted record that cannot be turned back into a track.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("bad duration: {0}")]
    Duration(#[from] InputError),
}

/// Failures of the audio output side.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The fetched bytes are not a format the decoder understands.
    #[error("cannot decode audio: {0}")]
    Decode(String),

    #[error("no audio output: {0}")]
    Output(String),
}
