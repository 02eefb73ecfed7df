//! Audio-related small types and handles.
//!
//! Shared by the loader thread, its handle and the tracks waiting on it.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
#[cfg(test)]
use std::sync::mpsc::RecvTimeoutError;
#[cfg(test)]
use std::time::Duration;

use crate::error::FetchError;

/// Fetched audio bytes. Cheap to clone; decoders read through a cursor.
pub type Blob = Arc<[u8]>;

/// Length of the cache key derived from an audio URL (a video id).
pub const CACHE_KEY_LEN: usize = 11;

/// The cache key for `url`: its last [`CACHE_KEY_LEN`] characters.
pub fn cache_key(url: &str) -> &str {
    let n = url.chars().count();
    url.char_indices()
        .nth(n.saturating_sub(CACHE_KEY_LEN))
        .map(|(i, _)| &url[i..])
        .unwrap_or(url)
}

pub(super) type Reply = Sender<Result<Blob, FetchError>>;

#[derive(Debug)]
pub(super) enum LoaderMsg {
    /// Queue a download of `url`; the outcome goes to `reply`.
    Load { url: String, reply: Reply },
    /// Move `url` right behind the in-flight download.
    Prioritize(String),
    /// Forget the cached bytes for `url`.
    Evict(String),
    /// Posted by the fetch thread when the download tagged `generation` ends.
    Fetched {
        generation: u64,
        result: Result<Blob, FetchError>,
    },
    /// Stop the loader; queued requests are answered with `FetchError::Closed`.
    Shutdown,
}

/// The eventual outcome of one `AudioLoader::load` call.
#[derive(Debug)]
pub struct PendingBlob {
    rx: Receiver<Result<Blob, FetchError>>,
}

impl PendingBlob {
    pub(super) fn new(rx: Receiver<Result<Blob, FetchError>>) -> Self {
        Self { rx }
    }

    /// Non-blocking poll. `None` while the request is still queued or in flight.
    pub fn try_take(&self) -> Option<Result<Blob, FetchError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(FetchError::Closed)),
        }
    }

    /// Block until the request settles or `timeout` passes.
    #[cfg(test)]
    pub fn wait(&self, timeout: Duration) -> Result<Blob, FetchError> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(FetchError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(FetchError::Closed),
        }
    }
}
