use std::io;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::FetchSettings;
use crate::store::BlobStore;

use super::fetch::Fetcher;
use super::thread::{LoaderConfig, spawn_loader_thread};
use super::types::{LoaderMsg, PendingBlob};

/// Handle to the audio download queue.
///
/// At most one download runs at a time; the rest wait in request order.
/// Finished downloads land in the blob cache, and later requests for the same
/// video are answered from there without touching the network.
pub struct AudioLoader {
    tx: Sender<LoaderMsg>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioLoader {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<dyn BlobStore>,
        settings: &FetchSettings,
    ) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<LoaderMsg>();
        let config = LoaderConfig {
            fetcher,
            cache: settings.cache_audio.then_some(cache),
            stall_timeout: (settings.stall_timeout_ms > 0)
                .then(|| Duration::from_millis(settings.stall_timeout_ms)),
        };

        let handle = spawn_loader_thread(rx, tx.clone(), config)?;

        Ok(Self {
            tx,
            join: Mutex::new(Some(handle)),
        })
    }

    /// Request the audio at `url`.
    pub fn load(&self, url: &str) -> PendingBlob {
        let (reply, rx) = mpsc::channel();
        // If the loader is gone the reply sender drops here and the
        // pending blob reports `FetchError::Closed`.
        let _ = self.tx.send(LoaderMsg::Load {
            url: url.to_string(),
            reply,
        });
        PendingBlob::new(rx)
    }

    /// Let `url` jump ahead of other waiting downloads without interrupting
    /// the one in flight.
    pub fn prioritize(&self, url: &str) {
        let _ = self.tx.send(LoaderMsg::Prioritize(url.to_string()));
    }

    /// Drop cached audio for `url` so the next `load` downloads it again.
    pub fn evict(&self, url: &str) {
        let _ = self.tx.send(LoaderMsg::Evict(url.to_string()));
    }

    /// Stop the worker; every request still waiting is rejected.
    pub fn shutdown(&self) {
        let _ = self.tx.send(LoaderMsg::Shutdown);

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl Drop for AudioLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}
