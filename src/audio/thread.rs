use std::io;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::error::FetchError;
use crate::store::BlobStore;

use super::fetch::Fetcher;
use super::queue::FetchQueue;
use super::types::{Blob, LoaderMsg, Reply, cache_key};

/// How often the loader wakes up without messages to check for a stalled fetch.
const STALL_POLL: Duration = Duration::from_millis(200);

pub(super) struct LoaderConfig {
    pub fetcher: Arc<dyn Fetcher>,
    pub cache: Option<Arc<dyn BlobStore>>,
    pub stall_timeout: Option<Duration>,
}

struct LoaderState {
    queue: FetchQueue<Reply>,
    generation: u64,
    started_at: Option<Instant>,
    tx: Sender<LoaderMsg>,
    config: LoaderConfig,
}

impl LoaderState {
    fn cached(&self, url: &str) -> Option<Blob> {
        let cache = self.config.cache.as_ref()?;
        match cache.get(cache_key(url)) {
            Ok(Some(bytes)) => Some(Blob::from(bytes)),
            Ok(None) => None,
            Err(e) => {
                log::warn!("audio cache read failed for {url}: {e}");
                None
            }
        }
    }

    fn store(&self, url: &str, blob: &Blob) {
        if let Some(cache) = self.config.cache.as_ref() {
            if let Err(e) = cache.put(cache_key(url), blob) {
                log::warn!("audio cache write failed for {url}: {e}");
            }
        }
    }

    fn evict(&self, url: &str) {
        if let Some(cache) = self.config.cache.as_ref() {
            if let Err(e) = cache.remove(cache_key(url)) {
                log::warn!("audio cache evict failed for {url}: {e}");
            }
        }
    }

    /// Start the head of the queue unless something is already in flight.
    /// A fetch already running keeps its stall clock.
    fn start_next(&mut self) {
        while let Some(url) = self.queue.start_next() {
            self.generation += 1;
            let generation = self.generation;
            let fetcher = Arc::clone(&self.config.fetcher);
            let tx = self.tx.clone();

            log::debug!("fetching {url} (generation {generation})");
            let spawned = thread::Builder::new()
                .name("audio-fetch".to_string())
                .spawn(move || {
                    let result = fetcher.fetch(&url);
                    let _ = tx.send(LoaderMsg::Fetched { generation, result });
                });

            match spawned {
                Ok(_) => {
                    self.started_at = Some(Instant::now());
                    return;
                }
                Err(e) => {
                    log::error!("failed to spawn fetch thread: {e}");
                    self.finish_head(Err(FetchError::Io(e.to_string())));
                }
            }
        }
    }

    /// Settle the in-flight request (and identical waiting ones on success).
    fn finish_head(&mut self, result: Result<Blob, FetchError>) {
        let Some(done) = self.queue.complete_head() else {
            return;
        };
        self.started_at = None;

        match &result {
            Ok(blob) => {
                self.store(&done.url, blob);
                for dup in self.queue.take_waiting(&done.url) {
                    let _ = dup.reply.send(Ok(Arc::clone(blob)));
                }
            }
            Err(e) => log::warn!("audio fetch for {} failed: {e}", done.url),
        }
        let _ = done.reply.send(result);
    }

    fn check_stall(&mut self) {
        let (Some(limit), Some(started)) = (self.config.stall_timeout, self.started_at) else {
            return;
        };
        if started.elapsed() < limit {
            return;
        }
        // Whatever the stalled fetch eventually posts carries an old generation.
        self.generation += 1;
        self.finish_head(Err(FetchError::Timeout(limit)));
        self.start_next();
    }
}

pub(super) fn spawn_loader_thread(
    rx: Receiver<LoaderMsg>,
    tx: Sender<LoaderMsg>,
    config: LoaderConfig,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("audio-loader".to_string())
        .spawn(move || {
            let mut state = LoaderState {
                queue: FetchQueue::new(),
                generation: 0,
                started_at: None,
                tx,
                config,
            };

            loop {
                match rx.recv_timeout(STALL_POLL) {
                    Ok(LoaderMsg::Load { url, reply }) => {
                        if let Some(blob) = state.cached(&url) {
                            log::debug!("cache hit for {url}");
                            let _ = reply.send(Ok(blob));
                            continue;
                        }
                        state.queue.push(url, reply);
                        state.start_next();
                    }
                    Ok(LoaderMsg::Prioritize(url)) => {
                        if state.queue.prioritize(&url) {
                            log::debug!("prioritized {url}");
                        }
                    }
                    Ok(LoaderMsg::Evict(url)) => state.evict(&url),
                    Ok(LoaderMsg::Fetched { generation, result }) => {
                        if generation != state.generation {
                            log::debug!("ignoring late fetch result (generation {generation})");
                            continue;
                        }
                        state.finish_head(result);
                        state.start_next();
                    }
                    Ok(LoaderMsg::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
                state.check_stall();
            }

            for pending in state.queue.drain() {
                let _ = pending.reply.send(Err(FetchError::Closed));
            }
        })
}
