//! Client side of the video resolution service.
//!
//! The service maps a video id to its metadata and the URL its audio can be
//! downloaded from. Requests run on short-lived worker threads; the caller
//! gets a [`CancelHandle`] and a completion callback.

mod http;
mod record;

pub use http::HttpResolver;
pub use record::VideoRecord;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::error::ResolveError;

pub trait Resolver: Send + Sync {
    /// Look up metadata for `id`. Safe to call repeatedly for the same id.
    fn resolve(&self, id: &str) -> Result<VideoRecord, ResolveError>;
}

/// Shared flag that aborts delivery of an in-flight resolution.
///
/// Canceling does not interrupt the request itself: the worker thread stays
/// blocked in the HTTP call until it answers or `service.read_timeout_ms`
/// runs out, and its result is then discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Resolve `id` on a worker thread and hand the result to `on_done`.
///
/// Once the returned handle is canceled `on_done` is never called, even if
/// the request already finished on the wire.
pub fn spawn_resolve<F>(resolver: Arc<dyn Resolver>, id: String, on_done: F) -> CancelHandle
where
    F: FnOnce(Result<VideoRecord, ResolveError>) + Send + 'static,
{
    let cancel = CancelHandle::new();
    let flag = cancel.clone();

    let spawned = thread::Builder::new()
        .name(format!("resolve-{id}"))
        .spawn(move || {
            if flag.is_canceled() {
                return;
            }
            let result = resolver.resolve(&id);
            if flag.is_canceled() {
                log::debug!("dropping canceled resolution for {id}");
                return;
            }
            on_done(result);
        });

    if let Err(e) = spawned {
        log::error!("failed to spawn resolution thread: {e}");
    }

    cancel
}
