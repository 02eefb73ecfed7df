//! Audio side of the player.
//!
//! * [`AudioLoader`]: the single-flight, reprioritizable download queue for
//!   audio byte streams, backed by a local blob cache.
//! * [`MediaElement`]: the small playback capability a track drives, with a
//!   rodio-backed implementation in [`SinkElement`].

mod element;
mod fetch;
mod loader;
mod queue;
mod sink;
mod thread;
mod types;

pub use element::{ElementFactory, MediaElement};
pub use fetch::{Fetcher, HttpFetcher};
pub use loader::AudioLoader;
pub use sink::SinkFactory;
pub use types::PendingBlob;

#[cfg(test)]
pub(crate) use queue::FetchQueue;
#[cfg(test)]
pub(crate) use types::{Blob, cache_key};
