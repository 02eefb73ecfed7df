//! A playlist track: resolved video metadata plus a trimmed, volume-adjusted
//! playback window over one media element.

mod codec;
mod model;
mod playback;

pub use codec::{AudioUrls, PersistedTrack, decode, decode_parts, encode, encode_parts};
pub use model::{TrackSettings, VideoMetadata};
pub use playback::{EndSubscription, Track, TrackContext, TrackTick};

#[cfg(test)]
mod tests;
