//! The ordered playlist and everything that reorders, fills or persists it.

mod model;
mod persist;
mod reconciler;

pub use model::{Entry, EntryKey, EntryKind, Placeholder};
pub use reconciler::Playlist;
