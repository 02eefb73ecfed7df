use crate::error::ResolveError;
use crate::resolve::{CancelHandle, VideoRecord};
use crate::track::Track;

/// Stable identity of a playlist entry; survives moves and resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryKey(pub(super) u64);

/// A track whose metadata is still being resolved (or failed to resolve).
#[derive(Debug)]
pub struct Placeholder {
    pub id: String,
    cancel: Option<CancelHandle>,
    pub error: Option<String>,
}

impl Placeholder {
    pub(super) fn new(id: String, cancel: CancelHandle) -> Self {
        Self {
            id,
            cancel: Some(cancel),
            error: None,
        }
    }

    pub fn in_flight(&self) -> bool {
        self.cancel.is_some()
    }

    pub(super) fn cancel(&mut self) {
        if let Some(c) = self.cancel.take() {
            c.cancel();
        }
    }

    pub(super) fn fail(&mut self, error: String) {
        self.cancel = None;
        self.error = Some(error);
    }
}

pub enum EntryKind {
    Track(Track),
    Placeholder(Placeholder),
}

pub struct Entry {
    key: EntryKey,
    pub kind: EntryKind,
}

impl Entry {
    pub(super) fn new(key: EntryKey, kind: EntryKind) -> Self {
        Self { key, kind }
    }

    pub fn key(&self) -> EntryKey {
        self.key
    }

    /// The video id, resolved or not.
    pub fn id(&self) -> &str {
        match &self.kind {
            EntryKind::Track(t) => t.id(),
            EntryKind::Placeholder(p) => &p.id,
        }
    }

    pub fn track(&self) -> Option<&Track> {
        match &self.kind {
            EntryKind::Track(t) => Some(t),
            EntryKind::Placeholder(_) => None,
        }
    }

    pub fn track_mut(&mut self) -> Option<&mut Track> {
        match &mut self.kind {
            EntryKind::Track(t) => Some(t),
            EntryKind::Placeholder(_) => None,
        }
    }

    pub fn placeholder(&self) -> Option<&Placeholder> {
        match &self.kind {
            EntryKind::Placeholder(p) => Some(p),
            EntryKind::Track(_) => None,
        }
    }

    pub fn is_track(&self) -> bool {
        matches!(self.kind, EntryKind::Track(_))
    }
}

/// Completions the playlist picks up on its next tick.
#[derive(Debug)]
pub(super) enum PlaylistEvent {
    Resolved {
        key: EntryKey,
        result: Result<VideoRecord, ResolveError>,
    },
    Ended(EntryKey),
}
