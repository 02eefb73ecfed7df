use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use crate::error::{InputError, ResolveError, StoreError};
use crate::resolve::{CancelHandle, VideoRecord, spawn_resolve};
use crate::store::BlobStore;
use crate::track::{EndSubscription, Track, TrackContext, TrackSettings, VideoMetadata, decode};
use crate::util::get_id;

use super::model::{Entry, EntryKey, EntryKind, Placeholder, PlaylistEvent};
use super::persist::{Restored, decode_entries, encode_entries};

struct Drag {
    key: EntryKey,
    origin: usize,
}

/// Owns the entries and reconciles user edits, resolutions finishing and
/// tracks ending into one persisted order.
///
/// Resolutions and end-of-track notifications arrive on a channel and are
/// applied in [`tick`](Playlist::tick); tracks never see the playlist.
pub struct Playlist {
    entries: Vec<Entry>,
    play_idx: usize,
    /// Move on to the next track when the current one ends, instead of
    /// repeating it. Cleared after one advance.
    progressing: bool,
    next_key: u64,
    drag: Option<Drag>,
    subscriptions: HashMap<EntryKey, EndSubscription>,
    ctx: TrackContext,
    store: Arc<dyn BlobStore>,
    state_key: String,
    tx: Sender<PlaylistEvent>,
    rx: Receiver<PlaylistEvent>,
}

impl Playlist {
    pub fn new(ctx: TrackContext, store: Arc<dyn BlobStore>, state_key: impl Into<String>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            entries: Vec::new(),
            play_idx: 0,
            progressing: false,
            next_key: 0,
            drag: None,
            subscriptions: HashMap::new(),
            ctx,
            store,
            state_key: state_key.into(),
            tx,
            rx,
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn play_idx(&self) -> usize {
        self.play_idx
    }

    pub fn progressing(&self) -> bool {
        self.progressing
    }

    pub fn dragging(&self) -> Option<usize> {
        let drag = self.drag.as_ref()?;
        self.index_of(drag.key)
    }

    pub fn track(&self, idx: usize) -> Option<&Track> {
        self.entries.get(idx).and_then(Entry::track)
    }

    fn track_mut(&mut self, idx: usize) -> Option<&mut Track> {
        self.entries.get_mut(idx).and_then(Entry::track_mut)
    }

    fn index_of(&self, key: EntryKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key() == key)
    }

    fn fresh_key(&mut self) -> EntryKey {
        self.next_key += 1;
        EntryKey(self.next_key)
    }

    fn resolve(&self, key: EntryKey, id: &str) -> CancelHandle {
        let tx = self.tx.clone();
        spawn_resolve(Arc::clone(&self.ctx.resolver), id.to_string(), move |result| {
            let _ = tx.send(PlaylistEvent::Resolved { key, result });
        })
    }

    fn push_pending(&mut self, id: String) -> EntryKey {
        let key = self.fresh_key();
        let cancel = self.resolve(key, &id);
        self.entries.push(Entry::new(
            key,
            EntryKind::Placeholder(Placeholder::new(id, cancel)),
        ));
        key
    }

    fn attach(&mut self, key: EntryKey, mut track: Track) -> EntryKind {
        let tx = self.tx.clone();
        let sub = track.on_end(move || {
            let _ = tx.send(PlaylistEvent::Ended(key));
        });
        self.subscriptions.insert(key, sub);
        EntryKind::Track(track)
    }

    /// Load the saved playlist. Unresolved ids are sent off for resolution
    /// again. Returns how many entries were restored.
    pub fn restore(&mut self) -> Result<usize, StoreError> {
        let Some(bytes) = self.store.get(&self.state_key)? else {
            return Ok(0);
        };
        let restored = decode_entries(&bytes)?;

        for item in restored {
            match item {
                Restored::Track(persisted) => {
                    let id = persisted.video.id.clone();
                    match decode(persisted, &self.ctx) {
                        Ok(track) => {
                            let key = self.fresh_key();
                            let kind = self.attach(key, track);
                            self.entries.push(Entry::new(key, kind));
                        }
                        Err(e) => {
                            log::warn!("saved track {id} unusable ({e}); resolving again");
                            self.push_pending(id);
                        }
                    }
                }
                Restored::Pending(id) => {
                    self.push_pending(id);
                }
            }
        }

        log::info!("restored {} playlist entries", self.entries.len());
        self.save();
        Ok(self.entries.len())
    }

    /// Append a placeholder for `link_or_id` and start resolving it.
    pub fn add(&mut self, link_or_id: &str) -> Result<EntryKey, InputError> {
        let id = get_id(link_or_id)?;
        log::info!("adding {id}");
        let key = self.push_pending(id);
        self.save();
        Ok(key)
    }

    /// Try a failed entry again: resolution for placeholders, audio for tracks.
    pub fn retry(&mut self, idx: usize) -> bool {
        if let Some(track) = self.track_mut(idx) {
            return track.retry_load();
        }
        let Some(entry) = self.entries.get(idx) else {
            return false;
        };
        let key = entry.key();
        let id = match entry.placeholder() {
            Some(p) if !p.in_flight() => p.id.clone(),
            _ => return false,
        };

        log::info!("retrying {id}");
        let cancel = self.resolve(key, &id);
        self.entries[idx].kind = EntryKind::Placeholder(Placeholder::new(id, cancel));
        true
    }

    pub fn delete(&mut self, idx: usize) -> bool {
        if idx >= self.entries.len() {
            return false;
        }
        let mut removed = self.entries.remove(idx);
        let key = removed.key();
        match &mut removed.kind {
            EntryKind::Placeholder(p) => p.cancel(),
            EntryKind::Track(t) => {
                t.pause();
                if let Some(sub) = self.subscriptions.remove(&key) {
                    sub.unsubscribe();
                }
            }
        }
        if self.drag.as_ref().is_some_and(|d| d.key == key) {
            self.drag = None;
        }
        if idx <= self.play_idx {
            self.play_idx = self.play_idx.saturating_sub(1);
        }
        log::info!("deleted {}", removed.id());
        self.save();
        true
    }

    /// Move one entry; the play cursor keeps pointing at the same entry.
    fn shift(&mut self, from: usize, to: usize) -> bool {
        let len = self.entries.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }
        let playing = self.entries.get(self.play_idx).map(Entry::key);
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        if let Some(idx) = playing.and_then(|k| self.index_of(k)) {
            self.play_idx = idx;
        }
        true
    }

    pub fn move_entry(&mut self, from: usize, to: usize) -> bool {
        let moved = self.shift(from, to);
        if moved && from != to {
            self.save();
        }
        moved
    }

    pub fn begin_drag(&mut self, idx: usize) -> bool {
        let Some(entry) = self.entries.get(idx) else {
            return false;
        };
        self.drag = Some(Drag {
            key: entry.key(),
            origin: idx,
        });
        true
    }

    /// Preview the dragged entry at `to`. Nothing is saved until the drop.
    pub fn drag_to(&mut self, to: usize) -> bool {
        let Some(from) = self.dragging() else {
            return false;
        };
        self.shift(from, to.min(self.entries.len().saturating_sub(1)))
    }

    pub fn drop_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        let moved = self.index_of(drag.key).is_some_and(|idx| idx != drag.origin);
        if moved {
            self.save();
        }
        moved
    }

    /// Put the dragged entry back; returns where it landed.
    pub fn cancel_drag(&mut self) -> Option<usize> {
        let drag = self.drag.take()?;
        let idx = self.index_of(drag.key)?;
        let origin = drag.origin.min(self.entries.len().saturating_sub(1));
        self.shift(idx, origin);
        Some(origin)
    }

    /// Move on once the current track ends.
    pub fn request_advance(&mut self) {
        self.progressing = true;
    }

    /// Skip to the next track right away.
    pub fn advance_now(&mut self) {
        self.progressing = true;
        let current = self.play_idx;
        if let Some(track) = self.track_mut(current) {
            track.pause();
        }
        self.progress_from(current);
    }

    /// First track after `idx`, wrapping around and skipping placeholders.
    /// `idx` itself is found last.
    pub fn next_track_after(&self, idx: usize) -> Option<usize> {
        let len = self.entries.len();
        if len == 0 {
            return None;
        }
        (1..=len)
            .map(|step| (idx + step) % len)
            .find(|&i| self.entries[i].is_track())
    }

    fn progress_from(&mut self, idx: usize) {
        let Some(next) = self.next_track_after(idx) else {
            return;
        };
        self.progressing = false;
        self.play_at(next);
    }

    /// React to the track under `key` reaching its end.
    pub fn handle_track_end(&mut self, key: EntryKey) {
        let Some(idx) = self.index_of(key) else {
            return;
        };
        if self.progressing {
            log::debug!("entry {idx} ended, advancing");
            self.progress_from(idx);
        } else if let Some(track) = self.track_mut(idx) {
            log::debug!("repeating entry {idx}");
            track.play();
        }
    }

    /// Start the track at `idx` from its start, pausing the previous one.
    pub fn play_at(&mut self, idx: usize) -> bool {
        if self.track(idx).is_none() {
            return false;
        }
        if idx != self.play_idx {
            if let Some(prev) = self.track_mut(self.play_idx) {
                prev.pause();
            }
        }
        if let Some(track) = self.track_mut(idx) {
            track.prioritize();
            track.play();
        }
        self.play_idx = idx;
        true
    }

    /// Make `idx` the current entry without touching playback.
    pub fn select_play_index(&mut self, idx: usize) -> bool {
        if idx >= self.entries.len() {
            return false;
        }
        self.play_idx = idx;
        true
    }

    pub fn pause_at(&mut self, idx: usize) {
        if let Some(track) = self.track_mut(idx) {
            track.pause();
        }
    }

    pub fn resume_at(&mut self, idx: usize) {
        if let Some(track) = self.track_mut(idx) {
            track.resume();
        }
    }

    fn update_track(&mut self, idx: usize, f: impl FnOnce(&mut Track) -> bool) -> bool {
        let applied = self.track_mut(idx).is_some_and(f);
        if applied {
            self.save();
        }
        applied
    }

    pub fn set_volume(&mut self, idx: usize, volume: u8) -> bool {
        self.update_track(idx, |t| t.set_volume(volume))
    }

    pub fn set_start_time(&mut self, idx: usize, start: f64) -> bool {
        self.update_track(idx, |t| t.set_start_time(start))
    }

    pub fn set_end_time(&mut self, idx: usize, end: f64) -> bool {
        self.update_track(idx, |t| t.set_end_time(end))
    }

    fn handle_resolved(&mut self, key: EntryKey, result: Result<VideoRecord, ResolveError>) {
        let Some(idx) = self.index_of(key) else {
            log::debug!("resolution for a deleted entry dropped");
            return;
        };
        let built = result
            .map_err(|e| e.to_string())
            .and_then(|record| VideoMetadata::from_record(record).map_err(|e| e.to_string()));

        match built {
            Ok(video) => {
                log::info!("resolved {} ({})", video.id, video.title);
                let length = f64::from(video.duration_seconds);
                let track = Track::new(video, TrackSettings::full(length), &self.ctx);
                let kind = self.attach(key, track);
                self.entries[idx].kind = kind;
            }
            Err(e) => {
                if let EntryKind::Placeholder(p) = &mut self.entries[idx].kind {
                    log::warn!("resolving {} failed: {e}", p.id);
                    p.fail(e);
                }
            }
        }
    }

    /// Advance every track, then apply whatever completed in the meantime.
    /// Returns true when anything visible changed.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;
        let mut dirty = false;
        for entry in &mut self.entries {
            if let EntryKind::Track(track) = &mut entry.kind {
                let t = track.tick();
                changed |= t.changed;
                dirty |= t.changed;
            }
        }

        while let Ok(event) = self.rx.try_recv() {
            changed = true;
            match event {
                PlaylistEvent::Resolved { key, result } => {
                    self.handle_resolved(key, result);
                    dirty = true;
                }
                PlaylistEvent::Ended(key) => self.handle_track_end(key),
            }
        }

        if dirty {
            self.save();
        }
        changed
    }

    /// Write the playlist to the store. Failures are logged, not returned.
    pub fn save(&self) {
        let result = encode_entries(&self.entries)
            .map_err(StoreError::from)
            .and_then(|bytes| self.store.put(&self.state_key, &bytes));
        if let Err(e) = result {
            log::error!("saving playlist failed: {e}");
        }
    }

    /// Cancel in-flight resolutions and save one last time.
    pub fn teardown(&mut self) {
        for entry in &mut self.entries {
            if let EntryKind::Placeholder(p) = &mut entry.kind {
                p.cancel();
            }
        }
        self.save();
    }
}
