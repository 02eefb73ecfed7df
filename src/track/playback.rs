use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use crate::audio::{AudioLoader, ElementFactory, MediaElement, PendingBlob};
use crate::error::ResolveError;
use crate::resolve::{CancelHandle, Resolver, VideoRecord, spawn_resolve};

use super::codec::AudioUrls;
use super::model::{TrackSettings, VideoMetadata};

/// What a track needs from the rest of the player.
pub struct TrackContext {
    pub loader: Arc<AudioLoader>,
    pub resolver: Arc<dyn Resolver>,
    pub elements: Rc<dyn ElementFactory>,
    pub audio_urls: AudioUrls,
}

/// Result of one [`Track::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackTick {
    /// The trimmed end was reached during this tick.
    pub ended: bool,
    /// Something worth persisting or redrawing changed (audio bound, metadata
    /// backfilled, load failed).
    pub changed: bool,
}

type Listener = Box<dyn FnMut()>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Returned by [`Track::on_end`]; drop it to keep the listener forever.
pub struct EndSubscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl EndSubscription {
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

struct Backfill {
    rx: Receiver<Result<VideoRecord, ResolveError>>,
    cancel: CancelHandle,
}

/// One playlist track.
///
/// The element plays one continuous piece of media. The track confines it to
/// `[start, end)`: `play` jumps to `start`, and each [`tick`](Track::tick)
/// moves a position past `end` straight to the natural end so the element
/// reports "ended" right at the trim point.
pub struct Track {
    video: VideoMetadata,
    element: Box<dyn MediaElement>,
    volume: u8,
    start: f64,
    end: f64,
    length: f64,
    loaded: bool,
    pending: Option<PendingBlob>,
    load_error: Option<String>,
    /// `play` arrived while the audio was still on its way.
    play_requested: bool,
    backfill: Option<Backfill>,
    was_ended: bool,
    listeners: Rc<RefCell<Listeners>>,
    loader: Arc<AudioLoader>,
}

impl Track {
    pub fn new(video: VideoMetadata, settings: TrackSettings, ctx: &TrackContext) -> Self {
        let length = f64::from(video.duration_seconds);
        let settings = settings.repaired(length);

        let mut element = ctx.elements.create(length);
        element.seek(settings.start);
        element.set_volume(f32::from(settings.volume) / 100.0);

        let pending = Some(ctx.loader.load(&video.audio_url));

        let backfill = video.needs_backfill().then(|| {
            let (tx, rx) = mpsc::channel();
            let cancel = spawn_resolve(Arc::clone(&ctx.resolver), video.id.clone(), move |r| {
                let _ = tx.send(r);
            });
            Backfill { rx, cancel }
        });

        Self {
            video,
            element,
            volume: settings.volume,
            start: settings.start,
            end: settings.end,
            length,
            loaded: false,
            pending,
            load_error: None,
            play_requested: false,
            backfill,
            was_ended: false,
            listeners: Rc::default(),
            loader: Arc::clone(&ctx.loader),
        }
    }

    pub fn video(&self) -> &VideoMetadata {
        &self.video
    }

    pub fn id(&self) -> &str {
        &self.video.id
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn start_time(&self) -> f64 {
        self.start
    }

    pub fn end_time(&self) -> f64 {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn loaded(&self) -> bool {
        self.loaded
    }

    /// Why the audio could not be loaded, if it could not.
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn settings(&self) -> TrackSettings {
        TrackSettings {
            volume: self.volume,
            start: self.start,
            end: self.end,
        }
    }

    pub fn position(&self) -> f64 {
        self.element.position()
    }

    pub fn set_volume(&mut self, volume: u8) -> bool {
        if volume > 100 {
            return false;
        }
        self.volume = volume;
        self.element.set_volume(f32::from(volume) / 100.0);
        true
    }

    pub fn set_start_time(&mut self, start: f64) -> bool {
        if !start.is_finite() || start < 0.0 || start >= self.end {
            return false;
        }
        self.start = start;
        true
    }

    pub fn set_end_time(&mut self, end: f64) -> bool {
        if !end.is_finite() || end <= self.start || end > self.length {
            return false;
        }
        self.end = end;
        true
    }

    /// Play the trimmed window from its start.
    pub fn play(&mut self) {
        self.element.seek(self.start);
        self.element.play();
        self.play_requested = self.pending.is_some();
    }

    pub fn pause(&mut self) {
        self.element.pause();
        self.play_requested = false;
    }

    /// Continue from wherever playback was paused.
    pub fn resume(&mut self) {
        if self.element.ended() {
            self.element.seek(self.start);
        }
        self.element.play();
        self.play_requested = self.pending.is_some();
    }

    /// Advancing, or waiting for audio to start advancing.
    pub fn is_playing(&self) -> bool {
        self.play_requested || !self.element.is_paused()
    }

    /// Paused somewhere inside the window, i.e. resuming makes sense.
    /// A track that reached its end was not "playing" any more.
    pub fn was_playing(&self) -> bool {
        !self.element.ended() && self.element.position() > self.start
    }

    pub fn on_end<F>(&mut self, listener: F) -> EndSubscription
    where
        F: FnMut() + 'static,
    {
        let mut listeners = self.listeners.borrow_mut();
        listeners.next_id += 1;
        let id = listeners.next_id;
        listeners.entries.push((id, Box::new(listener)));
        EndSubscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Let this track's audio jump ahead of other queued downloads.
    pub fn prioritize(&self) {
        if !self.loaded {
            self.loader.prioritize(&self.video.audio_url);
        }
    }

    /// Ask for the audio again after a failed load. Cached bytes are dropped
    /// first in case they were what failed to decode.
    pub fn retry_load(&mut self) -> bool {
        if self.loaded || self.pending.is_some() {
            return false;
        }
        self.load_error = None;
        self.loader.evict(&self.video.audio_url);
        self.pending = Some(self.loader.load(&self.video.audio_url));
        true
    }

    pub fn tick(&mut self) -> TrackTick {
        let mut tick = TrackTick::default();

        if let Some(result) = self.pending.as_ref().and_then(PendingBlob::try_take) {
            self.pending = None;
            tick.changed = true;
            let bound = result
                .map_err(|e| e.to_string())
                .and_then(|blob| self.element.bind(blob).map_err(|e| e.to_string()));
            match bound {
                Ok(()) => {
                    log::debug!("audio ready for {}", self.video.id);
                    self.loaded = true;
                    self.element.seek(self.start);
                    if std::mem::take(&mut self.play_requested) {
                        self.element.play();
                    }
                }
                Err(e) => {
                    log::warn!("audio for {} failed to load: {e}", self.video.id);
                    self.load_error = Some(e);
                    self.play_requested = false;
                }
            }
        }

        if let Some(backfill) = &self.backfill {
            match backfill.rx.try_recv() {
                Ok(Ok(record)) => {
                    self.video.backfill(&record);
                    self.backfill = None;
                    tick.changed = true;
                }
                Ok(Err(e)) => {
                    log::warn!("metadata backfill for {} failed: {e}", self.video.id);
                    self.backfill = None;
                }
                Err(TryRecvError::Disconnected) => self.backfill = None,
                Err(TryRecvError::Empty) => {}
            }
        }

        if !self.element.is_paused() {
            let pos = self.element.position();
            if pos >= self.end && pos < self.length {
                self.element.seek(self.length);
            }
        }

        let ended = self.element.ended();
        if ended && !self.was_ended {
            tick.ended = true;
            self.fire_end();
        }
        self.was_ended = ended;

        tick
    }

    fn fire_end(&mut self) {
        // Listeners may register more listeners while running.
        let mut running = std::mem::take(&mut self.listeners.borrow_mut().entries);
        for (_, listener) in running.iter_mut() {
            listener();
        }
        let mut listeners = self.listeners.borrow_mut();
        running.append(&mut listeners.entries);
        listeners.entries = running;
    }
}

impl Drop for Track {
    fn drop(&mut self) {
        if let Some(backfill) = self.backfill.take() {
            backfill.cancel.cancel();
        }
        self.element.pause();
    }
}
