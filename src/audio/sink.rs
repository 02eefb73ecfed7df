//! `rodio`-backed media elements.
//!
//! Each track gets its own `Sink` on the shared output mixer. The fetched
//! bytes stay in memory; a fresh decoder is built over them whenever the
//! sink ran dry and playback starts again.

use std::io::Cursor;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};

use crate::error::MediaError;

use super::element::{ElementFactory, MediaElement};
use super::types::Blob;

fn decoder_for(blob: &Blob) -> Result<Decoder<Cursor<Blob>>, MediaError> {
    Decoder::new(Cursor::new(Blob::clone(blob))).map_err(|e| MediaError::Decode(e.to_string()))
}

pub struct SinkElement {
    sink: Sink,
    blob: Option<Blob>,
    length: f64,
    /// Position requested before any audio was bound.
    pending_seek: f64,
    paused: bool,
    at_end: bool,
}

impl SinkElement {
    /// Make sure the sink holds a source; returns false when none can be built.
    fn ensure_source(&mut self) -> bool {
        if !self.sink.empty() {
            return true;
        }
        let Some(blob) = self.blob.as_ref() else {
            return false;
        };
        match decoder_for(blob) {
            Ok(source) => {
                self.sink.append(source);
                true
            }
            Err(e) => {
                log::warn!("{e}");
                false
            }
        }
    }
}

impl MediaElement for SinkElement {
    fn bind(&mut self, blob: Blob) -> Result<(), MediaError> {
        let source = decoder_for(&blob)?;
        self.sink.clear();
        self.sink.append(source);
        self.sink.pause();
        self.blob = Some(blob);
        self.paused = true;
        self.at_end = false;

        if self.pending_seek > 0.0 {
            let at = std::mem::take(&mut self.pending_seek);
            self.seek(at);
        }
        Ok(())
    }

    fn play(&mut self) {
        if self.blob.is_none() {
            return;
        }
        if self.at_end {
            // Like a media element that already ended: start over.
            self.sink.clear();
            self.at_end = false;
        }
        if !self.ensure_source() {
            return;
        }
        self.sink.play();
        self.paused = false;
    }

    fn pause(&mut self) {
        self.sink.pause();
        self.paused = true;
    }

    fn is_paused(&self) -> bool {
        self.paused || self.at_end || (self.blob.is_some() && self.sink.empty())
    }

    fn seek(&mut self, secs: f64) {
        let secs = secs.max(0.0);
        if self.blob.is_none() {
            self.pending_seek = secs;
            return;
        }
        if secs >= self.length {
            // `clear` also pauses the sink.
            self.sink.clear();
            self.at_end = true;
            self.paused = true;
            return;
        }

        self.at_end = false;
        if !self.ensure_source() {
            return;
        }
        if let Err(e) = self.sink.try_seek(Duration::from_secs_f64(secs)) {
            log::warn!("seek to {secs:.1}s failed: {e}");
        }
    }

    fn position(&self) -> f64 {
        if self.blob.is_none() {
            return self.pending_seek;
        }
        if self.at_end {
            return self.length;
        }
        self.sink.get_pos().as_secs_f64()
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 1.0));
    }

    fn ended(&self) -> bool {
        self.at_end || (self.blob.is_some() && !self.paused && self.sink.empty())
    }
}

/// Owns the output stream; every element it creates plays through it.
pub struct SinkFactory {
    stream: OutputStream,
}

impl SinkFactory {
    /// Open the default output device.
    pub fn open_default() -> Result<Self, MediaError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| MediaError::Output(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped, which would
        // scribble over the terminal UI.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

impl ElementFactory for SinkFactory {
    fn create(&self, length: f64) -> Box<dyn MediaElement> {
        let sink = Sink::connect_new(self.stream.mixer());
        sink.pause();
        Box::new(SinkElement {
            sink,
            blob: None,
            length,
            pending_seek: 0.0,
            paused: true,
            at_end: false,
        })
    }
}
