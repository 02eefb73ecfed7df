//! Application model types: `App` and `InputMode`.

use crate::config::ControlsSettings;
use crate::playlist::Playlist;
use crate::util::{raw_number_to_time, time_string_to_seconds};

/// What keystrokes currently mean.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a video link or id.
    AddLink,
    /// Typing a start time as `HH:MM:SS`.
    EditStart,
    /// Typing an end time as `HH:MM:SS`.
    EditEnd,
    /// Carrying the selected entry around; `j`/`k` move it.
    Drag,
}

/// The main application model.
pub struct App {
    pub playlist: Playlist,
    pub selected: usize,
    pub mode: InputMode,
    pub input: String,
    pub status: Option<String>,
    controls: ControlsSettings,
}

impl App {
    pub fn new(playlist: Playlist, controls: ControlsSettings) -> Self {
        Self {
            playlist,
            selected: 0,
            mode: InputMode::Normal,
            input: String::new(),
            status: None,
            controls,
        }
    }

    fn say(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    /// Keep `selected` inside the playlist after it shrank.
    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.playlist.len().saturating_sub(1));
    }

    /// Move selection down, wrapping to the top.
    pub fn next(&mut self) {
        let len = self.playlist.len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move selection up, wrapping to the bottom.
    pub fn prev(&mut self) {
        let len = self.playlist.len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Play, pause or resume the selected track.
    pub fn toggle_selected(&mut self) {
        let idx = self.selected;
        let Some(track) = self.playlist.track(idx) else {
            self.say("nothing playable selected");
            return;
        };

        if track.is_playing() {
            self.playlist.pause_at(idx);
        } else if track.was_playing() {
            let current = self.playlist.play_idx();
            if current != idx {
                self.playlist.pause_at(current);
            }
            self.playlist.resume_at(idx);
            self.playlist.select_play_index(idx);
        } else {
            self.playlist.play_at(idx);
        }
    }

    /// Move on after the current track instead of repeating it.
    pub fn queue_advance(&mut self) {
        self.playlist.request_advance();
        self.say("next track after this one");
    }

    pub fn skip_now(&mut self) {
        self.playlist.advance_now();
        self.selected = self.playlist.play_idx();
    }

    pub fn delete_selected(&mut self) {
        if self.playlist.delete(self.selected) {
            self.clamp_selection();
        }
    }

    pub fn retry_selected(&mut self) {
        if !self.playlist.retry(self.selected) {
            self.say("nothing to retry");
        }
    }

    pub fn change_volume(&mut self, up: bool) {
        let Some(track) = self.playlist.track(self.selected) else {
            return;
        };
        let step = self.controls.volume_step;
        let volume = if up {
            track.volume().saturating_add(step).min(100)
        } else {
            track.volume().saturating_sub(step)
        };
        self.playlist.set_volume(self.selected, volume);
    }

    /// Move the trim start by one step; moves that would break
    /// `start < end` are dropped.
    pub fn nudge_start(&mut self, forward: bool) {
        let Some(track) = self.playlist.track(self.selected) else {
            return;
        };
        let step = f64::from(self.controls.time_step_seconds);
        let start = if forward {
            track.start_time() + step
        } else {
            (track.start_time() - step).max(0.0)
        };
        self.playlist.set_start_time(self.selected, start);
    }

    pub fn nudge_end(&mut self, forward: bool) {
        let Some(track) = self.playlist.track(self.selected) else {
            return;
        };
        let step = f64::from(self.controls.time_step_seconds);
        let end = if forward {
            (track.end_time() + step).min(track.length())
        } else {
            track.end_time() - step
        };
        self.playlist.set_end_time(self.selected, end);
    }

    pub fn begin_add(&mut self) {
        self.mode = InputMode::AddLink;
        self.input.clear();
    }

    /// Start typing a new start (`EditStart`) or end (`EditEnd`) time,
    /// prefilled with the current value.
    pub fn begin_edit(&mut self, mode: InputMode) {
        let Some(track) = self.playlist.track(self.selected) else {
            return;
        };
        let current = match mode {
            InputMode::EditStart => track.start_time(),
            InputMode::EditEnd => track.end_time(),
            _ => return,
        };
        self.input = raw_number_to_time(current);
        self.mode = mode;
    }

    pub fn push_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_char(&mut self) {
        self.input.pop();
    }

    pub fn cancel_input(&mut self) {
        self.input.clear();
        self.mode = InputMode::Normal;
    }

    /// Apply whatever was typed, then go back to normal mode.
    pub fn submit_input(&mut self) {
        let text = std::mem::take(&mut self.input);
        let mode = std::mem::replace(&mut self.mode, InputMode::Normal);

        match mode {
            InputMode::AddLink => {
                if text.trim().is_empty() {
                    return;
                }
                match self.playlist.add(text.trim()) {
                    Ok(_) => {
                        self.selected = self.playlist.len() - 1;
                        let id = self.playlist.entries()[self.selected].id().to_string();
                        self.say(format!("loading {id}"));
                    }
                    Err(e) => self.say(e.to_string()),
                }
            }
            InputMode::EditStart | InputMode::EditEnd => self.apply_time(mode, &text),
            InputMode::Normal | InputMode::Drag => {}
        }
    }

    fn apply_time(&mut self, mode: InputMode, text: &str) {
        let Some(length) = self.playlist.track(self.selected).map(|t| t.length()) else {
            return;
        };
        let secs = match time_string_to_seconds(text.trim()) {
            Ok(secs) => f64::from(secs),
            Err(e) => {
                self.say(e.to_string());
                return;
            }
        };
        if secs > length {
            self.say(format!("{} is past the end of the track", text.trim()));
            return;
        }

        let applied = if mode == InputMode::EditStart {
            self.playlist.set_start_time(self.selected, secs)
        } else {
            self.playlist.set_end_time(self.selected, secs)
        };
        if !applied {
            self.say("start must stay before end");
        }
    }

    /// Swap the selected entry with its neighbour.
    pub fn move_selected(&mut self, down: bool) {
        let from = self.selected;
        let to = if down {
            from + 1
        } else {
            match from.checked_sub(1) {
                Some(to) => to,
                None => return,
            }
        };
        if self.playlist.move_entry(from, to) {
            self.selected = to;
        }
    }

    /// Pick up the selected entry.
    pub fn begin_drag(&mut self) {
        if self.playlist.begin_drag(self.selected) {
            self.mode = InputMode::Drag;
        }
    }

    pub fn drag_by(&mut self, down: bool) {
        let Some(at) = self.playlist.dragging() else {
            return;
        };
        let to = if down {
            at + 1
        } else {
            at.saturating_sub(1)
        };
        self.playlist.drag_to(to);
        self.selected = self.playlist.dragging().unwrap_or(self.selected);
    }

    pub fn drop_drag(&mut self) {
        self.playlist.drop_drag();
        self.mode = InputMode::Normal;
    }

    pub fn cancel_drag(&mut self) {
        if let Some(idx) = self.playlist.cancel_drag() {
            self.selected = idx;
        }
        self.mode = InputMode::Normal;
    }

    /// Advance playback and apply finished background work.
    pub fn tick(&mut self) -> bool {
        let changed = self.playlist.tick();
        self.clamp_selection();
        changed
    }
}
