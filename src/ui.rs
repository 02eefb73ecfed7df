//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, InputMode};
use crate::config::{ControlsSettings, UiSettings};
use crate::playlist::{Entry, EntryKind};
use crate::track::Track;
use crate::util::raw_number_to_time;

/// Render the controls help text for the current input mode.
fn controls_text(mode: InputMode, controls: &ControlsSettings) -> String {
    let pairs: Vec<(&str, String)> = match mode {
        InputMode::Normal => vec![
            ("j/k", "up/down".to_string()),
            ("enter/space/p", "play/pause".to_string()),
            ("a", "add link".to_string()),
            ("n", "next after this".to_string()),
            ("N", "skip".to_string()),
            ("[/]", format!("start -/+{}s", controls.time_step_seconds)),
            ("{/}", format!("end -/+{}s", controls.time_step_seconds)),
            ("s/e", "type start/end".to_string()),
            ("-/+", format!("volume -/+{}", controls.volume_step)),
            ("m", "move".to_string()),
            ("J/K", "shift down/up".to_string()),
            ("d", "delete".to_string()),
            ("r", "retry".to_string()),
            ("q", "quit".to_string()),
        ],
        InputMode::AddLink | InputMode::EditStart | InputMode::EditEnd => vec![
            ("enter", "apply".to_string()),
            ("esc", "cancel".to_string()),
        ],
        InputMode::Drag => vec![
            ("j/k", "move down/up".to_string()),
            ("m/enter", "drop".to_string()),
            ("esc", "cancel".to_string()),
        ],
    };
    pairs
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

fn track_line(track: &Track, is_current: bool) -> String {
    let mut line = track.video().title.clone();
    if let Some(author) = track.video().author.as_deref().filter(|a| !a.is_empty()) {
        line.push_str(" · ");
        line.push_str(author);
    }

    let window = format!(
        "{} - {}",
        raw_number_to_time(track.start_time()),
        raw_number_to_time(track.end_time())
    );
    if is_current && track.loaded() {
        line.push_str(&format!(
            "  [{} in {window}]",
            raw_number_to_time(track.position())
        ));
    } else {
        line.push_str(&format!("  [{window}]"));
    }
    line.push_str(&format!("  vol {}%", track.volume()));

    if let Some(err) = track.load_error() {
        line.push_str(&format!("  (audio failed: {err})"));
    } else if !track.loaded() {
        line.push_str("  (loading audio)");
    }
    line
}

fn entry_line(entry: &Entry, is_current: bool, dragging: bool) -> String {
    let marker = match (&entry.kind, dragging) {
        (_, true) => "≡ ",
        (EntryKind::Track(t), _) if t.is_playing() => "▶ ",
        (EntryKind::Track(_), _) if is_current => "‖ ",
        _ => "  ",
    };
    let body = match &entry.kind {
        EntryKind::Track(t) => track_line(t, is_current),
        EntryKind::Placeholder(p) => match &p.error {
            Some(err) => format!("{} (failed: {err}; r retries)", p.id),
            None => format!("{} (resolving...)", p.id),
        },
    };
    format!("{marker}{body}")
}

fn status_text(app: &App) -> String {
    match app.mode {
        InputMode::AddLink => return format!("Link or id: {}_", app.input),
        InputMode::EditStart => return format!("Start (HH:MM:SS): {}_", app.input),
        InputMode::EditEnd => return format!("End (HH:MM:SS): {}_", app.input),
        InputMode::Normal | InputMode::Drag => {}
    }

    let mut parts: Vec<String> = Vec::new();
    let idx = app.playlist.play_idx();
    match app.playlist.track(idx) {
        Some(track) => {
            let state = if track.is_playing() { "Playing" } else { "Paused" };
            parts.push(format!("{state}: {}", track.video().title));
        }
        None => parts.push("Stopped".to_string()),
    }
    if app.playlist.progressing() {
        parts.push("NEXT: queued".to_string());
    } else {
        parts.push("NEXT: repeat".to_string());
    }
    if app.mode == InputMode::Drag {
        parts.push("MOVING".to_string());
    }
    if let Some(msg) = &app.status {
        parts.push(msg.clone());
    }
    parts.join(" • ")
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings, controls: &ControlsSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" tubeloop ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Main list
    {
        let entries = app.playlist.entries();
        let total = entries.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel = app.selected.min(total.saturating_sub(1));

        // Only build items for the visible window, keeping the selection centered.
        let (start, end) = if total <= list_height || list_height == 0 {
            (0, total)
        } else {
            let half = list_height / 2;
            let mut start = sel.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height)
        };

        let play_idx = app.playlist.play_idx();
        let dragging = app.playlist.dragging();
        let visible_items: Vec<ListItem> = entries[start..end]
            .iter()
            .enumerate()
            .map(|(offset, entry)| {
                let i = start + offset;
                let line = entry_line(entry, i == play_idx, dragging == Some(i));
                if entry.is_track() {
                    ListItem::new(line)
                } else {
                    ListItem::new(line).italic()
                }
            })
            .collect();

        let visible_items = if app.playlist.is_empty() {
            vec![ListItem::new("  press a to add a video link").dim()]
        } else {
            visible_items
        };

        let title = format!(" playlist ({total}) ");
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(sel - start));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    let footer = Paragraph::new(controls_text(app.mode, controls))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
