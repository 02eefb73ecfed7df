use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, InputMode};
use crate::config;
use crate::ui;

/// Main terminal event loop: handles input, advances playback and redraws.
/// Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let tick = Duration::from_millis(settings.ui.tick_ms);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        let timeout = tick.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key_event(key, app) {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= tick {
            app.tick();
            last_tick = Instant::now();
        }
    }
}

/// Returns true when the app should quit.
fn handle_key_event(key: KeyEvent, app: &mut App) -> bool {
    match app.mode {
        InputMode::AddLink | InputMode::EditStart | InputMode::EditEnd => {
            match key.code {
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Enter => app.submit_input(),
                KeyCode::Backspace => app.pop_char(),
                KeyCode::Char(c) if !c.is_control() => app.push_char(c),
                _ => {}
            }
            return false;
        }
        InputMode::Drag => {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => app.drag_by(true),
                KeyCode::Char('k') | KeyCode::Up => app.drag_by(false),
                KeyCode::Char('m') | KeyCode::Enter => app.drop_drag(),
                KeyCode::Esc => app.cancel_drag(),
                _ => {}
            }
            return false;
        }
        InputMode::Normal => {}
    }

    app.status = None;
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('p') => app.toggle_selected(),
        KeyCode::Char('a') => app.begin_add(),
        KeyCode::Char('n') => app.queue_advance(),
        KeyCode::Char('N') => app.skip_now(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Char('m') => app.begin_drag(),
        KeyCode::Char('J') => app.move_selected(true),
        KeyCode::Char('K') => app.move_selected(false),
        KeyCode::Char('[') => app.nudge_start(false),
        KeyCode::Char(']') => app.nudge_start(true),
        KeyCode::Char('{') => app.nudge_end(false),
        KeyCode::Char('}') => app.nudge_end(true),
        KeyCode::Char('s') => app.begin_edit(InputMode::EditStart),
        KeyCode::Char('e') => app.begin_edit(InputMode::EditEnd),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_volume(true),
        KeyCode::Char('-') => app.change_volume(false),
        KeyCode::Char('r') => app.retry_selected(),
        _ => {}
    }
    false
}
