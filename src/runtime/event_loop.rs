use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, View};
use crate::config;
use crate::queue::{Navigator, Tick};
use crate::ui;

/// Rows moved by PageUp/PageDown.
const PAGE: usize = 10;

/// Main terminal event loop: advances the queue, draws, handles input.
/// Returns `Ok(())` when the user quits.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    nav: &mut Navigator,
) -> Result<(), Box<dyn std::error::Error>> {
    let poll = Duration::from_millis(settings.controls.poll_interval_ms);

    loop {
        if let Tick::Started(i) = nav.tick() {
            tracing::debug!(index = i, "advanced");
            if app.view == View::Lyrics {
                app.set_view(View::Lyrics);
            }
        }

        terminal.draw(|f| ui::draw(f, app, nav, &settings.ui, &settings.controls))?;

        if event::poll(poll)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, nav) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one key press. Returns `true` when the user asked to quit.
pub(crate) fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    nav: &mut Navigator,
) -> bool {
    let controls = &settings.controls;
    app.status = None;
    nav.clear_error();

    match key.code {
        KeyCode::Esc => return true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
        KeyCode::Char(c) if c.is_ascii_digit() => app.push_digit(c),
        KeyCode::Backspace => app.pop_digit(),
        KeyCode::Enter => app.submit(nav),
        KeyCode::Char('t') => app.set_view(View::Tracks),
        KeyCode::Char('q') => app.set_view(View::Queue),
        KeyCode::Char('a') => app.set_view(View::Albums),
        KeyCode::Char('l') => app.set_view(View::Lyrics),
        KeyCode::Char('i') => {
            let on = nav.toggle_insert_mode();
            app.status = Some(format!("insert mode {}", if on { "on" } else { "off" }));
        }
        KeyCode::Char('n') => nav.next(),
        KeyCode::Char('p') => nav.previous(),
        KeyCode::Char(' ') => {
            nav.toggle_pause();
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let v = nav.change_volume(controls.volume_step);
            app.status = Some(format!("volume {}", v.level()));
        }
        KeyCode::Char('-') => {
            let v = nav.change_volume(-controls.volume_step);
            app.status = Some(format!("volume {}", v.level()));
        }
        KeyCode::Char('L') => scrub(app, nav, controls.scrub_seconds as f64),
        KeyCode::Char('H') => scrub(app, nav, -(controls.scrub_seconds as f64)),
        KeyCode::Char('f') => app.toggle_favorite(nav),
        KeyCode::Char('s') => {
            nav.shuffle_upcoming();
            app.status = Some("shuffled upcoming entries".to_string());
        }
        KeyCode::Up => app.scroll_up(1),
        KeyCode::PageUp => app.scroll_up(PAGE),
        KeyCode::Down => {
            let len = app.view_len(nav);
            app.scroll_down(1, len);
        }
        KeyCode::PageDown => {
            let len = app.view_len(nav);
            app.scroll_down(PAGE, len);
        }
        _ => {}
    }

    false
}

fn scrub(app: &mut App, nav: &mut Navigator, delta: f64) {
    if let Err(e) = nav.seek_by(delta) {
        tracing::debug!(error = %e, "scrub rejected");
        app.status = Some(e.to_string());
    }
}
