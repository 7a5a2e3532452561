//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    widgets::{Block, Borders, Gauge, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, View};
use crate::audio::PlaybackState;
use crate::config::{ControlsSettings, UiSettings};
use crate::queue::Navigator;

/// Below this many rows the progress bar is left out.
const MIN_ROWS_FOR_PROGRESS: u16 = 16;

/// Render the controls help text, incorporating the configured steps.
fn controls_text(controls: &ControlsSettings) -> String {
    [
        "[t/q/a/l] view".to_string(),
        "[0-9 enter] act on entry".to_string(),
        "[i] insert mode".to_string(),
        "[n/p] next/prev".to_string(),
        "[space] pause".to_string(),
        format!("[+/-] volume {}", controls.volume_step),
        format!("[H/L] scrub -/+{}s", controls.scrub_seconds),
        "[f] favorite".to_string(),
        "[s] shuffle upcoming".to_string(),
        "[esc] quit".to_string(),
    ]
    .join(" | ")
}

/// Format seconds as `MM:SS`.
pub(crate) fn format_mmss(seconds: f64) -> String {
    let secs = if seconds.is_finite() { seconds.max(0.0) as u64 } else { 0 };
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Fraction of the track played, for the progress bar.
pub(crate) fn progress_ratio(elapsed: f64, total: f64) -> f64 {
    if total <= 0.0 || !elapsed.is_finite() {
        return 0.0;
    }
    (elapsed / total).clamp(0.0, 1.0)
}

fn state_text(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Idle => "Idle",
        PlaybackState::Loading => "Loading",
        PlaybackState::Playing => "Playing",
        PlaybackState::Paused => "Paused",
        PlaybackState::Stopped => "Stopped",
    }
}

fn status_text(app: &App, nav: &Navigator) -> String {
    let engine = nav.engine();
    let mut parts: Vec<String> = vec![format!(" VIEW: {}", app.view.title())];

    match nav.now_playing() {
        Some(track) => {
            let fav = if app.is_favorite(track) { " *" } else { "" };
            parts.push(format!("Song: {}{}", track.display(), fav));
        }
        None => parts.push("Nothing playing".to_string()),
    }
    let state = match engine.state() {
        // A user pause also holds the queue when nothing is loaded.
        PlaybackState::Idle | PlaybackState::Stopped if nav.is_paused() => PlaybackState::Paused,
        s => s,
    };
    parts.push(state_text(state).to_string());
    parts.push(format!("Vol: {}", engine.volume().level()));
    if nav.insert_mode() {
        parts.push("INSERT".to_string());
    }
    if !app.input.is_empty() {
        parts.push(format!("#{}", app.input));
    }
    if let Some(msg) = app.status.as_deref().or(nav.last_error()) {
        parts.push(msg.to_string());
    }

    parts.join(" • ")
}

/// Rows of the main list for the current view, starting at `app.offset`.
fn list_rows(app: &mut App, nav: &Navigator, height: usize) -> Vec<ListItem<'static>> {
    let start = app.offset;
    match app.view {
        View::Tracks => app
            .library
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(i, t)| {
                let fav = if app.favorites.is_favorite(&t.id()) { "*" } else { " " };
                ListItem::new(format!("{i}:{fav} {}", t.display()))
            })
            .collect(),
        View::Queue => nav
            .queue()
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(i, t)| {
                let text = format!("{i}: {}", t.display());
                if Some(i) == nav.playing_index() {
                    ListItem::new(text).style(Style::default().add_modifier(Modifier::BOLD))
                } else {
                    ListItem::new(text)
                }
            })
            .collect(),
        View::Albums => app
            .albums
            .iter()
            .enumerate()
            .skip(start)
            .take(height)
            .map(|(i, (artist, album))| ListItem::new(format!("{i}: {artist} - {album}")))
            .collect(),
        View::Lyrics => {
            let Some(track) = nav.now_playing().cloned() else {
                return vec![ListItem::new("nothing playing")];
            };
            let now = nav.engine().time();
            let (active, lines) = match app.lyrics_for(&track) {
                Some(lyrics) => (
                    lyrics.active_index(now),
                    lyrics
                        .lines()
                        .iter()
                        .map(|l| l.text.clone())
                        .collect::<Vec<_>>(),
                ),
                None => return vec![ListItem::new("no lyrics for this track")],
            };
            app.follow_lyrics(active, height);
            lines
                .into_iter()
                .enumerate()
                .skip(app.offset)
                .take(height)
                .map(|(i, text)| {
                    if Some(i) == active {
                        ListItem::new(format!("~ {text}"))
                            .style(Style::default().add_modifier(Modifier::BOLD))
                    } else {
                        ListItem::new(text)
                    }
                })
                .collect()
        }
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &mut App,
    nav: &Navigator,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let area = frame.area();
    let show_progress = area.height >= MIN_ROWS_FOR_PROGRESS;

    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Min(1),
    ];
    if show_progress {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Length(4));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" segue ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status_par = Paragraph::new(status_text(app, nav))
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

    // Main list: borders take two rows.
    let list_height = chunks[2].height.saturating_sub(2) as usize;
    let rows = list_rows(app, nav, list_height);
    let list = List::new(rows).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", app.view.title())),
    );
    frame.render_widget(list, chunks[2]);

    let footer_area = if show_progress {
        let engine = nav.engine();
        let elapsed = engine.time();
        let total = nav.now_playing().map_or(0.0, |t| t.duration);
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(" progress "))
            .gauge_style(Style::default().bold())
            .ratio(progress_ratio(elapsed, total))
            .label(format!("{} / {}", format_mmss(elapsed), format_mmss(total)));
        frame.render_widget(gauge, chunks[3]);
        chunks[4]
    } else {
        chunks[3]
    };

    let footer = Paragraph::new(controls_text(controls_settings))
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
    frame.render_widget(footer, footer_area);
}
