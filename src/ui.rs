//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`, one
//! body renderer per screen plus the shared header, notice line and footer.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{App, Confirm, Screen, ToastKind};
use crate::config::Settings;

/// Key help for `screen`, incorporating the configured skip distance.
fn controls_text(screen: Screen, skip_ms: u64) -> String {
    let skip = format!("[h/l] skip -/+{}", format_skip(skip_ms));
    let keys: Vec<String> = match screen {
        Screen::Home => vec![
            "[a] add song".into(),
            "[enter/p] play last played".into(),
            "[l] playlist".into(),
            "[q] quit".into(),
        ],
        Screen::Picker => vec![
            "[j/k] up/down".into(),
            "[enter] add to playlist".into(),
            "[r] rescan".into(),
            "[esc] back".into(),
        ],
        Screen::Playlist => vec![
            "[j/k] up/down".into(),
            "[enter] play".into(),
            "[d] delete".into(),
            "[C] clear all".into(),
            "[r] refresh".into(),
            "[esc] back".into(),
        ],
        Screen::Player => vec![
            "[space/p] play/pause".into(),
            skip,
            "[0-9] seek to 0-90%".into(),
            "[s] stop".into(),
            "[esc/b] back".into(),
        ],
    };
    keys.join(" | ")
}

/// Whole seconds as `10s`, anything else in milliseconds.
fn format_skip(ms: u64) -> String {
    if ms % 1000 == 0 {
        format!("{}s", ms / 1000)
    } else {
        format!("{ms}ms")
    }
}

/// Format a `Duration` as `m:ss`.
pub fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn song_count(n: usize) -> String {
    if n == 1 {
        "1 song".to_string()
    } else {
        format!("{n} songs")
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, settings: &Settings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(settings.ui.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" cadenza ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    match app.screen {
        Screen::Home => draw_home(frame, app, chunks[1]),
        Screen::Picker => draw_picker(frame, app, chunks[1], settings),
        Screen::Playlist => draw_playlist(frame, app, chunks[1]),
        Screen::Player => draw_player(frame, app, chunks[1]),
    }

    if let Some(confirm) = &app.confirm {
        draw_confirm(frame, confirm, chunks[1]);
    }

    draw_toast(frame, app, chunks[2]);

    let footer = Paragraph::new(controls_text(app.screen, settings.audio.skip_ms))
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_home(frame: &mut Frame, app: &App, area: Rect) {
    let last = match &app.last_played {
        Some(track) => format!("Last played: {}", track.name),
        None => "Nothing played yet. Add a song to get started.".to_string(),
    };
    let lines = vec![
        Line::from(last),
        Line::from(""),
        Line::from(format!("Playlist: {}", song_count(app.playlist.len()))),
    ];
    let body = Paragraph::new(lines)
        .block(padded(" home "))
        .wrap(Wrap { trim: true });
    frame.render_widget(body, area);
}

fn draw_picker(frame: &mut Frame, app: &App, area: Rect, settings: &Settings) {
    let title = format!(" add song: {} ", app.picker_dir.display());
    if app.picker_entries.is_empty() {
        let empty = Paragraph::new("No audio files found here.")
            .block(padded(&title))
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .picker_entries
        .iter()
        .map(|e| {
            let mb = e.size as f64 / (1024.0 * 1024.0);
            let style = if e.too_large(&settings.library) {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            ListItem::new(format!("{}  ({:.1} MB)", e.name, mb)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.picker_selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_playlist(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" your playlist ({}) ", song_count(app.playlist.len()));
    if app.playlist.is_empty() {
        let empty = Paragraph::new(
            "No songs yet.\nAdd songs from the Home screen to start building your playlist.",
        )
        .alignment(Alignment::Center)
        .block(padded(&title))
        .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .playlist
        .iter()
        .map(|t| ListItem::new(t.name.as_str()))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_player(frame: &mut Frame, app: &App, area: Rect) {
    let block = padded(" now playing ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let name = app
        .now_playing
        .as_ref()
        .map(|t| t.name.as_str())
        .unwrap_or("Unknown Track");
    frame.render_widget(
        Paragraph::new(name)
            .alignment(Alignment::Center)
            .style(Style::default().add_modifier(Modifier::BOLD)),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new("Local File").alignment(Alignment::Center),
        rows[1],
    );

    let status = app.playback.unwrap_or_default();
    let label = format!(
        "{} / {}",
        format_time(status.position),
        format_time(status.duration.unwrap_or_default())
    );
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(status.progress())
        .label(label);
    frame.render_widget(gauge, rows[3]);

    let state = if app.loading {
        "Loading..."
    } else if app.playback.is_none() {
        "Stopped"
    } else if status.is_playing {
        "Playing"
    } else {
        "Paused"
    };
    frame.render_widget(Paragraph::new(state).alignment(Alignment::Center), rows[4]);
}

fn draw_confirm(frame: &mut Frame, confirm: &Confirm, area: Rect) {
    let popup_area = centered_rect_sized(60, 6, area);
    frame.render_widget(Clear, popup_area);

    let (title, text) = match confirm {
        Confirm::DeleteTrack { name, .. } => (
            " delete song ",
            format!("Remove \"{name}\" from your playlist?\n\n[y] delete   [n] cancel"),
        ),
        Confirm::ClearPlaylist => (
            " clear playlist ",
            "Remove all songs from your playlist?\n\n[y] clear all   [n] cancel".to_string(),
        ),
    };
    let popup = Paragraph::new(text)
        .block(padded(title))
        .wrap(Wrap { trim: true });
    frame.render_widget(popup, popup_area);
}

fn draw_toast(frame: &mut Frame, app: &App, area: Rect) {
    let Some(toast) = &app.toast else {
        frame.render_widget(Block::default().borders(Borders::ALL), area);
        return;
    };

    let color = match toast.kind {
        ToastKind::Info => Color::Cyan,
        ToastKind::Success => Color::Green,
        ToastKind::Error => Color::Red,
    };
    let text = match &toast.detail {
        Some(detail) => format!("{}: {}", toast.title, detail),
        None => toast.title.clone(),
    };
    let notice = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(padded(" notice "));
    frame.render_widget(notice, area);
}
