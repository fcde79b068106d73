use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Confirm, Screen, ToastKind};
use crate::audio::{AudioEngine, Observer, PlaybackError, PlaybackSession, PlaybackStatus};
use crate::config;
use crate::library::{Track, scan};
use crate::runtime::startup::refresh_library;
use crate::storage::{AddOutcome, KeyValueStore, PlaylistStore};
use crate::ui;

/// Messages pushed to the loop from the audio side.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// Fresh status for whatever is loaded.
    Status(PlaybackStatus),
    /// The named track played to its end.
    Finished { name: String },
}

/// State tracked by the runtime event loop across iterations.
#[derive(Default)]
pub struct EventLoopState {
    /// Track to load once the player has been drawn in its loading state.
    pub pending_load: Option<Track>,
}

/// Everything a key handler may touch besides the `App` model.
pub struct Context<'a, E: AudioEngine, S: KeyValueStore> {
    pub settings: &'a config::Settings,
    pub session: &'a mut PlaybackSession<E>,
    pub store: &'a mut PlaylistStore<S>,
    pub events_tx: &'a mpsc::Sender<UiEvent>,
    pub events_rx: &'a mpsc::Receiver<UiEvent>,
    pub state: &'a mut EventLoopState,
}

/// Observer forwarding every status report into the loop's channel.
pub fn status_forwarder(tx: mpsc::Sender<UiEvent>) -> Observer {
    Arc::new(move |status: &PlaybackStatus| {
        let _ = tx.send(UiEvent::Status(*status));
    })
}

/// Main terminal event loop: drains audio events, draws, and handles input.
/// Returns `Ok(())` when shutdown is requested.
pub fn run<E: AudioEngine, S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    ctx: &mut Context<'_, E, S>,
) -> Result<(), Box<dyn std::error::Error>> {
    let toast_ttl = Duration::from_millis(ctx.settings.ui.toast_ms);

    loop {
        while let Ok(event) = ctx.events_rx.try_recv() {
            handle_ui_event(event, app, ctx.session.is_loaded());
        }
        app.expire_toast(Instant::now(), toast_ttl);

        terminal.draw(|f| ui::draw(f, app, ctx.settings))?;

        // The player has been drawn as "Loading..."; now do the blocking part.
        if let Some(track) = ctx.state.pending_load.take() {
            start_playback(app, ctx, track);
            continue;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, ctx) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply an audio-side event. Status for a session that has since been
/// stopped is dropped.
pub fn handle_ui_event(event: UiEvent, app: &mut App, loaded: bool) {
    match event {
        UiEvent::Status(status) => {
            if loaded && app.now_playing.is_some() && !app.loading {
                app.playback = Some(status);
            }
        }
        UiEvent::Finished { name } => {
            app.notify(ToastKind::Success, "Playback finished", Some(name));
        }
    }
}

/// Handle one key press. Returns `true` when the app should quit.
pub fn handle_key_event<E: AudioEngine, S: KeyValueStore>(
    key: KeyEvent,
    app: &mut App,
    ctx: &mut Context<'_, E, S>,
) -> bool {
    if app.confirm.is_some() {
        handle_confirm_key(key, app, ctx);
        return false;
    }

    if key.code == KeyCode::Char('q') {
        return true;
    }

    match app.screen {
        Screen::Home => handle_home_key(key, app, ctx),
        Screen::Picker => handle_picker_key(key, app, ctx),
        Screen::Playlist => handle_playlist_key(key, app, ctx),
        Screen::Player => handle_player_key(key, app, ctx),
    }
    false
}

fn handle_home_key<E: AudioEngine, S: KeyValueStore>(
    key: KeyEvent,
    app: &mut App,
    ctx: &mut Context<'_, E, S>,
) {
    match key.code {
        KeyCode::Char('a') => {
            app.set_picker_entries(scan(&app.picker_dir, &ctx.settings.library));
            app.screen = Screen::Picker;
        }
        KeyCode::Enter | KeyCode::Char('p') => match app.last_played.clone() {
            Some(track) if !track.locator.is_empty() => request_playback(app, ctx, track),
            _ => app.notify(
                ToastKind::Info,
                "No song to play",
                Some("Add a song first to start playing.".to_string()),
            ),
        },
        KeyCode::Char('l') => {
            refresh_library(app, ctx.store, true);
            app.screen = Screen::Playlist;
        }
        _ => {}
    }
}

fn handle_picker_key<E: AudioEngine, S: KeyValueStore>(
    key: KeyEvent,
    app: &mut App,
    ctx: &mut Context<'_, E, S>,
) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.picker_next(),
        KeyCode::Char('k') | KeyCode::Up => app.picker_prev(),
        KeyCode::Char('r') => {
            app.set_picker_entries(scan(&app.picker_dir, &ctx.settings.library));
        }
        KeyCode::Enter => add_selected_entry(app, ctx),
        KeyCode::Esc | KeyCode::Char('b') => app.screen = Screen::Home,
        _ => {}
    }
}

fn add_selected_entry<E: AudioEngine, S: KeyValueStore>(app: &mut App, ctx: &mut Context<'_, E, S>) {
    let Some(entry) = app.selected_entry().cloned() else {
        return;
    };

    if entry.too_large(&ctx.settings.library) {
        app.notify(
            ToastKind::Error,
            "File too large",
            Some(format!(
                "Please select a file smaller than {}MB.",
                ctx.settings.library.max_file_size_mb
            )),
        );
        return;
    }

    let track = Track::from_path(&entry.path);
    if !track.is_valid() {
        app.notify(
            ToastKind::Error,
            "Invalid file",
            Some("The selected file could not be used.".to_string()),
        );
        return;
    }

    match ctx.store.add_track(&track) {
        Ok(AddOutcome::Added { count }) => {
            tracing::info!(name = %track.name, count, "song added");
            refresh_library(app, ctx.store, false);
            app.notify(
                ToastKind::Success,
                "Song added",
                Some(format!("{} has been added to your playlist.", track.name)),
            );
            app.screen = Screen::Home;
        }
        Ok(AddOutcome::Duplicate) => {
            app.notify(
                ToastKind::Info,
                "Song already exists",
                Some("This song is already in your playlist.".to_string()),
            );
            app.screen = Screen::Home;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to add song");
            app.notify(
                ToastKind::Error,
                "Error adding song",
                Some("Failed to add song to playlist.".to_string()),
            );
        }
    }
}

fn handle_playlist_key<E: AudioEngine, S: KeyValueStore>(
    key: KeyEvent,
    app: &mut App,
    ctx: &mut Context<'_, E, S>,
) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => {
            let Some(track) = app.selected_track().cloned() else {
                return;
            };
            if let Err(e) = ctx.store.set_last_played(&track) {
                tracing::error!(error = %e, "failed to remember last played track");
            }
            app.last_played = Some(track.clone());
            request_playback(app, ctx, track);
        }
        KeyCode::Char('d') => app.request_delete(),
        KeyCode::Char('C') => app.request_clear(),
        KeyCode::Char('r') => refresh_library(app, ctx.store, true),
        KeyCode::Esc | KeyCode::Char('b') => app.screen = Screen::Home,
        _ => {}
    }
}

fn handle_confirm_key<E: AudioEngine, S: KeyValueStore>(
    key: KeyEvent,
    app: &mut App,
    ctx: &mut Context<'_, E, S>,
) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {}
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm = None;
            return;
        }
        _ => return,
    }

    match app.confirm.take() {
        Some(Confirm::DeleteTrack { id, name }) => match ctx.store.remove_track(&id) {
            Ok(tracks) => {
                app.set_playlist(tracks);
                refresh_library(app, ctx.store, false);
                app.notify(
                    ToastKind::Success,
                    "Song removed",
                    Some(format!("{name} has been removed from your playlist.")),
                );
            }
            Err(e) => {
                tracing::error!(error = %e, id = %id, "failed to remove song");
                app.notify(
                    ToastKind::Error,
                    "Error deleting song",
                    Some("Could not remove the song.".to_string()),
                );
            }
        },
        Some(Confirm::ClearPlaylist) => match ctx.store.clear() {
            Ok(()) => {
                app.set_playlist(Vec::new());
                app.last_played = None;
                app.notify(
                    ToastKind::Success,
                    "Playlist cleared",
                    Some("All songs have been removed.".to_string()),
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to clear playlist");
                app.notify(
                    ToastKind::Error,
                    "Error clearing playlist",
                    Some("Could not clear the playlist.".to_string()),
                );
            }
        },
        None => {}
    }
}

fn handle_player_key<E: AudioEngine, S: KeyValueStore>(
    key: KeyEvent,
    app: &mut App,
    ctx: &mut Context<'_, E, S>,
) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('b')) {
        ctx.session.stop();
        ctx.state.pending_load = None;
        app.leave_player();
        refresh_library(app, ctx.store, false);
        return;
    }

    if app.loading {
        return;
    }

    let skip = Duration::from_millis(ctx.settings.audio.skip_ms);
    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') => {
            if !ctx.session.is_loaded() {
                // Stopped: start the same track over.
                if let Some(track) = app.now_playing.clone() {
                    request_playback(app, ctx, track);
                }
                return;
            }

            let was_playing = app.is_playing();
            if was_playing {
                ctx.session.pause();
                app.notify(ToastKind::Info, "Paused", None);
            } else {
                ctx.session.resume();
                app.notify(ToastKind::Info, "Playing", None);
            }
            sync_status(app, ctx);
            // Show the requested state even if the engine has not reported yet.
            if let Some(view) = app.playback.as_mut() {
                view.is_playing = !was_playing;
            }
        }
        KeyCode::Char('l') | KeyCode::Right => {
            ctx.session.skip_forward(skip);
            sync_status(app, ctx);
        }
        KeyCode::Char('h') | KeyCode::Left => {
            ctx.session.skip_backward(skip);
            sync_status(app, ctx);
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            let tenths = c.to_digit(10).unwrap_or(0);
            if let Some(duration) = app.playback.and_then(|s| s.duration) {
                ctx.session.seek_to(duration.mul_f64(f64::from(tenths) / 10.0));
                sync_status(app, ctx);
            }
        }
        KeyCode::Char('s') => {
            ctx.session.stop();
            app.playback = None;
        }
        _ => {}
    }
}

/// Copy the session's status into the view, unless a reload is queued.
fn sync_status<E: AudioEngine, S: KeyValueStore>(app: &mut App, ctx: &Context<'_, E, S>) {
    if ctx.state.pending_load.is_none() {
        app.playback = ctx.session.status();
    }
}

/// Switch to the player and queue `track` for loading on the next iteration.
fn request_playback<E: AudioEngine, S: KeyValueStore>(
    app: &mut App,
    ctx: &mut Context<'_, E, S>,
    track: Track,
) {
    app.open_player(track.clone());
    ctx.state.pending_load = Some(track);
}

/// Load `track` into the session and report the outcome.
pub fn start_playback<E: AudioEngine, S: KeyValueStore>(
    app: &mut App,
    ctx: &mut Context<'_, E, S>,
    track: Track,
) {
    let name = track.name.clone();
    let result = ctx
        .session
        .load(track, Some(finish_notifier(ctx.events_tx.clone(), name.clone())));
    app.loading = false;
    discard_queued_status(app, ctx);

    match result {
        Ok(status) => {
            app.playback = Some(status);
            app.notify(ToastKind::Info, "Now playing", Some(name));
        }
        Err(PlaybackError::EmptyLocator) => {
            app.playback = None;
            app.notify(
                ToastKind::Error,
                "Missing song file",
                Some("Cannot find audio source.".to_string()),
            );
        }
        Err(e) => {
            app.playback = None;
            app.notify(ToastKind::Error, "Error loading audio", Some(e.to_string()));
        }
    }
}

/// Drop status reports still queued from the sound `load` just released.
/// Anything else in the queue is applied as usual.
fn discard_queued_status<E: AudioEngine, S: KeyValueStore>(app: &mut App, ctx: &Context<'_, E, S>) {
    while let Ok(event) = ctx.events_rx.try_recv() {
        if !matches!(event, UiEvent::Status(_)) {
            handle_ui_event(event, app, ctx.session.is_loaded());
        }
    }
}

fn finish_notifier(tx: mpsc::Sender<UiEvent>, name: String) -> Observer {
    Arc::new(move |status: &PlaybackStatus| {
        if status.did_just_finish {
            let _ = tx.send(UiEvent::Finished { name: name.clone() });
        }
    })
}
