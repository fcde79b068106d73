//! Application model types: `App`, `Screen` and notifications.
//!
//! The `App` struct holds the playlist, the current screen and the view copy
//! of playback state used by the UI and runtime.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::audio::PlaybackStatus;
use crate::library::{PickerEntry, Track};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Picker,
    Playlist,
    Player,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

/// A short-lived notice shown above the footer.
#[derive(Clone, Debug)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub detail: Option<String>,
    pub shown_at: Instant,
}

/// A destructive action waiting for y/n.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Confirm {
    DeleteTrack { id: String, name: String },
    ClearPlaylist,
}

/// The main application model.
pub struct App {
    pub screen: Screen,
    /// Where `back` from the player goes.
    pub player_return: Screen,

    pub playlist: Vec<Track>,
    pub selected: usize,
    pub last_played: Option<Track>,

    pub now_playing: Option<Track>,
    pub playback: Option<PlaybackStatus>,
    /// A load is in flight; transport keys are ignored.
    pub loading: bool,

    pub picker_dir: PathBuf,
    pub picker_entries: Vec<PickerEntry>,
    pub picker_selected: usize,

    pub toast: Option<Toast>,
    pub confirm: Option<Confirm>,
}

impl App {
    /// Create a new `App` whose picker browses `picker_dir`.
    pub fn new(picker_dir: PathBuf) -> Self {
        Self {
            screen: Screen::Home,
            player_return: Screen::Home,

            playlist: Vec::new(),
            selected: 0,
            last_played: None,

            now_playing: None,
            playback: None,
            loading: false,

            picker_dir,
            picker_entries: Vec::new(),
            picker_selected: 0,

            toast: None,
            confirm: None,
        }
    }

    /// Replace the playlist, keeping the cursor in range.
    pub fn set_playlist(&mut self, tracks: Vec<Track>) {
        self.playlist = tracks;
        if self.selected >= self.playlist.len() {
            self.selected = self.playlist.len().saturating_sub(1);
        }
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.playlist.get(self.selected)
    }

    /// Move selection to the next track, wrapping around.
    pub fn next(&mut self) {
        self.selected = wrap_next(self.selected, self.playlist.len());
    }

    /// Move selection to the previous track, wrapping around.
    pub fn prev(&mut self) {
        self.selected = wrap_prev(self.selected, self.playlist.len());
    }

    pub fn set_picker_entries(&mut self, entries: Vec<PickerEntry>) {
        self.picker_entries = entries;
        self.picker_selected = 0;
    }

    pub fn selected_entry(&self) -> Option<&PickerEntry> {
        self.picker_entries.get(self.picker_selected)
    }

    pub fn picker_next(&mut self) {
        self.picker_selected = wrap_next(self.picker_selected, self.picker_entries.len());
    }

    pub fn picker_prev(&mut self) {
        self.picker_selected = wrap_prev(self.picker_selected, self.picker_entries.len());
    }

    /// Switch to the player for `track`, remembering where we came from.
    pub fn open_player(&mut self, track: Track) {
        if self.screen != Screen::Player {
            self.player_return = self.screen;
        }
        self.now_playing = Some(track);
        self.playback = None;
        self.loading = true;
        self.screen = Screen::Player;
    }

    /// Leave the player and forget the view copy of playback state.
    pub fn leave_player(&mut self) {
        self.screen = self.player_return;
        self.now_playing = None;
        self.playback = None;
        self.loading = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_some_and(|s| s.is_playing)
    }

    pub fn notify(&mut self, kind: ToastKind, title: impl Into<String>, detail: Option<String>) {
        self.toast = Some(Toast {
            kind,
            title: title.into(),
            detail,
            shown_at: Instant::now(),
        });
    }

    /// Drop the toast once it has been visible for `ttl`.
    pub fn expire_toast(&mut self, now: Instant, ttl: Duration) {
        if self
            .toast
            .as_ref()
            .is_some_and(|t| now.saturating_duration_since(t.shown_at) >= ttl)
        {
            self.toast = None;
        }
    }

    /// Ask to delete the selected track.
    pub fn request_delete(&mut self) {
        if let Some(track) = self.selected_track() {
            self.confirm = Some(Confirm::DeleteTrack {
                id: track.id.clone(),
                name: track.name.clone(),
            });
        }
    }

    /// Ask to clear the playlist. Nothing to ask when it is already empty.
    pub fn request_clear(&mut self) {
        if !self.playlist.is_empty() {
            self.confirm = Some(Confirm::ClearPlaylist);
        }
    }
}

fn wrap_next(current: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (current + 1) % len }
}

fn wrap_prev(current: usize, len: usize) -> usize {
    match (current, len) {
        (_, 0) => 0,
        (0, len) => len - 1,
        (c, _) => c - 1,
    }
}
