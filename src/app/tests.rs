use super::*;
use crate::audio::PlaybackStatus;
use crate::library::Track;
use std::path::PathBuf;
use std::time::{Duration, Instant};

fn t(id: &str) -> Track {
    Track {
        id: id.into(),
        name: format!("Song {id}"),
        locator: format!("file:///{id}.mp3"),
        date_added: None,
    }
}

fn app() -> App {
    App::new(PathBuf::from("/music"))
}

#[test]
fn next_prev_wrap_around() {
    let mut app = app();
    app.set_playlist(vec![t("1"), t("2"), t("3")]);

    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.next();
    assert_eq!(app.selected_track().unwrap().id, "2");
}

#[test]
fn navigation_on_empty_playlist_stays_at_zero() {
    let mut app = app();
    app.next();
    app.prev();
    assert_eq!(app.selected, 0);
    assert!(app.selected_track().is_none());
}

#[test]
fn set_playlist_clamps_selection() {
    let mut app = app();
    app.set_playlist(vec![t("1"), t("2"), t("3")]);
    app.selected = 2;

    app.set_playlist(vec![t("1")]);
    assert_eq!(app.selected, 0);
}

#[test]
fn player_returns_to_the_screen_that_opened_it() {
    let mut app = app();
    app.screen = Screen::Playlist;

    app.open_player(t("1"));
    assert_eq!(app.screen, Screen::Player);
    assert!(app.loading);

    // Reloading from inside the player keeps the original return target.
    app.open_player(t("2"));
    app.leave_player();
    assert_eq!(app.screen, Screen::Playlist);
    assert!(app.now_playing.is_none());
    assert!(app.playback.is_none());
}

#[test]
fn is_playing_reads_the_last_status() {
    let mut app = app();
    assert!(!app.is_playing());

    app.playback = Some(PlaybackStatus {
        is_playing: true,
        ..PlaybackStatus::default()
    });
    assert!(app.is_playing());
}

#[test]
fn toast_expires_after_ttl() {
    let mut app = app();
    app.notify(ToastKind::Info, "Paused", None);
    let shown = app.toast.as_ref().unwrap().shown_at;

    app.expire_toast(shown + Duration::from_millis(100), Duration::from_millis(500));
    assert!(app.toast.is_some());

    app.expire_toast(shown + Duration::from_millis(500), Duration::from_millis(500));
    assert!(app.toast.is_none());

    app.expire_toast(Instant::now(), Duration::ZERO);
    assert!(app.toast.is_none());
}

#[test]
fn delete_and_clear_requests_need_something_to_act_on() {
    let mut app = app();
    app.request_delete();
    app.request_clear();
    assert!(app.confirm.is_none());

    app.set_playlist(vec![t("1"), t("2")]);
    app.next();
    app.request_delete();
    assert_eq!(
        app.confirm,
        Some(Confirm::DeleteTrack {
            id: "2".into(),
            name: "Song 2".into()
        })
    );

    app.request_clear();
    assert_eq!(app.confirm, Some(Confirm::ClearPlaylist));
}

#[test]
fn picker_entries_reset_cursor() {
    let mut app = app();
    let entry = |name: &str| crate::library::PickerEntry {
        path: PathBuf::from(format!("/music/{name}.mp3")),
        name: name.into(),
        size: 1,
    };
    app.set_picker_entries(vec![entry("a"), entry("b")]);
    app.picker_prev();
    assert_eq!(app.selected_entry().unwrap().name, "b");

    app.set_picker_entries(vec![entry("c")]);
    assert_eq!(app.picker_selected, 0);
}
