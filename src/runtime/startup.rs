use crate::app::{App, ToastKind};
use crate::storage::{KeyValueStore, PlaylistStore};

/// Pull the playlist and "last played" from storage into `app`.
///
/// With `announce`, a cleaned or reset playlist is reported to the user.
pub fn refresh_library<S: KeyValueStore>(
    app: &mut App,
    store: &mut PlaylistStore<S>,
    announce: bool,
) {
    match store.load_playlist() {
        Ok(loaded) => {
            if announce && loaded.was_cleaned() {
                app.notify(
                    ToastKind::Info,
                    "Playlist cleaned",
                    Some("Removed invalid songs".to_string()),
                );
            }
            app.set_playlist(loaded.tracks);
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load playlist");
            app.set_playlist(Vec::new());
            if announce {
                app.notify(
                    ToastKind::Error,
                    "Error loading playlist",
                    Some("Could not load your songs".to_string()),
                );
            }
        }
    }

    app.last_played = match store.last_played() {
        Ok(track) => track,
        Err(e) => {
            tracing::error!(error = %e, "failed to load last played track");
            None
        }
    };
}
