use serde_json::Value;

use crate::library::Track;

use super::StorageError;
use super::kv::KeyValueStore;

pub const PLAYLIST_KEY: &str = "playlist";
pub const LAST_PLAYED_KEY: &str = "lastPlayed";

/// Result of reading the playlist back from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedPlaylist {
    pub tracks: Vec<Track>,
    /// Entries dropped because they were not valid tracks.
    pub removed: usize,
    /// The stored value was not a list and has been reset.
    pub reset: bool,
}

impl LoadedPlaylist {
    pub fn was_cleaned(&self) -> bool {
        self.removed > 0 || self.reset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added { count: usize },
    /// A track with the same locator is already in the playlist.
    Duplicate,
}

/// Playlist and "last played" persistence over a [`KeyValueStore`].
pub struct PlaylistStore<S> {
    store: S,
}

impl<S: KeyValueStore> PlaylistStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the playlist, writing back a cleaned copy when it held junk.
    pub fn load_playlist(&mut self) -> Result<LoadedPlaylist, StorageError> {
        let Some(raw) = self.store.get(PLAYLIST_KEY)? else {
            return Ok(LoadedPlaylist::default());
        };

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(_) | Err(_) => {
                tracing::warn!("stored playlist is not a list, resetting it");
                self.save_playlist(&[])?;
                return Ok(LoadedPlaylist {
                    reset: true,
                    ..LoadedPlaylist::default()
                });
            }
        };

        let total = entries.len();
        let tracks: Vec<Track> = entries
            .into_iter()
            .filter_map(|v| serde_json::from_value::<Track>(v).ok())
            .filter(Track::is_valid)
            .collect();

        let removed = total - tracks.len();
        if removed > 0 {
            tracing::info!(removed, "dropping invalid playlist entries");
            self.save_playlist(&tracks)?;
        }

        Ok(LoadedPlaylist {
            tracks,
            removed,
            reset: false,
        })
    }

    pub fn playlist_count(&mut self) -> Result<usize, StorageError> {
        Ok(self.load_playlist()?.tracks.len())
    }

    /// Append `track` unless its locator is already present; it becomes last played.
    pub fn add_track(&mut self, track: &Track) -> Result<AddOutcome, StorageError> {
        let mut tracks = self.load_playlist()?.tracks;

        if tracks.iter().any(|t| t.locator == track.locator) {
            return Ok(AddOutcome::Duplicate);
        }

        tracks.push(track.clone());
        self.save_playlist(&tracks)?;
        self.set_last_played(track)?;

        tracing::info!(id = %track.id, name = %track.name, "track added to playlist");
        Ok(AddOutcome::Added {
            count: tracks.len(),
        })
    }

    /// Remove the track with `id` and repoint "last played" if it was that track.
    pub fn remove_track(&mut self, id: &str) -> Result<Vec<Track>, StorageError> {
        let mut tracks = self.load_playlist()?.tracks;
        tracks.retain(|t| t.id != id);
        self.save_playlist(&tracks)?;

        if self.last_played()?.is_some_and(|t| t.id == id) {
            match tracks.first() {
                Some(first) => self.set_last_played(first)?,
                None => self.store.remove(LAST_PLAYED_KEY)?,
            }
        }

        Ok(tracks)
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.save_playlist(&[])?;
        self.store.remove(LAST_PLAYED_KEY)
    }

    /// The last played track, if stored and valid. Junk is removed.
    pub fn last_played(&mut self) -> Result<Option<Track>, StorageError> {
        let Some(raw) = self.store.get(LAST_PLAYED_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<Track>(&raw) {
            Ok(track) if track.is_valid() => Ok(Some(track)),
            _ => {
                tracing::warn!("stored last played track is invalid, removing it");
                self.store.remove(LAST_PLAYED_KEY)?;
                Ok(None)
            }
        }
    }

    pub fn set_last_played(&mut self, track: &Track) -> Result<(), StorageError> {
        let json = serde_json::to_string(track)?;
        self.store.set(LAST_PLAYED_KEY, &json)
    }

    fn save_playlist(&mut self, tracks: &[Track]) -> Result<(), StorageError> {
        let json = serde_json::to_string(tracks)?;
        self.store.set(PLAYLIST_KEY, &json)
    }

    #[cfg(test)]
    pub fn inner(&self) -> &S {
        &self.store
    }
}
