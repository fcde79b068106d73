//! Local persistence: a string key-value store and the playlist repository
//! built on top of it.

mod kv;
mod playlist;

pub use kv::{JsonFileStore, KeyValueStore};
pub use playlist::{AddOutcome, LoadedPlaylist, PlaylistStore};

#[cfg(test)]
pub use kv::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests;
