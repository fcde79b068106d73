use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cadenza/config.toml` or `~/.config/cadenza/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CADENZA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub library: LibrarySettings,
    pub storage: StorageSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Milliseconds moved by skip-forward / skip-backward.
    pub skip_ms: u64,
    /// How often the engine reports playback status (milliseconds).
    pub status_interval_ms: u64,
    /// Start playing as soon as a track is loaded.
    pub autoplay: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            skip_ms: crate::audio::DEFAULT_SKIP.as_millis() as u64,
            status_interval_ms: 500,
            autoplay: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Directory the file picker starts in. The first CLI argument wins over this.
    pub root: Option<PathBuf>,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
    /// Files larger than this are refused by the picker.
    pub max_file_size_mb: u64,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            root: None,
            extensions: vec![
                "mp3".into(),
                "flac".into(),
                "wav".into(),
                "ogg".into(),
                "m4a".into(),
            ],
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
            max_file_size_mb: 100,
        }
    }
}

impl LibrarySettings {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Location of the key-value store file. Defaults to `<data dir>/storage.json`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// How long a notification stays on screen (milliseconds).
    pub toast_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ cadenza ~ ".to_string(),
            toast_ms: 2500,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// `tracing` filter directive, overridden by `CADENZA_LOG`.
    pub filter: String,
    /// Log file. Defaults to `<data dir>/cadenza.log`.
    pub path: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "cadenza=info".to_string(),
            path: None,
        }
    }
}
