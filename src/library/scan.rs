use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::strip_extension;

/// A candidate file offered by the picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerEntry {
    pub path: PathBuf,
    /// File name without extension, as it will appear in the playlist.
    pub name: String,
    pub size: u64,
}

impl PickerEntry {
    pub fn too_large(&self, settings: &LibrarySettings) -> bool {
        self.size > settings.max_file_size_bytes()
    }
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// List the audio files under `dir` that the picker may offer.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<PickerEntry> {
    let mut entries: Vec<PickerEntry> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if !path.is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(strip_extension)
            .unwrap_or("UNKNOWN")
            .to_string();
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

        entries.push(PickerEntry {
            path: path.to_path_buf(),
            name,
            size,
        });
    }

    entries.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    tracing::debug!(dir = %dir.display(), found = entries.len(), "scanned picker directory");
    entries
}
