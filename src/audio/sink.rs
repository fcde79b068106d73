//! Utilities for turning track locators into `rodio` sources.
//!
//! The helpers here encapsulate resolving a locator to a local path, opening
//! and decoding the file, and probing its length when the decoder cannot.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::Decoder;
use url::Url;

use super::error::EngineError;

pub(super) type FileSource = Decoder<BufReader<File>>;

/// Accepts `file://` URLs and plain paths.
pub(crate) fn locator_to_path(locator: &str) -> Result<PathBuf, EngineError> {
    if locator.starts_with("file:") {
        let url =
            Url::parse(locator).map_err(|_| EngineError::UnsupportedLocator(locator.to_string()))?;
        return url
            .to_file_path()
            .map_err(|_| EngineError::UnsupportedLocator(locator.to_string()));
    }
    if locator.contains("://") {
        return Err(EngineError::UnsupportedLocator(locator.to_string()));
    }
    Ok(PathBuf::from(locator))
}

/// Open and decode `path` from the beginning.
pub(super) fn open_source(path: &Path) -> Result<FileSource, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::Open {
        path: path.display().to_string(),
        source,
    })?;

    Decoder::new(BufReader::new(file)).map_err(|e| EngineError::Decode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Read the length from the file's metadata. Used when the decoder cannot
/// tell (VBR mp3 without a header, for instance).
pub(super) fn probe_duration(path: &Path) -> Option<Duration> {
    match lofty::read_from_path(path) {
        Ok(tagged) => Some(tagged.properties().duration()).filter(|d| !d.is_zero()),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "duration probe failed");
            None
        }
    }
}
