//! File-backed `tracing` setup. The terminal belongs to the UI, so nothing is
//! ever logged to stdout or stderr once the app is running.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;

/// Install the global subscriber, appending to `path`.
///
/// `CADENZA_LOG` overrides the configured filter.
pub fn init(settings: &LogSettings, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env("CADENZA_LOG")
        .unwrap_or_else(|_| EnvFilter::new(&settings.filter));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| e as Box<dyn std::error::Error>)?;
    Ok(())
}
