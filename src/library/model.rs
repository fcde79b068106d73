use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// A single playable audio item.
///
/// Identity is `id`; playlists deduplicate on `locator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// `file://` URL or plain filesystem path.
    #[serde(default, alias = "uri")]
    pub locator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<DateTime<Utc>>,
}

impl Track {
    /// Build a new track for a local file, stamped with a fresh id and `now`.
    pub fn from_path(path: &Path) -> Self {
        let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let locator = Url::from_file_path(&absolute)
            .map(String::from)
            .unwrap_or_else(|_| absolute.display().to_string());

        let name = absolute
            .file_name()
            .and_then(|s| s.to_str())
            .map(strip_extension)
            .unwrap_or("UNKNOWN")
            .to_string();

        Self {
            id: new_track_id(),
            name,
            locator,
            date_added: Some(Utc::now()),
        }
    }

    /// A track is usable only when it carries an id, a name and a locator.
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.name.trim().is_empty() && !self.locator.trim().is_empty()
    }
}

/// `<unix-millis>_<9 hex chars>`, unique enough for a hand-built playlist.
pub(crate) fn new_track_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", millis, &random[..9])
}

/// Drop the final `.ext` of a file name; dotfiles keep their name.
pub(crate) fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(i) => &file_name[..i],
    }
}
