//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the playlist, the active
//! screen, notifications and the playback state shown on the player.

mod model;

pub use model::*;

#[cfg(test)]
mod tests;
