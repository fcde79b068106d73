use thiserror::Error;

/// Failures reported by an [`AudioEngine`](super::AudioEngine) or one of its sounds.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unsupported locator: {0}")]
    UnsupportedLocator(String),

    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("audio output unavailable: {0}")]
    Output(String),

    #[error("seek failed: {0}")]
    Seek(String),

    #[error("sound already released")]
    Released,
}

/// Errors surfaced by the playback session to its caller.
///
/// Only acquisition failures reach the caller; transport failures are logged
/// and swallowed by the session.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("track has no locator")]
    EmptyLocator,

    #[error("failed to load {locator}: {source}")]
    Acquire {
        locator: String,
        #[source]
        source: EngineError,
    },
}
