//! Audio-related small types and handles.
//!
//! This module defines the status snapshot the session tracks for its
//! current track and the observer handle UI code registers to receive it.

use std::sync::Arc;
use std::time::Duration;

use super::engine::EngineStatus;

/// Skip distance used when the caller does not configure one.
pub const DEFAULT_SKIP: Duration = Duration::from_millis(10_000);

/// Last known playback status of the loaded track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackStatus {
    /// Playback position within the track.
    pub position: Duration,
    /// Total length of the track, if the engine knows it.
    pub duration: Option<Duration>,
    /// Whether audio is currently coming out.
    pub is_playing: bool,
    /// The track reached its end on this update. Position has already been
    /// rewound to zero.
    pub did_just_finish: bool,
}

impl PlaybackStatus {
    /// Fold an engine report into the tracked snapshot.
    pub(super) fn from_engine(status: EngineStatus) -> Self {
        if status.did_just_finish {
            Self {
                position: Duration::ZERO,
                duration: status.duration,
                is_playing: false,
                did_just_finish: true,
            }
        } else {
            Self {
                position: status.position,
                duration: status.duration,
                is_playing: status.is_playing,
                did_just_finish: false,
            }
        }
    }

    /// Position reached by skipping `delta` forward; `None` when the length
    /// is unknown.
    pub fn skip_forward_target(&self, delta: Duration) -> Option<Duration> {
        let duration = self.duration?;
        Some(self.position.saturating_add(delta).min(duration))
    }

    /// Position reached by skipping `delta` backward, floored at zero.
    pub fn skip_backward_target(&self, delta: Duration) -> Duration {
        self.position.saturating_sub(delta)
    }

    /// Fraction of the track played, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        match self.duration {
            Some(d) if !d.is_zero() => {
                (self.position.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }
}

/// Receives read-only status snapshots.
pub type Observer = Arc<dyn Fn(&PlaybackStatus) + Send + Sync + 'static>;
