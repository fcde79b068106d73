//! Audio playback.
//!
//! [`PlaybackSession`] owns the one live sound and exposes transport controls;
//! [`AudioEngine`] is the seam to the decoder/output, with [`RodioEngine`] as
//! the production implementation.

mod engine;
mod error;
mod rodio_engine;
mod session;
mod sink;
mod types;

pub use engine::{AcquireOptions, AudioEngine, EngineStatus, SoundResource, StatusCallback};
pub use error::{EngineError, PlaybackError};
pub use rodio_engine::RodioEngine;
pub use session::{PlaybackSession, Subscription};
pub use types::{DEFAULT_SKIP, Observer, PlaybackStatus};
