//! The seam between the playback session and whatever decodes and outputs audio.

use std::time::Duration;

use super::error::EngineError;

/// Point-in-time report pushed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStatus {
    pub position: Duration,
    /// Unknown for some streams until decoding has progressed.
    pub duration: Option<Duration>,
    pub is_playing: bool,
    pub is_loaded: bool,
    /// Set on the one report that follows the end of the stream.
    pub did_just_finish: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireOptions {
    pub autoplay: bool,
}

impl Default for AcquireOptions {
    fn default() -> Self {
        Self { autoplay: true }
    }
}

/// Invoked by the engine at its own cadence, possibly from another thread.
pub type StatusCallback = Box<dyn Fn(EngineStatus) + Send + Sync + 'static>;

pub trait AudioEngine {
    type Sound: SoundResource;

    /// Open and decode `locator`, returning a live sound resource.
    fn acquire(
        &self,
        locator: &str,
        options: AcquireOptions,
        on_status: StatusCallback,
    ) -> Result<Self::Sound, EngineError>;
}

/// One decoded-audio resource.
pub trait SoundResource {
    fn play(&mut self) -> Result<(), EngineError>;
    fn pause(&mut self) -> Result<(), EngineError>;
    fn stop(&mut self) -> Result<(), EngineError>;
    fn seek_to(&mut self, position: Duration) -> Result<(), EngineError>;
    fn status(&self) -> Result<EngineStatus, EngineError>;
    /// Free the resource. No callbacks are delivered after this returns.
    fn release(self) -> Result<(), EngineError>;
}
