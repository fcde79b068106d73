//! The playback session: owner of the single live sound resource.
//!
//! All transport operations go through [`PlaybackSession`]. At most one sound is
//! alive at a time; loading a track first releases the previous one. Engine
//! status reports are folded into a tracked [`PlaybackStatus`] and fanned out
//! to subscribers.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use crate::library::Track;

use super::engine::{AcquireOptions, AudioEngine, EngineStatus, SoundResource, StatusCallback};
use super::error::{EngineError, PlaybackError};
use super::types::{Observer, PlaybackStatus};

/// State reachable from engine callbacks.
#[derive(Default)]
struct Shared {
    /// Bumped on every load and release; callbacks from older sounds are dropped.
    generation: u64,
    status: Option<PlaybackStatus>,
    /// Observer registered through `load`. Latest registration wins.
    load_observer: Option<Observer>,
    subscribers: Vec<(u64, Observer)>,
    next_subscriber: u64,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Loaded<S> {
    track: Track,
    sound: S,
}

pub struct PlaybackSession<E: AudioEngine> {
    engine: E,
    options: AcquireOptions,
    current: Option<Loaded<E::Sound>>,
    shared: Arc<Mutex<Shared>>,
}

impl<E: AudioEngine> PlaybackSession<E> {
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, AcquireOptions::default())
    }

    pub fn with_options(engine: E, options: AcquireOptions) -> Self {
        Self {
            engine,
            options,
            current: None,
            shared: Arc::new(Mutex::new(Shared::default())),
        }
    }

    /// Release whatever is loaded, then acquire `track` and start it.
    ///
    /// `on_status` replaces the previously registered load observer. On failure
    /// nothing is loaded afterwards.
    pub fn load(
        &mut self,
        track: Track,
        on_status: Option<Observer>,
    ) -> Result<PlaybackStatus, PlaybackError> {
        self.release_current();

        let generation = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            shared.status = None;
            shared.load_observer = on_status;
            shared.generation
        };

        if track.locator.trim().is_empty() {
            lock(&self.shared).load_observer = None;
            return Err(PlaybackError::EmptyLocator);
        }

        let callback = status_callback(Arc::downgrade(&self.shared), generation);
        let sound = match self.engine.acquire(&track.locator, self.options, callback) {
            Ok(sound) => sound,
            Err(source) => {
                tracing::error!(locator = %track.locator, error = %source, "failed to load track");
                let mut shared = lock(&self.shared);
                shared.generation += 1;
                shared.status = None;
                shared.load_observer = None;
                return Err(PlaybackError::Acquire {
                    locator: track.locator,
                    source,
                });
            }
        };

        let initial = match sound.status() {
            Ok(status) => PlaybackStatus::from_engine(status),
            Err(e) => {
                tracing::warn!(error = %e, "no initial status from engine");
                PlaybackStatus {
                    is_playing: self.options.autoplay,
                    ..PlaybackStatus::default()
                }
            }
        };
        lock(&self.shared).status.get_or_insert(initial);

        tracing::info!(id = %track.id, name = %track.name, "track loaded");
        self.current = Some(Loaded { track, sound });
        Ok(initial)
    }

    pub fn pause(&mut self) {
        self.transport("pause", SoundResource::pause);
    }

    pub fn resume(&mut self) {
        self.transport("resume", SoundResource::play);
    }

    /// Stop and release the current sound. Nothing is loaded afterwards, even
    /// when the engine fails to release.
    pub fn stop(&mut self) {
        if self.current.is_none() {
            return;
        }
        self.release_current();
        lock(&self.shared).load_observer = None;
    }

    /// Move to `position`. The caller keeps it within the track.
    pub fn seek_to(&mut self, position: Duration) {
        self.transport("seek", |sound| sound.seek_to(position));
    }

    /// Seek `delta` past the tracked position, capped at the track length.
    /// Does nothing while the length is unknown.
    pub fn skip_forward(&mut self, delta: Duration) {
        let Some(status) = self.status() else {
            return;
        };
        match status.skip_forward_target(delta) {
            Some(target) => self.seek_to(target),
            None => tracing::debug!("skip forward ignored, duration unknown"),
        }
    }

    /// Seek `delta` before the tracked position, floored at zero.
    pub fn skip_backward(&mut self, delta: Duration) {
        let Some(status) = self.status() else {
            return;
        };
        self.seek_to(status.skip_backward_target(delta));
    }

    /// Last known status, or `None` when nothing is loaded.
    pub fn status(&self) -> Option<PlaybackStatus> {
        self.current.as_ref()?;
        lock(&self.shared).status
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref().map(|loaded| &loaded.track)
    }

    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// Receive every status snapshot until the returned handle is dropped.
    pub fn subscribe(&self, observer: Observer) -> Subscription {
        let mut shared = lock(&self.shared);
        let id = shared.next_subscriber;
        shared.next_subscriber += 1;
        shared.subscribers.push((id, observer));
        Subscription {
            id,
            shared: Arc::downgrade(&self.shared),
        }
    }

    fn transport(
        &mut self,
        op: &'static str,
        f: impl FnOnce(&mut E::Sound) -> Result<(), EngineError>,
    ) {
        let Some(loaded) = self.current.as_mut() else {
            return;
        };
        if let Err(e) = f(&mut loaded.sound) {
            tracing::warn!(op, track = %loaded.track.name, error = %e, "transport operation failed");
        }
    }

    fn release_current(&mut self) {
        let Some(Loaded { track, mut sound }) = self.current.take() else {
            return;
        };

        {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            shared.status = None;
        }

        // The shared lock must not be held here: releasing may wait for the
        // engine's status thread, which takes it.
        if let Err(e) = sound.stop() {
            tracing::warn!(track = %track.name, error = %e, "failed to stop sound");
        }
        if let Err(e) = sound.release() {
            tracing::warn!(track = %track.name, error = %e, "failed to release sound");
        }
        tracing::debug!(id = %track.id, "sound released");
    }
}

impl<E: AudioEngine> Drop for PlaybackSession<E> {
    fn drop(&mut self) {
        self.release_current();
    }
}

fn status_callback(shared: Weak<Mutex<Shared>>, generation: u64) -> StatusCallback {
    Box::new(move |status: EngineStatus| {
        if let Some(shared) = shared.upgrade() {
            deliver(&shared, generation, status);
        }
    })
}

fn deliver(shared: &Mutex<Shared>, generation: u64, engine_status: EngineStatus) {
    if !engine_status.is_loaded {
        return;
    }

    let (status, observers) = {
        let mut guard = lock(shared);
        if guard.generation != generation {
            return;
        }
        let status = PlaybackStatus::from_engine(engine_status);
        guard.status = Some(status);

        let mut observers: Vec<Observer> =
            guard.subscribers.iter().map(|(_, o)| o.clone()).collect();
        observers.extend(guard.load_observer.clone());
        (status, observers)
    };

    // Observers run unlocked so they may unsubscribe from inside the callback.
    for observer in observers {
        observer(&status);
    }
}

/// Handle returned by [`PlaybackSession::subscribe`].
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    shared: Weak<Mutex<Shared>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            lock(&shared).subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}
