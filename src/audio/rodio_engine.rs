//! [`AudioEngine`] backed by `rodio`.
//!
//! Each acquired sound owns a `Sink` on the shared output stream and a small
//! status thread that reports progress at a fixed interval.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};

use super::engine::{AcquireOptions, AudioEngine, EngineStatus, SoundResource, StatusCallback};
use super::error::EngineError;
use super::sink::{locator_to_path, open_source, probe_duration};

pub struct RodioEngine {
    stream: OutputStream,
    status_interval: Duration,
}

impl RodioEngine {
    /// Open the default output device.
    pub fn open_default(status_interval: Duration) -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::Output(e.to_string()))?;
        // rodio logs to stderr when the stream is dropped, which would land on
        // top of the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            status_interval,
        })
    }
}

impl AudioEngine for RodioEngine {
    type Sound = RodioSound;

    fn acquire(
        &self,
        locator: &str,
        options: AcquireOptions,
        on_status: StatusCallback,
    ) -> Result<RodioSound, EngineError> {
        let path = locator_to_path(locator)?;
        let source = open_source(&path)?;
        let duration = source.total_duration().or_else(|| probe_duration(&path));

        let sink = Sink::connect_new(self.stream.mixer());
        if !options.autoplay {
            sink.pause();
        }
        sink.append(source);

        let state = Arc::new(SoundState {
            sink,
            path,
            duration,
            halted: AtomicBool::new(false),
            finish_reported: AtomicBool::new(false),
        });
        let on_status: SharedCallback = Arc::from(on_status);
        let ticker = Ticker::spawn(state.clone(), self.status_interval, on_status.clone())?;

        tracing::debug!(locator, ?duration, "rodio sound acquired");
        Ok(RodioSound {
            state,
            on_status,
            ticker: Some(ticker),
        })
    }
}

struct SoundState {
    sink: Sink,
    path: PathBuf,
    duration: Option<Duration>,
    /// Emptied on purpose by `stop`, not by reaching the end.
    halted: AtomicBool,
    finish_reported: AtomicBool,
}

impl SoundState {
    fn snapshot(&self, report_finish: bool) -> EngineStatus {
        let empty = self.sink.empty();
        let did_just_finish = report_finish
            && empty
            && !self.halted.load(Ordering::SeqCst)
            && !self.finish_reported.swap(true, Ordering::SeqCst);

        EngineStatus {
            position: if empty {
                Duration::ZERO
            } else {
                self.sink.get_pos()
            },
            duration: self.duration,
            is_playing: !empty && !self.sink.is_paused(),
            is_loaded: true,
            did_just_finish,
        }
    }
}

type SharedCallback = Arc<dyn Fn(EngineStatus) + Send + Sync + 'static>;

pub struct RodioSound {
    state: Arc<SoundState>,
    /// Same callback the ticker uses; transport calls report through it at once.
    on_status: SharedCallback,
    ticker: Option<Ticker>,
}

impl RodioSound {
    fn live(&self) -> Result<&SoundState, EngineError> {
        if self.ticker.is_none() {
            return Err(EngineError::Released);
        }
        Ok(&self.state)
    }

    /// Push a fresh snapshot instead of waiting for the next tick.
    fn report(&self) {
        if self.ticker.is_some() {
            (self.on_status)(self.state.snapshot(false));
        }
    }

    fn shutdown(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        self.state.sink.stop();
    }
}

impl SoundResource for RodioSound {
    fn play(&mut self) -> Result<(), EngineError> {
        let state = self.live()?;
        // A finished or stopped sink has nothing queued; start over.
        if state.sink.empty() {
            let source = open_source(&state.path)?;
            state.sink.append(source);
            state.halted.store(false, Ordering::SeqCst);
            state.finish_reported.store(false, Ordering::SeqCst);
        }
        state.sink.play();
        self.report();
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.live()?.sink.pause();
        self.report();
        Ok(())
    }

    fn stop(&mut self) -> Result<(), EngineError> {
        let state = self.live()?;
        state.halted.store(true, Ordering::SeqCst);
        state.sink.stop();
        Ok(())
    }

    fn seek_to(&mut self, position: Duration) -> Result<(), EngineError> {
        let state = self.live()?;
        if state.sink.empty() {
            return Err(EngineError::Seek("nothing queued".to_string()));
        }
        state
            .sink
            .try_seek(position)
            .map_err(|e| EngineError::Seek(e.to_string()))?;
        self.report();
        Ok(())
    }

    fn status(&self) -> Result<EngineStatus, EngineError> {
        Ok(self.live()?.snapshot(false))
    }

    fn release(mut self) -> Result<(), EngineError> {
        self.shutdown();
        Ok(())
    }
}

impl Drop for RodioSound {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Periodic status reporter for one sound.
struct Ticker {
    stop_tx: Sender<()>,
    join: JoinHandle<()>,
}

impl Ticker {
    fn spawn(
        state: Arc<SoundState>,
        interval: Duration,
        on_status: SharedCallback,
    ) -> Result<Self, EngineError> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let join = thread::Builder::new()
            .name("cadenza-status".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => on_status(state.snapshot(true)),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(|e| EngineError::Output(e.to_string()))?;

        Ok(Self { stop_tx, join })
    }

    /// Stop reporting and wait for the thread, so no callback outlives release.
    fn stop(self) {
        let _ = self.stop_tx.send(());
        if self.join.join().is_err() {
            tracing::warn!("status thread panicked");
        }
    }
}
