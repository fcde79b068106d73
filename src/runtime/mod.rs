use std::env;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, ToastKind};
use crate::audio::{AcquireOptions, PlaybackSession, RodioEngine};
use crate::logging;
use crate::storage::{JsonFileStore, PlaylistStore};

mod event_loop;
mod settings;
mod startup;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--print-config") {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    match settings.log_path() {
        Some(path) => {
            if let Err(e) = logging::init(&settings.log, &path) {
                eprintln!("cadenza: logging disabled: {e}");
            }
        }
        None => eprintln!("cadenza: no data directory, logging disabled"),
    }
    if let Some(reason) = config_warning {
        tracing::warn!(%reason, "using default settings");
    }

    let picker_dir = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .or_else(|| settings.library.root.clone())
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let store_path = settings
        .storage_path()
        .ok_or("cannot determine where to keep the playlist; set storage.path")?;
    let store = JsonFileStore::open(store_path)?;
    tracing::info!(path = %store.path().display(), "opened store");
    let mut store = PlaylistStore::new(store);

    let engine = RodioEngine::open_default(Duration::from_millis(settings.audio.status_interval_ms))?;
    let mut session = PlaybackSession::with_options(
        engine,
        AcquireOptions {
            autoplay: settings.audio.autoplay,
        },
    );

    let (events_tx, events_rx) = mpsc::channel::<event_loop::UiEvent>();
    let _subscription = session.subscribe(event_loop::status_forwarder(events_tx.clone()));

    let mut app = App::new(picker_dir);
    startup::refresh_library(&mut app, &mut store, true);
    if app.toast.is_none() && app.playlist.is_empty() {
        app.notify(ToastKind::Info, "Welcome", Some("Press [a] to add a song.".to_string()));
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = {
        let mut ctx = event_loop::Context {
            settings: &settings,
            session: &mut session,
            store: &mut store,
            events_tx: &events_tx,
            events_rx: &events_rx,
            state: &mut state,
        };
        event_loop::run(&mut terminal, &mut app, &mut ctx)
    };

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("shutting down");
    run_result
}
