//! Process supervisor for `albumpaper run`.
//!
//! A session is one configuration snapshot: source, tracker, compositor,
//! worker and watchers are built from it and torn down together. `Restart`
//! (from the console or a config edit) ends the session and starts a fresh
//! one; `Quit` ends the process.

use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::config::{self, LoadedConfig, watch_config_file};
use crate::error::AlbumPaperError;
use crate::platform::{BatteryPower, SystemWallpaper, spawn_named_thread};
use crate::source::{HttpArtworkFetcher, HttpClient, build_source};
use crate::tracker::ArtworkChangeTracker;
use crate::wallpaper::processing::{ensure_dir, load_image};
use crate::wallpaper::{WallpaperCompositor, WallpaperManager};
use crate::worker::{
    self, Control, ExitReason, POWER_POLL_INTERVAL, PollLoop, WorkerHandle, watch_power,
};

/// How often the supervisor checks on the worker between console commands.
const SUPERVISOR_TICK: Duration = Duration::from_millis(200);

/// Runs sessions until `Quit`.
///
/// # Errors
///
/// Returns the error that stopped the worker, or a configuration error.
///
/// # Panics
///
/// Panics instead of returning a worker error when `debug` is set in the
/// configuration.
pub fn run(config_path: Option<&Path>) -> Result<(), AlbumPaperError> {
    let console = spawn_console_reader();

    loop {
        let loaded = config::load(config_path)?;
        let debug = loaded.config.debug;

        match run_session(&loaded, &console) {
            Ok(ExitReason::Restart) => {
                tracing::info!("restarting with fresh configuration");
            }
            Ok(ExitReason::Quit) => {
                tracing::info!("quitting");
                return Ok(());
            }
            Err(err) => {
                tracing::error!(error = %err, "session failed");
                if debug {
                    panic!("session failed: {err}");
                }
                return Err(err);
            }
        }
    }
}

/// Builds a session from `loaded` and forwards console commands to it until
/// the worker stops.
fn run_session(
    loaded: &LoadedConfig,
    console: &Receiver<Control>,
) -> Result<ExitReason, AlbumPaperError> {
    let worker = start_session(loaded)?;

    loop {
        if worker.is_finished() {
            return worker.join();
        }

        match console.recv_timeout(SUPERVISOR_TICK) {
            Ok(control) => {
                if worker.send(control).is_err() {
                    return worker.join();
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            // stdin closed; keep supervising without a console
            Err(RecvTimeoutError::Disconnected) => thread::sleep(SUPERVISOR_TICK),
        }
    }
}

/// Builds every component of a session and starts the worker.
///
/// # Errors
///
/// Returns an error if the credentials are invalid, the images directory or
/// default wallpaper cannot be created, or the worker cannot start.
pub fn start_session(loaded: &LoadedConfig) -> Result<WorkerHandle, AlbumPaperError> {
    let config = &loaded.config;
    let keys = loaded.api_keys();
    config.validate_service(&keys)?;

    ensure_dir(&loaded.images_dir())?;

    let client = HttpClient::new();
    let source = build_source(config, &keys, &client);

    let missing_artwork = loaded.missing_artwork_path().and_then(|path| {
        load_image(&path)
            .inspect_err(|err| tracing::warn!(error = %err, "failed to load missing-artwork image"))
            .ok()
    });
    let tracker =
        ArtworkChangeTracker::new(Box::new(HttpArtworkFetcher::new(client)), missing_artwork);

    let compositor = WallpaperCompositor::new(
        config.layer_config(),
        config.display.geometry(),
        loaded.default_wallpaper_path(),
    );
    let manager = WallpaperManager::new(
        compositor,
        Box::new(SystemWallpaper),
        loaded.generated_wallpaper_path(),
    );
    manager.ensure_default_wallpaper()?;

    tracing::info!(
        service = %config.service.name,
        style = %config.background.style,
        images = %loaded.images_dir().display(),
        "starting session"
    );

    let poll_loop = PollLoop::new(source, tracker, manager, config.request_interval());
    let worker = worker::spawn(poll_loop, config.start_paused)?;

    if config.power.pause_on_battery_saver {
        watch_power(BatteryPower::new(config.power.threshold), worker.sender(), POWER_POLL_INTERVAL);
    }

    if let Some(path) = loaded.path.clone() {
        let session = worker.sender();
        let sender = worker.sender();
        watch_config_file(path, move || !session.is_closed(), move || {
            tracing::info!("configuration changed");
            // One restart per session
            let _ = sender.blocking_send(Control::Restart);
            false
        });
    }

    Ok(worker)
}

/// Reads console commands from stdin on its own thread.
fn spawn_console_reader() -> Receiver<Control> {
    let (tx, rx) = mpsc::channel();

    spawn_named_thread("console", move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }

            match line.parse::<Control>() {
                Ok(control) => {
                    if tx.send(control).is_err() {
                        break;
                    }
                }
                Err(err) => tracing::warn!("{err}"),
            }
        }
        tracing::debug!("console closed");
    });

    rx
}
