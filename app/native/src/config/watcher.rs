//! Configuration file watcher.
//!
//! Settings are an immutable snapshot per session, so a change to the active
//! configuration file triggers a restart of the poller instead of a reload.

use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::platform::spawn_named_thread;

/// Debounce duration for config file changes.
/// Some editors trigger multiple events per save (write to temp, rename, etc.).
const CONFIG_DEBOUNCE_MS: u64 = 200;

/// How often the watcher checks `is_active` while no events arrive.
const ACTIVE_CHECK_INTERVAL: Duration = Duration::from_millis(250);

/// Watches `config_path` and calls `on_change` once per (debounced) edit.
///
/// The watcher thread stops after `on_change` returns `false`, or once
/// `is_active` returns `false`, which is checked between events.
pub fn watch_config_file<A, F>(
    config_path: PathBuf,
    is_active: A,
    mut on_change: F,
) -> Option<JoinHandle<()>>
where
    A: Fn() -> bool + Send + 'static,
    F: FnMut() -> bool + Send + 'static,
{
    let config_filename =
        config_path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();

    spawn_named_thread("config-watcher", move || {
        let (tx, rx) = mpsc::channel();

        let mut watcher: RecommendedWatcher = match notify::recommended_watcher(tx) {
            Ok(w) => w,
            Err(err) => {
                tracing::warn!(error = %err, "failed to create config watcher");
                return;
            }
        };

        // Watch the parent directory to catch editors that save by renaming
        let watch_path = config_path.parent().unwrap_or(&config_path);

        if let Err(err) = watcher.watch(watch_path, RecursiveMode::NonRecursive) {
            tracing::warn!(error = %err, "failed to watch config file");
            return;
        }

        let debounce = Duration::from_millis(CONFIG_DEBOUNCE_MS);
        let mut last_event_time: Option<Instant> = None;

        while is_active() {
            let result = match rx.recv_timeout(ACTIVE_CHECK_INTERVAL) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };

            match result {
                Ok(event) => {
                    let affects_config = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().is_some_and(|name| name == config_filename));

                    if !affects_config || !(event.kind.is_modify() || event.kind.is_create()) {
                        continue;
                    }

                    let now = Instant::now();
                    if last_event_time.is_some_and(|t| now.duration_since(t) < debounce) {
                        continue;
                    }
                    last_event_time = Some(now);

                    tracing::info!(path = %config_path.display(), "configuration changed");
                    if !on_change() {
                        break;
                    }
                }
                Err(err) => tracing::warn!(error = %err, "config watch error"),
            }
        }

        tracing::debug!(path = %config_path.display(), "config watcher stopped");
    })
}
