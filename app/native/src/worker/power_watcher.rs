//! Battery-saver watcher.
//!
//! Polls the power state on its own low-priority thread and forwards changes
//! to the worker as [`Control::SetBatterySaver`]. Only edges are sent.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::sync::mpsc;

use super::Control;
use crate::platform::{PowerSource, spawn_named_thread};

/// How often the power state is read.
pub const POWER_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Starts watching `source`. The thread exits once the worker is gone.
pub fn watch_power<P>(
    source: P,
    sender: mpsc::Sender<Control>,
    interval: Duration,
) -> Option<JoinHandle<()>>
where
    P: PowerSource + 'static,
{
    spawn_named_thread("power-watcher", move || {
        let mut battery_saver = false;
        let mut reported_error = false;

        while !sender.is_closed() {
            match source.battery_saver_active() {
                Ok(active) => {
                    reported_error = false;
                    if active != battery_saver {
                        battery_saver = active;
                        tracing::info!(active, "battery saver changed");
                        if sender.blocking_send(Control::SetBatterySaver(active)).is_err() {
                            break;
                        }
                    }
                }
                Err(err) => {
                    if !reported_error {
                        tracing::warn!(error = %err, "failed to read power state");
                        reported_error = true;
                    }
                }
            }

            thread::sleep(interval);
        }

        tracing::debug!("power watcher stopped");
    })
}
