//! The poll worker.
//!
//! A single dedicated thread runs poll → decide → apply, sequentially and
//! without overlap, on a timer. Other threads talk to it only through a
//! single-slot control channel; none of them touches the tracker state.
//!
//! While paused the worker waits on the channel without a timeout. Entering
//! a pause shows the default wallpaper right away, and leaving it clears the
//! tracker's last signal so the next poll redraws.

pub mod control;
pub mod power_watcher;

use std::thread::JoinHandle;
use std::time::Duration;

use tokio::sync::mpsc;

pub use control::{Control, PauseFlags, PauseState, Transition};
pub use power_watcher::{POWER_POLL_INTERVAL, watch_power};

use crate::error::AlbumPaperError;
use crate::platform::spawn_named_thread;
use crate::source::ArtSource;
use crate::tracker::{Action, ArtworkChangeTracker};
use crate::wallpaper::WallpaperManager;

/// Control channel capacity.
const CONTROL_CHANNEL_SIZE: usize = 1;

/// Why the worker stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    Restart,
}

/// Errors talking to the worker.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// The worker has stopped.
    #[error("Failed to send control to worker: channel closed")]
    SendFailed,
    /// The worker thread panicked.
    #[error("Worker thread panicked: {0}")]
    Panicked(String),
}

impl From<WorkerError> for AlbumPaperError {
    fn from(err: WorkerError) -> Self { Self::WorkerError(err.to_string()) }
}

/// The poll → decide → apply loop and its pause state.
pub struct PollLoop {
    source: Box<dyn ArtSource>,
    tracker: ArtworkChangeTracker,
    manager: WallpaperManager,
    interval: Duration,
    pause: PauseFlags,
}

impl PollLoop {
    #[must_use]
    pub fn new(
        source: Box<dyn ArtSource>,
        tracker: ArtworkChangeTracker,
        manager: WallpaperManager,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            tracker,
            manager,
            interval,
            pause: PauseFlags::default(),
        }
    }

    #[must_use]
    pub const fn pause_state(&self) -> PauseState { self.pause.state() }

    #[must_use]
    pub const fn tracker(&self) -> &ArtworkChangeTracker { &self.tracker }

    /// Polls the source once and applies the resulting action.
    ///
    /// # Errors
    ///
    /// Returns an error if the wallpaper could not be composed, saved or set.
    pub fn tick(&mut self) -> Result<Action, AlbumPaperError> {
        let signal = self.source.poll();
        let action = self.tracker.decide(&signal);

        tracing::debug!(source = self.source.name(), ?signal, action = action.name(), "poll");

        if let Err(err) = self.manager.apply(&action) {
            if matches!(action, Action::GenerateAndSet(_)) {
                self.tracker.forget_generated();
            }
            return Err(err);
        }

        Ok(action)
    }

    /// Handles one control message.
    ///
    /// Returns the exit reason for `Restart` and `Quit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the default wallpaper cannot be shown when a pause
    /// begins.
    pub fn handle(&mut self, control: Control) -> Result<Option<ExitReason>, AlbumPaperError> {
        tracing::debug!(control = control.name(), "control received");

        match control {
            Control::Quit => return Ok(Some(ExitReason::Quit)),
            Control::Restart => return Ok(Some(ExitReason::Restart)),
            _ => {}
        }

        match self.pause.apply(control) {
            Transition::EnteredPause => {
                tracing::info!(state = %self.pause.state(), "polling paused");
                self.manager.set_default()?;
            }
            Transition::LeftPause => {
                tracing::info!("polling resumed");
                self.tracker.clear_previous();
            }
            Transition::Unchanged => {}
        }

        Ok(None)
    }

    /// Runs until a `Restart` or `Quit` arrives or the channel closes.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a tick or a pause transition.
    pub async fn run(
        mut self,
        mut controls: mpsc::Receiver<Control>,
    ) -> Result<ExitReason, AlbumPaperError> {
        tracing::info!(
            source = self.source.name(),
            interval_ms = self.interval.as_millis(),
            "poller started"
        );

        loop {
            if self.pause.is_paused() {
                let Some(control) = controls.recv().await else {
                    return Ok(ExitReason::Quit);
                };
                if let Some(exit) = self.handle(control)? {
                    return Ok(exit);
                }
                continue;
            }

            self.tick()?;

            tokio::select! {
                control = controls.recv() => {
                    let Some(control) = control else {
                        return Ok(ExitReason::Quit);
                    };
                    if let Some(exit) = self.handle(control)? {
                        return Ok(exit);
                    }
                }
                () = tokio::time::sleep(self.interval) => {}
            }
        }
    }
}

/// Handle to a running worker thread.
pub struct WorkerHandle {
    sender: mpsc::Sender<Control>,
    thread: JoinHandle<Result<ExitReason, AlbumPaperError>>,
}

impl WorkerHandle {
    /// Sends a control message, waiting for the worker to take it.
    ///
    /// Must not be called from inside an async runtime.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::SendFailed`] if the worker has stopped.
    pub fn send(&self, control: Control) -> Result<(), WorkerError> {
        self.sender.blocking_send(control).map_err(|_| WorkerError::SendFailed)
    }

    /// A sender for watchers.
    #[must_use]
    pub fn sender(&self) -> mpsc::Sender<Control> { self.sender.clone() }

    #[must_use]
    pub fn is_finished(&self) -> bool { self.thread.is_finished() }

    /// Waits for the worker to stop.
    ///
    /// # Errors
    ///
    /// Returns the worker's error, or [`WorkerError::Panicked`] if it panicked.
    pub fn join(self) -> Result<ExitReason, AlbumPaperError> {
        drop(self.sender);
        self.thread.join().map_err(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            AlbumPaperError::from(WorkerError::Panicked(message))
        })?
    }
}

/// Starts `poll_loop` on its own thread with a current-thread runtime.
///
/// With `start_paused` the worker enters the pause before its first poll.
///
/// # Errors
///
/// Returns an error if the thread cannot be spawned.
pub fn spawn(poll_loop: PollLoop, start_paused: bool) -> Result<WorkerHandle, AlbumPaperError> {
    let (sender, receiver) = mpsc::channel(CONTROL_CHANNEL_SIZE);

    let thread = spawn_named_thread("poller", move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| AlbumPaperError::WorkerError(format!("failed to build runtime: {e}")))?;

        let mut poll_loop = poll_loop;
        if start_paused {
            poll_loop.handle(Control::Pause)?;
        }

        runtime.block_on(poll_loop.run(receiver))
    })
    .ok_or_else(|| AlbumPaperError::WorkerError("failed to spawn poller thread".to_string()))?;

    Ok(WorkerHandle { sender, thread })
}
