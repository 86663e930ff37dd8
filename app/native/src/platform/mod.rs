//! Platform abstractions for AlbumPaper.
//!
//! The core never talks to the OS directly; it goes through the narrow
//! interfaces defined here:
//!
//! - [`wallpaper`] - setting the desktop wallpaper and capturing the current one
//! - [`power`] - battery-saver detection
//! - [`path`] - shell-like path expansion for configuration values
//! - [`thread`] - named worker threads

pub mod path;
pub mod power;
pub mod thread;
pub mod wallpaper;

use thiserror::Error;

pub use power::{BatteryPower, PowerSource};
pub use thread::spawn_named_thread;
pub use wallpaper::{SystemWallpaper, WallpaperSetter};

/// Errors raised by OS collaborators.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The wallpaper file does not exist.
    #[error("Wallpaper file not found: {0}")]
    FileNotFound(String),
    /// The OS rejected the wallpaper change.
    #[error("Failed to set wallpaper: {0}")]
    SetWallpaperFailed(String),
    /// The current OS wallpaper could not be read or copied.
    #[error("Failed to capture current wallpaper: {0}")]
    CaptureFailed(String),
    /// Battery information was unavailable.
    #[error("Battery error: {0}")]
    Battery(String),
}
