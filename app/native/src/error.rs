//! Error types for AlbumPaper.
//!
//! Every layer has its own error enum; this module provides the unified error
//! that the CLI and the worker supervisor deal with.

use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::platform::PlatformError;
use crate::source::SourceError;
use crate::wallpaper::ProcessingError;

/// Errors that can occur during application execution.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum AlbumPaperError {
    /// Invalid command arguments.
    #[error("{0}")]
    InvalidArguments(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Art provider or artwork download failure.
    #[error("Source error: {0}")]
    SourceError(String),
    /// Image decoding, compositing or saving failed.
    #[error("Wallpaper error: {0}")]
    WallpaperError(String),
    /// OS wallpaper or power-state collaborator failed.
    #[error("Platform error: {0}")]
    PlatformError(String),
    /// The poll worker stopped unexpectedly.
    #[error("Worker error: {0}")]
    WorkerError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

impl From<std::io::Error> for AlbumPaperError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for AlbumPaperError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<ConfigError> for AlbumPaperError {
    fn from(err: ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<SourceError> for AlbumPaperError {
    fn from(err: SourceError) -> Self { Self::SourceError(err.to_string()) }
}

impl From<ProcessingError> for AlbumPaperError {
    fn from(err: ProcessingError) -> Self { Self::WallpaperError(err.to_string()) }
}

impl From<PlatformError> for AlbumPaperError {
    fn from(err: PlatformError) -> Self { Self::PlatformError(err.to_string()) }
}

impl From<String> for AlbumPaperError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for AlbumPaperError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}
