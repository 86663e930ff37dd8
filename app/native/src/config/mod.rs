//! Configuration module for AlbumPaper.
//!
//! This module provides configuration types, loading, secrets handling and
//! file watching.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.
//!
//! A loaded configuration is an immutable value: components receive it (or a
//! snapshot derived from it) at construction and a change on disk rebuilds
//! them.

pub mod env;
pub mod template;
pub mod types;
mod watcher;

use std::path::{Path, PathBuf};

pub use env::{ApiKeys, load_api_keys};
pub use types::{
    AlbumPaperConfig, BackgroundConfig, ConfigError, DisplayConfig, ForegroundConfig,
    LastFmConfig, PowerConfig, RadialConfig, RectConfig, ServiceConfig, ServiceKind, ThemeConfig,
    config_paths, load_config as load_config_default, load_config_from_path,
};
pub use watcher::watch_config_file;

use crate::cache::get_cache_subdir;
use crate::constants::{DEFAULT_WALLPAPER_FILE, GENERATED_WALLPAPER_FILE};
use crate::platform::path::{expand_and_resolve, resolve_optional};

/// A configuration together with the file it came from.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: AlbumPaperConfig,
    /// `None` when running on defaults.
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Directory used to resolve relative paths in the configuration.
    #[must_use]
    pub fn base_dir(&self) -> PathBuf {
        self.path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_default()
    }

    /// Loads the provider secrets referenced by `apiKeys`.
    #[must_use]
    pub fn api_keys(&self) -> ApiKeys { load_api_keys(&self.config.api_keys, &self.base_dir()) }

    /// Directory holding the default and generated wallpapers.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        resolve_optional(&self.config.images_dir, &self.base_dir())
            .unwrap_or_else(|| get_cache_subdir("images"))
    }

    /// Path of the captured default wallpaper.
    #[must_use]
    pub fn default_wallpaper_path(&self) -> PathBuf {
        self.images_dir().join(DEFAULT_WALLPAPER_FILE)
    }

    /// Path of the generated wallpaper.
    #[must_use]
    pub fn generated_wallpaper_path(&self) -> PathBuf {
        self.images_dir().join(GENERATED_WALLPAPER_FILE)
    }

    /// Path of the provider's missing-artwork placeholder, if configured.
    #[must_use]
    pub fn missing_artwork_path(&self) -> Option<PathBuf> {
        resolve_optional(&self.config.missing_artwork, &self.base_dir())
    }
}

/// Loads the configuration.
///
/// With `custom_path` the file must exist and parse. Without it the default
/// search paths are used; when none exists a commented template is written to
/// the preferred location and defaults are returned. Unreadable default files
/// are logged and replaced by defaults.
///
/// # Errors
///
/// Returns an error only for a custom path that cannot be loaded.
pub fn load(custom_path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    if let Some(path) = custom_path {
        let path = expand_and_resolve(&path.to_string_lossy(), Path::new("."));
        let (config, path) = load_config_from_path(&path)?;
        return Ok(LoadedConfig { config, path: Some(path) });
    }

    match load_config_default() {
        Ok((config, path)) => Ok(LoadedConfig { config, path: Some(path) }),
        Err(ConfigError::NotFound) => Ok(LoadedConfig {
            config: AlbumPaperConfig::default(),
            path: create_default_config_file(),
        }),
        Err(err) => {
            tracing::warn!(error = %err, "failed to load configuration, using defaults");
            Ok(LoadedConfig::default())
        }
    }
}

/// Creates a template configuration file at the preferred location.
fn create_default_config_file() -> Option<PathBuf> {
    let Some(config_path) = config_paths().into_iter().next() else {
        tracing::debug!("no config path available for creating template");
        return None;
    };

    if config_path.exists() {
        return Some(config_path);
    }

    match template::create_config_file(&config_path) {
        Ok(()) => {
            tracing::info!(path = %config_path.display(), "created default configuration file");
            Some(config_path)
        }
        Err(err) => {
            tracing::debug!(
                error = %err,
                path = %config_path.display(),
                "failed to create default configuration file"
            );
            None
        }
    }
}
