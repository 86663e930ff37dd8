//! Configuration types for AlbumPaper.
//!
//! This module provides the configuration types and loading functionality.
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::env::ApiKeys;
use crate::constants::APP_ID;
use crate::wallpaper::{BackgroundStyle, Geometry, LayerConfig, Rect};

/// Smallest accepted poll interval, in seconds.
const MIN_REQUEST_INTERVAL: f64 = 0.1;

/// Largest accepted display or foreground side, in pixels.
pub const MAX_IMAGE_SIDE: u32 = 16_384;

/// Clamps a configured image side to `1..=MAX_IMAGE_SIDE`.
fn image_side(value: u32, field: &str) -> u32 {
    let side = value.clamp(1, MAX_IMAGE_SIDE);
    if side != value {
        tracing::warn!(field, value, used = side, "image size out of range");
    }
    side
}

/// The "now playing" provider to poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum ServiceKind {
    /// Spotify Web API (currently playing track).
    #[default]
    Spotify,
    /// Last.fm scrobbles (most recent track).
    #[serde(rename = "lastfm", alias = "last.fm")]
    LastFm,
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spotify => write!(f, "spotify"),
            Self::LastFm => write!(f, "lastfm"),
        }
    }
}

/// Provider selection and polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Which provider to poll: `spotify` or `lastfm`.
    pub name: ServiceKind,

    /// Seconds between two polls. Values below 0.1 are raised to 0.1.
    /// Default: 1.0
    pub request_interval: f64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: ServiceKind::default(),
            request_interval: 1.0,
        }
    }
}

/// Last.fm account settings. The API key lives in the `apiKeys` env file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct LastFmConfig {
    /// Last.fm user whose scrobbles are followed.
    pub username: String,
}

/// Radius overrides for the radial gradient background.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RadialConfig {
    /// Radius in pixels inside which the anchor color is solid.
    /// Default: half of the foreground size (0 without foreground).
    pub inner_radius: Option<f64>,

    /// Radius in pixels at which the second color is reached.
    /// Default: distance from the center to a corner.
    pub outer_radius: Option<f64>,
}

/// Background layer settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundConfig {
    /// Background style.
    pub style: BackgroundStyle,

    /// Blur the artwork, wallpaper and noise backgrounds.
    pub blur_enabled: bool,

    /// Gaussian blur radius in pixels.
    /// Default: 20
    pub blur_strength: u32,

    /// Radial gradient tuning.
    pub radial: RadialConfig,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            style: BackgroundStyle::default(),
            blur_enabled: true,
            blur_strength: 20,
            radial: RadialConfig::default(),
        }
    }
}

/// Foreground (artwork) layer settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ForegroundConfig {
    /// Draw the artwork on top of the background.
    pub enabled: bool,

    /// Edge length in pixels of the square artwork.
    /// Default: 600
    pub size: u32,
}

impl Default for ForegroundConfig {
    fn default() -> Self { Self { enabled: true, size: 600 } }
}

/// A rectangle on screen, in pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RectConfig {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for RectConfig {
    fn default() -> Self { Self { x: 0, y: 0, width: 2560, height: 1440 } }
}

impl From<RectConfig> for Rect {
    fn from(rect: RectConfig) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

/// Display geometry used to size the generated wallpaper.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayConfig {
    /// Full display width in pixels.
    /// Default: 2560
    pub width: u32,

    /// Full display height in pixels.
    /// Default: 1440
    pub height: u32,

    /// Area not covered by taskbars or docks. Defaults to the full display.
    pub available: Option<RectConfig>,
}

impl Default for DisplayConfig {
    fn default() -> Self { Self { width: 2560, height: 1440, available: None } }
}

impl DisplayConfig {
    /// Returns the display geometry as used by the compositor.
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        let display = Rect {
            x: 0,
            y: 0,
            width: image_side(self.width, "display.width"),
            height: image_side(self.height, "display.height"),
        };
        let available = self.available.map_or(display, |rect| {
            let rect = Rect::from(rect);
            Rect {
                width: image_side(rect.width, "display.available.width"),
                height: image_side(rect.height, "display.available.height"),
                ..rect
            }
        });

        Geometry { display, available }
    }
}

/// Power management settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct PowerConfig {
    /// Pause while the machine runs on battery.
    /// Default: true
    pub pause_on_battery_saver: bool,

    /// Only pause once the charge drops to this percentage (0 = whenever discharging).
    pub threshold: u8,
}

impl Default for PowerConfig {
    fn default() -> Self { Self { pause_on_battery_saver: true, threshold: 0 } }
}

/// Theme used by front-ends; the poller itself does not read it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self { Self { name: "Dark".to_string() } }
}

/// Root configuration for AlbumPaper.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct AlbumPaperConfig {
    /// Provider selection and polling interval.
    pub service: ServiceConfig,

    /// Path to a `.env` file holding provider secrets, relative to this file.
    pub api_keys: String,

    /// Last.fm account settings.
    pub lastfm: LastFmConfig,

    /// Background layer settings.
    pub background: BackgroundConfig,

    /// Foreground layer settings.
    pub foreground: ForegroundConfig,

    /// Display geometry.
    pub display: DisplayConfig,

    /// Power management.
    pub power: PowerConfig,

    /// Start with the poller paused.
    pub start_paused: bool,

    /// Directory holding the default and generated wallpapers.
    /// Default: the application cache directory.
    pub images_dir: String,

    /// Image the provider returns when a track has no artwork.
    pub missing_artwork: String,

    /// Front-end theme.
    pub theme: ThemeConfig,

    /// Treat worker failures as panics instead of clean exits.
    pub debug: bool,
}

impl AlbumPaperConfig {
    /// Returns the poll interval, never shorter than 100ms.
    #[must_use]
    pub fn request_interval(&self) -> Duration {
        let seconds = if self.service.request_interval.is_finite() {
            self.service.request_interval.max(MIN_REQUEST_INTERVAL)
        } else {
            1.0
        };
        Duration::from_secs_f64(seconds)
    }

    /// Returns the immutable layer snapshot for the compositor.
    #[must_use]
    pub fn layer_config(&self) -> LayerConfig {
        LayerConfig {
            background: self.background.style,
            foreground_enabled: self.foreground.enabled,
            foreground_size: image_side(self.foreground.size, "foreground.size"),
            blur_enabled: self.background.blur_enabled,
            blur_strength: self.background.blur_strength,
            inner_radius: self.background.radial.inner_radius,
            outer_radius: self.background.radial.outer_radius,
        }
    }

    /// Checks that the selected service has usable credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first missing or
    /// malformed credential.
    pub fn validate_service(&self, keys: &ApiKeys) -> Result<(), ConfigError> {
        match self.service.name {
            ServiceKind::Spotify => {
                let id_ok = keys.spotify_client_id().chars().count() == 32;
                let secret_ok = keys.spotify_client_secret().chars().count() == 32;
                if !id_ok || !secret_ok {
                    return Err(ConfigError::Invalid("Set valid Spotify API keys".to_string()));
                }
                if keys.spotify_refresh_token().is_empty() {
                    return Err(ConfigError::Invalid(
                        "Set a Spotify refresh token (SPOTIFY_REFRESH_TOKEN)".to_string(),
                    ));
                }
            }
            ServiceKind::LastFm => {
                let key_ok = keys.lastfm_api_key().chars().count() == 32;
                let user_len = self.lastfm.username.trim().chars().count();
                if !key_ok || !(2..=15).contains(&user_len) {
                    return Err(ConfigError::Invalid(
                        "Set valid Last.fm API key and username".to_string(),
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Errors that can occur when loading the configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    NotFound,
    /// The configuration file exists but could not be read.
    IoError(std::io::Error),
    /// The configuration file contains invalid JSON.
    ParseError(serde_json::Error),
    /// The configuration parsed but cannot be used.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "No configuration file found. Expected at ~/.config/albumpaper/config.jsonc \
                or ~/.albumpaper.jsonc"
            ),
            Self::IoError(err) => write!(f, "Failed to read configuration file: {err}"),
            Self::ParseError(err) => write!(f, "Failed to parse configuration file: {err}"),
            Self::Invalid(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError(err) => Some(err),
            Self::ParseError(err) => Some(err),
            Self::NotFound | Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::ParseError(err) }
}

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".albumpaper.jsonc", ".albumpaper.json"];

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/albumpaper/config.jsonc` or `config.json`, when set
/// 2. `~/.config/albumpaper/config.jsonc` or `config.json`
/// 3. The platform config directory (`dirs::config_dir()`)
/// 4. `~/.albumpaper.jsonc` or `~/.albumpaper.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    fn push_dir(dir: &Path, paths: &mut Vec<PathBuf>) {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            // XDG_CONFIG_HOME may already be ~/.config
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        push_dir(&PathBuf::from(xdg_config).join(APP_ID), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(&home.join(".config").join(APP_ID), &mut paths);
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(&config_dir.join(APP_ID), &mut paths);
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Parses a JSONC configuration file.
///
/// # Errors
///
/// Returns `ConfigError::IoError` if the file cannot be read and
/// `ConfigError::ParseError` if it is not valid JSONC.
pub fn load_config_from_path(path: &Path) -> Result<(AlbumPaperConfig, PathBuf), ConfigError> {
    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let config: AlbumPaperConfig = serde_json::from_reader(reader)?;
    Ok((config, path.to_path_buf()))
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of
/// the expected locations, or the errors of [`load_config_from_path`].
pub fn load_config() -> Result<(AlbumPaperConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            return load_config_from_path(&path);
        }
    }

    Err(ConfigError::NotFound)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;

    fn keys(id: &str, secret: &str, token: &str, lastfm: &str) -> ApiKeys {
        ApiKeys {
            spotify_client_id: Some(id.to_string()),
            spotify_client_secret: Some(secret.to_string()),
            spotify_refresh_token: Some(token.to_string()),
            lastfm_api_key: Some(lastfm.to_string()),
        }
    }

    // ========================================================================
    // Defaults and parsing
    // ========================================================================

    #[test]
    fn test_default_config() {
        let config = AlbumPaperConfig::default();
        assert_eq!(config.service.name, ServiceKind::Spotify);
        assert_eq!(config.request_interval(), Duration::from_secs(1));
        assert!(config.foreground.enabled);
        assert_eq!(config.foreground.size, 600);
        assert!(config.power.pause_on_battery_saver);
        assert!(!config.start_paused);
    }

    #[test]
    fn test_config_deserializes_camel_case() {
        let json = r#"{
            "service": { "name": "lastfm", "requestInterval": 2.5 },
            "lastfm": { "username": "someone" },
            "background": { "style": "coloredNoise", "blurEnabled": false, "blurStrength": 8 },
            "foreground": { "enabled": false, "size": 400 },
            "startPaused": true
        }"#;

        let config: AlbumPaperConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.service.name, ServiceKind::LastFm);
        assert_eq!(config.request_interval(), Duration::from_millis(2500));
        assert_eq!(config.lastfm.username, "someone");
        assert_eq!(config.background.style, BackgroundStyle::ColoredNoise);
        assert!(!config.background.blur_enabled);
        assert_eq!(config.background.blur_strength, 8);
        assert!(!config.foreground.enabled);
        assert!(config.start_paused);
    }

    #[test]
    fn test_service_accepts_dotted_lastfm_alias() {
        let config: ServiceConfig = serde_json::from_str(r#"{ "name": "last.fm" }"#).unwrap();
        assert_eq!(config.name, ServiceKind::LastFm);
    }

    #[test]
    fn test_request_interval_is_clamped() {
        let mut config = AlbumPaperConfig::default();
        config.service.request_interval = 0.0;
        assert_eq!(config.request_interval(), Duration::from_millis(100));

        config.service.request_interval = f64::NAN;
        assert_eq!(config.request_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_display_geometry_defaults_available_to_full() {
        let geometry = DisplayConfig::default().geometry();
        assert_eq!(geometry.display.width, 2560);
        assert_eq!(geometry.display.height, 1440);
        assert_eq!(geometry.available, geometry.display);
    }

    #[test]
    fn test_display_geometry_with_taskbar() {
        let display = DisplayConfig {
            width: 1920,
            height: 1080,
            available: Some(RectConfig { x: 0, y: 0, width: 1920, height: 1040 }),
        };
        let geometry = display.geometry();
        assert_eq!(geometry.available.height, 1040);
        assert_eq!(geometry.display.height, 1080);
    }

    #[test]
    fn test_display_geometry_caps_oversized_values() {
        let display = DisplayConfig {
            width: 2_560_000,
            height: 0,
            available: Some(RectConfig { x: 0, y: 0, width: u32::MAX, height: 1040 }),
        };
        let geometry = display.geometry();

        assert_eq!(geometry.display.width, MAX_IMAGE_SIDE);
        assert_eq!(geometry.display.height, 1);
        assert_eq!(geometry.available.width, MAX_IMAGE_SIDE);
        assert_eq!(geometry.available.height, 1040);

        let mut config = AlbumPaperConfig::default();
        config.foreground.size = 1_000_000;
        assert_eq!(config.layer_config().foreground_size, MAX_IMAGE_SIDE);
    }

    #[test]
    fn test_layer_config_snapshot() {
        let mut config = AlbumPaperConfig::default();
        config.background.style = BackgroundStyle::LinearGradient;
        config.background.radial.inner_radius = Some(12.0);
        config.foreground.size = 0;

        let layers = config.layer_config();
        assert_eq!(layers.background, BackgroundStyle::LinearGradient);
        assert_eq!(layers.inner_radius, Some(12.0));
        assert_eq!(layers.foreground_size, 1);
    }

    // ========================================================================
    // Service validation
    // ========================================================================

    #[test]
    fn test_validate_spotify_keys() {
        let config = AlbumPaperConfig::default();
        let valid = "a".repeat(32);

        assert!(config.validate_service(&keys(&valid, &valid, "token", "")).is_ok());
        assert!(config.validate_service(&keys("short", &valid, "token", "")).is_err());
        assert!(config.validate_service(&keys(&valid, &valid, "", "")).is_err());
        assert!(config.validate_service(&ApiKeys::default()).is_err());
    }

    #[test]
    fn test_validate_lastfm_keys_and_username() {
        let mut config = AlbumPaperConfig::default();
        config.service.name = ServiceKind::LastFm;
        let valid = "b".repeat(32);

        config.lastfm.username = "someone".to_string();
        assert!(config.validate_service(&keys("", "", "", &valid)).is_ok());

        config.lastfm.username = "x".to_string();
        assert!(config.validate_service(&keys("", "", "", &valid)).is_err());

        config.lastfm.username = "a_very_long_username".to_string();
        assert!(config.validate_service(&keys("", "", "", &valid)).is_err());

        config.lastfm.username = "someone".to_string();
        let err = config.validate_service(&keys("", "", "", "short")).unwrap_err();
        assert!(err.to_string().contains("Last.fm"));
    }

    // ========================================================================
    // Loading
    // ========================================================================

    #[test]
    fn test_load_config_from_path_strips_comments() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.jsonc");

        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "// header comment").unwrap();
        writeln!(file, "{{ /* inline */ \"foreground\": {{ \"size\": 320 }} }}").unwrap();

        let (config, loaded_path) = load_config_from_path(&path).unwrap();
        assert_eq!(config.foreground.size, 320);
        assert_eq!(loaded_path, path);
    }

    #[test]
    fn test_load_config_from_path_reports_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.jsonc");
        fs::write(&path, "{ \"foreground\": ").unwrap();

        let err = load_config_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_load_config_from_missing_path() {
        let err = load_config_from_path(Path::new("/nonexistent/config.jsonc")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn test_config_paths_are_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty() || std::env::var("HOME").is_err());
    }

    #[test]
    fn test_config_error_not_found_message() {
        assert!(ConfigError::NotFound.to_string().contains("No configuration file found"));
    }
}
