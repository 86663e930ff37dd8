//! Configuration template generation.
//!
//! Generates a commented configuration template with all available options.

use std::fs;
use std::path::Path;

/// Generates a configuration template with all options commented out.
#[must_use]
pub fn generate_config_template() -> String {
    r##"// AlbumPaper Configuration File
// ==============================
// This file uses JSONC format (JSON with comments).
// All options below are commented out and show their default values.
// Uncomment and modify the options you want to configure.
// Changes are picked up automatically: the poller restarts on save.

{
  // ============================================================================
  // Service
  // ============================================================================
  // "service": {
  //   // Provider to follow: "spotify" or "lastfm"
  //   "name": "spotify",
  //
  //   // Seconds between two polls (minimum 0.1)
  //   "requestInterval": 1.0
  // },
  //
  // // Path to a .env file with SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET,
  // // SPOTIFY_REFRESH_TOKEN and/or LASTFM_API_KEY (relative to this file)
  // "apiKeys": ".env",
  //
  // "lastfm": {
  //   // Last.fm user whose scrobbles are followed (2-15 characters)
  //   "username": ""
  // },

  // ============================================================================
  // Background
  // ============================================================================
  // "background": {
  //   // "solid", "linearGradient", "radialGradient", "coloredNoise",
  //   // "artwork", "wallpaper" or "random"
  //   "style": "radialGradient",
  //
  //   // Blur the artwork, wallpaper and noise backgrounds
  //   "blurEnabled": true,
  //   "blurStrength": 20,
  //
  //   // Radial gradient radii in pixels (null = automatic)
  //   "radial": {
  //     "innerRadius": null,
  //     "outerRadius": null
  //   }
  // },

  // ============================================================================
  // Foreground
  // ============================================================================
  // "foreground": {
  //   // Draw the album art on top of the background
  //   "enabled": true,
  //
  //   // Edge length of the album art in pixels
  //   "size": 600
  // },

  // ============================================================================
  // Display
  // ============================================================================
  // "display": {
  //   "width": 2560,
  //   "height": 1440,
  //
  //   // Screen area not covered by a taskbar or dock (null = full display)
  //   "available": null
  //   // Or: { "x": 0, "y": 0, "width": 2560, "height": 1400 }
  // },

  // ============================================================================
  // Power
  // ============================================================================
  // "power": {
  //   // Pause while running on battery
  //   "pauseOnBatterySaver": true,
  //
  //   // Only pause below this charge percentage (0 = whenever discharging)
  //   "threshold": 0
  // },

  // ============================================================================
  // Miscellaneous
  // ============================================================================
  // // Start with the poller paused
  // "startPaused": false,
  //
  // // Where the default and generated wallpapers are stored ("" = cache dir)
  // "imagesDir": "",
  //
  // // Placeholder image your provider returns for tracks without artwork
  // "missingArtwork": "",
  //
  // "theme": { "name": "Dark" },
  //
  // // Panic on worker failures instead of exiting cleanly
  // "debug": false
}
"##
    .to_string()
}

/// Creates a configuration file with the template at the specified path.
///
/// Creates parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn create_config_file(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, generate_config_template())
}
