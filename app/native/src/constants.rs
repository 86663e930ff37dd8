//! Application-wide constants.

/// Application identifier used for config, cache and thread names.
pub const APP_ID: &str = "albumpaper";

/// User-Agent sent with every provider request.
pub const USER_AGENT: &str = "AlbumPaper";

/// File name of the captured default wallpaper inside the images directory.
pub const DEFAULT_WALLPAPER_FILE: &str = "default_wallpaper.jpg";

/// File name of the generated wallpaper inside the images directory.
pub const GENERATED_WALLPAPER_FILE: &str = "generated_wallpaper.jpg";

/// JPEG quality used for every wallpaper written to disk.
pub const JPEG_QUALITY: u8 = 95;
