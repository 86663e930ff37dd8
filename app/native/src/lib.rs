//! AlbumPaper - turns the album art of whatever is playing into the desktop
//! wallpaper.
//!
//! A poll worker asks the configured service (Spotify or Last.fm) for the
//! current track, decides whether the artwork changed, and composes a
//! wallpaper from it: a background derived from the artwork's colors with
//! the artwork itself centered on top.

pub mod cache;
pub mod cli;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod platform;
pub mod schema;
pub mod source;
pub mod supervisor;
pub mod tracker;
pub mod wallpaper;
pub mod worker;

pub use supervisor::run;
