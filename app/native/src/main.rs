#![allow(clippy::multiple_crate_versions)]

//! AlbumPaper binary.
//!
//! Without arguments (or with `run`) it follows the configured service and
//! keeps the wallpaper in sync; the other subcommands are one-shot helpers.

fn main() {
    if let Err(err) = albumpaper_lib::cli::run() {
        eprintln!("albumpaper: {err}");
        std::process::exit(1);
    }
}
