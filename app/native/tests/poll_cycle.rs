//! End-to-end poll cycle through the public API.
//!
//! Runs a real worker thread against a scripted source, an in-memory
//! artwork fetcher and a recording wallpaper setter.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use albumpaper_lib::platform::{PlatformError, WallpaperSetter};
use albumpaper_lib::source::{ArtSource, SourceError, TrackSignal};
use albumpaper_lib::tracker::{ArtworkChangeTracker, ArtworkFetcher};
use albumpaper_lib::wallpaper::processing::load_image;
use albumpaper_lib::wallpaper::{
    BackgroundStyle, Geometry, LayerConfig, WallpaperCompositor, WallpaperManager,
};
use albumpaper_lib::worker::{self, Control, ExitReason, PollLoop};
use image::{Rgb, RgbImage};
use tempfile::TempDir;

// ============================================================================
// Fakes
// ============================================================================

/// Reports whatever the test last put in the shared slot.
struct SharedSource(Arc<Mutex<TrackSignal>>);

impl ArtSource for SharedSource {
    fn name(&self) -> &'static str { "shared" }

    fn poll(&mut self) -> TrackSignal { self.0.lock().unwrap().clone() }
}

/// Serves a gradient whose colors depend on the URL.
struct UrlArtwork;

impl ArtworkFetcher for UrlArtwork {
    fn fetch(&self, url: &str) -> Result<RgbImage, SourceError> {
        if url.ends_with("broken") {
            return Err(SourceError::Status(404));
        }
        let tint = url.bytes().fold(0_u8, u8::wrapping_add);
        Ok(RgbImage::from_fn(24, 24, |x, y| {
            Rgb([tint, (x * 10) as u8, (y * 10) as u8])
        }))
    }
}

#[derive(Clone, Default)]
struct RecordingSetter(Arc<Mutex<Vec<PathBuf>>>);

impl RecordingSetter {
    fn calls(&self) -> Vec<PathBuf> { self.0.lock().unwrap().clone() }

    /// Waits until `count` wallpapers have been set.
    fn wait_for(&self, count: usize) -> Vec<PathBuf> {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            let calls = self.calls();
            if calls.len() >= count {
                return calls;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("expected {count} wallpaper changes, saw {:?}", self.calls());
    }
}

impl WallpaperSetter for RecordingSetter {
    fn set_wallpaper(&self, path: &Path) -> Result<(), PlatformError> {
        self.0.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn capture_current_wallpaper_as_default(&self, _path: &Path) -> Result<(), PlatformError> {
        Err(PlatformError::CaptureFailed("no display".to_string()))
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    _temp_dir: TempDir,
    signal: Arc<Mutex<TrackSignal>>,
    setter: RecordingSetter,
    default_path: PathBuf,
    generated_path: PathBuf,
    handle: worker::WorkerHandle,
}

fn start(initial: TrackSignal, start_paused: bool) -> Harness {
    let temp_dir = TempDir::new().unwrap();
    let default_path = temp_dir.path().join("images").join("default_wallpaper.jpg");
    let generated_path = temp_dir.path().join("images").join("generated_wallpaper.jpg");

    let signal = Arc::new(Mutex::new(initial));
    let setter = RecordingSetter::default();

    let layers = LayerConfig {
        background: BackgroundStyle::ColoredNoise,
        foreground_size: 12,
        blur_strength: 2,
        ..LayerConfig::default()
    };
    let compositor = WallpaperCompositor::new(layers, Geometry::full(64, 40), default_path.clone());
    let manager =
        WallpaperManager::new(compositor, Box::new(setter.clone()), generated_path.clone());
    manager.ensure_default_wallpaper().unwrap();

    let tracker = ArtworkChangeTracker::new(Box::new(UrlArtwork), None);
    let poll_loop = PollLoop::new(
        Box::new(SharedSource(Arc::clone(&signal))),
        tracker,
        manager,
        Duration::from_millis(10),
    );
    let handle = worker::spawn(poll_loop, start_paused).unwrap();

    Harness { _temp_dir: temp_dir, signal, setter, default_path, generated_path, handle }
}

fn playing(url: &str) -> TrackSignal { TrackSignal::Playing(url.to_string()) }

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_playing_track_generates_wallpaper_once() {
    let harness = start(playing("https://art/a"), false);

    let calls = harness.setter.wait_for(1);
    assert_eq!(calls[0], harness.generated_path);
    assert_eq!(load_image(&harness.generated_path).unwrap().dimensions(), (64, 40));

    // Same signal for a while: no further changes
    thread::sleep(Duration::from_millis(100));
    assert_eq!(harness.setter.calls().len(), 1);

    harness.handle.send(Control::Quit).unwrap();
    assert_eq!(harness.handle.join().unwrap(), ExitReason::Quit);
}

#[test]
fn test_pause_and_resume_during_playback() {
    let harness = start(playing("https://art/a"), false);
    harness.setter.wait_for(1);

    harness.handle.send(Control::Pause).unwrap();
    let calls = harness.setter.wait_for(2);
    assert_eq!(calls[1], harness.default_path);

    // Nothing happens while paused, even if the track changes
    *harness.signal.lock().unwrap() = playing("https://art/b");
    thread::sleep(Duration::from_millis(100));
    assert_eq!(harness.setter.calls().len(), 2);

    // Back to the same track: the resumed poll re-evaluates it
    *harness.signal.lock().unwrap() = playing("https://art/a");
    harness.handle.send(Control::Resume).unwrap();
    let calls = harness.setter.wait_for(3);
    assert_eq!(calls[2], harness.generated_path);

    harness.handle.send(Control::Quit).unwrap();
    harness.handle.join().unwrap();
}

#[test]
fn test_stopping_playback_restores_default() {
    let harness = start(playing("https://art/a"), false);
    harness.setter.wait_for(1);

    *harness.signal.lock().unwrap() = TrackSignal::NotPlaying;
    let calls = harness.setter.wait_for(2);
    assert_eq!(calls[1], harness.default_path);

    harness.handle.send(Control::Restart).unwrap();
    assert_eq!(harness.handle.join().unwrap(), ExitReason::Restart);
}

#[test]
fn test_download_failure_leaves_wallpaper_alone() {
    let harness = start(playing("https://art/broken"), false);

    thread::sleep(Duration::from_millis(100));
    assert!(harness.setter.calls().is_empty());

    // Retried on every poll, so a recovered track is picked up
    *harness.signal.lock().unwrap() = playing("https://art/c");
    harness.setter.wait_for(1);

    harness.handle.send(Control::Quit).unwrap();
    harness.handle.join().unwrap();
}

#[test]
fn test_start_paused_waits_for_resume() {
    let harness = start(playing("https://art/a"), true);

    let calls = harness.setter.wait_for(1);
    assert_eq!(calls[0], harness.default_path);

    harness.handle.send(Control::Toggle).unwrap();
    let calls = harness.setter.wait_for(2);
    assert_eq!(calls[1], harness.generated_path);

    harness.handle.send(Control::Quit).unwrap();
    harness.handle.join().unwrap();
}
