//! Artwork change tracking.
//!
//! Turns the stream of [`TrackSignal`]s into wallpaper actions. Polls can be
//! sub-second, so repeated signals must not trigger a download or a
//! recomposition: the tracker deduplicates by URL first and by downloaded
//! content second.

use image::RgbImage;

use crate::source::{SourceError, TrackSignal};
use crate::wallpaper::processing::image_hash;

/// Comparison key for [`TrackSignal::NotPlaying`].
const DEFAULT_KEY: &str = "default";
/// Comparison key for [`TrackSignal::Unknown`].
const NONE_KEY: &str = "none";

/// Downloads and decodes album art.
pub trait ArtworkFetcher: Send {
    /// Fetches the artwork at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the download or decoding fails.
    fn fetch(&self, url: &str) -> Result<RgbImage, SourceError>;
}

/// What the worker should do with the wallpaper after a poll.
#[derive(Debug)]
pub enum Action {
    /// Leave the wallpaper alone.
    NoChange,
    /// Show the default wallpaper.
    SetDefault,
    /// Show the wallpaper generated last, without regenerating it.
    SetLastGenerated,
    /// Compose a new wallpaper from this artwork and show it.
    GenerateAndSet(RgbImage),
}

impl Action {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NoChange => "no-change",
            Self::SetDefault => "set-default",
            Self::SetLastGenerated => "set-last-generated",
            Self::GenerateAndSet(_) => "generate-and-set",
        }
    }
}

/// Dedup state owned by the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtworkState {
    /// Key of the most recent signal that was not deduplicated.
    pub previous_url: Option<String>,
    /// URL of the artwork the generated wallpaper was made from.
    pub previously_generated_url: Option<String>,
    /// Content hash of that artwork.
    previously_generated_hash: Option<u64>,
}

/// Decides, poll by poll, whether the wallpaper has to change.
pub struct ArtworkChangeTracker {
    fetcher: Box<dyn ArtworkFetcher>,
    missing_artwork: Option<RgbImage>,
    state: ArtworkState,
}

impl ArtworkChangeTracker {
    /// Creates a tracker. Downloads identical to `missing_artwork` are treated
    /// as "nothing playing".
    #[must_use]
    pub fn new(fetcher: Box<dyn ArtworkFetcher>, missing_artwork: Option<RgbImage>) -> Self {
        Self {
            fetcher,
            missing_artwork,
            state: ArtworkState::default(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ArtworkState { &self.state }

    /// Maps one poll result to an action.
    pub fn decide(&mut self, signal: &TrackSignal) -> Action {
        let key = match signal {
            TrackSignal::Playing(url) => url.as_str(),
            TrackSignal::NotPlaying => DEFAULT_KEY,
            TrackSignal::Unknown => NONE_KEY,
        };

        if self.state.previous_url.as_deref() == Some(key) {
            return Action::NoChange;
        }
        self.state.previous_url = Some(key.to_string());

        match key {
            NONE_KEY => Action::NoChange,
            DEFAULT_KEY => Action::SetDefault,
            url => self.decide_for_url(url),
        }
    }

    fn decide_for_url(&mut self, url: &str) -> Action {
        if self.state.previously_generated_url.as_deref() == Some(url) {
            return Action::SetLastGenerated;
        }

        let artwork = match self.fetcher.fetch(url) {
            Ok(artwork) => artwork,
            Err(err) => {
                tracing::warn!(url, error = %err, "failed to download artwork");
                // Let the next poll try again
                self.state.previous_url = None;
                return Action::NoChange;
            }
        };

        if self.is_missing_artwork(&artwork) {
            tracing::debug!(url, "artwork is the missing-artwork placeholder");
            return Action::SetDefault;
        }

        let hash = image_hash(&artwork);
        if self.state.previously_generated_hash == Some(hash) {
            tracing::debug!(url, "artwork identical to the last generated one");
            self.state.previously_generated_url = Some(url.to_string());
            return Action::SetLastGenerated;
        }

        self.state.previously_generated_url = Some(url.to_string());
        self.state.previously_generated_hash = Some(hash);
        Action::GenerateAndSet(artwork)
    }

    fn is_missing_artwork(&self, artwork: &RgbImage) -> bool {
        self.missing_artwork.as_ref().is_some_and(|placeholder| {
            placeholder.dimensions() == artwork.dimensions()
                && placeholder.as_raw() == artwork.as_raw()
        })
    }

    /// Forgets the last signal so the next poll is evaluated from scratch.
    pub fn clear_previous(&mut self) { self.state.previous_url = None; }

    /// Forgets the last generated wallpaper. Called when composing it failed.
    pub fn forget_generated(&mut self) {
        self.state.previously_generated_url = None;
        self.state.previously_generated_hash = None;
    }

    /// Resets all dedup state.
    pub fn reset(&mut self) { self.state = ArtworkState::default(); }
}
