//! Art sources.
//!
//! An [`ArtSource`] answers one question per poll: which album art is playing
//! right now? Provider failures never escape `poll`; they are logged and
//! folded into [`TrackSignal::NotPlaying`] or [`TrackSignal::Unknown`].

pub mod http;
pub mod lastfm;
pub mod spotify;

use thiserror::Error;

pub use http::{HttpArtworkFetcher, HttpClient};
pub use lastfm::{LastFmArtSource, LastFmClient, ScrobbleApi};
pub use spotify::{SpotifyApi, SpotifyArtSource, SpotifyClient};

use crate::config::{AlbumPaperConfig, ApiKeys, ServiceKind};

/// Normalized result of one provider poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSignal {
    /// A track is playing and this is its artwork URL.
    Playing(String),
    /// Nothing is playing (or the provider could not be reached).
    NotPlaying,
    /// The provider answered with something we could not interpret.
    Unknown,
}

/// What a provider reports about the current track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NowPlaying {
    pub is_playing: bool,
    pub art_url: Option<String>,
    pub track_id: Option<String>,
}

impl NowPlaying {
    /// Maps the provider answer to a signal. Playing tracks without artwork
    /// count as not playing.
    #[must_use]
    pub fn into_signal(self) -> TrackSignal {
        match self.art_url {
            Some(url) if self.is_playing && !url.trim().is_empty() => TrackSignal::Playing(url),
            _ => TrackSignal::NotPlaying,
        }
    }
}

/// Errors raised while talking to a provider or downloading artwork.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// The provider answered with an unexpected HTTP status.
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    /// The access token was rejected.
    #[error("authorization expired")]
    AuthExpired,
    /// The payload did not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The downloaded artwork could not be decoded.
    #[error("failed to decode artwork: {0}")]
    Decode(String),
    /// The downloaded artwork exceeded the size limit.
    #[error("artwork larger than {0} bytes")]
    TooLarge(u64),
    /// A credential needed by the provider is not configured.
    #[error("missing credential: {0}")]
    MissingCredentials(&'static str),
}

/// A provider of "now playing" artwork.
pub trait ArtSource: Send {
    /// Short provider name used in logs.
    fn name(&self) -> &'static str;

    /// Queries the provider once.
    fn poll(&mut self) -> TrackSignal;
}

/// Builds the source selected in the configuration.
#[must_use]
pub fn build_source(
    config: &AlbumPaperConfig,
    keys: &ApiKeys,
    client: &HttpClient,
) -> Box<dyn ArtSource> {
    match config.service.name {
        ServiceKind::Spotify => Box::new(SpotifyArtSource::new(SpotifyClient::new(
            client.clone(),
            keys.spotify_client_id(),
            keys.spotify_client_secret(),
            keys.spotify_refresh_token(),
        ))),
        ServiceKind::LastFm => Box::new(LastFmArtSource::new(LastFmClient::new(
            client.clone(),
            &config.lastfm.username,
            keys.lastfm_api_key(),
        ))),
    }
}
