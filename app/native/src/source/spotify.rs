//! Spotify art source.
//!
//! Polls the "currently playing" endpoint of the Spotify Web API. Access
//! tokens are minted from a long-lived refresh token; obtaining that refresh
//! token (the OAuth consent flow) happens outside this crate.

use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use super::{ArtSource, HttpClient, NowPlaying, SourceError, TrackSignal};

const CURRENTLY_PLAYING_URL: &str = "https://api.spotify.com/v1/me/player/currently-playing";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Tokens are treated as expired this long before Spotify says so.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Spotify Web API operations used by [`SpotifyArtSource`].
pub trait SpotifyApi: Send {
    /// Fetches the current playback state.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::AuthExpired` when there is no valid access token
    /// or Spotify rejects it, and other variants for transport or payload
    /// problems.
    fn currently_playing(&mut self) -> Result<NowPlaying, SourceError>;

    /// Exchanges the refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns an error when credentials are missing or the exchange fails.
    fn refresh_token(&mut self) -> Result<(), SourceError>;
}

/// [`ArtSource`] for Spotify.
///
/// An expired token is refreshed and the request retried exactly once per
/// poll. Every other failure is logged and reported as `NotPlaying`.
pub struct SpotifyArtSource<A> {
    api: A,
}

impl<A: SpotifyApi> SpotifyArtSource<A> {
    pub const fn new(api: A) -> Self { Self { api } }

    fn signal_or_not_playing(result: Result<NowPlaying, SourceError>) -> TrackSignal {
        match result {
            Ok(now_playing) => now_playing.into_signal(),
            Err(err) => {
                tracing::warn!(error = %err, "spotify request failed");
                TrackSignal::NotPlaying
            }
        }
    }
}

impl<A: SpotifyApi> ArtSource for SpotifyArtSource<A> {
    fn name(&self) -> &'static str { "spotify" }

    fn poll(&mut self) -> TrackSignal {
        match self.api.currently_playing() {
            Err(SourceError::AuthExpired) => {
                tracing::debug!("spotify access token expired, refreshing");
                if let Err(err) = self.api.refresh_token() {
                    tracing::warn!(error = %err, "spotify token refresh failed");
                    return TrackSignal::NotPlaying;
                }
                Self::signal_or_not_playing(self.api.currently_playing())
            }
            result => Self::signal_or_not_playing(result),
        }
    }
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

/// [`SpotifyApi`] over HTTPS.
pub struct SpotifyClient {
    http: HttpClient,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    access: Option<AccessToken>,
}

impl SpotifyClient {
    #[must_use]
    pub fn new(
        http: HttpClient,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Self {
        Self {
            http,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            refresh_token: refresh_token.to_string(),
            access: None,
        }
    }

    fn valid_token(&self) -> Option<&str> {
        self.access
            .as_ref()
            .filter(|token| Instant::now() < token.expires_at)
            .map(|token| token.value.as_str())
    }
}

impl SpotifyApi for SpotifyClient {
    fn currently_playing(&mut self) -> Result<NowPlaying, SourceError> {
        let Some(token) = self.valid_token() else {
            return Err(SourceError::AuthExpired);
        };

        let result = self
            .http
            .agent()
            .get(CURRENTLY_PLAYING_URL)
            .set("Authorization", &format!("Bearer {token}"))
            .call();

        match result {
            // No active device
            Ok(response) if response.status() == 204 => Ok(NowPlaying::default()),
            Ok(response) => {
                let body = response.into_string().map_err(|e| SourceError::Network(e.to_string()))?;
                parse_currently_playing(&body)
            }
            Err(ureq::Error::Status(401, _)) => {
                self.access = None;
                Err(SourceError::AuthExpired)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn refresh_token(&mut self) -> Result<(), SourceError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(SourceError::MissingCredentials("SPOTIFY_CLIENT_ID/SPOTIFY_CLIENT_SECRET"));
        }
        if self.refresh_token.is_empty() {
            return Err(SourceError::MissingCredentials("SPOTIFY_REFRESH_TOKEN"));
        }

        let credentials = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        let response = self
            .http
            .agent()
            .post(TOKEN_URL)
            .set("Authorization", &format!("Basic {credentials}"))
            .send_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.refresh_token.as_str()),
            ])?;

        let body = response.into_string().map_err(|e| SourceError::Network(e.to_string()))?;
        let token = parse_token_response(&body)?;

        self.access = Some(AccessToken {
            value: token.access_token,
            expires_at: Instant::now()
                + Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN),
        });
        // Spotify may rotate the refresh token
        if let Some(refresh_token) = token.refresh_token.filter(|t| !t.is_empty()) {
            self.refresh_token = refresh_token;
        }

        tracing::debug!(expires_in = token.expires_in, "spotify access token refreshed");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CurrentlyPlayingPayload {
    #[serde(default)]
    is_playing: bool,
    item: Option<TrackItem>,
}

#[derive(Debug, Deserialize)]
struct TrackItem {
    id: Option<String>,
    album: Option<AlbumPayload>,
}

#[derive(Debug, Deserialize)]
struct AlbumPayload {
    #[serde(default)]
    images: Vec<ImagePayload>,
}

#[derive(Debug, Deserialize)]
struct ImagePayload {
    url: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
    refresh_token: Option<String>,
}

const fn default_expires_in() -> u64 { 3600 }

/// Maps a currently-playing payload. Local files and podcasts without album
/// images yield no artwork.
fn parse_currently_playing(body: &str) -> Result<NowPlaying, SourceError> {
    let payload: CurrentlyPlayingPayload =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    let item = payload.item;
    let track_id = item.as_ref().and_then(|item| item.id.clone());
    let art_url = item
        .and_then(|item| item.album)
        .and_then(|album| album.images.into_iter().next())
        .map(|image| image.url);

    Ok(NowPlaying { is_playing: payload.is_playing, art_url, track_id })
}

fn parse_token_response(body: &str) -> Result<TokenResponse, SourceError> {
    serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    struct FakeApi {
        responses: VecDeque<Result<NowPlaying, SourceError>>,
        refresh_result: Option<SourceError>,
        refreshes: usize,
        requests: usize,
    }

    impl FakeApi {
        fn new(responses: Vec<Result<NowPlaying, SourceError>>) -> Self {
            Self {
                responses: responses.into(),
                refresh_result: None,
                refreshes: 0,
                requests: 0,
            }
        }
    }

    impl SpotifyApi for FakeApi {
        fn currently_playing(&mut self) -> Result<NowPlaying, SourceError> {
            self.requests += 1;
            self.responses.pop_front().unwrap_or(Err(SourceError::Status(500)))
        }

        fn refresh_token(&mut self) -> Result<(), SourceError> {
            self.refreshes += 1;
            self.refresh_result.take().map_or(Ok(()), Err)
        }
    }

    fn playing(url: &str) -> NowPlaying {
        NowPlaying {
            is_playing: true,
            art_url: Some(url.to_string()),
            track_id: Some("id".to_string()),
        }
    }

    // ========================================================================
    // Art source behaviour
    // ========================================================================

    #[test]
    fn test_poll_playing() {
        let mut source = SpotifyArtSource::new(FakeApi::new(vec![Ok(playing("https://a"))]));
        assert_eq!(source.poll(), TrackSignal::Playing("https://a".to_string()));
        assert_eq!(source.api.refreshes, 0);
    }

    #[test]
    fn test_poll_refreshes_and_retries_once_on_auth_expiry() {
        let api = FakeApi::new(vec![Err(SourceError::AuthExpired), Ok(playing("https://b"))]);
        let mut source = SpotifyArtSource::new(api);

        assert_eq!(source.poll(), TrackSignal::Playing("https://b".to_string()));
        assert_eq!(source.api.refreshes, 1);
        assert_eq!(source.api.requests, 2);
    }

    #[test]
    fn test_poll_does_not_retry_twice() {
        let api = FakeApi::new(vec![Err(SourceError::AuthExpired), Err(SourceError::AuthExpired)]);
        let mut source = SpotifyArtSource::new(api);

        assert_eq!(source.poll(), TrackSignal::NotPlaying);
        assert_eq!(source.api.refreshes, 1);
        assert_eq!(source.api.requests, 2);
    }

    #[test]
    fn test_poll_refresh_failure_is_not_playing() {
        let mut api = FakeApi::new(vec![Err(SourceError::AuthExpired), Ok(playing("https://c"))]);
        api.refresh_result = Some(SourceError::Network("offline".to_string()));
        let mut source = SpotifyArtSource::new(api);

        assert_eq!(source.poll(), TrackSignal::NotPlaying);
        assert_eq!(source.api.requests, 1);

        // The next poll starts from scratch
        assert_eq!(source.poll(), TrackSignal::Playing("https://c".to_string()));
    }

    #[test]
    fn test_poll_other_failures_fail_open() {
        let api = FakeApi::new(vec![
            Err(SourceError::Network("timeout".to_string())),
            Err(SourceError::Malformed("bad".to_string())),
        ]);
        let mut source = SpotifyArtSource::new(api);

        assert_eq!(source.poll(), TrackSignal::NotPlaying);
        assert_eq!(source.poll(), TrackSignal::NotPlaying);
        assert_eq!(source.api.refreshes, 0);
    }

    #[test]
    fn test_poll_no_device_is_not_playing() {
        let mut source = SpotifyArtSource::new(FakeApi::new(vec![Ok(NowPlaying::default())]));
        assert_eq!(source.poll(), TrackSignal::NotPlaying);
    }

    // ========================================================================
    // Client
    // ========================================================================

    #[test]
    fn test_client_without_token_reports_auth_expired() {
        let mut client = SpotifyClient::new(HttpClient::new(), "id", "secret", "refresh");
        assert!(matches!(client.currently_playing(), Err(SourceError::AuthExpired)));
    }

    #[test]
    fn test_client_refresh_requires_credentials() {
        let mut client = SpotifyClient::new(HttpClient::new(), "", "", "");
        assert!(matches!(client.refresh_token(), Err(SourceError::MissingCredentials(_))));

        let mut client = SpotifyClient::new(HttpClient::new(), "id", "secret", "");
        assert!(matches!(
            client.refresh_token(),
            Err(SourceError::MissingCredentials("SPOTIFY_REFRESH_TOKEN"))
        ));
    }

    // ========================================================================
    // Payload parsing
    // ========================================================================

    #[test]
    fn test_parse_currently_playing() {
        let body = r#"{
            "is_playing": true,
            "item": {
                "id": "4uLU6hMCjMI75M1A2tKUQC",
                "album": {
                    "images": [
                        { "url": "https://i.scdn.co/image/640", "width": 640, "height": 640 },
                        { "url": "https://i.scdn.co/image/300", "width": 300, "height": 300 }
                    ]
                }
            }
        }"#;

        let now_playing = parse_currently_playing(body).unwrap();
        assert!(now_playing.is_playing);
        assert_eq!(now_playing.art_url.as_deref(), Some("https://i.scdn.co/image/640"));
        assert_eq!(now_playing.track_id.as_deref(), Some("4uLU6hMCjMI75M1A2tKUQC"));
    }

    #[test]
    fn test_parse_currently_playing_podcast_without_album() {
        let body = r#"{ "is_playing": true, "item": { "id": "ep" } }"#;
        let now_playing = parse_currently_playing(body).unwrap();
        assert!(now_playing.art_url.is_none());
        assert_eq!(now_playing.into_signal(), TrackSignal::NotPlaying);
    }

    #[test]
    fn test_parse_currently_playing_rejects_garbage() {
        assert!(matches!(parse_currently_playing("<html>"), Err(SourceError::Malformed(_))));
    }

    #[test]
    fn test_parse_token_response() {
        let token = parse_token_response(
            r#"{ "access_token": "abc", "token_type": "Bearer", "expires_in": 3600 }"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, 3600);
        assert!(token.refresh_token.is_none());

        let token = parse_token_response(r#"{ "access_token": "abc" }"#).unwrap();
        assert_eq!(token.expires_in, 3600);
    }
}
