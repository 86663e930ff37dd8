//! Last.fm art source.
//!
//! Reads the most recent scrobble of a user. Only tracks flagged as
//! "now playing" produce artwork.

use serde_json::Value;

use super::{ArtSource, HttpClient, SourceError, TrackSignal};

const API_URL: &str = "http://ws.audioscrobbler.com/2.0/";

/// Thumbnail segment in Last.fm image URLs and its high resolution twin.
const THUMBNAIL_SEGMENT: &str = "/i/u/34s/";
const FULL_SIZE_SEGMENT: &str = "/i/u/600x600/";

/// Scrobble service operations used by [`LastFmArtSource`].
pub trait ScrobbleApi: Send {
    /// Fetches the `user.getRecentTracks` payload with a limit of one.
    ///
    /// # Errors
    ///
    /// Returns an error when no JSON document could be obtained.
    fn recent_tracks(&self) -> Result<Value, SourceError>;
}

/// [`ArtSource`] for Last.fm.
///
/// Network failures map to `NotPlaying`. A payload without the expected keys
/// (Last.fm hiccups, invalid API key) maps to `Unknown`.
pub struct LastFmArtSource<C> {
    client: C,
}

impl<C: ScrobbleApi> LastFmArtSource<C> {
    pub const fn new(client: C) -> Self { Self { client } }
}

impl<C: ScrobbleApi> ArtSource for LastFmArtSource<C> {
    fn name(&self) -> &'static str { "lastfm" }

    fn poll(&mut self) -> TrackSignal {
        match self.client.recent_tracks() {
            Ok(payload) => signal_from_payload(&payload),
            Err(err) => {
                tracing::warn!(error = %err, "last.fm request failed");
                TrackSignal::NotPlaying
            }
        }
    }
}

/// [`ScrobbleApi`] over HTTP.
pub struct LastFmClient {
    http: HttpClient,
    username: String,
    api_key: String,
}

impl LastFmClient {
    #[must_use]
    pub fn new(http: HttpClient, username: &str, api_key: &str) -> Self {
        Self {
            http,
            username: username.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

impl ScrobbleApi for LastFmClient {
    fn recent_tracks(&self) -> Result<Value, SourceError> {
        if self.api_key.is_empty() {
            return Err(SourceError::MissingCredentials("LASTFM_API_KEY"));
        }

        let result = self
            .http
            .agent()
            .get(API_URL)
            .query("method", "user.getRecentTracks")
            .query("limit", "1")
            .query("user", &self.username)
            .query("api_key", &self.api_key)
            .query("format", "json")
            .call();

        let response = match result {
            Ok(response) => response,
            // Error statuses still carry a JSON body ({"error": 10, "message": ...})
            Err(ureq::Error::Status(code, response)) => {
                tracing::debug!(status = code, "last.fm answered with an error status");
                response
            }
            Err(err) => return Err(err.into()),
        };

        response.into_json::<Value>().map_err(|e| SourceError::Malformed(e.to_string()))
    }
}

/// Interprets a `user.getRecentTracks` payload.
fn signal_from_payload(payload: &Value) -> TrackSignal {
    let Some(tracks) = payload.get("recenttracks").and_then(|r| r.get("track")) else {
        tracing::debug!("last.fm payload without recenttracks.track");
        return TrackSignal::Unknown;
    };

    // A single track may be returned as a bare object
    let latest = match tracks {
        Value::Array(list) => list.first(),
        Value::Object(_) => Some(tracks),
        _ => return TrackSignal::Unknown,
    };
    let Some(latest) = latest else {
        return TrackSignal::NotPlaying;
    };

    let now_playing = latest
        .get("@attr")
        .and_then(|attr| attr.get("nowplaying"))
        .and_then(Value::as_str)
        .is_some_and(|flag| flag.eq_ignore_ascii_case("true"));
    if !now_playing {
        return TrackSignal::NotPlaying;
    }

    let url = latest
        .get("image")
        .and_then(Value::as_array)
        .and_then(|images| images.first())
        .and_then(|image| image.get("#text"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    if url.trim().is_empty() {
        return TrackSignal::NotPlaying;
    }

    TrackSignal::Playing(url.replace(THUMBNAIL_SEGMENT, FULL_SIZE_SEGMENT))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct FakeScrobbles(Result<Value, ()>);

    impl ScrobbleApi for FakeScrobbles {
        fn recent_tracks(&self) -> Result<Value, SourceError> {
            self.0.clone().map_err(|()| SourceError::Network("offline".to_string()))
        }
    }

    fn track(now_playing: bool, url: &str) -> Value {
        let mut track = json!({
            "name": "Song",
            "image": [
                { "#text": url, "size": "small" },
                { "#text": url.replace("34s", "64s"), "size": "medium" }
            ]
        });
        if now_playing {
            track["@attr"] = json!({ "nowplaying": "true" });
        }
        track
    }

    const THUMB: &str = "https://lastfm.freetls.fastly.net/i/u/34s/abc.png";

    #[test]
    fn test_now_playing_uses_full_size_image() {
        let payload = json!({ "recenttracks": { "track": [track(true, THUMB)] } });
        assert_eq!(
            signal_from_payload(&payload),
            TrackSignal::Playing("https://lastfm.freetls.fastly.net/i/u/600x600/abc.png".to_string())
        );
    }

    #[test]
    fn test_single_track_object_is_accepted() {
        let payload = json!({ "recenttracks": { "track": track(true, THUMB) } });
        assert!(matches!(signal_from_payload(&payload), TrackSignal::Playing(_)));
    }

    #[test]
    fn test_not_now_playing() {
        let payload = json!({ "recenttracks": { "track": [track(false, THUMB)] } });
        assert_eq!(signal_from_payload(&payload), TrackSignal::NotPlaying);

        let empty = json!({ "recenttracks": { "track": [] } });
        assert_eq!(signal_from_payload(&empty), TrackSignal::NotPlaying);
    }

    #[test]
    fn test_now_playing_without_image_is_not_playing() {
        let payload = json!({ "recenttracks": { "track": [track(true, "")] } });
        assert_eq!(signal_from_payload(&payload), TrackSignal::NotPlaying);
    }

    #[test]
    fn test_malformed_payload_is_unknown() {
        let error = json!({ "error": 10, "message": "Invalid API key" });
        assert_eq!(signal_from_payload(&error), TrackSignal::Unknown);

        let no_track = json!({ "recenttracks": {} });
        assert_eq!(signal_from_payload(&no_track), TrackSignal::Unknown);

        let wrong_type = json!({ "recenttracks": { "track": "nope" } });
        assert_eq!(signal_from_payload(&wrong_type), TrackSignal::Unknown);
    }

    #[test]
    fn test_poll_maps_network_failure_to_not_playing() {
        let mut source = LastFmArtSource::new(FakeScrobbles(Err(())));
        assert_eq!(source.poll(), TrackSignal::NotPlaying);
    }

    #[test]
    fn test_poll_passes_payload_through() {
        let payload = json!({ "recenttracks": { "track": [track(true, THUMB)] } });
        let mut source = LastFmArtSource::new(FakeScrobbles(Ok(payload)));
        assert!(matches!(source.poll(), TrackSignal::Playing(_)));
        assert_eq!(source.name(), "lastfm");
    }

    #[test]
    fn test_client_requires_api_key() {
        let client = LastFmClient::new(HttpClient::new(), "someone", "");
        assert!(matches!(
            client.recent_tracks(),
            Err(SourceError::MissingCredentials("LASTFM_API_KEY"))
        ));
    }
}
