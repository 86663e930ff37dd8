//! Environment file parsing utilities.
//!
//! Provider secrets are loaded from an environment file (`.env` format)
//! instead of being stored in the configuration file. Variables that are
//! missing from the file fall back to the process environment.
//!
//! Uses the `dotenvy` crate for `.env` parsing.

use std::collections::HashMap;
use std::path::Path;

use crate::platform::path::expand_and_resolve;

/// Environment variable names for provider secrets.
pub mod keys {
    /// Spotify application client id.
    pub const SPOTIFY_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
    /// Spotify application client secret.
    pub const SPOTIFY_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
    /// Long-lived Spotify refresh token obtained through the OAuth flow.
    pub const SPOTIFY_REFRESH_TOKEN: &str = "SPOTIFY_REFRESH_TOKEN";
    /// Last.fm API key.
    pub const LASTFM_API_KEY: &str = "LASTFM_API_KEY";
}

/// Parses an environment file and returns a map of key-value pairs.
///
/// Returns an empty map if the file doesn't exist or can't be read.
#[must_use]
pub fn parse_env_file(path: &Path) -> HashMap<String, String> {
    match dotenvy::from_path_iter(path) {
        Ok(iter) => iter.filter_map(Result::ok).collect(),
        Err(err) => {
            if path.exists() {
                tracing::warn!(path = %path.display(), error = %err, "failed to read env file");
            }
            HashMap::new()
        }
    }
}

/// Loads provider secrets.
///
/// # Arguments
///
/// * `api_keys_path` - Path to the env file (can be relative, absolute or empty)
/// * `config_dir` - Directory containing the config file (for resolving relative paths)
#[must_use]
pub fn load_api_keys(api_keys_path: &str, config_dir: &Path) -> ApiKeys {
    let env_vars = if api_keys_path.trim().is_empty() {
        HashMap::new()
    } else {
        parse_env_file(&expand_and_resolve(api_keys_path, config_dir))
    };

    ApiKeys::from_lookup(|key| {
        env_vars.get(key).cloned().or_else(|| std::env::var(key).ok())
    })
}

/// Container for provider secrets.
#[derive(Clone, Default)]
pub struct ApiKeys {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub spotify_refresh_token: Option<String>,
    pub lastfm_api_key: Option<String>,
}

impl ApiKeys {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            spotify_client_id: get(keys::SPOTIFY_CLIENT_ID),
            spotify_client_secret: get(keys::SPOTIFY_CLIENT_SECRET),
            spotify_refresh_token: get(keys::SPOTIFY_REFRESH_TOKEN),
            lastfm_api_key: get(keys::LASTFM_API_KEY),
        }
    }

    #[must_use]
    pub fn spotify_client_id(&self) -> &str { self.spotify_client_id.as_deref().unwrap_or("") }

    #[must_use]
    pub fn spotify_client_secret(&self) -> &str {
        self.spotify_client_secret.as_deref().unwrap_or("")
    }

    #[must_use]
    pub fn spotify_refresh_token(&self) -> &str {
        self.spotify_refresh_token.as_deref().unwrap_or("")
    }

    #[must_use]
    pub fn lastfm_api_key(&self) -> &str { self.lastfm_api_key.as_deref().unwrap_or("") }
}

// Secrets never end up in logs.
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |value: &Option<String>| if value.is_some() { "<set>" } else { "<unset>" };

        f.debug_struct("ApiKeys")
            .field("spotify_client_id", &mask(&self.spotify_client_id))
            .field("spotify_client_secret", &mask(&self.spotify_client_secret))
            .field("spotify_refresh_token", &mask(&self.spotify_refresh_token))
            .field("lastfm_api_key", &mask(&self.lastfm_api_key))
            .finish()
    }
}
