use reqwest::Client;

use crate::config;

/// HTTP client for the Spotify accounts service and Web API.
///
/// Implements [`TokenExchange`](super::TokenExchange),
/// [`Catalog`](super::Catalog) and [`PlayerControl`](super::PlayerControl).
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    pub(crate) http: Client,
    pub(crate) api_url: String,
    pub(crate) token_url: String,
}

impl SpotifyClient {
    /// Creates a client for explicit endpoints.
    ///
    /// # Arguments
    ///
    /// * `api_url` - Web API base, e.g. `https://api.spotify.com/v1/`
    /// * `token_url` - Accounts service token endpoint
    ///
    /// # Example
    ///
    /// ```
    /// let client = SpotifyClient::new(
    ///     "https://api.spotify.com/v1/",
    ///     "https://accounts.spotify.com/api/token",
    /// );
    /// ```
    pub fn new(api_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token_url: token_url.into(),
        }
    }

    /// Client for the configured Web API and the given token endpoint.
    ///
    /// The API base comes from `SPOTIFY_API_URL` and the token endpoint from
    /// `auth.token_url`.
    pub fn from_config(auth: &config::AuthConfig) -> Self {
        Self::new(config::spotify_apiurl(), auth.token_url.clone())
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }
}
