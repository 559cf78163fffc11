//! Error types for the login handshake, the result window and the player.
//!
//! Every failure is recovered at the component boundary and reported to the
//! caller. None of them is fatal to the session: the worst outcome is that
//! the action failed, the state is unchanged and the user may try again.

use std::time::Duration;

use thiserror::Error;

/// Configuration problems detected before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Spotify client id is not configured. Set SPOTIFY_API_AUTH_CLIENT_ID in your .env file.")]
    MissingClientId,

    #[error("Invalid redirect uri '{0}': {1}")]
    InvalidRedirectUri(String, String),

    #[error("Invalid endpoint '{0}': {1}")]
    InvalidEndpoint(String, String),

    #[error("Invalid value '{value}' for {name}")]
    InvalidNumber { name: &'static str, value: String },
}

/// Failures of the proof-key authorization handshake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("Authorization denied by Spotify: {0}")]
    AuthorizationDenied(String),

    #[error("State mismatch in OAuth callback, refusing to exchange the code")]
    StateMismatch,

    #[error("No PKCE code verifier stored for this login attempt")]
    MissingVerifier,

    #[error("Token exchange failed ({status}): {body}")]
    TokenExchangeFailed { status: u16, body: String },

    #[error("Token exchange request failed: {0}")]
    Transport(String),
}

/// Failures while searching the catalog or commanding the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowseError {
    #[error("Please enter a search keyword!")]
    EmptyKeyword,

    #[error("Not authenticated. Please log in first.")]
    NotAuthenticated,

    #[error("Failed to search for tracks: {0}")]
    SearchFailed(String),

    #[error("Could not play track. Make sure you have Spotify Premium. ({0})")]
    PlaybackRejected(String),

    #[error("Player not ready. Please wait a moment and try again.")]
    PlayerNotReady,

    #[error("Track {0} is not part of the current result window")]
    UnknownTrack(String),
}

/// Failures of the player bootstrap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("No Spotify Connect device became ready within {0:?}")]
    ReadyTimeout(Duration),

    #[error("Player readiness was already resolved")]
    AlreadyResolved,
}

impl From<PlayerError> for BrowseError {
    fn from(_: PlayerError) -> Self {
        BrowseError::PlayerNotReady
    }
}

impl From<reqwest::Error> for BrowseError {
    fn from(err: reqwest::Error) -> Self {
        BrowseError::SearchFailed(err.to_string())
    }
}
