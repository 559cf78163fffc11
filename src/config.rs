//! Configuration management for spotrack.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. It provides a centralized way to manage the Spotify
//! client id, the redirect target of the login handshake, the Web API endpoints and
//! the tuning of the result window.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, net::SocketAddr, path::PathBuf};

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:3000/callback";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_MARKET: &str = "US";
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_PREFETCH_LOOKAHEAD: usize = 3;
pub const DEFAULT_TRIM_LOOKBACK: usize = 3;

/// Capability scopes requested during login.
pub const SCOPES: [&str; 5] = [
    "user-read-private",
    "user-read-email",
    "streaming",
    "user-read-playback-state",
    "user-modify-playback-state",
];

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the necessary directory structure if it doesn't exist and loads
/// environment variables from a `.env` file located in the platform-specific
/// local data directory under `spotrack/.env`. Variables already present in the
/// process environment win over the file.
///
/// # Directory Structure
///
/// The function looks for the `.env` file in:
/// - Linux: `~/.local/share/spotrack/.env`
/// - macOS: `~/Library/Application Support/spotrack/.env`
/// - Windows: `%LOCALAPPDATA%/spotrack/.env`
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or the file
/// exists but cannot be parsed. A missing file is not an error.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotrack/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| e.to_string())
}

/// Settings of the proof-key login handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Absent when `SPOTIFY_API_AUTH_CLIENT_ID` is not set; login then fails fast.
    pub client_id: Option<String>,
    pub redirect_uri: Url,
    pub auth_url: String,
    pub token_url: String,
    pub scopes: Vec<String>,
}

impl AuthConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_redirect =
            lookup("SPOTIFY_API_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string());
        let redirect_uri = Url::parse(&raw_redirect)
            .map_err(|e| ConfigError::InvalidRedirectUri(raw_redirect.clone(), e.to_string()))?;

        Ok(Self {
            client_id: lookup("SPOTIFY_API_AUTH_CLIENT_ID").filter(|id| !id.trim().is_empty()),
            redirect_uri,
            auth_url: lookup("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            token_url: lookup("SPOTIFY_API_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Space-joined scope list as sent to the authorization endpoint.
    pub fn scope(&self) -> String {
        self.scopes.join(" ")
    }

    /// Address the local callback server binds to, taken from the redirect target.
    pub fn server_addr(&self) -> Result<SocketAddr, ConfigError> {
        let invalid = |reason: &str| {
            ConfigError::InvalidRedirectUri(self.redirect_uri.to_string(), reason.to_string())
        };

        let host = self.redirect_uri.host_str().ok_or_else(|| invalid("missing host"))?;
        let port = self
            .redirect_uri
            .port_or_known_default()
            .ok_or_else(|| invalid("missing port"))?;
        let host = if host == "localhost" { "127.0.0.1" } else { host };

        format!("{host}:{port}")
            .parse()
            .map_err(|_| invalid("host is not an ip address"))
    }
}

/// Tuning of the sliding result window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub page_size: usize,
    /// Selecting one of the last `prefetch_lookahead` items fetches the next page.
    pub prefetch_lookahead: usize,
    /// Number of items kept above the selected one when trimming.
    pub trim_lookback: usize,
    pub market: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            prefetch_lookahead: DEFAULT_PREFETCH_LOOKAHEAD,
            trim_lookback: DEFAULT_TRIM_LOOKBACK,
            market: DEFAULT_MARKET.to_string(),
        }
    }
}

impl WindowConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |name: &'static str, default: usize| -> Result<usize, ConfigError> {
            match lookup(name) {
                None => Ok(default),
                Some(value) => value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidNumber { name, value }),
            }
        };

        let page_size = number("SPOTRACK_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::InvalidNumber {
                name: "SPOTRACK_PAGE_SIZE",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            page_size,
            prefetch_lookahead: number("SPOTRACK_PREFETCH_LOOKAHEAD", DEFAULT_PREFETCH_LOOKAHEAD)?,
            trim_lookback: number("SPOTRACK_TRIM_LOOKBACK", DEFAULT_TRIM_LOOKBACK)?,
            market: lookup("SPOTIFY_MARKET").unwrap_or_else(|| DEFAULT_MARKET.to_string()),
        })
    }
}

/// Returns the Spotify Web API base URL.
///
/// Reads `SPOTIFY_API_URL`, falling back to the public endpoint.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Returns the name of the Spotify Connect device to play on, if one is pinned.
pub fn device_name() -> Option<String> {
    env::var("SPOTRACK_DEVICE_NAME")
        .ok()
        .filter(|name| !name.trim().is_empty())
}
