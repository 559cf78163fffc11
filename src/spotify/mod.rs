//! # Spotify Integration Module
//!
//! This module is the integration layer between spotrack and Spotify's services.
//! It implements the login handshake against the accounts service and the three
//! collaborator seams the rest of the application depends on.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (CLI, TrackBrowser)
//!          ↓
//! Collaborator traits
//!     ├── TokenExchange  (authorization code redemption)
//!     ├── Catalog        (paged track search)
//!     └── PlayerControl  (Spotify Connect playback)
//!          ↓
//! SpotifyClient (reqwest, JSON)
//!          ↓
//! Spotify accounts service / Web API
//! ```
//!
//! ## Core Modules
//!
//! [`auth`] - OAuth 2.0 authorization-code flow with PKCE:
//! - **PKCE Security**: verifier and S256 challenge, no client secret involved
//! - **Anti-forgery State**: random state round-tripped through the redirect and
//!   compared byte for byte before any code is redeemed
//! - **Single Use**: a callback claims the stored artifacts before redeeming the code
//!
//! [`search`] - `GET /search` restricted to tracks, paged by `limit`/`offset`.
//!
//! [`player`] - Playback commands on a Spotify Connect device plus the device
//! bootstrap that resolves the player readiness signal.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - Authorization code exchange
//! - `GET /search` - Track search
//! - `GET /me` - Current user profile
//! - `GET /me/player`, `GET /me/player/devices` - Playback state and devices
//! - `PUT /me/player/play`, `PUT /me/player/pause` - Play, resume and pause
//! - `POST /me/player/next`, `POST /me/player/previous` - Skipping
//!
//! ## Error Types
//!
//! Handshake failures are [`AuthError`](crate::error::AuthError); search and
//! player failures are [`BrowseError`](crate::error::BrowseError). Transient
//! failures are never retried automatically.

pub mod auth;
pub mod client;
pub mod player;
pub mod search;
pub mod user;

pub use auth::{AuthHandshake, CodeExchange, LoginOutcome, LoginRedirect, TokenExchange};
pub use client::SpotifyClient;
pub use player::{PlayerControl, bootstrap_player, choose_device};
pub use search::Catalog;

use crate::types::SpotifyErrorResponse;

/// Extracts the message of a Spotify error body, or returns the raw text.
///
/// # Arguments
///
/// * `text` - Response body of a failed Web API call
///
/// # Returns
///
/// `error.message` when the body has Spotify's `{"error": {...}}` shape,
/// otherwise the trimmed body as is.
///
/// # Example
///
/// ```
/// let body = r#"{"error":{"status":401,"message":"The access token expired"}}"#;
/// assert_eq!(parse_spotify_error(body), "The access token expired");
/// ```
pub fn parse_spotify_error(text: &str) -> String {
    match serde_json::from_str::<SpotifyErrorResponse>(text) {
        Ok(err) => err.error.message,
        Err(_) => text.trim().to_string(),
    }
}
