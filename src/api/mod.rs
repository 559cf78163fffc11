//! # API Module
//!
//! HTTP endpoints of the local server that receives the Spotify login
//! redirect.
//!
//! ## Endpoints
//!
//! - [`callback`] - The redirect target. Every request is treated as a page
//!   load and handed to [`AuthHandshake::complete_login`]. On success the page
//!   replaces the visible location with one stripped of `code` and `state`.
//! - [`health`] - Status and version, handy for checking the server is up.
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use axum::{Extension, Router, routing::get};
//! use spotrack::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health))
//!     .layer(Extension(handshake));
//! ```
//!
//! [`AuthHandshake::complete_login`]: crate::spotify::AuthHandshake::complete_login

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
