//! Spotify Track Search Library
//!
//! This library lets a user log in to Spotify without a client secret, search the
//! track catalog and drive playback on a Spotify Connect device. It contains the
//! proof-key login handshake, the sliding result window that backs search and
//! playback, and the plumbing around them.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local login callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error types reported by the handshake, the window and the player
//! - `management` - Result window, credential, session storage and player signals
//! - `server` - Local HTTP server for the OAuth redirect
//! - `spotify` - Spotify accounts service and Web API client
//! - `types` - Data structures and type definitions
//! - `utils` - PKCE helpers and formatting
//!
//! # Example
//!
//! ```
//! use spotrack::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> spotrack::Res<()> {
//!     config::load_env().await?;
//!     cli::session(Some("jazz".to_string())).await
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the CLI plumbing where any error ends up printed to the user.
/// Library operations return the typed errors from [`error`] instead.
///
/// # Example
///
/// ```
/// use spotrack::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Waiting for Spotify authorization...");
/// info!("Showing {} of {} tracks", shown, total);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Authentication successful!");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only meant for fatal startup failures of the binary. Library code reports
/// errors through return values.
///
/// # Example
///
/// ```
/// error!("Cannot start the callback server: {}", err);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable problems: a rejected play command, a failed
/// prefetch, a browser that could not be opened.
///
/// # Example
///
/// ```
/// warning!("Failed to load more tracks: {}", err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
