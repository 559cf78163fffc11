//! # CLI Module
//!
//! The command-line layer of spotrack. It wires the Spotify client, the login
//! handshake and the result window together and handles user interaction.
//!
//! ## Commands
//!
//! - [`auth`] - Runs the PKCE login once and greets the user, to check the setup
//! - [`session`] - Logs in, then runs an interactive loop: type a keyword to
//!   search, a track number to play it (again to pause, a third time to resume),
//!   `t`/`n`/`p` to toggle or skip, `l` to list the window, `q` to quit
//!
//! ## Usage Patterns
//!
//! ```bash
//! spotrack auth                    # Check that login works
//! spotrack session                 # Search and play interactively
//! spotrack session --keyword jazz  # Start with a search
//! ```
//!
//! Nothing is persisted: the credential lives as long as the process.

mod auth;
mod session;

pub use auth::LOGIN_TIMEOUT;
pub use auth::LoginContext;
pub use auth::auth;
pub use auth::login;
pub use session::SessionCommand;
pub use session::parse_command;
pub use session::session;
