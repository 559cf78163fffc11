use std::{fmt, time::Duration};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::types::TokenResponse;

/// Bearer credential issued by the login handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
    pub obtained_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            scope: None,
            expires_in: None,
            obtained_at: Utc::now(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl From<TokenResponse> for Credential {
    fn from(res: TokenResponse) -> Self {
        Self {
            access_token: res.access_token,
            scope: res.scope,
            expires_in: res.expires_in,
            obtained_at: Utc::now(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

/// Process-wide slot holding the current credential.
///
/// Written only by the login handshake; everyone else reads it.
#[derive(Clone)]
pub struct CredentialCell {
    tx: watch::Sender<Option<Credential>>,
}

impl Default for CredentialCell {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialCell {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// A cell that starts out holding `credential`.
    pub fn with_credential(credential: Credential) -> Self {
        let (tx, _) = watch::channel(Some(credential));
        Self { tx }
    }

    pub fn current(&self) -> Option<Credential> {
        self.tx.borrow().clone()
    }

    pub fn is_set(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub(crate) fn set(&self, credential: Credential) {
        self.tx.send_replace(Some(credential));
    }

    pub(crate) fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Waits until a credential is present, or `None` once `timeout` elapses.
    pub async fn wait_for(&self, timeout: Duration) -> Option<Credential> {
        let mut rx = self.tx.subscribe();
        match tokio::time::timeout(timeout, rx.wait_for(|c| c.is_some())).await {
            Ok(Ok(credential)) => credential.clone(),
            _ => None,
        }
    }
}
