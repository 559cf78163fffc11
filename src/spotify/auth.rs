use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use url::Url;

use crate::{
    config::AuthConfig,
    error::{AuthError, ConfigError},
    management::{
        Credential, CredentialCell, SessionStore,
        store::{KEY_AUTH_STATE, KEY_CODE_VERIFIER},
    },
    types::TokenResponse,
    utils,
};

use super::SpotifyClient;

/// Form fields of the authorization-code redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeExchange {
    pub client_id: String,
    pub code: String,
    pub redirect_uri: String,
    pub code_verifier: String,
}

impl CodeExchange {
    /// Form body of the token request.
    ///
    /// # Returns
    ///
    /// The five `application/x-www-form-urlencoded` fields in the order the
    /// accounts service documents them, with `grant_type` fixed to
    /// `authorization_code`.
    pub fn form(&self) -> [(&'static str, &str); 5] {
        [
            ("client_id", self.client_id.as_str()),
            ("grant_type", "authorization_code"),
            ("code", self.code.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code_verifier", self.code_verifier.as_str()),
        ]
    }
}

/// Redeems an authorization code at the identity provider.
///
/// [`SpotifyClient`] implements this with a form POST to its token URL.
/// Tests substitute a fake so the handshake runs without network access.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Sends one redemption request.
    ///
    /// # Arguments
    ///
    /// * `exchange` - Client id, code, redirect URI and code verifier to post
    ///
    /// # Returns
    ///
    /// The token response on a 2xx reply carrying an `access_token`.
    ///
    /// # Errors
    ///
    /// - `AuthError::TokenExchangeFailed` for a non-2xx status or a body
    ///   without an access token, carrying the status and raw body
    /// - `AuthError::Transport` when the request cannot be sent or read
    async fn exchange_code(&self, exchange: &CodeExchange) -> Result<TokenResponse, AuthError>;
}

#[async_trait]
impl TokenExchange for SpotifyClient {
    async fn exchange_code(&self, exchange: &CodeExchange) -> Result<TokenResponse, AuthError> {
        let res = self
            .http
            .post(&self.token_url)
            .form(&exchange.form())
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(AuthError::TokenExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<TokenResponse>(&body).map_err(|_| AuthError::TokenExchangeFailed {
            status: status.as_u16(),
            body,
        })
    }
}

/// Where to send the user agent to start a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// An ordinary page load without callback parameters.
    NoCallback,
    /// The code was redeemed. `clean_location` is the callback location with
    /// `code` and `state` removed.
    Authorized {
        credential: Credential,
        clean_location: Url,
    },
}

/// OAuth 2.0 authorization-code flow with PKCE against the Spotify accounts
/// service.
///
/// The handshake spans a full navigation away from the client and back, so
/// the code verifier and the anti-forgery state live in an injected
/// [`SessionStore`] between [`begin_login`](Self::begin_login) and
/// [`complete_login`](Self::complete_login). Both are single-use: a callback
/// takes them out of the store before redeeming the code, so a replayed or
/// concurrent load of the same callback fails the state check. A failed
/// redemption puts them back.
///
/// A second `begin_login` before the callback overwrites the pending attempt.
pub struct AuthHandshake {
    config: AuthConfig,
    store: Arc<dyn SessionStore>,
    exchange: Arc<dyn TokenExchange>,
    credentials: CredentialCell,
}

impl AuthHandshake {
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn SessionStore>,
        exchange: Arc<dyn TokenExchange>,
        credentials: CredentialCell,
    ) -> Self {
        Self {
            config,
            store,
            exchange,
            credentials,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialCell {
        &self.credentials
    }

    /// Generates the PKCE pair and anti-forgery state, stores what the
    /// callback needs and builds the authorization URL.
    ///
    /// # Returns
    ///
    /// The URL to navigate to. It carries `client_id`, `response_type=code`,
    /// `redirect_uri`, the fixed scopes, `code_challenge_method=S256`, the
    /// challenge and the state.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingClientId`, storing nothing, when no client
    /// id is configured.
    ///
    /// # Example
    ///
    /// ```
    /// let redirect = handshake.begin_login()?;
    /// webbrowser::open(redirect.url.as_str())?;
    /// ```
    pub fn begin_login(&self) -> Result<LoginRedirect, AuthError> {
        let client_id = self
            .config
            .client_id
            .as_deref()
            .ok_or(ConfigError::MissingClientId)?;

        let code_verifier = utils::generate_code_verifier();
        let code_challenge = utils::generate_code_challenge(&code_verifier);
        let state = utils::generate_state();

        let url = Url::parse_with_params(
            &self.config.auth_url,
            &[
                ("client_id", client_id),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", self.config.scope().as_str()),
                ("code_challenge_method", "S256"),
                ("code_challenge", code_challenge.as_str()),
                ("state", state.as_str()),
            ],
        )
        .map_err(|e| ConfigError::InvalidEndpoint(self.config.auth_url.clone(), e.to_string()))?;

        self.store.set(KEY_CODE_VERIFIER, &code_verifier);
        self.store.set(KEY_AUTH_STATE, &state);

        Ok(LoginRedirect { url })
    }

    /// Location of the callback page for the given raw query string.
    pub fn callback_location(&self, query: Option<&str>) -> Url {
        let mut location = self.config.redirect_uri.clone();
        location.set_query(query.filter(|q| !q.is_empty()));
        location
    }

    /// Inspects the current location after a page load.
    ///
    /// An `error` parameter means the user declined. `code` plus `state`
    /// is a callback: the state must equal the stored one byte for byte
    /// before the code is redeemed. Anything else is an ordinary load.
    ///
    /// # Arguments
    ///
    /// * `location` - Full callback URL including its query string
    ///
    /// # Returns
    ///
    /// - `LoginOutcome::NoCallback` for an ordinary load
    /// - `LoginOutcome::Authorized` once the code is redeemed. The credential
    ///   is also published to the handshake's [`CredentialCell`].
    ///
    /// # Errors
    ///
    /// - `AuthError::AuthorizationDenied` with the provider's reason
    /// - `AuthError::StateMismatch` when no attempt is pending, the state
    ///   differs or the callback was already used
    /// - `AuthError::MissingVerifier` when the verifier is gone
    /// - the exchange error when redemption fails; the attempt stays pending
    ///
    /// # Example
    ///
    /// ```
    /// let location = handshake.callback_location(Some("code=abc&state=xyz"));
    /// match handshake.complete_login(&location).await? {
    ///     LoginOutcome::Authorized { clean_location, .. } => show(clean_location),
    ///     LoginOutcome::NoCallback => {}
    /// }
    /// ```
    pub async fn complete_login(&self, location: &Url) -> Result<LoginOutcome, AuthError> {
        let params: HashMap<String, String> = location.query_pairs().into_owned().collect();

        if let Some(reason) = params.get("error") {
            return Err(AuthError::AuthorizationDenied(reason.clone()));
        }

        let (Some(code), Some(state)) = (params.get("code"), params.get("state")) else {
            return Ok(LoginOutcome::NoCallback);
        };

        // claim the pending attempt before the await so a second load of the
        // same callback finds nothing
        let stored_state = self.store.take(KEY_AUTH_STATE);
        if stored_state.as_deref().map(str::as_bytes) != Some(state.as_bytes()) {
            if let Some(stored) = stored_state {
                self.store.set(KEY_AUTH_STATE, &stored);
            }
            return Err(AuthError::StateMismatch);
        }

        let Some(code_verifier) = self.store.take(KEY_CODE_VERIFIER) else {
            self.store.set(KEY_AUTH_STATE, state);
            return Err(AuthError::MissingVerifier);
        };
        let Some(client_id) = self.config.client_id.clone() else {
            self.restore(state, &code_verifier);
            return Err(ConfigError::MissingClientId.into());
        };

        let exchange = CodeExchange {
            client_id,
            code: code.clone(),
            redirect_uri: self.config.redirect_uri.to_string(),
            code_verifier,
        };
        let token = match self.exchange.exchange_code(&exchange).await {
            Ok(token) => token,
            Err(e) => {
                self.restore(state, &exchange.code_verifier);
                return Err(e);
            }
        };

        let credential = Credential::from(token);
        self.credentials.set(credential.clone());

        Ok(LoginOutcome::Authorized {
            credential,
            clean_location: strip_callback_params(location),
        })
    }

    // puts a claimed attempt back so the same callback can be retried
    fn restore(&self, state: &str, code_verifier: &str) {
        self.store.set(KEY_AUTH_STATE, state);
        self.store.set(KEY_CODE_VERIFIER, code_verifier);
    }

    /// Drops the credential and any pending login attempt.
    ///
    /// Safe to call when nothing is stored. A callback arriving afterwards
    /// fails the state check.
    pub fn logout(&self) {
        self.credentials.clear();
        self.store.delete(KEY_CODE_VERIFIER);
        self.store.delete(KEY_AUTH_STATE);
    }
}

/// Removes `code` and `state` from a location, keeping other parameters.
///
/// # Arguments
///
/// * `location` - URL the callback page was loaded with
///
/// # Returns
///
/// The same URL without the two callback parameters. The query is dropped
/// entirely when nothing else remains.
///
/// # Example
///
/// ```
/// let url = Url::parse("http://127.0.0.1:3000/callback?code=a&state=b&view=x")?;
/// assert_eq!(strip_callback_params(&url).as_str(), "http://127.0.0.1:3000/callback?view=x");
/// ```
pub fn strip_callback_params(location: &Url) -> Url {
    let kept: Vec<(String, String)> = location
        .query_pairs()
        .into_owned()
        .filter(|(key, _)| key != "code" && key != "state")
        .collect();

    let mut clean = location.clone();
    if kept.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(kept);
    }
    clean
}
