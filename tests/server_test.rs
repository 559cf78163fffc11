//! End-to-end tests of the callback server.
//!
//! The router is served on an ephemeral local port and driven with reqwest,
//! the same way a browser loads the redirect target.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use spotrack::config::AuthConfig;
use spotrack::error::AuthError;
use spotrack::management::store::KEY_AUTH_STATE;
use spotrack::management::{CredentialCell, MemoryStore, SessionStore};
use spotrack::server;
use spotrack::spotify::{AuthHandshake, CodeExchange, TokenExchange};
use spotrack::types::TokenResponse;

struct AcceptingExchange;

#[async_trait]
impl TokenExchange for AcceptingExchange {
    async fn exchange_code(&self, _: &CodeExchange) -> Result<TokenResponse, AuthError> {
        Ok(TokenResponse {
            access_token: "access-token".to_string(),
            token_type: Some("Bearer".to_string()),
            scope: None,
            expires_in: Some(3600),
        })
    }
}

struct TestServer {
    base: String,
    handshake: Arc<AuthHandshake>,
    store: Arc<MemoryStore>,
    http: reqwest::Client,
}

impl TestServer {
    async fn get(&self, path_and_query: &str) -> String {
        self.http
            .get(format!("{}{}", self.base, path_and_query))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    }

    async fn health(&self) -> Value {
        self.http
            .get(format!("{}/health", self.base))
            .send()
            .await
            .unwrap()
            .json::<Value>()
            .await
            .unwrap()
    }
}

async fn start() -> TestServer {
    let config = AuthConfig::from_lookup(|name| match name {
        "SPOTIFY_API_AUTH_CLIENT_ID" => Some("client-123".to_string()),
        _ => None,
    })
    .unwrap();

    let store = Arc::new(MemoryStore::new());
    let handshake = Arc::new(AuthHandshake::new(
        config,
        store.clone(),
        Arc::new(AcceptingExchange),
        CredentialCell::new(),
    ));

    let listener = server::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, handshake.clone()));

    TestServer {
        base: format!("http://{}", addr),
        handshake,
        store,
        http: reqwest::Client::new(),
    }
}

#[tokio::test]
async fn test_health_reports_login() {
    let server = start().await;

    let before = server.health().await;
    assert_eq!(before["status"], "ok");
    assert_eq!(before["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(before["authenticated"], false);

    server.handshake.begin_login().unwrap();
    let state = server.store.get(KEY_AUTH_STATE).unwrap();
    server
        .get(&format!("/callback?code=auth-code&state={}", state))
        .await;

    assert_eq!(server.health().await["authenticated"], true);
}

#[tokio::test]
async fn test_plain_load_waits_for_authorization() {
    let server = start().await;

    let body = server.get("/callback").await;

    assert!(body.contains("Waiting for Spotify authorization."));
}

#[tokio::test]
async fn test_denied_authorization_page() {
    let server = start().await;
    server.handshake.begin_login().unwrap();

    let body = server
        .get("/callback?error=access_denied&state=whatever")
        .await;

    assert!(body.contains("Login failed."));
    assert!(body.contains("access_denied"));
    assert!(!server.handshake.credentials().is_set());
}

#[tokio::test]
async fn test_forged_state_page() {
    let server = start().await;
    server.handshake.begin_login().unwrap();

    let body = server.get("/callback?code=auth-code&state=forged").await;

    assert!(body.contains("Login failed."));
    assert!(body.contains("State mismatch"));
    assert!(!server.handshake.credentials().is_set());
}

#[tokio::test]
async fn test_success_page_hides_callback_params() {
    let server = start().await;
    server.handshake.begin_login().unwrap();
    let state = server.store.get(KEY_AUTH_STATE).unwrap();

    let body = server
        .get(&format!("/callback?code=auth-code&state={}&view=compact", state))
        .await;

    assert!(body.contains("Authentication successful."));
    assert!(body.contains("replaceState(null, '', '/callback?view=compact')"));
    assert!(!body.contains("code="));
    assert!(!body.contains("state="));
    assert!(server.handshake.credentials().is_set());

    // Reloading the same callback is refused
    let reload = server
        .get(&format!("/callback?code=auth-code&state={}&view=compact", state))
        .await;
    assert!(reload.contains("Login failed."));
}
