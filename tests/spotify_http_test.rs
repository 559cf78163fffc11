//! HTTP-level tests of the Spotify client.
//!
//! These tests use wiremock to stand in for the accounts service and the Web
//! API, so they run without network access or a Spotify account.

use serde_json::json;
use spotrack::error::{AuthError, BrowseError};
use spotrack::management::{Credential, FetchKind, PageRequest};
use spotrack::spotify::{Catalog, CodeExchange, PlayerControl, SpotifyClient, TokenExchange};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a client pointed at a mock server.
fn mock_client(server: &MockServer) -> SpotifyClient {
    SpotifyClient::new(
        format!("{}/v1/", server.uri()),
        format!("{}/api/token", server.uri()),
    )
}

fn track_json(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Song {}", id),
        "artists": [{ "id": "a1", "name": "Band" }],
        "album": {
            "id": "al1",
            "name": "Record",
            "images": [{ "url": "https://i.scdn.co/image/large", "height": 640, "width": 640 }]
        },
        "duration_ms": 215000,
        "uri": format!("spotify:track:{}", id)
    })
}

fn exchange() -> CodeExchange {
    CodeExchange {
        client_id: "client-123".to_string(),
        code: "auth-code".to_string(),
        redirect_uri: "http://127.0.0.1:3000/callback".to_string(),
        code_verifier: "verifier".to_string(),
    }
}

// ============================================================================
// Token exchange
// ============================================================================

#[tokio::test]
async fn test_token_exchange_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=auth-code"))
        .and(body_string_contains("code_verifier=verifier"))
        .and(body_string_contains("client_id=client-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "BQD-token",
            "token_type": "Bearer",
            "scope": "streaming user-read-private",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = mock_client(&server).exchange_code(&exchange()).await.unwrap();

    assert_eq!(token.access_token, "BQD-token");
    assert_eq!(token.expires_in, Some(3600));
}

#[tokio::test]
async fn test_token_exchange_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code"
        })))
        .mount(&server)
        .await;

    let result = mock_client(&server).exchange_code(&exchange()).await;

    match result {
        Err(AuthError::TokenExchangeFailed { status, body }) => {
            assert_eq!(status, 400);
            assert!(body.contains("invalid_grant"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_token_exchange_without_access_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "Bearer" })))
        .mount(&server)
        .await;

    let result = mock_client(&server).exchange_code(&exchange()).await;

    assert!(matches!(
        result,
        Err(AuthError::TokenExchangeFailed { status: 200, .. })
    ));
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_search_sends_paging_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(header("authorization", "Bearer token"))
        .and(query_param("q", "jazz"))
        .and(query_param("type", "track"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "40"))
        .and(query_param("market", "US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": {
                "items": [track_json("t40"), track_json("t41")],
                "total": 42,
                "offset": 40,
                "limit": 20,
                "next": null
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = PageRequest {
        generation: 1,
        kind: FetchKind::Append,
        query: "jazz".to_string(),
        offset: 40,
        limit: 20,
        market: "US".to_string(),
    };
    let page = mock_client(&server)
        .search_tracks(&Credential::new("token"), &request)
        .await
        .unwrap();

    assert_eq!(page.total, 42);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, "t40");
    assert_eq!(page.items[0].artist_names(), "Band");
}

#[tokio::test]
async fn test_search_skips_tracks_without_id() {
    let server = MockServer::start().await;

    let mut local_file = track_json("ignored");
    local_file["id"] = serde_json::Value::Null;
    local_file["uri"] = json!("spotify:local:Band:Record:Demo:215");

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": {
                "items": [track_json("t0"), local_file, null, track_json("t3")],
                "total": 4,
                "offset": 0,
                "limit": 20,
                "next": null
            }
        })))
        .mount(&server)
        .await;

    let request = PageRequest {
        generation: 1,
        kind: FetchKind::Initial,
        query: "demo".to_string(),
        offset: 0,
        limit: 20,
        market: "US".to_string(),
    };
    let page = mock_client(&server)
        .search_tracks(&Credential::new("token"), &request)
        .await
        .unwrap();

    let ids: Vec<&str> = page.items.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t0", "t3"]);
    assert_eq!(page.total, 4);
}

#[tokio::test]
async fn test_search_error_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "status": 401, "message": "The access token expired" }
        })))
        .mount(&server)
        .await;

    let request = PageRequest {
        generation: 1,
        kind: FetchKind::Initial,
        query: "jazz".to_string(),
        offset: 0,
        limit: 20,
        market: "US".to_string(),
    };
    let result = mock_client(&server)
        .search_tracks(&Credential::new("token"), &request)
        .await;

    assert_eq!(
        result,
        Err(BrowseError::SearchFailed(
            "API Error: 401 The access token expired".to_string()
        ))
    );
}

// ============================================================================
// Player
// ============================================================================

#[tokio::test]
async fn test_play_sends_single_uri() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/me/player/play"))
        .and(query_param("device_id", "device-1"))
        .and(header("authorization", "Bearer token"))
        .and(body_json(json!({ "uris": ["spotify:track:t1"] })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    mock_client(&server)
        .play(&Credential::new("token"), "device-1", "spotify:track:t1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_play_rejected_without_premium() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/me/player/play"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "status": 403,
                "message": "Player command failed: Premium required",
                "reason": "PREMIUM_REQUIRED"
            }
        })))
        .mount(&server)
        .await;

    let result = mock_client(&server)
        .play(&Credential::new("token"), "device-1", "spotify:track:t1")
        .await;

    assert_eq!(
        result,
        Err(BrowseError::PlaybackRejected(
            "Player command failed: Premium required".to_string()
        ))
    );
}

#[tokio::test]
async fn test_pause_and_skip() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v1/me/player/pause"))
        .and(query_param("device_id", "device-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/me/player/next"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let credential = Credential::new("token");
    client.pause(&credential, "device-1").await.unwrap();
    client.next(&credential, "device-1").await.unwrap();
}

#[tokio::test]
async fn test_state_without_active_playback() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me/player"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let state = mock_client(&server)
        .state(&Credential::new("token"))
        .await
        .unwrap();

    assert_eq!(state, None);
}

#[tokio::test]
async fn test_state_while_playing_local_file() {
    let server = MockServer::start().await;

    let mut local_file = track_json("ignored");
    local_file["id"] = serde_json::Value::Null;

    Mock::given(method("GET"))
        .and(path("/v1/me/player"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "is_playing": true,
            "progress_ms": 10,
            "item": local_file,
            "device": { "id": "device-1", "name": "Laptop", "is_active": true }
        })))
        .mount(&server)
        .await;

    let state = mock_client(&server)
        .state(&Credential::new("token"))
        .await
        .unwrap()
        .unwrap();

    assert!(state.is_playing);
    assert_eq!(state.item, None);
}

#[tokio::test]
async fn test_state_and_devices() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me/player"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "is_playing": true,
            "progress_ms": 1234,
            "item": track_json("t1"),
            "device": { "id": "device-1", "name": "Laptop", "is_active": true }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/devices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [
                { "id": "device-1", "name": "Laptop", "is_active": true },
                { "id": null, "name": "Restricted", "is_active": false }
            ]
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let credential = Credential::new("token");

    let state = client.state(&credential).await.unwrap().unwrap();
    assert!(state.is_playing);
    assert_eq!(state.item.unwrap().id, "t1");

    let devices = client.devices(&credential).await.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(devices[1].id, None);
}

#[tokio::test]
async fn test_current_user() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("authorization", "Bearer token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "listener",
            "display_name": "A Listener",
            "product": "premium"
        })))
        .mount(&server)
        .await;

    let user = mock_client(&server)
        .current_user(&Credential::new("token"))
        .await
        .unwrap();

    assert_eq!(user.display_name.as_deref(), Some("A Listener"));
    assert_eq!(user.product.as_deref(), Some("premium"));
}
