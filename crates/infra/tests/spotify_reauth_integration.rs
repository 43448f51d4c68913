//! Integration tests for the Spotify client's token handling
//!
//! Exercises the refresh-and-replay policy end to end: a wiremock Spotify
//! API, the real `TokenManager` and hybrid storage, and a mock token
//! endpoint.

use std::sync::Arc;

use listify_common::testing::{AuthHarness, MockOAuthClient};
use listify_core::CatalogPort;
use listify_domain::constants::LOGIN_ROUTE;
use listify_domain::{ListifyError, SpotifyConfig};
use listify_infra::http::HttpClient;
use listify_infra::integrations::spotify::SpotifyApiClient;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn spotify_client(server: &MockServer, harness: &AuthHarness) -> SpotifyApiClient {
    let mut config = SpotifyConfig::new("client-id", "http://localhost:5173/callback");
    config.api_url = format!("{}/v1", server.uri());
    SpotifyApiClient::new(
        &config,
        HttpClient::new().expect("http client"),
        harness.manager.clone(),
        harness.navigator.clone(),
    )
    .expect("spotify client")
}

fn profile() -> serde_json::Value {
    json!({ "id": "spotify-user", "display_name": "Listener", "images": [] })
}

/// Validates the bounded retry on repeated 401s.
///
/// Assertions:
/// - Ensures exactly one refresh and one replay happen (two requests total).
/// - Confirms the tokens are cleared and the login route is requested.
/// - Confirms the caller sees `Unauthenticated`.
#[tokio::test]
async fn repeated_unauthorized_refreshes_once_then_expires_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let harness =
        AuthHarness::new(MockOAuthClient::new().with_refresh_tokens("A2", Some("R2"), 3600));
    harness.storage.set_tokens("A1", "R1", 3600).expect("seed tokens");
    let client = spotify_client(&server, &harness);

    let err = client.current_user().await.unwrap_err();

    assert!(matches!(err, ListifyError::Unauthenticated(_)), "got {err:?}");
    assert_eq!(harness.client.refresh_calls(), 1);
    assert_eq!(harness.client.refresh_tokens_seen(), vec!["R1".to_string()]);
    assert!(!harness.storage.has_tokens());
    assert_eq!(harness.navigator.last_redirect().as_deref(), Some(LOGIN_ROUTE));
}

/// Validates a successful replay after one rejected token.
///
/// Assertions:
/// - Ensures the replay carries the refreshed token.
/// - Confirms no redirect happens and the tokens are kept.
#[tokio::test]
async fn unauthorized_then_replay_with_refreshed_token_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile()))
        .expect(1)
        .mount(&server)
        .await;

    let harness =
        AuthHarness::new(MockOAuthClient::new().with_refresh_tokens("A2", None, 3600));
    harness.storage.set_tokens("A1", "R1", 3600).expect("seed tokens");
    let client = spotify_client(&server, &harness);

    let user = client.current_user().await.expect("replayed request succeeds");

    assert_eq!(user.id, "spotify-user");
    assert_eq!(harness.client.refresh_calls(), 1);
    assert_eq!(harness.storage.get_access_token().as_deref(), Some("A2"));
    assert_eq!(harness.storage.get_refresh_token().as_deref(), Some("R1"));
    assert!(harness.navigator.last_redirect().is_none());
}

#[tokio::test]
async fn rejected_refresh_expires_session_without_replay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let harness = AuthHarness::new(MockOAuthClient::new().with_refresh_failure("invalid_grant"));
    harness.storage.set_tokens("A1", "R1", 3600).expect("seed tokens");
    let client = spotify_client(&server, &harness);

    let err = client.user_playlists().await.unwrap_err();

    assert!(matches!(err, ListifyError::Unauthenticated(_)));
    assert_eq!(harness.client.refresh_calls(), 1);
    assert!(!harness.storage.has_tokens());
    assert_eq!(harness.navigator.history(), vec![LOGIN_ROUTE.to_string()]);
    assert!(!harness.errors.is_empty(), "refresh failure should be recorded");
}

/// Validates the refresh performed before sending.
///
/// Assertions:
/// - Ensures a token inside the expiry buffer is refreshed before the call.
/// - Confirms the first request already carries the new token.
#[tokio::test]
async fn expiring_token_is_refreshed_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile()))
        .expect(1)
        .mount(&server)
        .await;

    let harness =
        AuthHarness::new(MockOAuthClient::new().with_refresh_tokens("A2", None, 3600));
    // 60 seconds is inside the five-minute buffer, so A1 is never sent.
    harness.storage.set_tokens("A1", "R1", 60).expect("seed tokens");
    let client = spotify_client(&server, &harness);

    client.current_user().await.expect("request with refreshed token");

    assert_eq!(harness.client.refresh_calls(), 1);
    assert_eq!(harness.storage.get_refresh_token().as_deref(), Some("R1"));
}

#[tokio::test]
async fn elapsed_access_token_is_restored_from_refresh_cookie() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile()))
        .mount(&server)
        .await;

    let harness =
        AuthHarness::new(MockOAuthClient::new().with_refresh_tokens("A2", None, 3600));
    harness.storage.set_tokens("A1", "R1", 3600).expect("seed tokens");
    harness.clock.advance_secs(7200);
    let client = spotify_client(&server, &harness);

    let user = client.current_user().await.expect("session restored from cookie");

    assert_eq!(user.display_name.as_deref(), Some("Listener"));
    assert_eq!(harness.client.refresh_tokens_seen(), vec!["R1".to_string()]);
}

/// Validates single-flight refresh across concurrent 401s.
///
/// Assertions:
/// - Ensures two requests rejected with the same token share one refresh.
#[tokio::test]
async fn concurrent_unauthorized_requests_share_one_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [], "total": 0 })))
        .mount(&server)
        .await;

    let harness = AuthHarness::new(
        MockOAuthClient::new()
            .with_refresh_tokens("A2", None, 3600)
            .with_delay(std::time::Duration::from_millis(50)),
    );
    harness.storage.set_tokens("A1", "R1", 3600).expect("seed tokens");
    let client = Arc::new(spotify_client(&server, &harness));

    let (user, playlists) = tokio::join!(client.current_user(), client.user_playlists());

    assert!(user.is_ok(), "{user:?}");
    assert_eq!(playlists.expect("playlists").total, 0);
    assert_eq!(harness.client.refresh_calls(), 1);
}
