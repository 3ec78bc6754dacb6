//! Full request flow against a mock auth server and API.

use std::sync::Arc;
use std::time::Duration;

use las_client::las_auth::{BearerAuth, Credentials, ManualClock, TokenProvider};
use las_client::{Client, DocumentOptions, Error, RetryPolicy};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const START: u64 = 1_700_000_000;

async fn mount_token(server: &MockServer, token: &str, times: Option<u64>) {
    let mock = Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("authorization", "Basic Y2xpZW50OnNoaA=="))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access_token": token, "expires_in": 3600})),
        );
    let mock = match times {
        Some(n) => mock.up_to_n_times(n),
        None => mock,
    };
    mock.mount(server).await;
}

fn bearer_client(server: &MockServer, clock: Arc<ManualClock>) -> Client {
    let credentials =
        Credentials::client_credentials("client", "shh", server.uri(), server.uri()).unwrap();
    let Credentials::ClientCredentials(client_credentials) = &credentials else {
        panic!("expected client credentials");
    };
    let tokens = TokenProvider::new(client_credentials, reqwest::Client::new())
        .without_cache()
        .with_clock(clock);
    let fast = Duration::from_millis(1);
    Client::builder()
        .authenticator(Arc::new(BearerAuth::new(Arc::new(tokens), None)))
        .endpoint(server.uri())
        .rate_limit_policy(RetryPolicy::rate_limited().with_base_delay(fast))
        .transient_policy(RetryPolicy::transient().with_base_delay(fast))
        .build()
        .unwrap()
}

async fn count(server: &MockServer, wanted: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == wanted)
        .count()
}

#[tokio::test]
async fn bearer_token_reused_until_expiry() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", Some(1)).await;
    mount_token(&server, "T2", None).await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "T1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "T2"})))
        .mount(&server)
        .await;

    let clock = Arc::new(ManualClock::new(START));
    let client = bearer_client(&server, clock.clone());
    let options = Default::default();

    assert_eq!(client.list_models(&options).await.unwrap()["token"], "T1");
    clock.advance(3599);
    assert_eq!(client.list_models(&options).await.unwrap()["token"], "T1");
    assert_eq!(count(&server, "/oauth2/token").await, 1);

    clock.advance(1);
    assert_eq!(client.list_models(&options).await.unwrap()["token"], "T2");
    assert_eq!(count(&server, "/oauth2/token").await, 2);
}

#[tokio::test]
async fn forbidden_surfaces_as_invalid_credentials() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", None).await;
    Mock::given(method("POST"))
        .and(path("/documents"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden"})))
        .mount(&server)
        .await;

    let client = bearer_client(&server, Arc::new(ManualClock::new(START)));
    let err = client
        .create_document(b"%PDF".to_vec(), "application/pdf", &DocumentOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials(_)), "got: {err}");
    assert_eq!(count(&server, "/documents").await, 1);
}

#[tokio::test]
async fn rate_limit_then_success_refreshes_nothing() {
    let server = MockServer::start().await;
    mount_token(&server, "T1", None).await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"message": "Too Many Requests"})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    let client = bearer_client(&server, Arc::new(ManualClock::new(START)));
    let value = client.list_models(&Default::default()).await.unwrap();
    assert_eq!(value, json!({"models": []}));
    assert_eq!(count(&server, "/models").await, 2);
    assert_eq!(count(&server, "/oauth2/token").await, 1);
}

#[test]
fn missing_credentials_without_any_source() {
    let err = Client::builder().endpoint("https://api.example.com").build().unwrap_err();
    assert!(err.is_missing_credentials());
}

#[tokio::test]
async fn client_timeout_bounds_token_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "LATE", "expires_in": 3600}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let credentials =
        Credentials::client_credentials("client", "shh", server.uri(), server.uri()).unwrap();
    let client = Client::builder()
        .credentials(credentials)
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let started = std::time::Instant::now();
    let err = client.list_models(&Default::default()).await.unwrap_err();
    assert!(matches!(err, Error::Auth(_)), "got: {err}");
    assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    assert_eq!(count(&server, "/models").await, 0);
}
