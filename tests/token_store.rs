use std::sync::Arc;

use berbix::{
    webhook::compute_signature, BaseUrl, Client, Config, Error, SignatureError, TokenStore,
    Tokens,
};
use chrono::Utc;
use http::{Method, StatusCode};
use serde_json::json;

mod common;

use common::{client, token_response, MockHttpClient};

const TOKENS: &str = "/v0/tokens";

#[tokio::test]
async fn concurrent_callers_share_one_refresh() {
    let (client, http) = client();
    http.respond(Method::POST, TOKENS, 200, token_response(1, "shared", 3600));

    let store = TokenStore::new(Tokens::from_refresh("refresh-1"));
    let (a, b, c) = tokio::join!(
        store.fresh(&client),
        store.fresh(&client),
        store.fresh(&client)
    );

    for tokens in [a.unwrap(), b.unwrap(), c.unwrap()] {
        assert_eq!(tokens.access_token, "shared");
    }
    assert_eq!(http.count(Method::POST, TOKENS), 1);
    assert_eq!(store.snapshot().await.access_token, "shared");
}

#[tokio::test]
async fn concurrent_callers_across_tasks() {
    let (client, http) = client();
    http.respond(Method::POST, TOKENS, 200, token_response(2, "spawned", 3600));

    let store = TokenStore::new(Tokens::from_refresh("refresh-2"));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            let client = client.clone();
            tokio::spawn(async move { store.fresh(&client).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().access_token, "spawned");
    }
    assert_eq!(http.count(Method::POST, TOKENS), 1);
}

#[tokio::test]
async fn failed_refresh_keeps_stored_tokens() {
    let (client, http) = client();
    http.respond(Method::POST, TOKENS, 401, json!({"message": "revoked"}));

    let store = TokenStore::new(Tokens::from_refresh("refresh-3"));
    let error = store.fresh(&client).await.unwrap_err();
    assert_eq!(error.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(store.snapshot().await, Tokens::from_refresh("refresh-3"));
}

#[tokio::test]
async fn replace_swaps_tokens() {
    let (client, http) = client();
    let store = TokenStore::default();

    let previous = store
        .replace(Tokens {
            transaction_id: 4,
            access_token: "manual".into(),
            refresh_token: "refresh-4".into(),
            client_token: String::new(),
            expiry: Some(Utc::now() + chrono::Duration::hours(1)),
        })
        .await;
    assert_eq!(previous, Tokens::default());

    let tokens = store.fresh(&client).await.unwrap();
    assert_eq!(tokens.access_token, "manual");
    assert!(http.requests().is_empty());
}

#[test]
fn builder_requires_secret() {
    let error = Client::builder()
        .with_http_client(Arc::new(MockHttpClient::default()))
        .build()
        .unwrap_err();
    assert!(error.to_string().contains("with_secret"));

    assert!(Client::builder()
        .with_secret("")
        .with_http_client(Arc::new(MockHttpClient::default()))
        .build()
        .is_err());
}

#[test]
fn builder_uses_config() {
    let config: Config = serde_json::from_value(json!({
        "secret": "secret_from_file",
        "host": "https://sandbox.example.com"
    }))
    .unwrap();
    let client = Client::builder()
        .with_config(config)
        .with_http_client(Arc::new(MockHttpClient::default()))
        .build()
        .unwrap();
    assert_eq!(client.host().as_str(), "https://sandbox.example.com/");
    assert!(!format!("{client:?}").contains("secret_from_file"));
}

#[test]
fn builder_defaults_to_production_host() {
    let client = Client::builder()
        .with_secret("s")
        .with_http_client(Arc::new(MockHttpClient::default()))
        .build()
        .unwrap();
    assert_eq!(client.host(), &BaseUrl::default());
    assert_eq!(client.host().as_str(), "https://api.berbix.com/");
}

#[tokio::test]
async fn requests_follow_host_path() {
    let http = Arc::new(MockHttpClient::default());
    let client = Client::builder()
        .with_secret("s")
        .with_host(BaseUrl::try_from("http://gateway.local/berbix").unwrap())
        .with_http_client(http.clone())
        .build()
        .unwrap();
    http.respond(Method::POST, "/berbix/v0/tokens", 200, token_response(5, "a", 60));

    client
        .refresh_tokens(&Tokens::from_refresh("r"))
        .await
        .unwrap();
    assert_eq!(http.requests()[0].path, "/berbix/v0/tokens");
}

#[test]
fn client_validates_webhook_signatures() {
    let (client, _) = client();
    let body = br#"{"transaction_id":1}"#;
    let now = Utc::now().timestamp();
    let header = format!("v0,{now},{}", compute_signature("hook_secret", now, body));

    client.validate_signature("hook_secret", body, &header).unwrap();

    let error = client
        .validate_signature("other_secret", body, &header)
        .unwrap_err();
    assert!(matches!(error, Error::Signature(SignatureError::Mismatch)));
}
