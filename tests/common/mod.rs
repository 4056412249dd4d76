#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use berbix::{core::util::AsyncHttpClient, BaseUrl, Client};
use http::{
    header::{HeaderName, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
    Method, Request, Response,
};
use serde_json::{json, Value as Json};

pub const SECRET: &str = "secret_test_abc";
pub const HOST: &str = "http://mock.berbix.local/";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub user_agent: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Json {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Replays canned responses per (method, path) and records every request.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    routes: Mutex<HashMap<(Method, String), VecDeque<(u16, Vec<u8>)>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttpClient {
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Json) {
        self.respond_raw(method, path, status, serde_json::to_vec(&body).unwrap());
    }

    pub fn respond_raw(&self, method: Method, path: &str, status: u16, body: Vec<u8>) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_owned()))
            .or_default()
            .push_back((status, body));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl AsyncHttpClient for MockHttpClient {
    async fn execute(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>> {
        let header = |name: HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        let recorded = RecordedRequest {
            method: request.method().clone(),
            path: request.uri().path().to_owned(),
            authorization: header(AUTHORIZATION),
            content_type: header(CONTENT_TYPE),
            user_agent: header(USER_AGENT),
            body: request.body().clone(),
        };
        let key = (recorded.method.clone(), recorded.path.clone());
        self.requests.lock().unwrap().push(recorded);

        let (status, body) = self
            .routes
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front)
            .ok_or_else(|| anyhow!("connection refused: no route for {} {}", key.0, key.1))?;

        Ok(Response::builder().status(status).body(body)?)
    }
}

pub fn client() -> (Client, Arc<MockHttpClient>) {
    let http_client = Arc::new(MockHttpClient::default());
    let client = Client::builder()
        .with_secret(SECRET)
        .with_host(BaseUrl::try_from(HOST).unwrap())
        .with_http_client(http_client.clone())
        .build()
        .unwrap();
    (client, http_client)
}

pub fn basic_auth() -> String {
    berbix::core::auth::basic_auth_header(SECRET)
}

pub fn token_response(transaction_id: i64, access_token: &str, expires_in: i64) -> Json {
    json!({
        "transaction_id": transaction_id,
        "refresh_token": format!("refresh-{transaction_id}"),
        "access_token": access_token,
        "client_token": format!("client-{transaction_id}"),
        "expires_in": expires_in
    })
}

pub fn transaction_metadata(id: i64) -> Json {
    json!({
        "entity": "transaction_metadata",
        "id": id,
        "flags": ["id_under_18"],
        "action": "review",
        "created_at": "2023-05-01T12:00:00Z",
        "customer_uid": "customer-123",
        "duplicates": [],
        "dashboard_url": format!("https://dashboard.berbix.com/transaction?id={id}")
    })
}
