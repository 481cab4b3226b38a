#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use whiskey_canon::auth::{generate_jwt, Claims};
use whiskey_canon::config::AppConfig;
use whiskey_canon::database::{
    AdminScope, MemoryAccountStore, MemoryWhiskeyStore, Stores, WhiskeyStore,
};
use whiskey_canon::server::{app, AppState};
use whiskey_canon::types::Role;

pub const SECRET: &str = "integration-test-secret";
pub const BOUNDARY: &str = "whiskey-canon-test-boundary";

pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;
pub const ADMIN: i64 = 99;

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = SECRET.to_string();
    config.security.cors_origins = Vec::new();
    config.api.enable_request_logging = false;
    config
}

/// Router wired to in-memory stores, driven in-process
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryWhiskeyStore>,
    pub accounts: Arc<MemoryAccountStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(MemoryWhiskeyStore::new());
        let accounts = Arc::new(MemoryAccountStore::new());
        let stores = Stores {
            whiskeys: store.clone(),
            accounts: accounts.clone(),
        };
        let router = app(AppState::new(stores, config));
        Self {
            router,
            store,
            accounts,
        }
    }

    /// Router over an arbitrary store, for failure cases
    pub fn router_with_store(store: Arc<dyn WhiskeyStore>) -> Router {
        let stores = Stores {
            whiskeys: store,
            accounts: Arc::new(MemoryAccountStore::new()),
        };
        app(AppState::new(stores, test_config()))
    }

    pub fn token(&self, id: i64, username: &str, role: Role) -> String {
        token(id, username, role)
    }

    pub fn alice(&self) -> String {
        self.token(ALICE, "alice", Role::Editor)
    }

    pub fn bob(&self) -> String {
        self.token(BOB, "bob", Role::Editor)
    }

    pub fn admin(&self) -> String {
        self.token(ADMIN, "root", Role::Admin)
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<TestResponse> {
        self.send(request(Method::GET, path, token).body(Body::empty())?).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<TestResponse> {
        self.send(request(Method::DELETE, path, Some(token)).body(Body::empty())?).await
    }

    pub async fn post_json(&self, path: &str, token: &str, body: &Value) -> Result<TestResponse> {
        self.send_json(Method::POST, path, token, body).await
    }

    pub async fn put_json(&self, path: &str, token: &str, body: &Value) -> Result<TestResponse> {
        self.send_json(Method::PUT, path, token, body).await
    }

    async fn send_json(&self, method: Method, path: &str, token: &str, body: &Value) -> Result<TestResponse> {
        let req = request(method, path, Some(token))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(body)?))?;
        self.send(req).await
    }

    /// POST a multipart body with one part named `field`
    pub async fn upload(
        &self,
        token: &str,
        field: &str,
        filename: &str,
        content_type: &str,
        contents: &[u8],
    ) -> Result<TestResponse> {
        let req = request(Method::POST, "/api/whiskeys/import/csv", Some(token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(field, filename, content_type, contents)))?;
        self.send(req).await
    }

    pub async fn import_csv(&self, token: &str, csv: &str) -> Result<TestResponse> {
        self.upload(token, "file", "collection.csv", "text/csv", csv.as_bytes()).await
    }

    /// Records held across every owner
    pub async fn stored_count(&self) -> Result<usize> {
        let scope = AdminScope::for_role(Role::Admin).context("admin scope")?;
        Ok(self.store.find_all_owners(&scope).await?.len())
    }

    pub async fn send(&self, req: Request<Body>) -> Result<TestResponse> {
        send(&self.router, req).await
    }
}

pub fn token(id: i64, username: &str, role: Role) -> String {
    let claims = Claims::new(id, username, role, 1);
    generate_jwt(&claims, SECRET).expect("token")
}

pub async fn send(router: &Router, req: Request<Body>) -> Result<TestResponse> {
    let response = router.clone().oneshot(req).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(TestResponse { status, headers, body })
}

fn request(method: Method, path: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(path);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

pub fn multipart_body(field: &str, filename: &str, content_type: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
        b = BOUNDARY,
    )
    .into_bytes();
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
