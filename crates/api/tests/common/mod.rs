#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use quickai_api::app::build_app;
use quickai_api::config::{Environment, ServerConfig};
use quickai_api::engine::audit::{AuditError, AuditSink};
use quickai_api::engine::dispatcher::Dispatcher;
use quickai_api::state::AppState;
use quickai_completion::{CompletionError, CompletionProvider, CompletionRequest};
use quickai_core::creation::CreationRecord;
use quickai_core::plan::Plan;
use quickai_identity::{CallerProfile, IdentityError, IdentityStore, InMemoryIdentityStore};
use tower::ServiceExt;

pub const FREE_TOKEN: &str = "tok_free";
pub const FREE_ID: &str = "user_free";
pub const PREMIUM_TOKEN: &str = "tok_premium";
pub const PREMIUM_ID: &str = "user_premium";

/// Text every successful completion returns.
pub const PROVIDER_TEXT: &str = "Generated text";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: Environment::Development,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        body_limit_bytes: 10 * 1024 * 1024,
        detach_side_effects: false,
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Completion provider that counts calls and either replies or fails.
#[derive(Default)]
pub struct CountingProvider {
    calls: AtomicUsize,
    fail: bool,
    delay: Option<Duration>,
}

impl CountingProvider {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Replies normally, but only after `delay`.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for CountingProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(CompletionError::Api {
                status: 500,
                body: "upstream exploded".into(),
            });
        }
        Ok(PROVIDER_TEXT.to_string())
    }
}

/// Audit sink that keeps every record in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    records: Mutex<Vec<CreationRecord>>,
}

impl RecordingAuditSink {
    pub fn records(&self) -> Vec<CreationRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingAuditSink {
    async fn append(&self, record: &CreationRecord) -> Result<(), AuditError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Audit sink whose every write fails.
pub struct FailingAuditSink;

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn append(&self, _record: &CreationRecord) -> Result<(), AuditError> {
        Err(AuditError::Database(sqlx::Error::PoolTimedOut))
    }
}

/// Identity store that cannot be reached.
pub struct UnreachableIdentityStore;

#[async_trait]
impl IdentityStore for UnreachableIdentityStore {
    async fn authenticate(&self, _token: &str) -> Result<String, IdentityError> {
        Err(IdentityError::Unavailable("connection refused".into()))
    }

    async fn load_profile(&self, _caller_id: &str) -> Result<CallerProfile, IdentityError> {
        Err(IdentityError::Unavailable("connection refused".into()))
    }

    async fn set_free_usage(&self, _caller_id: &str, _value: u32) -> Result<(), IdentityError> {
        Err(IdentityError::Unavailable("connection refused".into()))
    }
}

/// Identity store that resolves callers normally but cannot write counters.
pub struct ReadOnlyIdentityStore {
    pub inner: Arc<InMemoryIdentityStore>,
}

#[async_trait]
impl IdentityStore for ReadOnlyIdentityStore {
    async fn authenticate(&self, token: &str) -> Result<String, IdentityError> {
        self.inner.authenticate(token).await
    }

    async fn load_profile(&self, caller_id: &str) -> Result<CallerProfile, IdentityError> {
        self.inner.load_profile(caller_id).await
    }

    async fn set_free_usage(&self, _caller_id: &str, _value: u32) -> Result<(), IdentityError> {
        Err(IdentityError::Unavailable("metadata update rejected".into()))
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Shared handles to the test doubles behind one application.
pub struct Harness {
    pub config: ServerConfig,
    pub identity: Arc<InMemoryIdentityStore>,
    pub provider: Option<Arc<CountingProvider>>,
    pub audit: Arc<RecordingAuditSink>,
}

impl Harness {
    /// Development config, a replying provider, an empty identity store.
    pub fn new() -> Self {
        Self {
            config: test_config(),
            identity: Arc::new(InMemoryIdentityStore::new()),
            provider: Some(Arc::new(CountingProvider::default())),
            audit: Arc::new(RecordingAuditSink::default()),
        }
    }

    pub fn without_provider(mut self) -> Self {
        self.provider = None;
        self
    }

    pub fn with_failing_provider(mut self) -> Self {
        self.provider = Some(Arc::new(CountingProvider::failing()));
        self
    }

    pub fn with_slow_provider(mut self, delay: Duration) -> Self {
        self.provider = Some(Arc::new(CountingProvider::slow(delay)));
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.config.body_limit_bytes = bytes;
        self
    }

    pub fn production(mut self) -> Self {
        self.config.environment = Environment::Production;
        self
    }

    pub fn detached(mut self) -> Self {
        self.config.detach_side_effects = true;
        self
    }

    pub async fn seed(&self, token: &str, caller_id: &str, plan: Plan, free_usage: Option<u32>) {
        self.identity
            .insert_caller(token, caller_id, plan, free_usage)
            .await;
    }

    pub fn provider_calls(&self) -> usize {
        self.provider.as_ref().map_or(0, |p| p.calls())
    }

    /// The application wired to this harness's doubles.
    pub fn app(&self) -> Router {
        self.app_with(self.identity.clone(), self.audit.clone())
    }

    /// The application with a different identity store or audit sink.
    pub fn app_with(&self, identity: Arc<dyn IdentityStore>, audit: Arc<dyn AuditSink>) -> Router {
        let provider = self
            .provider
            .clone()
            .map(|p| p as Arc<dyn CompletionProvider>);
        build_app(AppState {
            config: Arc::new(self.config.clone()),
            identity,
            dispatcher: Arc::new(Dispatcher::new(provider)),
            audit,
        })
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request and return the response.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a JSON body and optional bearer token.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: Option<&str>,
) -> Response {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with a raw body.
pub async fn post_raw(app: Router, uri: &str, body: &'static str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST request with arbitrary bytes and an optional content type.
pub async fn post_bytes(
    app: Router,
    uri: &str,
    body: Vec<u8>,
    content_type: Option<&str>,
) -> Response {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder.body(Body::from(body)).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
