//! Tests for `HostedIdentityStore` against a local stub of the backend API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch};
use axum::{Json, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use quickai_core::plan::Plan;
use quickai_identity::{
    HostedIdentityStore, IdentityConfig, IdentityError, IdentityStore, SessionClaims,
};
use serde_json::{json, Value};

const SECRET_KEY: &str = "sk_test_backend";
const JWT_KEY: &str = "session-signing-secret-for-tests";

#[derive(Clone, Default)]
struct Stub {
    patches: Arc<Mutex<Vec<(String, Value)>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {SECRET_KEY}"))
}

async fn get_user(
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    if !authorized(&headers) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    match id.as_str() {
        "user_free" => Ok(Json(json!({
            "id": "user_free",
            "public_metadata": {},
            "private_metadata": { "free_usage": 4 },
        }))),
        "user_new" => Ok(Json(json!({
            "id": "user_new",
            "public_metadata": {},
            "private_metadata": {},
        }))),
        "user_premium" => Ok(Json(json!({
            "id": "user_premium",
            "public_metadata": { "plan": "premium" },
            "private_metadata": { "free_usage": 10 },
        }))),
        "user_broken" => Err(StatusCode::INTERNAL_SERVER_ERROR),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn patch_metadata(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    stub.patches.lock().unwrap().push((id, body));
    StatusCode::OK
}

async fn spawn_stub() -> (String, Stub) {
    let stub = Stub::default();
    let app = Router::new()
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/metadata", patch(patch_metadata))
        .with_state(stub.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), stub)
}

fn config(api_url: String, secret_key: &str) -> IdentityConfig {
    IdentityConfig {
        api_url,
        secret_key: secret_key.to_string(),
        jwt_key: Some(JWT_KEY.to_string()),
        timeout: Duration::from_secs(5),
    }
}

fn session_token(sub: &str) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: sub.to_string(),
        exp: now + 600,
        iat: Some(now),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_KEY.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn authenticate_resolves_subject() {
    let (url, _stub) = spawn_stub().await;
    let store = HostedIdentityStore::new(&config(url, SECRET_KEY)).unwrap();

    let id = store.authenticate(&session_token("user_free")).await.unwrap();
    assert_eq!(id, "user_free");

    assert_matches!(
        store.authenticate("garbage").await,
        Err(IdentityError::InvalidCredential(_))
    );
}

#[tokio::test]
async fn load_profile_reads_plan_and_counter() {
    let (url, _stub) = spawn_stub().await;
    let store = HostedIdentityStore::new(&config(url, SECRET_KEY)).unwrap();

    let free = store.load_profile("user_free").await.unwrap();
    assert_eq!(free.plan, Plan::Free);
    assert_eq!(free.free_usage, Some(4));

    let fresh = store.load_profile("user_new").await.unwrap();
    assert!(fresh.needs_counter_init());

    let premium = store.load_profile("user_premium").await.unwrap();
    assert_eq!(premium.plan, Plan::Premium);
    assert_eq!(premium.into_caller().free_usage, 0);
}

#[tokio::test]
async fn unknown_caller_is_invalid_but_backend_failure_is_unavailable() {
    let (url, _stub) = spawn_stub().await;
    let store = HostedIdentityStore::new(&config(url, SECRET_KEY)).unwrap();

    assert_matches!(
        store.load_profile("user_missing").await,
        Err(IdentityError::InvalidCredential(_))
    );
    assert_matches!(
        store.load_profile("user_broken").await,
        Err(IdentityError::Unavailable(_))
    );
}

#[tokio::test]
async fn wrong_secret_key_is_unavailable() {
    let (url, _stub) = spawn_stub().await;
    let store = HostedIdentityStore::new(&config(url, "sk_wrong")).unwrap();

    assert_matches!(
        store.load_profile("user_free").await,
        Err(IdentityError::Unavailable(msg)) if msg.contains("401")
    );
}

#[tokio::test]
async fn unreachable_store_is_unavailable() {
    let store = HostedIdentityStore::new(&config("http://127.0.0.1:9".into(), SECRET_KEY)).unwrap();

    assert_matches!(
        store.load_profile("user_free").await,
        Err(IdentityError::Unavailable(_))
    );
}

#[tokio::test]
async fn set_free_usage_patches_private_metadata() {
    let (url, stub) = spawn_stub().await;
    let store = HostedIdentityStore::new(&config(url, SECRET_KEY)).unwrap();

    store.set_free_usage("user_free", 5).await.unwrap();

    let patches = stub.patches.lock().unwrap().clone();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].0, "user_free");
    assert_eq!(patches[0].1, json!({ "private_metadata": { "free_usage": 5 } }));
}
