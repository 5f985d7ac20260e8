//! The free-usage counter is a plain read-modify-write with no
//! compare-and-swap. These tests pin that behaviour down: two concurrent
//! requests that both observe the last free slot are both admitted.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use common::{post_json, Harness, FREE_ID, FREE_TOKEN};
use quickai_core::plan::{Plan, FREE_USAGE_LIMIT};
use quickai_identity::{CallerProfile, IdentityError, IdentityStore, InMemoryIdentityStore};
use serde_json::json;
use tokio::sync::Barrier;

/// Holds every `load_profile` until `n` callers have read their profile,
/// so all of them observe the same counter before anyone writes.
struct LockstepIdentityStore {
    inner: Arc<InMemoryIdentityStore>,
    barrier: Barrier,
}

#[async_trait]
impl IdentityStore for LockstepIdentityStore {
    async fn authenticate(&self, token: &str) -> Result<String, IdentityError> {
        self.inner.authenticate(token).await
    }

    async fn load_profile(&self, caller_id: &str) -> Result<CallerProfile, IdentityError> {
        let profile = self.inner.load_profile(caller_id).await?;
        self.barrier.wait().await;
        Ok(profile)
    }

    async fn set_free_usage(&self, caller_id: &str, value: u32) -> Result<(), IdentityError> {
        self.inner.set_free_usage(caller_id, value).await
    }
}

#[tokio::test]
async fn concurrent_requests_at_last_free_slot_both_succeed() {
    let harness = Harness::new();
    harness
        .seed(FREE_TOKEN, FREE_ID, Plan::Free, Some(FREE_USAGE_LIMIT - 1))
        .await;

    let store = Arc::new(LockstepIdentityStore {
        inner: harness.identity.clone(),
        barrier: Barrier::new(2),
    });
    let app = harness.app_with(store, harness.audit.clone());

    let body = json!({ "prompt": "Rust ownership" });
    let (first, second) = tokio::join!(
        post_json(app.clone(), "/api/ai/generate-article", body.clone(), Some(FREE_TOKEN)),
        post_json(app, "/api/ai/generate-article", body, Some(FREE_TOKEN)),
    );

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(harness.provider_calls(), 2);
    assert_eq!(harness.audit.records().len(), 2);

    // Both wrote observed + 1, so the counter records one use, not two.
    assert_eq!(
        harness.identity.free_usage(FREE_ID).await,
        Some(FREE_USAGE_LIMIT)
    );
}

#[tokio::test]
async fn sequential_requests_at_last_free_slot_admit_only_one() {
    let harness = Harness::new();
    harness
        .seed(FREE_TOKEN, FREE_ID, Plan::Free, Some(FREE_USAGE_LIMIT - 1))
        .await;

    let body = json!({ "prompt": "Rust ownership" });
    let first = post_json(
        harness.app(),
        "/api/ai/generate-article",
        body.clone(),
        Some(FREE_TOKEN),
    )
    .await;
    let second = post_json(harness.app(), "/api/ai/generate-article", body, Some(FREE_TOKEN)).await;

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}
