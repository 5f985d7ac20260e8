//! Process-local identity store.
//!
//! Used when no hosted provider is configured (development) and as the
//! default test double. Writes are visible immediately; there is still no
//! compare-and-swap, so the quota race described for the hosted store is
//! reproducible here too.

use std::collections::HashMap;

use async_trait::async_trait;
use quickai_core::plan::Plan;
use tokio::sync::RwLock;

use crate::{CallerProfile, IdentityError, IdentityStore};

#[derive(Debug, Clone)]
struct StoredCaller {
    plan: Plan,
    free_usage: Option<u32>,
}

/// In-memory [`IdentityStore`] keyed by opaque token and caller id.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    tokens: RwLock<HashMap<String, String>>,
    callers: RwLock<HashMap<String, StoredCaller>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a caller reachable through `token`.
    pub async fn insert_caller(
        &self,
        token: &str,
        caller_id: &str,
        plan: Plan,
        free_usage: Option<u32>,
    ) {
        self.tokens
            .write()
            .await
            .insert(token.to_string(), caller_id.to_string());
        self.callers
            .write()
            .await
            .insert(caller_id.to_string(), StoredCaller { plan, free_usage });
    }

    /// Current stored counter, if the caller exists and has one.
    pub async fn free_usage(&self, caller_id: &str) -> Option<u32> {
        self.callers
            .read()
            .await
            .get(caller_id)
            .and_then(|c| c.free_usage)
    }
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn authenticate(&self, token: &str) -> Result<String, IdentityError> {
        self.tokens
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or_else(|| IdentityError::InvalidCredential("unknown token".into()))
    }

    async fn load_profile(&self, caller_id: &str) -> Result<CallerProfile, IdentityError> {
        let callers = self.callers.read().await;
        let stored = callers
            .get(caller_id)
            .ok_or_else(|| IdentityError::InvalidCredential("unknown caller".into()))?;
        Ok(CallerProfile {
            id: caller_id.to_string(),
            plan: stored.plan,
            free_usage: stored.free_usage,
        })
    }

    /// Upserts: a caller seen for the first time is created on the free tier.
    async fn set_free_usage(&self, caller_id: &str, value: u32) -> Result<(), IdentityError> {
        self.callers
            .write()
            .await
            .entry(caller_id.to_string())
            .and_modify(|c| c.free_usage = Some(value))
            .or_insert(StoredCaller {
                plan: Plan::Free,
                free_usage: Some(value),
            });
        Ok(())
    }
}
