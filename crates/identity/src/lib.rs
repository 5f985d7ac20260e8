//! Caller identity for the QuickAI service.
//!
//! The service never owns user accounts. Identity, plan tier and the
//! free-usage counter live in an external store reached through the
//! [`IdentityStore`] trait:
//!
//! - [`HostedIdentityStore`] -- REST client for a hosted identity provider.
//! - [`InMemoryIdentityStore`] -- process-local store for development and tests.
//! - [`TokenVerifier`] -- bearer-token (JWT) verification shared by both.

pub mod config;
pub mod hosted;
pub mod memory;
pub mod token;

use async_trait::async_trait;
use quickai_core::plan::{Caller, Plan};

pub use config::IdentityConfig;
pub use hosted::HostedIdentityStore;
pub use memory::InMemoryIdentityStore;
pub use token::{SessionClaims, TokenVerifier};

/// Errors from the identity layer.
///
/// A bad credential and an unreachable store are kept apart so callers can
/// log them differently, even though the HTTP layer answers both with 401.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The credential is malformed, expired, or names an unknown caller.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The identity store could not be reached or answered with an error.
    #[error("identity store unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        IdentityError::Unavailable(err.to_string())
    }
}

/// What the identity store knows about a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerProfile {
    pub id: String,
    pub plan: Plan,
    /// Stored free-usage counter; `None` when it was never initialised.
    pub free_usage: Option<u32>,
}

impl CallerProfile {
    /// A free-tier caller without a stored counter needs one written.
    pub fn needs_counter_init(&self) -> bool {
        !self.plan.is_premium() && self.free_usage.is_none()
    }

    /// Collapse the stored profile into the request-scoped [`Caller`].
    ///
    /// Premium callers always report zero usage.
    pub fn into_caller(self) -> Caller {
        let free_usage = if self.plan.is_premium() {
            0
        } else {
            self.free_usage.unwrap_or(0)
        };
        Caller {
            id: self.id,
            plan: self.plan,
            free_usage,
        }
    }
}

/// External store holding caller identity, plan and usage counter.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Resolve a bearer credential to a caller id.
    async fn authenticate(&self, token: &str) -> Result<String, IdentityError>;

    /// Load plan tier and usage counter for a caller.
    async fn load_profile(&self, caller_id: &str) -> Result<CallerProfile, IdentityError>;

    /// Overwrite the caller's stored free-usage counter.
    async fn set_free_usage(&self, caller_id: &str, value: u32) -> Result<(), IdentityError>;
}
