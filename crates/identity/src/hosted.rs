//! REST client for a hosted identity provider's backend API.
//!
//! Plan tier and the free-usage counter are kept in the user's metadata:
//!
//! - `public_metadata.plan` or `private_metadata.plan` set to `"premium"`
//!   grants the premium tier;
//! - `private_metadata.free_usage` holds the counter.

use async_trait::async_trait;
use quickai_core::plan::Plan;
use serde::Deserialize;
use serde_json::Value;

use crate::config::IdentityConfig;
use crate::token::TokenVerifier;
use crate::{CallerProfile, IdentityError, IdentityStore};

/// User resource as returned by `GET /users/{id}`.
#[derive(Debug, Deserialize)]
struct UserResource {
    id: String,
    #[serde(default)]
    public_metadata: Value,
    #[serde(default)]
    private_metadata: Value,
}

/// Identity store backed by a hosted provider.
pub struct HostedIdentityStore {
    client: reqwest::Client,
    api_url: String,
    secret_key: String,
    verifier: Option<TokenVerifier>,
}

impl HostedIdentityStore {
    /// Build a client from configuration.
    ///
    /// Fails if the configured token key cannot be parsed or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let verifier = config
            .jwt_key
            .as_deref()
            .map(TokenVerifier::from_key)
            .transpose()
            .map_err(|e| IdentityError::Unavailable(format!("invalid token key: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            secret_key: config.secret_key.clone(),
            verifier,
        })
    }

    fn user_url(&self, caller_id: &str) -> String {
        format!("{}/users/{}", self.api_url, caller_id)
    }

    /// Map a non-2xx backend answer to an [`IdentityError`].
    ///
    /// 404 means the caller does not exist, which is a credential problem;
    /// everything else is the store's fault.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, IdentityError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(IdentityError::InvalidCredential("unknown caller".into()));
        }
        Err(IdentityError::Unavailable(format!(
            "identity API returned {}: {body}",
            status.as_u16()
        )))
    }
}

/// Read `plan` from a metadata object.
fn metadata_plan(metadata: &Value) -> Plan {
    metadata
        .get("plan")
        .and_then(Value::as_str)
        .map(Plan::from_metadata)
        .unwrap_or_default()
}

/// Read the stored counter. A missing key means "never initialised"; a
/// present but non-numeric or negative value reads as zero.
fn metadata_free_usage(metadata: &Value) -> Option<u32> {
    let raw = metadata.get("free_usage")?;
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Some(match parsed {
        Some(v) if v.is_finite() && v > 0.0 => v.min(f64::from(u32::MAX)) as u32,
        _ => 0,
    })
}

fn profile_from_resource(user: UserResource) -> CallerProfile {
    let plan = if metadata_plan(&user.public_metadata).is_premium()
        || metadata_plan(&user.private_metadata).is_premium()
    {
        Plan::Premium
    } else {
        Plan::Free
    };

    CallerProfile {
        id: user.id,
        plan,
        free_usage: metadata_free_usage(&user.private_metadata),
    }
}

#[async_trait]
impl IdentityStore for HostedIdentityStore {
    async fn authenticate(&self, token: &str) -> Result<String, IdentityError> {
        let verifier = self.verifier.as_ref().ok_or_else(|| {
            IdentityError::Unavailable("no session token key configured".into())
        })?;
        let claims = verifier
            .verify(token)
            .map_err(|e| IdentityError::InvalidCredential(e.to_string()))?;
        Ok(claims.sub)
    }

    async fn load_profile(&self, caller_id: &str) -> Result<CallerProfile, IdentityError> {
        let response = self
            .client
            .get(self.user_url(caller_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        let user: UserResource = Self::ensure_success(response).await?.json().await?;
        Ok(profile_from_resource(user))
    }

    async fn set_free_usage(&self, caller_id: &str, value: u32) -> Result<(), IdentityError> {
        let body = serde_json::json!({
            "private_metadata": { "free_usage": value },
        });

        let response = self
            .client
            .patch(format!("{}/metadata", self.user_url(caller_id)))
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .await?;

        Self::ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn resource(public: Value, private: Value) -> UserResource {
        UserResource {
            id: "user_1".into(),
            public_metadata: public,
            private_metadata: private,
        }
    }

    #[test]
    fn premium_in_either_metadata_wins() {
        let public = profile_from_resource(resource(json!({"plan": "premium"}), json!({})));
        let private = profile_from_resource(resource(json!({}), json!({"plan": "premium"})));
        let neither = profile_from_resource(resource(json!({"plan": "gold"}), Value::Null));

        assert_eq!(public.plan, Plan::Premium);
        assert_eq!(private.plan, Plan::Premium);
        assert_eq!(neither.plan, Plan::Free);
    }

    #[test]
    fn missing_counter_is_uninitialised() {
        let profile = profile_from_resource(resource(json!({}), json!({})));
        assert_eq!(profile.free_usage, None);
    }

    #[test]
    fn counter_parsing_is_lenient() {
        assert_eq!(metadata_free_usage(&json!({"free_usage": 7})), Some(7));
        assert_eq!(metadata_free_usage(&json!({"free_usage": "3"})), Some(3));
        assert_eq!(metadata_free_usage(&json!({"free_usage": "lots"})), Some(0));
        assert_eq!(metadata_free_usage(&json!({"free_usage": -4})), Some(0));
        assert_eq!(metadata_free_usage(&json!({"free_usage": null})), Some(0));
    }
}
