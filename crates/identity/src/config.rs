use std::time::Duration;

/// Default backend API base URL of the hosted identity provider.
pub const DEFAULT_IDENTITY_API_URL: &str = "https://api.clerk.com/v1";

/// Default HTTP timeout for identity store calls.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Connection settings for the hosted identity store.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Backend API base URL, without trailing slash.
    pub api_url: String,
    /// Secret key used to call the backend API.
    pub secret_key: String,
    /// PEM public key (RS256) or shared secret (HS256) for session tokens.
    pub jwt_key: Option<String>,
    pub timeout: Duration,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_url", &self.api_url)
            .field("secret_key", &"<redacted>")
            .field("jwt_key", &self.jwt_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl IdentityConfig {
    /// Load identity configuration from environment variables.
    ///
    /// | Env Var                  | Required | Default                     |
    /// |--------------------------|----------|-----------------------------|
    /// | `IDENTITY_SECRET_KEY`    | yes      | --                          |
    /// | `IDENTITY_API_URL`       | no       | `https://api.clerk.com/v1`  |
    /// | `IDENTITY_JWT_KEY`       | no       | --                          |
    /// | `IDENTITY_TIMEOUT_SECS`  | no       | `10`                        |
    ///
    /// Returns `None` when `IDENTITY_SECRET_KEY` is unset or empty.
    ///
    /// # Panics
    ///
    /// Panics if `IDENTITY_TIMEOUT_SECS` is set but not a valid u64.
    pub fn from_env() -> Option<Self> {
        let secret_key = std::env::var("IDENTITY_SECRET_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())?;

        let api_url = std::env::var("IDENTITY_API_URL")
            .unwrap_or_else(|_| DEFAULT_IDENTITY_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        let jwt_key = std::env::var("IDENTITY_JWT_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.replace("\\n", "\n"));

        let timeout_secs: u64 = std::env::var("IDENTITY_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("IDENTITY_TIMEOUT_SECS must be a valid u64");

        Some(Self {
            api_url,
            secret_key,
            jwt_key,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Whether session tokens can be verified. Without `jwt_key` the hosted
    /// store rejects every bearer token.
    pub fn verifies_signatures(&self) -> bool {
        self.jwt_key.is_some()
    }
}
