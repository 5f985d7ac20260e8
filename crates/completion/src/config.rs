use std::time::Duration;

/// Gemini's OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Settings for the upstream completion provider.
#[derive(Clone)]
pub struct CompletionConfig {
    /// Base URL, without trailing slash; `/chat/completions` is appended.
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CompletionConfig {
    /// Load completion settings from environment variables.
    ///
    /// | Env Var                   | Default                                  |
    /// |---------------------------|------------------------------------------|
    /// | `COMPLETION_API_KEY`      | falls back to `GEMINI_API_KEY`           |
    /// | `COMPLETION_BASE_URL`     | Gemini OpenAI-compatible endpoint        |
    /// | `COMPLETION_MODEL`        | `gemini-2.0-flash`                       |
    /// | `COMPLETION_TIMEOUT_SECS` | `60`                                     |
    ///
    /// Returns `None` when no API key is set, in which case text commands
    /// answer with deterministic fallback content.
    ///
    /// # Panics
    ///
    /// Panics if `COMPLETION_TIMEOUT_SECS` is set but not a valid u64.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("COMPLETION_API_KEY")
            .or_else(|_| std::env::var("GEMINI_API_KEY"))
            .ok()
            .filter(|s| !s.trim().is_empty())?;

        let base_url = std::env::var("COMPLETION_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let model = std::env::var("COMPLETION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let timeout_secs: u64 = std::env::var("COMPLETION_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("COMPLETION_TIMEOUT_SECS must be a valid u64");

        Some(Self {
            base_url,
            api_key,
            model,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}
