//! Text completion for the QuickAI service.
//!
//! [`CompletionProvider`] is the seam the generation dispatcher calls;
//! [`OpenAiCompatClient`] implements it against any OpenAI-compatible
//! `/chat/completions` endpoint.

pub mod client;
pub mod config;
pub mod types;

use async_trait::async_trait;

pub use client::OpenAiCompatClient;
pub use config::CompletionConfig;
pub use types::{ChatMessage, CompletionRequest, Role};

/// Errors from the completion layer.
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Completion API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider answered 2xx but without any message content.
    #[error("Completion API returned no content")]
    EmptyResponse,
}

/// Something that turns a chat prompt into text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}
