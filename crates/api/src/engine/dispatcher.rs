//! Routes a [`GenerationRequest`] to the completion provider or to the
//! built-in placeholder outputs.

use std::sync::Arc;

use quickai_completion::{ChatMessage, CompletionError, CompletionProvider, CompletionRequest};
use quickai_core::generation::{CommandKind, GenerationOutput, GenerationRequest, PromptPlan};

/// Why a dispatch produced no output.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    /// The request kind has no output of the expected shape.
    #[error("no output available for {0}")]
    Unsupported(CommandKind),
}

/// Executes exactly one command.
///
/// Text kinds (article, blog titles, resume review) go to the completion
/// provider when one is configured and to a deterministic template when not.
/// Image kinds always return placeholders.
pub struct Dispatcher {
    provider: Option<Arc<dyn CompletionProvider>>,
}

impl Dispatcher {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>) -> Self {
        Self { provider }
    }

    /// Produce the output for an already validated and admitted request.
    pub async fn dispatch(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutput, DispatchError> {
        let kind = request.kind();

        let Some(plan) = request.prompt_plan() else {
            let now = chrono::Utc::now().timestamp_millis();
            return request
                .placeholder_output(now)
                .ok_or(DispatchError::Unsupported(kind));
        };

        let Some(provider) = &self.provider else {
            tracing::debug!(kind = %kind, "No completion provider configured, using fallback");
            return request
                .fallback_output()
                .ok_or(DispatchError::Unsupported(kind));
        };

        let text = provider.complete(completion_request(plan)).await?;
        request
            .shape_completion(text)
            .ok_or(DispatchError::Unsupported(kind))
    }
}

fn completion_request(plan: PromptPlan) -> CompletionRequest {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = plan.system {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(plan.user));

    CompletionRequest {
        messages,
        temperature: plan.temperature,
        max_tokens: plan.max_tokens,
    }
}
