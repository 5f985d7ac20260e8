use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use quickai_core::error::CoreError;
use quickai_core::generation::CommandKind;
use quickai_identity::IdentityError;
use serde_json::json;

use crate::engine::dispatcher::DispatchError;

/// Message returned with every 429.
pub const QUOTA_EXCEEDED_MESSAGE: &str = "Limit reached. Upgrade to continue.";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and [`IdentityError`] and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses of
/// the form `{"success": false, "message": ..., "code": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `quickai_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The caller could not be resolved.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Producing the generation result failed.
    #[error("{kind} generation failed: {source}")]
    Generation {
        kind: CommandKind,
        #[source]
        source: DispatchError,
    },

    /// The request body could not be read as the expected JSON.
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::QuotaExceeded { .. } => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "QUOTA_EXCEEDED",
                    QUOTA_EXCEEDED_MESSAGE.to_string(),
                ),
            },

            // --- Identity errors: both kinds answer with the same opaque 401 ---
            AppError::Identity(err) => {
                match err {
                    IdentityError::InvalidCredential(reason) => {
                        tracing::debug!(reason = %reason, "Rejected credential");
                    }
                    IdentityError::Unavailable(reason) => {
                        tracing::error!(error = %reason, "Identity store unavailable");
                    }
                }
                (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Unauthorized".to_string(),
                )
            }

            AppError::Generation { kind, source } => {
                tracing::error!(kind = %kind, error = %source, "Generation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GENERATION_FAILED",
                    kind.failure_message().to_string(),
                )
            }

            // --- HTTP-specific errors ---
            AppError::InvalidBody(rejection) => classify_json_rejection(rejection),
        };

        let body = json!({
            "success": false,
            "message": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a JSON body rejection into an HTTP status, error code, and message.
///
/// - Syntax and type errors map to 400, like any other bad input.
/// - Everything else keeps axum's status (413 body too large, 415 missing
///   `Content-Type`, ...).
fn classify_json_rejection(rejection: &JsonRejection) -> (StatusCode, &'static str, String) {
    let status = match rejection {
        JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
            StatusCode::BAD_REQUEST
        }
        other => other.status(),
    };
    let code = match status {
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        _ => "BAD_REQUEST",
    };
    (status, code, rejection.body_text())
}
