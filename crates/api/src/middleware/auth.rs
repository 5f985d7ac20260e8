//! Caller resolution and the free-usage counter bootstrap.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use quickai_core::error::CoreError;
use quickai_core::plan::Caller;

use crate::error::AppError;
use crate::state::AppState;

/// The caller behind a request, resolved through the identity store.
///
/// Use this as an extractor parameter in any handler that generates content:
///
/// ```ignore
/// async fn my_handler(AuthCaller(caller): AuthCaller) -> AppResult<Json<()>> {
///     tracing::info!(caller_id = %caller.id, plan = %caller.plan, "handling request");
///     Ok(Json(()))
/// }
/// ```
///
/// Without an `Authorization` header the fixed development caller is used,
/// except in production where the request is rejected.
#[derive(Debug, Clone)]
pub struct AuthCaller(pub Caller);

impl FromRequestParts<AppState> for AuthCaller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts.headers.get(AUTHORIZATION) else {
            if state.config.environment.is_production() {
                return Err(AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                )));
            }
            tracing::debug!("No credential supplied, using development caller");
            return Ok(AuthCaller(Caller::development()));
        };

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid Authorization format. Expected: Bearer <token>".into(),
                ))
            })?;

        let caller_id = state.identity.authenticate(token).await?;
        let profile = state.identity.load_profile(&caller_id).await?;

        if profile.needs_counter_init() {
            match state.identity.set_free_usage(&profile.id, 0).await {
                Ok(()) => tracing::debug!(caller_id = %profile.id, "Initialised free usage counter"),
                Err(e) => tracing::warn!(
                    caller_id = %profile.id,
                    error = %e,
                    "Failed to initialise free usage counter"
                ),
            }
        }

        Ok(AuthCaller(profile.into_caller()))
    }
}
