//! The generation flow shared by every command endpoint.
//!
//! Order matters: validation, then the quota check, then the dispatcher.
//! Nothing external is called for a request that fails either check. The
//! audit write and usage increment run only after the result is final and
//! can never change it.

pub mod audit;
pub mod dispatcher;
pub mod quota;

use std::sync::Arc;

use quickai_core::creation::CreationRecord;
use quickai_core::generation::{GenerationOutput, GenerationRequest};
use quickai_core::plan::{check_quota, Caller};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

use quota::QuotaRecorder;

/// Run one command for `caller` and return its payload.
pub async fn generate(
    state: &AppState,
    caller: &Caller,
    request: GenerationRequest,
) -> AppResult<GenerationOutput> {
    let kind = request.kind();

    request.validate()?;
    check_quota(caller.plan, caller.free_usage)?;

    let output = state
        .dispatcher
        .dispatch(&request)
        .await
        .map_err(|source| AppError::Generation { kind, source })?;

    tracing::info!(
        caller_id = %caller.id,
        plan = %caller.plan,
        kind = %kind,
        "Generation succeeded"
    );

    let record = CreationRecord::from_generation(&caller.id, &request, &output);
    run_side_effects(state, caller.clone(), record).await;

    Ok(output)
}

/// Append the audit record, then bump the caller's usage counter.
///
/// Failures are logged and dropped. With `detach_side_effects` the work is
/// spawned and the response does not wait for it.
async fn run_side_effects(state: &AppState, caller: Caller, record: CreationRecord) {
    let audit = Arc::clone(&state.audit);
    let quota = QuotaRecorder::new(Arc::clone(&state.identity));

    let work = async move {
        if let Err(e) = audit.append(&record).await {
            tracing::error!(
                caller_id = %record.caller_id,
                kind = %record.kind,
                error = %e,
                "Failed to record creation"
            );
        }

        match quota.record_usage(&caller).await {
            Ok(Some(used)) => {
                tracing::debug!(caller_id = %caller.id, free_usage = used, "Recorded free usage");
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(
                caller_id = %caller.id,
                error = %e,
                "Failed to record free usage"
            ),
        }
    };

    if state.config.detach_side_effects {
        tokio::spawn(work);
    } else {
        work.await;
    }
}
