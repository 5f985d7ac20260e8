use std::sync::Arc;

use quickai_core::plan::Caller;
use quickai_identity::{IdentityError, IdentityStore};

/// Bumps a caller's stored free-usage counter after a successful generation.
///
/// This is a plain read-modify-write: the new value is derived from the
/// count observed when the request was admitted, not re-read from the
/// store. Two concurrent requests from one caller can therefore both write
/// the same value.
pub struct QuotaRecorder {
    identity: Arc<dyn IdentityStore>,
}

impl QuotaRecorder {
    pub fn new(identity: Arc<dyn IdentityStore>) -> Self {
        Self { identity }
    }

    /// Write `free_usage + 1` for metered callers.
    ///
    /// Returns the value written, or `None` when the caller is not metered.
    pub async fn record_usage(&self, caller: &Caller) -> Result<Option<u32>, IdentityError> {
        if !caller.is_metered() {
            return Ok(None);
        }
        let next = caller.free_usage.saturating_add(1);
        self.identity.set_free_usage(&caller.id, next).await?;
        Ok(Some(next))
    }
}
