//! Plan tiers and the free-usage quota rule.
//!
//! The quota counter itself lives in the external identity store. This
//! module only decides whether a caller with a given plan and observed
//! counter may run another generation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of successful generations a free-tier caller may run.
pub const FREE_USAGE_LIMIT: u32 = 10;

/// Caller id substituted when no credential is sent outside production.
pub const DEV_CALLER_ID: &str = "dev-user";

/// Subscription tier of a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Premium,
}

impl Plan {
    /// Parse a plan name as stored in identity metadata.
    ///
    /// Only the exact string `"premium"` grants the premium tier; anything
    /// else (including unknown names) is treated as free.
    pub fn from_metadata(value: &str) -> Self {
        if value == "premium" {
            Plan::Premium
        } else {
            Plan::Free
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Premium => "premium",
        }
    }

    pub fn is_premium(&self) -> bool {
        matches!(self, Plan::Premium)
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved identity attached to every authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: String,
    pub plan: Plan,
    /// Free-tier generations consumed so far. Always `0` for premium callers.
    pub free_usage: u32,
}

impl Caller {
    /// The fixed identity used for credential-less requests in development.
    pub fn development() -> Self {
        Self {
            id: DEV_CALLER_ID.to_string(),
            plan: Plan::Free,
            free_usage: 0,
        }
    }

    /// Whether a successful generation should bump the stored counter.
    pub fn is_metered(&self) -> bool {
        !self.plan.is_premium()
    }
}

/// Reject a free-tier caller who has used up their allowance.
///
/// Premium callers always pass.
pub fn check_quota(plan: Plan, free_usage: u32) -> Result<(), CoreError> {
    if !plan.is_premium() && free_usage >= FREE_USAGE_LIMIT {
        return Err(CoreError::QuotaExceeded {
            limit: FREE_USAGE_LIMIT,
        });
    }
    Ok(())
}
