//! Shared response envelope types for API handlers.
//!
//! Successful responses carry `"success": true` next to the payload fields,
//! e.g. `{ "success": true, "content": "..." }`. Failures are produced by
//! [`AppError`](crate::error::AppError).

use serde::Serialize;

/// Standard `{ "success": true, ...T }` response envelope.
///
/// `T` must serialize as a map; its fields are flattened beside `success`.
///
/// # Example
///
/// ```ignore
/// Ok(Json(SuccessResponse::new(output)))
/// ```
#[derive(Debug, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
