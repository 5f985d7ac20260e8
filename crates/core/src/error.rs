/// Domain errors shared by every crate in the workspace.
///
/// The HTTP layer maps each variant to a status code; see
/// `quickai_api::error::AppError`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Free usage limit of {limit} generations reached")]
    QuotaExceeded { limit: u32 },
}
