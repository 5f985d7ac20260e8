//! Creation entity model and insert DTO.
//!
//! Creations are immutable once written; there is no update DTO.

use serde::Serialize;
use sqlx::FromRow;
use quickai_core::creation::CreationRecord;
use quickai_core::types::{DbId, Timestamp};

/// Full row from the `creations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Creation {
    pub id: DbId,
    pub user_id: String,
    pub prompt: String,
    pub content: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub publish: bool,
    pub likes: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new creation.
#[derive(Debug, Clone)]
pub struct CreateCreation {
    pub user_id: String,
    pub prompt: String,
    pub content: String,
    pub kind: String,
}

impl From<&CreationRecord> for CreateCreation {
    fn from(record: &CreationRecord) -> Self {
        Self {
            user_id: record.caller_id.clone(),
            prompt: record.prompt.clone(),
            content: record.content.clone(),
            kind: record.kind.tag().to_string(),
        }
    }
}
