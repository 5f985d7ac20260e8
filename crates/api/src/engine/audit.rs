//! Append-only record of finished generations.

use async_trait::async_trait;
use quickai_core::creation::CreationRecord;
use quickai_db::models::creation::CreateCreation;
use quickai_db::repositories::CreationRepo;
use quickai_db::DbPool;

/// Errors from an [`AuditSink`]. Never surfaced to the HTTP caller.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Destination for [`CreationRecord`]s.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append(&self, record: &CreationRecord) -> Result<(), AuditError>;
}

/// Writes records to the `creations` table.
pub struct PgAuditSink {
    pool: DbPool,
}

impl PgAuditSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditSink for PgAuditSink {
    async fn append(&self, record: &CreationRecord) -> Result<(), AuditError> {
        let created = CreationRepo::create(&self.pool, &CreateCreation::from(record)).await?;
        tracing::debug!(
            creation_id = created.id,
            caller_id = %record.caller_id,
            kind = %record.kind,
            "Creation recorded"
        );
        Ok(())
    }
}

/// Used when no database is configured. Records are dropped.
#[derive(Debug, Default)]
pub struct DiscardAuditSink;

#[async_trait]
impl AuditSink for DiscardAuditSink {
    async fn append(&self, record: &CreationRecord) -> Result<(), AuditError> {
        tracing::debug!(
            caller_id = %record.caller_id,
            kind = %record.kind,
            "No database configured, creation not recorded"
        );
        Ok(())
    }
}
