//! Repository for the `creations` table.

use sqlx::PgPool;

use crate::models::creation::{CreateCreation, Creation};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, prompt, content, type, publish, likes, created_at, updated_at";

/// Append and read operations for creations. There is no update or delete.
pub struct CreationRepo;

impl CreationRepo {
    /// Insert a new creation, returning the stored row.
    pub async fn create(pool: &PgPool, input: &CreateCreation) -> Result<Creation, sqlx::Error> {
        let query = format!(
            "INSERT INTO creations (user_id, prompt, content, type)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Creation>(&query)
            .bind(&input.user_id)
            .bind(&input.prompt)
            .bind(&input.content)
            .bind(&input.kind)
            .fetch_one(pool)
            .await
    }

    /// List a caller's creations, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Creation>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM creations WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Creation>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
